//! Core implementation of the Cypress TTSP touch controller driver.

use core::fmt::Debug;

use embassy_futures::select::{select, Either};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use heapless::Vec;

use crate::bus::I2cDevice;
use crate::config::{Config, ConfigError, PinRole};
use crate::error::{Error, PinError};
use crate::registers::*;
use crate::touchscreen::{
    TouchEvent, TouchPoint, TouchTracker, Touches, Touchscreen, TouchscreenConfig, MAX_TOUCHES,
};

/// Interrupt, RTS and enable pins, in that order.
pub type Pins<TINT, TRTS, TEN> = (TINT, TRTS, TEN);

const PING_RETRIES: usize = 5;

/// Lifecycle of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// `init` has not completed yet, or the controller was powered off.
    Uninitialized,
    /// The controller is out of its bootloader and reporting touches.
    Ready,
    /// The last `init` failed.
    Failed,
}

/// A controller for Cypress TTSP touch panels.
pub struct CypressTouch<TI2C, TINT, TRTS, TEN, TDELAY> {
    bus: I2cDevice<TI2C>,
    int_pin: TINT,
    rts_pin: TRTS,
    enable_pin: TEN,
    delay: TDELAY,
    config: Config,
    state: DriverState,
    tracker: TouchTracker,
    bootloader: Option<BootloaderData>,
    sysinfo: Option<SysInfo>,
}

impl<TI2C, TINT, TRTS, TEN, TDELAY, TPINERR> CypressTouch<TI2C, TINT, TRTS, TEN, TDELAY>
where
    TPINERR: Debug,
    TI2C: I2c<SevenBitAddress>,
    TINT: InputPin<Error = TPINERR> + Wait,
    TRTS: OutputPin<Error = TPINERR>,
    TEN: OutputPin<Error = TPINERR>,
    TDELAY: DelayNs,
{
    /// Creates a new `CypressTouch`.
    ///
    /// # Arguments
    ///
    /// * `i2c` - An I2C peripheral that implements `embedded-hal-async::i2c::I2c`.
    /// * `pins` - The interrupt input, the RTS (reset) output and the enable output.
    /// * `delay` - A delay provider, e.g. `embassy_time::Delay`.
    /// * `config` - Address and touchscreen settings; rejected if invalid.
    ///
    /// The controller is not touched until [`init`](Self::init) is called.
    ///
    /// All three pins are required, and the interrupt pin must be an input
    /// that can be awaited:
    ///
    /// ```
    /// use core::convert::Infallible;
    /// use cypress_touch_async::{config::Config, touch::CypressTouch};
    /// use embedded_hal::digital::{InputPin, OutputPin};
    /// use embedded_hal_async::{delay::DelayNs, digital::Wait, i2c::I2c};
    ///
    /// fn build<B, INT, OUT, D>(i2c: B, int: INT, rts: OUT, enable: OUT, delay: D)
    /// where
    ///     B: I2c,
    ///     INT: InputPin<Error = Infallible> + Wait,
    ///     OUT: OutputPin<Error = Infallible>,
    ///     D: DelayNs,
    /// {
    ///     let _ = CypressTouch::new(i2c, (int, rts, enable), delay, Config::default());
    /// }
    /// ```
    ///
    /// Leaving out the enable pin does not compile:
    ///
    /// ```compile_fail
    /// use core::convert::Infallible;
    /// use cypress_touch_async::{config::Config, touch::CypressTouch};
    /// use embedded_hal::digital::{InputPin, OutputPin};
    /// use embedded_hal_async::{delay::DelayNs, digital::Wait, i2c::I2c};
    ///
    /// fn build<B, INT, OUT, D>(i2c: B, int: INT, rts: OUT, delay: D)
    /// where
    ///     B: I2c,
    ///     INT: InputPin<Error = Infallible> + Wait,
    ///     OUT: OutputPin<Error = Infallible>,
    ///     D: DelayNs,
    /// {
    ///     let _ = CypressTouch::new(i2c, (int, rts), delay, Config::default());
    /// }
    /// ```
    ///
    /// Neither does an output-only pin on the interrupt line:
    ///
    /// ```compile_fail
    /// use core::convert::Infallible;
    /// use cypress_touch_async::{config::Config, touch::CypressTouch};
    /// use embedded_hal::digital::OutputPin;
    /// use embedded_hal_async::{delay::DelayNs, i2c::I2c};
    ///
    /// fn build<B, OUT, D>(i2c: B, int: OUT, rts: OUT, enable: OUT, delay: D)
    /// where
    ///     B: I2c,
    ///     OUT: OutputPin<Error = Infallible>,
    ///     D: DelayNs,
    /// {
    ///     let _ = CypressTouch::new(i2c, (int, rts, enable), delay, Config::default());
    /// }
    /// ```
    pub fn new(
        i2c: TI2C,
        pins: Pins<TINT, TRTS, TEN>,
        delay: TDELAY,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (int_pin, rts_pin, enable_pin) = pins;
        Ok(Self {
            bus: I2cDevice::new(i2c, config.address),
            int_pin,
            rts_pin,
            enable_pin,
            delay,
            config,
            state: DriverState::Uninitialized,
            tracker: TouchTracker::new(),
            bootloader: None,
            sysinfo: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The validated configuration the driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bootloader registers as read during the last `init`.
    pub fn bootloader_data(&self) -> Option<&BootloaderData> {
        self.bootloader.as_ref()
    }

    /// System information as read during the last `init`.
    pub fn sysinfo(&self) -> Option<&SysInfo> {
        self.sysinfo.as_ref()
    }

    /// Returns the bus, the pins and the delay.
    pub fn release(self) -> (TI2C, Pins<TINT, TRTS, TEN>, TDELAY) {
        (
            self.bus.release(),
            (self.int_pin, self.rts_pin, self.enable_pin),
            self.delay,
        )
    }

    /// Initializes the touch controller.
    ///
    /// Powers and resets the chip, leaves the bootloader, reads the system
    /// information, programs the scan intervals and switches to operate mode.
    /// On failure the driver is left in [`DriverState::Failed`].
    pub async fn init(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        log::info!("Setting up Cypress Touchscreen...");
        self.state = DriverState::Uninitialized;
        self.tracker.clear();
        match self.setup().await {
            Ok(()) => {
                self.state = DriverState::Ready;
                self.config.log();
                Ok(())
            }
            Err(err) => {
                log::error!("Cypress touchscreen setup failed: {err:?}");
                self.state = DriverState::Failed;
                Err(err)
            }
        }
    }

    async fn setup(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.power_on().await?;
        self.hard_reset().await?;
        log::trace!("touch::init reset done");

        self.ping(PING_RETRIES).await?;
        self.soft_reset().await?;
        log::trace!("touch::init soft reset done");

        self.bootloader = Some(self.load_bootloader_registers().await?);
        self.exit_bootloader_mode().await?;
        log::trace!("touch::init bootloader exited");

        self.set_sysinfo_mode().await?;
        self.set_sysinfo_registers().await?;
        log::trace!("touch::init sysinfo done");

        self.bus.write(&[REG_BASE, MODE_OPERATE]).await?;
        self.bus.write_register(REG_DIST, &[DIST_DEFAULT]).await?;

        self.delay.delay_ms(50).await;
        self.set_power_mode(PowerMode::Operate).await?;
        log::trace!("touch::init done");
        Ok(())
    }

    async fn power_on(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.enable_pin
            .set_high()
            .map_err(|e| PinError::Output(PinRole::Enable, e))?;
        self.delay.delay_ms(10).await;
        Ok(())
    }

    async fn set_rts(&mut self, high: bool) -> Result<(), Error<TI2C::Error, TPINERR>> {
        let result = if high {
            self.rts_pin.set_high()
        } else {
            self.rts_pin.set_low()
        };
        result
            .map_err(|e| PinError::Output(PinRole::Rts, e))
            .map_err(Into::into)
    }

    /// Pulses the RTS line low.
    pub async fn hard_reset(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.set_rts(true).await?;
        self.delay.delay_ms(10).await;
        self.set_rts(false).await?;
        self.delay.delay_ms(2).await;
        self.set_rts(true).await?;
        self.delay.delay_ms(10).await;
        Ok(())
    }

    async fn soft_reset(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.set_rts(true).await?;
        self.bus.write(&[REG_BASE, MODE_SOFT_RESET]).await?;
        self.delay.delay_ms(20).await;
        Ok(())
    }

    async fn ping(&mut self, retries: usize) -> Result<(), Error<TI2C::Error, TPINERR>> {
        for attempt in 0..retries {
            if self.bus.ping().await.is_ok() {
                return Ok(());
            }
            log::trace!("touch::ping attempt {} not acknowledged", attempt + 1);
            self.delay.delay_ms(20).await;
        }
        Err(Error::NotResponding)
    }

    async fn load_bootloader_registers(
        &mut self,
    ) -> Result<BootloaderData, Error<TI2C::Error, TPINERR>> {
        let mut buf = [0u8; BootloaderData::LEN];
        self.bus.read_register(REG_BASE, &mut buf).await?;
        Ok(BootloaderData::from_bytes(&buf))
    }

    async fn exit_bootloader_mode(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.bus
            .write_register(REG_BASE, &EXIT_BOOTLOADER_CMD)
            .await?;
        self.delay.delay_ms(500).await;

        let data = self.load_bootloader_registers().await?;
        self.bootloader = Some(data);
        if data.in_bootloader() {
            return Err(Error::BootloaderExit(data));
        }
        Ok(())
    }

    async fn set_sysinfo_mode(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.bus.write(&[REG_BASE, MODE_SYSINFO]).await?;
        self.delay.delay_ms(20).await;

        let mut buf = [0u8; SysInfo::LEN];
        self.bus.read_register(REG_BASE, &mut buf).await?;
        self.handshake().await?;

        let info = SysInfo::from_bytes(&buf);
        self.sysinfo = Some(info);
        if !info.is_valid() {
            return Err(Error::InvalidSysInfo);
        }
        Ok(())
    }

    async fn set_sysinfo_registers(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.bus
            .write_register(REG_ACT_INTRVL, &self.config.intervals.to_bytes())
            .await?;
        self.delay.delay_ms(20).await;
        Ok(())
    }

    /// Acknowledges the last read by toggling the handshake bit.
    pub async fn handshake(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        let mut mode = [0u8; 1];
        self.bus.read_register(REG_BASE, &mut mode).await?;
        mode[0] ^= HANDSHAKE_BIT;
        self.bus.write_register(REG_BASE, &mode).await?;
        Ok(())
    }

    /// Reads and acknowledges one raw touch data block.
    pub async fn read_report(&mut self) -> Result<TouchReport, Error<TI2C::Error, TPINERR>> {
        let mut buf = [0u8; TouchReport::LEN];
        self.bus.read_register(REG_BASE, &mut buf).await?;
        self.handshake().await?;
        Ok(TouchReport::from_bytes(&buf))
    }

    fn ensure_ready(&self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        match self.state {
            DriverState::Ready => Ok(()),
            state => Err(Error::NotReady(state)),
        }
    }

    /// Reads the current frame without waiting for the interrupt line.
    pub async fn update_touches(&mut self) -> Result<Touches, Error<TI2C::Error, TPINERR>> {
        self.ensure_ready()?;
        let report = self.read_report().await?;
        let fingers = usize::from(report.fingers);
        if fingers > MAX_TOUCHES {
            log::warn!(
                "Invalid number of touches detected ({}), ignoring...",
                report.fingers
            );
            return Err(Error::InvalidTouchCount(report.fingers));
        }
        log::trace!("Touch count: {fingers}");

        let mut frame: Vec<TouchPoint, MAX_TOUCHES> = Vec::new();
        for (id, raw) in report.points.iter().take(fingers).enumerate() {
            let (x, y) = self.config.touchscreen.normalize(raw.x, raw.y);
            // `take(fingers)` keeps this within capacity.
            let _ = frame.push(TouchPoint {
                id: id as u8,
                event: TouchEvent::Contact,
                x,
                y,
                x_raw: raw.x,
                y_raw: raw.y,
                pressure: raw.z,
            });
        }
        Ok(self.tracker.update(&frame))
    }

    /// Waits for a falling edge on the interrupt line.
    ///
    /// Returns `false` if the configured interrupt timeout elapsed first.
    pub async fn wait_for_interrupt(&mut self) -> Result<bool, Error<TI2C::Error, TPINERR>> {
        let timeout_ms = self.config.touchscreen.interrupt_timeout.as_millis();
        let timeout_ms = u32::try_from(timeout_ms).unwrap_or(u32::MAX);
        match select(
            self.int_pin.wait_for_falling_edge(),
            self.delay.delay_ms(timeout_ms),
        )
        .await
        {
            Either::First(result) => {
                result.map_err(PinError::Input)?;
                Ok(true)
            }
            Either::Second(()) => Ok(false),
        }
    }

    /// Checks if a touch is currently active by reading the interrupt pin state.
    pub fn is_touch_active(&mut self) -> Result<bool, Error<TI2C::Error, TPINERR>> {
        self.int_pin
            .is_low()
            .map_err(PinError::Input)
            .map_err(Into::into)
    }

    /// Switches the controller between operate, low-power and deep-sleep scanning.
    pub async fn set_power_mode(
        &mut self,
        mode: PowerMode,
    ) -> Result<(), Error<TI2C::Error, TPINERR>> {
        self.bus
            .write(&[REG_BASE, mode.register_value()])
            .await
            .map_err(Into::into)
    }

    /// Reads the power mode from the host mode register.
    ///
    /// `None` means the controller is in a non-scanning mode such as sysinfo.
    pub async fn power_mode(&mut self) -> Result<Option<PowerMode>, Error<TI2C::Error, TPINERR>> {
        let mut mode = [0u8; 1];
        self.bus.read_register(REG_BASE, &mut mode).await?;
        Ok(PowerMode::from_register(mode[0]))
    }

    /// Whether the controller is scanning at full rate.
    pub async fn is_operating(&mut self) -> Result<bool, Error<TI2C::Error, TPINERR>> {
        Ok(self.power_mode().await? == Some(PowerMode::Operate))
    }

    /// Puts the controller into deep sleep and cuts its power.
    ///
    /// `init` has to be called again before reading touches.
    pub async fn power_off(&mut self) -> Result<(), Error<TI2C::Error, TPINERR>> {
        if self.state == DriverState::Ready {
            self.set_power_mode(PowerMode::DeepSleep).await?;
        }
        self.enable_pin
            .set_low()
            .map_err(|e| PinError::Output(PinRole::Enable, e))?;
        self.state = DriverState::Uninitialized;
        self.tracker.clear();
        Ok(())
    }
}

impl<TI2C, TINT, TRTS, TEN, TDELAY, TPINERR> Touchscreen
    for CypressTouch<TI2C, TINT, TRTS, TEN, TDELAY>
where
    TPINERR: Debug,
    TI2C: I2c<SevenBitAddress>,
    TINT: InputPin<Error = TPINERR> + Wait,
    TRTS: OutputPin<Error = TPINERR>,
    TEN: OutputPin<Error = TPINERR>,
    TDELAY: DelayNs,
{
    type Error = Error<TI2C::Error, TPINERR>;

    /// Waits for the interrupt line (bounded by the configured timeout), then
    /// reads the frame.
    async fn read_touches(&mut self) -> Result<Touches, Self::Error> {
        self.ensure_ready()?;
        if !self.wait_for_interrupt().await? {
            log::trace!("touch::read_touches interrupt timeout, polling");
        }
        self.update_touches().await
    }

    fn touchscreen_config(&self) -> &TouchscreenConfig {
        &self.config.touchscreen
    }
}
