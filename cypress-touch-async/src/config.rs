//! Driver configuration and its validation.

use core::fmt;

use embedded_hal_async::i2c::SevenBitAddress;

use crate::touchscreen::TouchscreenConfig;

/// Default I2C address of the controller.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x24;

/// The three GPIO lines wired to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    /// Input, pulled low by the controller when a frame is ready.
    Interrupt,
    /// Output, drives the controller's reset line.
    Rts,
    /// Output, powers the controller.
    Enable,
}

/// A raw controller axis, as named by its calibration range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Scan timing written to the controller during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanIntervals {
    /// Active-mode scan interval.
    pub active: u8,
    /// Time without touch before dropping into low-power scanning.
    pub touch_timeout: u8,
    /// Low-power scan interval.
    pub low_power: u8,
}

impl Default for ScanIntervals {
    fn default() -> Self {
        Self {
            active: 0x00,
            touch_timeout: 0xFF,
            low_power: 0x0A,
        }
    }
}

impl ScanIntervals {
    /// Register contents starting at the active interval register.
    pub fn to_bytes(self) -> [u8; 3] {
        [self.active, self.touch_timeout, self.low_power]
    }
}

/// Why a [`Config`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Not a usable 7-bit device address.
    InvalidAddress(u8),
    /// The calibration range of an axis is empty.
    InvalidCalibration { axis: Axis, min: u16, max: u16 },
    /// The interrupt wait timeout is zero.
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(addr) => write!(f, "invalid I2C address 0x{addr:02X}"),
            Self::InvalidCalibration { axis, min, max } => {
                write!(f, "invalid {axis:?} calibration: min {min} >= max {max}")
            }
            Self::InvalidTimeout => write!(f, "interrupt timeout must be non-zero"),
        }
    }
}

/// Configuration of a Cypress touch controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// 7-bit I2C address.
    pub address: SevenBitAddress,
    pub touchscreen: TouchscreenConfig,
    pub intervals: ScanIntervals,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            touchscreen: TouchscreenConfig::default(),
            intervals: ScanIntervals::default(),
        }
    }
}

impl Config {
    /// Same as [`Config::default`]: address `0x24`, default panel and scan timing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the 7-bit I2C address.
    pub fn with_address(mut self, address: SevenBitAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the display geometry, calibration and orientation.
    pub fn with_touchscreen(mut self, touchscreen: TouchscreenConfig) -> Self {
        self.touchscreen = touchscreen;
        self
    }

    /// Sets the scan timing written during setup.
    pub fn with_intervals(mut self, intervals: ScanIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Checks every key that the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 0x00-0x07 and 0x78-0x7F are reserved by the I2C specification.
        if !(0x08..=0x77).contains(&self.address) {
            return Err(ConfigError::InvalidAddress(self.address));
        }
        let cal = &self.touchscreen.calibration;
        if cal.x_min >= cal.x_max {
            return Err(ConfigError::InvalidCalibration {
                axis: Axis::X,
                min: cal.x_min,
                max: cal.x_max,
            });
        }
        if cal.y_min >= cal.y_max {
            return Err(ConfigError::InvalidCalibration {
                axis: Axis::Y,
                min: cal.y_min,
                max: cal.y_max,
            });
        }
        if self.touchscreen.interrupt_timeout.as_ticks() == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Logs the configuration.
    pub fn log(&self) {
        log::info!("{self}");
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = &self.touchscreen;
        writeln!(f, "Cypress Touchscreen:")?;
        writeln!(f, "  Address: 0x{:02X}", self.address)?;
        writeln!(f, "  Display: {}x{}", ts.width, ts.height)?;
        writeln!(f, "  Calibration: {:?}", ts.calibration)?;
        writeln!(f, "  Transform: {:?}", ts.transform)?;
        write!(f, "  Scan intervals: {:?}", self.intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touchscreen::Calibration;
    use embassy_time::Duration;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert_eq!(config.address, 0x24);
        assert_eq!(config.intervals.to_bytes(), [0x00, 0xFF, 0x0A]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_reserved_addresses() {
        for address in [0x00, 0x07, 0x78, 0x7F, 0x80, 0xFF] {
            assert_eq!(
                Config::new().with_address(address).validate(),
                Err(ConfigError::InvalidAddress(address))
            );
        }
        assert!(Config::new().with_address(0x08).validate().is_ok());
        assert!(Config::new().with_address(0x77).validate().is_ok());
    }

    #[test]
    fn rejects_empty_calibration() {
        let touchscreen = TouchscreenConfig {
            calibration: Calibration {
                x_min: 0,
                x_max: 100,
                y_min: 50,
                y_max: 50,
            },
            ..TouchscreenConfig::default()
        };
        assert_eq!(
            Config::new().with_touchscreen(touchscreen).validate(),
            Err(ConfigError::InvalidCalibration {
                axis: Axis::Y,
                min: 50,
                max: 50
            })
        );
    }

    #[test]
    fn dump_lists_settings() {
        let dump = format!("{}", Config::new().with_address(0x1A));
        assert!(dump.starts_with("Cypress Touchscreen:"));
        assert!(dump.contains("  Address: 0x1A\n"));
        assert!(dump.contains("  Display: 0x0\n"));
        assert!(dump.contains("touch_timeout: 255"));
        // Pins are generic and only the driver holds them.
        assert!(!dump.contains("Pins"));
        assert!(!dump.contains("Interrupt"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let touchscreen = TouchscreenConfig {
            interrupt_timeout: Duration::from_ticks(0),
            ..TouchscreenConfig::default()
        };
        assert_eq!(
            Config::new().with_touchscreen(touchscreen).validate(),
            Err(ConfigError::InvalidTimeout)
        );
    }
}
