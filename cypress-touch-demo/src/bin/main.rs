#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

use cypress_touch_async::config::Config as TouchConfig;
use cypress_touch_async::error::Error;
use cypress_touch_async::touch::CypressTouch;
use cypress_touch_async::{TouchEvent, Touchscreen};
use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::i2c::master::I2c;
use esp_hal::Async;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig},
    time::Rate,
    timer::systimer::SystemTimer,
};
use esp_println::println;
use log::{info, warn};

type Touch = CypressTouch<
    I2c<'static, Async>,
    Input<'static>,
    Output<'static>,
    Output<'static>,
    Delay,
>;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let touch_int = Input::new(peripherals.GPIO12, InputConfig::default());
    let touch_rts = Output::new(peripherals.GPIO45, Level::High, OutputConfig::default());
    let touch_enable = Output::new(peripherals.GPIO39, Level::Low, OutputConfig::default());

    let i2c_config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
    let touch_i2c = I2c::new(peripherals.I2C0, i2c_config)
        .unwrap()
        .with_sda(peripherals.GPIO13)
        .with_scl(peripherals.GPIO14)
        .into_async();

    let mut touch = match CypressTouch::new(
        touch_i2c,
        (touch_int, touch_rts, touch_enable),
        Delay,
        TouchConfig::default(),
    ) {
        Ok(touch) => touch,
        Err(err) => panic!("Invalid touch configuration: {err}"),
    };

    match touch.init().await {
        Ok(_) => log::debug!("Touch controller initialized."),
        Err(_) => warn!("Error initializing touch controller."),
    };

    spawner.spawn(read_touch(touch)).unwrap();

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// A task that continuously reads touch events and logs them.
#[embassy_executor::task]
async fn read_touch(mut touch: Touch) {
    loop {
        match touch.read_touches().await {
            Ok(touches) => {
                for point in touches.iter() {
                    match point.event {
                        TouchEvent::Down => info!("Touch down {point:?}"),
                        TouchEvent::Contact => log::debug!("Touch move {point:?}"),
                        TouchEvent::Up => info!("Touch up {point:?}"),
                    }
                }
            }
            Err(Error::NotReady(state)) => {
                warn!("Touch controller not ready ({state:?}), retrying init.");
                Timer::after(Duration::from_secs(1)).await;
                let _ = touch.init().await;
            }
            Err(err) => {
                warn!("Error receiving touch: {err:?}");
                Timer::after(Duration::from_millis(100)).await;
            }
        }
    }
}
