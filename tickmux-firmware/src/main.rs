//! Tickmux servo demo
//!
//! Drives two hobby servos from a single RP2040 TIMER alarm. The pulse
//! edges for both are multiplexed onto one comparator by `tickmux-core`;
//! an async task sweeps their positions.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use tickmux_hal_rp2040::GpioOutput;
use {defmt_rtt as _, panic_probe as _};

mod tasks;
mod ticker;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tickmux servo demo starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let pan = GpioOutput::new(Output::new(p.PIN_2, Level::Low));
    let tilt = GpioOutput::new(Output::new(p.PIN_3, Level::Low));

    let [pan, tilt] = match ticker::init_servos([pan, tilt]) {
        Ok(servos) => servos,
        Err(e) => {
            error!("Servo setup failed: {}", e);
            loop {
                embassy_time::Timer::after_secs(60).await;
            }
        }
    };

    ticker::start();
    info!(
        "Ticker running, {} servos attached, next edge at {}",
        ticker::SERVO_COUNT,
        ticker::TICKER.next_deadline()
    );

    spawner.spawn(tasks::sweep_task(pan, tilt)).unwrap();

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat, counter at {}", ticker::TICKER.current_time());
    }
}
