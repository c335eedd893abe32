//! Servo sweep task
//!
//! Moves the two demo servos back and forth in opposite directions. The
//! pulses themselves come from the ticker interrupt; this task only updates
//! the target positions.

use defmt::*;
use embassy_time::Timer;
use tickmux_drivers::servo::ServoIndex;

use crate::ticker::TICKER;

/// Degrees moved per update
const SWEEP_STEP_DEG: i32 = 2;

/// Time between position updates
const SWEEP_INTERVAL_MS: u64 = 20;

#[embassy_executor::task]
pub async fn sweep_task(pan: ServoIndex, tilt: ServoIndex) {
    info!("Sweep task started");

    let mut angle: i32 = 0;
    let mut step = SWEEP_STEP_DEG;

    loop {
        let written = TICKER.with(|ticker| {
            ticker.handler_mut().map(|servos| {
                servos
                    .write(pan, angle)
                    .and_then(|_| servos.write(tilt, 180 - angle))
            })
        });
        if let Some(Err(e)) = written {
            warn!("Servo write failed: {}", e);
        }

        if !(0..=180).contains(&(angle + step)) {
            step = -step;
            trace!("Sweep reversed at {} deg", angle);
        }
        angle += step;

        Timer::after_millis(SWEEP_INTERVAL_MS).await;
    }
}
