//! Process-wide ticker on TIMER alarm 1
//!
//! embassy-rp's time driver owns alarm 0 and `TIMER_IRQ_0`; the multiplexer
//! takes the next alarm and its own interrupt line.

use embassy_rp::interrupt;
use embassy_rp::interrupt::InterruptExt;
use tickmux_core::{SharedTicker, Ticker};
use tickmux_drivers::servo::{ServoBank, ServoConfig, ServoError, ServoIndex};
use tickmux_hal_rp2040::{AlarmTimer, GpioOutput};

/// Servos driven by the demo
pub const SERVO_COUNT: usize = 2;

/// Event slots on the ticker; the servo bank needs one
pub const EVENT_SLOTS: usize = 4;

pub type Servos = ServoBank<GpioOutput<'static>, SERVO_COUNT>;

pub static TICKER: SharedTicker<AlarmTimer<1>, Servos, EVENT_SLOTS> =
    SharedTicker::new(Ticker::new(AlarmTimer::new()));

#[interrupt]
fn TIMER_IRQ_1() {
    TICKER.on_interrupt();
}

/// Install the servo bank and attach one servo per pin
pub fn init_servos(
    pins: [GpioOutput<'static>; SERVO_COUNT],
) -> Result<[ServoIndex; SERVO_COUNT], ServoError> {
    TICKER.with(|ticker| {
        let event = ticker.claim_event().ok_or(ServoError::TooManyServos)?;
        ticker.set_event_handler(ServoBank::new(event, ServoConfig::default())?);

        let [pan, tilt] = pins;
        ticker
            .with_handler(|servos, ctx| {
                let pan = servos.attach(pan, ctx)?;
                let tilt = servos.attach(tilt, ctx)?;
                Ok([pan, tilt])
            })
            .ok_or(ServoError::InvalidConfig)?
    })
}

/// Unmask the ticker interrupt
pub fn start() {
    interrupt::TIMER_IRQ_1.unpend();
    // SAFETY: the handler only touches TICKER, which is guarded by a critical section
    unsafe { interrupt::TIMER_IRQ_1.enable() };
}
