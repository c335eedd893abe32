//! RP2040 support for the timer multiplexer
//!
//! Implements the `tickmux-hal` traits on top of embassy-rp:
//!
//! - [`timer::AlarmTimer`] - One TIMER alarm as the multiplexer comparator
//! - [`gpio::GpioOutput`] - Push-pull output for pulse-generating clients
//!
//! embassy-rp's own time driver owns alarm 0, so multiplexer instances
//! should use alarms 1 to 3.

#![no_std]

pub mod gpio;
pub mod timer;

pub use gpio::GpioOutput;
pub use timer::AlarmTimer;
