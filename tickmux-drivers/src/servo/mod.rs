//! Hobby servo pulse generation
//!
//! Drives up to [`MAX_SERVOS`] servos from one ticker event. The event acts
//! as a cursor that walks the channels in turn: each callback ends the
//! current channel's pulse, starts the next one and re-inserts itself for
//! that channel's pulse width. After the last channel it waits out the rest
//! of the refresh frame.

pub mod bank;
pub mod config;

pub use bank::{ServoBank, ServoError, ServoIndex};
pub use config::{
    ServoConfig, DEFAULT_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US, MAX_SERVOS, MIN_PULSE_WIDTH_US,
    REFRESH_INTERVAL_US,
};
