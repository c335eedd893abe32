//! Peripheral drivers built on the timer multiplexer
//!
//! Each driver here is a client of `tickmux-core`: it owns one or more
//! event slots and does its work from the ticker's interrupt callback.
//!
//! - Servo pulse train generation ([`servo`])

#![no_std]
#![deny(unsafe_code)]

pub mod servo;
