//! Single-comparator timer multiplexer
//!
//! Many logical timers (servo pulse edges, UART timeouts, ...) share one
//! hardware counter/comparator pair. This crate holds everything that does
//! not depend on a particular chip:
//!
//! - Wraparound-aware timestamp arithmetic ([`wrap`])
//! - Fixed-capacity, deadline-ordered event queue ([`queue`])
//! - Interrupt-driven dispatcher that drains due events ([`dispatcher`])
//! - Critical-section wrapper for a process-wide instance ([`shared`])
//!
//! Nothing here allocates; every slot lives in a const-sized arena.

#![no_std]
#![deny(unsafe_code)]

pub mod dispatcher;
pub mod queue;
pub mod shared;
pub mod wrap;

pub use dispatcher::{EventHandler, Ticker, TickerContext, TickerState};
pub use queue::{EventHandle, EventQueue};
pub use shared::SharedTicker;
pub use tickmux_hal::{HardwareTimer, Timestamp};
