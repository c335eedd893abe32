//! Tickmux Hardware Abstraction Layer
//!
//! This crate defines the hardware contracts the timer multiplexer and its
//! clients depend on. Chip-specific crates implement them; the core and the
//! drivers only ever see these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Clients (tickmux-drivers, firmware)     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  tickmux-core (queue + dispatcher)       │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  tickmux-hal (this crate - traits)       │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          ┌─────────────────────┐
//!          │  tickmux-hal-rp2040 │
//!          └─────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timer::HardwareTimer`] - Free-running counter with one comparator
//! - [`gpio::OutputPin`] - Digital output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;

pub use gpio::OutputPin;
pub use timer::{HardwareTimer, Timestamp};
