//! Servo timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most channels one bank can drive within a refresh frame
pub const MAX_SERVOS: usize = 12;

/// Shortest pulse, sent for 0 degrees
pub const MIN_PULSE_WIDTH_US: u16 = 544;

/// Longest pulse, sent for 180 degrees
pub const MAX_PULSE_WIDTH_US: u16 = 2400;

/// Pulse sent to a freshly attached servo
pub const DEFAULT_PULSE_WIDTH_US: u16 = 1500;

/// Time between the starts of consecutive pulse frames
pub const REFRESH_INTERVAL_US: u32 = 20_000;

/// Shortest gap ever scheduled at the end of a frame
pub const MIN_FRAME_GAP_US: u32 = 40;

/// Servo bank timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Pulse width for 0 degrees unless overridden at attach
    pub min_pulse_us: u16,
    /// Pulse width for 180 degrees unless overridden at attach
    pub max_pulse_us: u16,
    /// Initial pulse width of new channels
    pub default_pulse_us: u16,
    /// Frame period
    pub refresh_interval_us: u32,
    /// Delay from the first attach to the first frame
    pub start_delay_us: u32,
    /// Hardware counter ticks per microsecond
    pub ticks_per_us: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: MIN_PULSE_WIDTH_US,
            max_pulse_us: MAX_PULSE_WIDTH_US,
            default_pulse_us: DEFAULT_PULSE_WIDTH_US,
            refresh_interval_us: REFRESH_INTERVAL_US,
            start_delay_us: 1000,
            ticks_per_us: 1,
        }
    }
}

impl ServoConfig {
    /// Check the configuration can produce a valid frame
    pub fn is_valid(&self) -> bool {
        self.ticks_per_us > 0
            && self.min_pulse_us < self.max_pulse_us
            && (self.min_pulse_us..=self.max_pulse_us).contains(&self.default_pulse_us)
            && self.refresh_interval_us > 2 * MIN_FRAME_GAP_US
    }

    /// Convert microseconds to counter ticks
    pub fn ticks(&self, us: u32) -> u32 {
        us.wrapping_mul(self.ticks_per_us)
    }

    /// Convert counter ticks to whole microseconds
    pub fn micros(&self, ticks: u32) -> u32 {
        ticks / self.ticks_per_us.max(1)
    }

    /// Wait after the last pulse of a frame, given the time the frame took
    ///
    /// Keeps at least [`MIN_FRAME_GAP_US`] between frames even when the
    /// pulses overran the refresh interval.
    pub fn frame_gap_us(&self, elapsed_us: u32) -> u32 {
        let elapsed = elapsed_us.clamp(
            MIN_FRAME_GAP_US,
            self.refresh_interval_us - MIN_FRAME_GAP_US,
        );
        self.refresh_interval_us - elapsed
    }
}
