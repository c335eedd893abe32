//! TIMER alarm comparator
//!
//! The RP2040 TIMER peripheral counts microseconds in a 64-bit register.
//! Each of its four alarms compares against the low 32 bits only, which is
//! exactly the wrapping 32-bit counter the multiplexer expects.

use embassy_rp::pac;
use tickmux_core::wrap;
use tickmux_hal::{HardwareTimer, Timestamp};

/// Number of alarms on the TIMER peripheral
pub const ALARM_COUNT: usize = 4;

/// One TIMER alarm driven as a multiplexer comparator
///
/// Counter ticks are microseconds. The matching `TIMER_IRQ_n` interrupt has
/// to be unmasked in the NVIC by the application.
pub struct AlarmTimer<const ALARM: usize> {
    _private: (),
}

impl<const ALARM: usize> Default for AlarmTimer<ALARM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ALARM: usize> AlarmTimer<ALARM> {
    /// Claim alarm `ALARM`
    ///
    /// Only one instance per alarm may exist.
    pub const fn new() -> Self {
        assert!(ALARM < ALARM_COUNT, "RP2040 has four TIMER alarms");
        Self { _private: () }
    }

    fn force(&mut self, pending: bool) {
        pac::TIMER.intf().modify(|w| w.set_alarm(ALARM, pending));
    }
}

impl<const ALARM: usize> HardwareTimer for AlarmTimer<ALARM> {
    fn init(&mut self) {
        self.disable_interrupt();
        self.clear_interrupt();
        pac::TIMER.inte().modify(|w| w.set_alarm(ALARM, true));
    }

    fn read(&self) -> Timestamp {
        pac::TIMER.timerawl().read()
    }

    fn set_interrupt(&mut self, timestamp: Timestamp) {
        pac::TIMER.alarm(ALARM).write_value(timestamp);

        // The alarm only matches on equality; a deadline that slipped by
        // while we were programming it would otherwise wait a full wrap.
        if wrap::is_due(timestamp, self.read()) {
            self.force(true);
        }
    }

    fn disable_interrupt(&mut self) {
        pac::TIMER.armed().write(|w| w.set_armed(1 << ALARM));
        self.force(false);
    }

    fn clear_interrupt(&mut self) {
        self.force(false);
        pac::TIMER.intr().write(|w| w.set_alarm(ALARM, true));
    }
}
