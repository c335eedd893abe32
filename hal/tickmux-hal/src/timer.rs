//! Hardware timer abstraction
//!
//! A single free-running 32-bit counter paired with one compare register.
//! The counter wraps from `0xFFFF_FFFF` to `0`; callers must never compare
//! raw timestamps with `<` (see `tickmux_core::wrap`).

/// Raw counter value
pub type Timestamp = u32;

/// Free-running counter with a single comparator interrupt
///
/// All methods are expected to be callable from interrupt context and must
/// not block.
pub trait HardwareTimer {
    /// Bring up the counter and leave the comparator disarmed
    fn init(&mut self);

    /// Current counter value
    fn read(&self) -> Timestamp;

    /// Arm the comparator to interrupt when the counter reaches `timestamp`
    ///
    /// Arming replaces any previously programmed value.
    fn set_interrupt(&mut self, timestamp: Timestamp);

    /// Disarm the comparator
    fn disable_interrupt(&mut self);

    /// Acknowledge a pending comparator interrupt
    fn clear_interrupt(&mut self);
}
