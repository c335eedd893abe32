//! Process-wide ticker instance
//!
//! The comparator interrupt can preempt foreground code at any instruction,
//! so every touch of the queue happens inside `critical_section::with`. That
//! masks interrupts for exactly the duration of one operation and makes an
//! unguarded mutation impossible to write.
//!
//! ```ignore
//! static TICKER: SharedTicker<AlarmTimer<1>, Servos, 4> =
//!     SharedTicker::new(Ticker::new(AlarmTimer::new()));
//!
//! #[interrupt]
//! fn TIMER_IRQ_1() {
//!     TICKER.on_interrupt();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use tickmux_hal::{HardwareTimer, Timestamp};

use crate::dispatcher::{EventHandler, Ticker};
use crate::queue::EventHandle;

/// [`Ticker`] behind a critical-section mutex, suitable for a `static`
pub struct SharedTicker<T, H, const N: usize> {
    inner: Mutex<RefCell<Ticker<T, H, N>>>,
}

impl<T, H, const N: usize> SharedTicker<T, H, N>
where
    T: HardwareTimer,
    H: EventHandler<T, N>,
{
    /// Wrap a ticker for shared use
    pub const fn new(ticker: Ticker<T, H, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ticker)),
        }
    }

    /// Run `f` with exclusive access to the ticker, interrupts masked
    pub fn with<R>(&self, f: impl FnOnce(&mut Ticker<T, H, N>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Comparator interrupt entry point, see [`Ticker::on_interrupt`]
    pub fn on_interrupt(&self) -> usize {
        self.with(|ticker| ticker.on_interrupt())
    }

    /// See [`Ticker::insert_event`]
    pub fn insert_event(&self, event: &EventHandle, timestamp: Timestamp, id: u32) {
        self.with(|ticker| ticker.insert_event(event, timestamp, id))
    }

    /// See [`Ticker::remove_event`]
    pub fn remove_event(&self, event: &EventHandle) {
        self.with(|ticker| ticker.remove_event(event))
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.with(|ticker| ticker.next_deadline())
    }

    /// Current counter value
    pub fn current_time(&self) -> Timestamp {
        self.with(|ticker| ticker.current_time())
    }
}
