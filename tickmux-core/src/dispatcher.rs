//! Ticker dispatcher
//!
//! Owns the hardware timer and the event queue, and keeps the comparator
//! armed for the head of the queue. Call [`Ticker::on_interrupt`] from the
//! comparator interrupt: it drains every event whose deadline has been
//! reached, handing each id to the registered [`EventHandler`], then re-arms
//! for the next deadline or disarms when nothing is left.
//!
//! # Reentrancy
//!
//! The handler receives a [`TickerContext`] and may insert or remove events
//! while the drain is in progress, including re-scheduling the event that
//! just fired. The drain loop re-reads the head after every callback and
//! never works from a snapshot.

use tickmux_hal::{HardwareTimer, Timestamp};

use crate::queue::{EventHandle, EventQueue};
use crate::wrap;

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickerState {
    /// Comparator disarmed, nothing pending
    Idle,
    /// Comparator armed for the head deadline
    Armed,
    /// Inside [`Ticker::on_interrupt`]
    Firing,
}

/// Receiver for fired events
///
/// Exactly one handler is registered per ticker. It runs in interrupt
/// context and must not block.
pub trait EventHandler<T: HardwareTimer, const N: usize> {
    /// Called once for every event whose deadline has been reached
    fn on_event(&mut self, id: u32, ctx: &mut TickerContext<'_, T, N>);
}

/// Scheduling access to a ticker's queue and timer
///
/// Every mutation that changes the head of the queue reprograms the
/// comparator: to the new head deadline, or disarmed if the queue empties.
pub struct TickerContext<'a, T, const N: usize> {
    timer: &'a mut T,
    queue: &'a mut EventQueue<N>,
    state: &'a mut TickerState,
}

impl<'a, T: HardwareTimer, const N: usize> TickerContext<'a, T, N> {
    /// Schedule `event` to fire with `id` once the counter reaches `timestamp`
    ///
    /// An event that is already pending is rescheduled.
    pub fn insert_event(&mut self, event: &EventHandle, timestamp: Timestamp, id: u32) {
        let front = self.queue.front();
        self.queue.insert(event, timestamp, id);
        if self.queue.front() != front {
            self.rearm();
        }
    }

    /// Cancel `event`
    ///
    /// Cancelling an event that is not pending does nothing.
    pub fn remove_event(&mut self, event: &EventHandle) {
        if self.queue.remove(event) {
            self.rearm();
        }
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.peek_next_timestamp()
    }

    /// Current counter value
    pub fn current_time(&self) -> Timestamp {
        self.timer.read()
    }

    /// True if `event` is pending
    pub fn is_pending(&self, event: &EventHandle) -> bool {
        self.queue.is_queued(event)
    }

    fn rearm(&mut self) {
        let next = match self.queue.peek_next_timestamp() {
            Some(deadline) => {
                self.timer.set_interrupt(deadline);
                TickerState::Armed
            }
            None => {
                self.timer.disable_interrupt();
                TickerState::Idle
            }
        };
        // The drain loop settles the state itself on exit
        if *self.state != TickerState::Firing {
            *self.state = next;
        }
    }
}

/// Multiplexes up to `N` logical timers onto one hardware comparator
pub struct Ticker<T, H, const N: usize> {
    timer: T,
    queue: EventQueue<N>,
    handler: Option<H>,
    state: TickerState,
}

impl<T, H, const N: usize> Ticker<T, H, N>
where
    T: HardwareTimer,
    H: EventHandler<T, N>,
{
    /// Wrap `timer` with an empty queue and no handler
    ///
    /// The timer is not touched until [`set_event_handler`](Self::set_event_handler).
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            queue: EventQueue::new(),
            handler: None,
            state: TickerState::Idle,
        }
    }

    /// Register the handler for fired events
    ///
    /// The first registration initialises the timer; later calls only
    /// replace the handler. Events queued before the timer was initialised
    /// are armed again afterwards.
    pub fn set_event_handler(&mut self, handler: H) {
        if self.handler.is_none() {
            self.timer.init();
            if !self.queue.is_empty() {
                self.context().rearm();
            }
        }
        self.handler = Some(handler);
    }

    /// Claim one of the `N` event slots for a client
    pub fn claim_event(&mut self) -> Option<EventHandle> {
        self.queue.claim()
    }

    /// Scheduling view used by foreground code
    pub fn context(&mut self) -> TickerContext<'_, T, N> {
        TickerContext {
            timer: &mut self.timer,
            queue: &mut self.queue,
            state: &mut self.state,
        }
    }

    /// Run `f` with the registered handler and a scheduling context
    ///
    /// Returns `None` if no handler has been registered.
    pub fn with_handler<R>(
        &mut self,
        f: impl FnOnce(&mut H, &mut TickerContext<'_, T, N>) -> R,
    ) -> Option<R> {
        let handler = self.handler.as_mut()?;
        let mut ctx = TickerContext {
            timer: &mut self.timer,
            queue: &mut self.queue,
            state: &mut self.state,
        };
        Some(f(handler, &mut ctx))
    }

    /// See [`TickerContext::insert_event`]
    pub fn insert_event(&mut self, event: &EventHandle, timestamp: Timestamp, id: u32) {
        self.context().insert_event(event, timestamp, id);
    }

    /// See [`TickerContext::remove_event`]
    pub fn remove_event(&mut self, event: &EventHandle) {
        self.context().remove_event(event);
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.peek_next_timestamp()
    }

    /// Current counter value
    pub fn current_time(&self) -> Timestamp {
        self.timer.read()
    }

    /// Current dispatcher state
    pub fn state(&self) -> TickerState {
        self.state
    }

    /// Pending events
    pub fn queue(&self) -> &EventQueue<N> {
        &self.queue
    }

    /// Registered handler, if any
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// Registered handler, if any
    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    /// Underlying hardware timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Underlying hardware timer
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Comparator interrupt entry point
    ///
    /// Fires every event whose deadline has been reached, in deadline order,
    /// then leaves the comparator armed for the next pending deadline or
    /// disarmed if none remain. Events popped while no handler is registered
    /// are dropped.
    ///
    /// Returns the number of events fired.
    pub fn on_interrupt(&mut self) -> usize {
        self.timer.clear_interrupt();
        self.state = TickerState::Firing;

        let mut fired = 0;
        loop {
            let Some(deadline) = self.queue.peek_next_timestamp() else {
                self.timer.disable_interrupt();
                self.state = TickerState::Idle;
                break;
            };

            let now = self.timer.read();
            if !wrap::is_due(deadline, now) {
                self.timer.set_interrupt(deadline);
                self.state = TickerState::Armed;
                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "ticker: armed for {=u32}, {=u32} ticks away",
                    deadline,
                    wrap::ticks_until(deadline, now)
                );
                break;
            }

            let Some(id) = self.queue.pop() else {
                break;
            };
            fired += 1;

            #[cfg(feature = "defmt")]
            defmt::trace!(
                "ticker: fire id {=u32}, {=i32} ticks late",
                id,
                wrap::delta(now, deadline)
            );

            if let Some(handler) = self.handler.as_mut() {
                let mut ctx = TickerContext {
                    timer: &mut self.timer,
                    queue: &mut self.queue,
                    state: &mut self.state,
                };
                handler.on_event(id, &mut ctx);
            }
        }

        fired
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording timer and handler shared by the crate's unit tests

    use super::*;
    use heapless::Vec;

    /// One call made to the hardware
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Init,
        Set(Timestamp),
        Disable,
        Clear,
    }

    #[derive(Debug, Default)]
    pub struct MockTimer {
        pub now: Timestamp,
        pub calls: Vec<Call, 64>,
    }

    impl MockTimer {
        pub fn at(now: Timestamp) -> Self {
            Self {
                now,
                calls: Vec::new(),
            }
        }
    }

    impl HardwareTimer for MockTimer {
        fn init(&mut self) {
            let _ = self.calls.push(Call::Init);
        }

        fn read(&self) -> Timestamp {
            self.now
        }

        fn set_interrupt(&mut self, timestamp: Timestamp) {
            let _ = self.calls.push(Call::Set(timestamp));
        }

        fn disable_interrupt(&mut self) {
            let _ = self.calls.push(Call::Disable);
        }

        fn clear_interrupt(&mut self) {
            let _ = self.calls.push(Call::Clear);
        }
    }

    /// Records fired ids and optionally re-schedules from inside the callback
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub fired: Vec<(u32, Timestamp), 32>,
        /// Event re-inserted at `now + delay` when `trigger` fires
        pub follow_up: Option<(EventHandle, u32, u32)>,
        /// Event cancelled when `trigger` fires
        pub cancel: Option<EventHandle>,
        pub trigger: u32,
    }

    impl<const N: usize> EventHandler<MockTimer, N> for Recorder {
        fn on_event(&mut self, id: u32, ctx: &mut TickerContext<'_, MockTimer, N>) {
            let now = ctx.current_time();
            let _ = self.fired.push((id, now));
            if id != self.trigger {
                return;
            }
            if let Some((event, delay, next_id)) = self.follow_up.take() {
                ctx.insert_event(&event, now.wrapping_add(delay), next_id);
                self.follow_up = Some((event, delay, next_id));
            }
            if let Some(event) = self.cancel.as_ref() {
                ctx.remove_event(event);
            }
        }
    }
}
