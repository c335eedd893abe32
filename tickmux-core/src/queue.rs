//! Deadline-ordered event queue
//!
//! A singly linked chain threaded through a fixed arena of `N` slots. Each
//! client owns an [`EventHandle`] naming one slot; the queue owns the links
//! and never hands them out. The chain is kept sorted by
//! [`wrap::comes_before`], so the head is always the next deadline the
//! comparator must be armed for.
//!
//! The queue knows nothing about hardware. Reprogramming the comparator when
//! the head changes is the dispatcher's job.

use tickmux_hal::Timestamp;

use crate::wrap;

/// Client-owned reference to one queue slot
///
/// Handles are issued once per slot by [`EventQueue::claim`] and are not
/// `Clone`, so two clients can never share a slot by accident. Identity is
/// the slot, never the deadline or id stored in it. A handle is only
/// meaningful for the queue that issued it.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventHandle {
    slot: usize,
}

impl EventHandle {
    /// Arena index this handle refers to
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    deadline: Timestamp,
    id: u32,
    next: Option<usize>,
    queued: bool,
}

impl Slot {
    const EMPTY: Self = Self {
        deadline: 0,
        id: 0,
        next: None,
        queued: false,
    };
}

/// Fixed-capacity pending event chain
#[derive(Debug)]
pub struct EventQueue<const N: usize> {
    slots: [Slot; N],
    head: Option<usize>,
    claimed: usize,
    len: usize,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue with no slots claimed
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
            head: None,
            claimed: 0,
            len: 0,
        }
    }

    /// Hand out the next unused slot
    ///
    /// Returns `None` once all `N` slots have been claimed.
    pub fn claim(&mut self) -> Option<EventHandle> {
        if self.claimed >= N {
            return None;
        }
        let slot = self.claimed;
        self.claimed += 1;
        Some(EventHandle { slot })
    }

    /// Total number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no event is pending
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// True if `event` is currently linked into the chain
    pub fn is_queued(&self, event: &EventHandle) -> bool {
        self.slots.get(event.slot).is_some_and(|s| s.queued)
    }

    /// Deadline of the earliest pending event
    pub fn peek_next_timestamp(&self) -> Option<Timestamp> {
        self.head.map(|i| self.slots[i].deadline)
    }

    /// Slot and deadline at the head, used to detect head changes
    pub(crate) fn front(&self) -> Option<(usize, Timestamp)> {
        self.head.map(|i| (i, self.slots[i].deadline))
    }

    /// Schedule `event` for `deadline`
    ///
    /// The event goes in front of the first pending event it comes before,
    /// so events with equal deadlines fire in insertion order. An event that
    /// is already pending is unlinked first and rescheduled.
    ///
    /// Returns `true` if the event is now at the head. A handle issued by
    /// another, larger queue is ignored.
    pub fn insert(&mut self, event: &EventHandle, deadline: Timestamp, id: u32) -> bool {
        let slot = event.slot;
        if slot >= N {
            return false;
        }
        self.remove(event);

        self.slots[slot].deadline = deadline;
        self.slots[slot].id = id;

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(i) = cursor {
            if wrap::comes_before(deadline, self.slots[i].deadline) {
                break;
            }
            prev = cursor;
            cursor = self.slots[i].next;
        }

        self.slots[slot].next = cursor;
        self.slots[slot].queued = true;
        self.len += 1;

        match prev {
            None => {
                self.head = Some(slot);
                true
            }
            Some(p) => {
                self.slots[p].next = Some(slot);
                false
            }
        }
    }

    /// Unlink `event` from the chain
    ///
    /// Removing an event that is not pending does nothing. Returns `true`
    /// if the event was the head.
    pub fn remove(&mut self, event: &EventHandle) -> bool {
        let slot = event.slot;
        if !self.is_queued(event) {
            return false;
        }

        let next = self.slots[slot].next.take();
        self.slots[slot].queued = false;
        self.len -= 1;

        if self.head == Some(slot) {
            self.head = next;
            return true;
        }

        let mut cursor = self.head;
        while let Some(i) = cursor {
            if self.slots[i].next == Some(slot) {
                self.slots[i].next = next;
                break;
            }
            cursor = self.slots[i].next;
        }
        false
    }

    /// Detach the head and return its id
    pub fn pop(&mut self) -> Option<u32> {
        let slot = self.head?;
        self.head = self.slots[slot].next.take();
        self.slots[slot].queued = false;
        self.len -= 1;
        Some(self.slots[slot].id)
    }

    /// Pending `(deadline, id)` pairs in firing order
    pub fn iter(&self) -> Iter<'_, N> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    /// True if no adjacent pair in the chain is out of order
    pub fn is_sorted(&self) -> bool {
        let mut prev: Option<Timestamp> = None;
        for (deadline, _) in self.iter() {
            if let Some(p) = prev {
                if wrap::comes_before(deadline, p) {
                    return false;
                }
            }
            prev = Some(deadline);
        }
        true
    }
}

/// Iterator over pending events, head first
pub struct Iter<'a, const N: usize> {
    queue: &'a EventQueue<N>,
    cursor: Option<usize>,
}

impl<'a, const N: usize> Iterator for Iter<'a, N> {
    type Item = (Timestamp, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.queue.slots[self.cursor?];
        self.cursor = slot.next;
        Some((slot.deadline, slot.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn deadlines<const N: usize>(queue: &EventQueue<N>) -> Vec<Timestamp, N> {
        queue.iter().map(|(deadline, _)| deadline).collect()
    }

    fn ids<const N: usize>(queue: &EventQueue<N>) -> Vec<u32, N> {
        queue.iter().map(|(_, id)| id).collect()
    }

    #[test]
    fn test_claim_exhausts_arena() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        assert_ne!(a, b);
        assert!(queue.claim().is_none());
        assert_eq!(queue.capacity(), 2);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue: EventQueue<4> = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek_next_timestamp(), None);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_insert_orders_by_deadline() {
        let mut queue: EventQueue<4> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        let c = queue.claim().unwrap();

        assert!(queue.insert(&a, 300, 1));
        assert!(queue.insert(&b, 100, 2));
        assert!(!queue.insert(&c, 200, 3));

        assert_eq!(deadlines(&queue).as_slice(), &[100, 200, 300]);
        assert_eq!(ids(&queue).as_slice(), &[2, 3, 1]);
        assert_eq!(queue.peek_next_timestamp(), Some(100));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_equal_deadlines_keep_insertion_order() {
        let mut queue: EventQueue<3> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        let c = queue.claim().unwrap();

        queue.insert(&a, 50, 1);
        assert!(!queue.insert(&b, 50, 2));
        assert!(!queue.insert(&c, 50, 3));

        assert_eq!(ids(&queue).as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_insert_across_wrap() {
        let mut queue: EventQueue<3> = EventQueue::new();
        let after = queue.claim().unwrap();
        let before = queue.claim().unwrap();

        // Inserted in the "wrong" unsigned order on purpose
        queue.insert(&after, 0x0000_0010, 2);
        assert!(queue.insert(&before, 0xFFFF_FFF0, 1));

        assert_eq!(deadlines(&queue).as_slice(), &[0xFFFF_FFF0, 0x0000_0010]);
        assert!(queue.is_sorted());
    }

    #[test]
    fn test_remove_head_and_interior() {
        let mut queue: EventQueue<3> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        let c = queue.claim().unwrap();
        queue.insert(&a, 10, 1);
        queue.insert(&b, 20, 2);
        queue.insert(&c, 30, 3);

        assert!(!queue.remove(&b));
        assert_eq!(ids(&queue).as_slice(), &[1, 3]);

        assert!(queue.remove(&a));
        assert_eq!(ids(&queue).as_slice(), &[3]);
        assert_eq!(queue.peek_next_timestamp(), Some(30));

        assert!(queue.remove(&c));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        queue.insert(&a, 10, 1);
        queue.insert(&b, 20, 2);

        assert!(queue.remove(&a));
        assert!(!queue.remove(&a));
        assert_eq!(ids(&queue).as_slice(), &[2]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_remove_never_inserted() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        queue.insert(&a, 10, 1);

        assert!(!queue.remove(&b));
        assert_eq!(ids(&queue).as_slice(), &[1]);
    }

    #[test]
    fn test_reinsert_reschedules() {
        let mut queue: EventQueue<3> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        queue.insert(&a, 10, 1);
        queue.insert(&b, 20, 2);

        // Moving the head behind its neighbour must not duplicate it
        assert!(!queue.insert(&a, 30, 7));
        assert_eq!(ids(&queue).as_slice(), &[2, 7]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_foreign_handle_is_ignored() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let a = queue.claim().unwrap();
        queue.insert(&a, 10, 1);

        let foreign = EventHandle { slot: 5 };
        assert!(!queue.insert(&foreign, 1, 9));
        assert!(!queue.is_queued(&foreign));
        assert!(!queue.remove(&foreign));
        assert_eq!(ids(&queue).as_slice(), &[1]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_detaches_head() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let a = queue.claim().unwrap();
        let b = queue.claim().unwrap();
        queue.insert(&a, 5, 11);
        queue.insert(&b, 6, 12);

        assert_eq!(queue.pop(), Some(11));
        assert!(!queue.is_queued(&a));
        assert!(queue.is_queued(&b));

        // The popped slot can be scheduled again
        assert!(queue.insert(&a, 1, 13));
        assert_eq!(ids(&queue).as_slice(), &[13, 12]);
    }
}
