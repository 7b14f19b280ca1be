//! Request id (`_reqid`) generation.
//!
//! Request ids are a non-cryptographic uniqueness hint in
//! `REQID_MIN..=REQID_MAX`. Collisions are tolerated by the server.

use std::sync::atomic::{AtomicU32, Ordering};

use rand::Rng;

/// Smallest request id.
pub const REQID_MIN: u32 = 100_000;

/// Largest request id.
pub const REQID_MAX: u32 = 999_999;

/// Source of request ids.
pub trait ReqIdSource: Send + Sync {
    /// Returns the next request id, within `REQID_MIN..=REQID_MAX`.
    fn next_req_id(&self) -> u32;
}

/// Draws request ids from the thread-local random generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReqId;

impl ReqIdSource for RandomReqId {
    fn next_req_id(&self) -> u32 {
        rand::rng().random_range(REQID_MIN..=REQID_MAX)
    }
}

/// Deterministic request ids, counting up from a start value and wrapping
/// back to [`REQID_MIN`] after [`REQID_MAX`].
#[derive(Debug)]
pub struct CounterReqId {
    next: AtomicU32,
}

impl CounterReqId {
    /// Creates a counter starting at `start` (clamped into range).
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start.clamp(REQID_MIN, REQID_MAX)),
        }
    }
}

impl Default for CounterReqId {
    fn default() -> Self {
        Self::new(REQID_MIN)
    }
}

impl ReqIdSource for CounterReqId {
    fn next_req_id(&self) -> u32 {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(if n >= REQID_MAX { REQID_MIN } else { n + 1 })
            })
            .unwrap_or_else(|n| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_in_range() {
        let source = RandomReqId;
        for _ in 0..1000 {
            let id = source.next_req_id();
            assert!((REQID_MIN..=REQID_MAX).contains(&id));
            assert_eq!(id.to_string().len(), 6);
        }
    }

    #[test]
    fn counter_is_sequential() {
        let source = CounterReqId::new(123_456);
        assert_eq!(source.next_req_id(), 123_456);
        assert_eq!(source.next_req_id(), 123_457);
        assert_eq!(source.next_req_id(), 123_458);
    }

    #[test]
    fn counter_wraps() {
        let source = CounterReqId::new(REQID_MAX);
        assert_eq!(source.next_req_id(), REQID_MAX);
        assert_eq!(source.next_req_id(), REQID_MIN);
    }

    #[test]
    fn counter_clamps_start() {
        assert_eq!(CounterReqId::new(5).next_req_id(), REQID_MIN);
        assert_eq!(CounterReqId::default().next_req_id(), REQID_MIN);
    }
}
