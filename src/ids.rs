//! Identity generation for tracks and deposits.
//!
//! Ids are generated values, not derived from observations. The provider is
//! injectable so deterministic sequences can be supplied in tests and so a
//! different scheme can be substituted without touching state logic.

pub trait IdProvider: Send {
    fn next_id(&mut self) -> u64;
}

/// Default provider: a plain monotonic counter starting at 1.
#[derive(Debug, Default)]
pub struct MonotonicIds {
    next: u64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self { next: 0 }
    }
}

impl IdProvider for MonotonicIds {
    fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
