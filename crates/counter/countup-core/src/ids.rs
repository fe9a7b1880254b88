//! Identifiers and a simple allocator for counters registered with the engine.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CounterId(pub u32);

/// Monotonic allocator for CounterId. Ids are never reused after detach; once
/// `u32::MAX` has been handed out the allocator is exhausted.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_counter: u32,
    exhausted: bool,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_counter(&mut self) -> Option<CounterId> {
        if self.exhausted {
            return None;
        }
        let id = CounterId(self.next_counter);
        match self.next_counter.checked_add(1) {
            Some(next) => self.next_counter = next,
            None => self.exhausted = true,
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_counter(), Some(CounterId(0)));
        assert_eq!(alloc.alloc_counter(), Some(CounterId(1)));
        assert_eq!(alloc.alloc_counter(), Some(CounterId(2)));
    }

    #[test]
    fn exhaustion_does_not_wrap() {
        let mut alloc = IdAllocator {
            next_counter: u32::MAX - 1,
            exhausted: false,
        };
        assert_eq!(alloc.alloc_counter(), Some(CounterId(u32::MAX - 1)));
        assert_eq!(alloc.alloc_counter(), Some(CounterId(u32::MAX)));
        assert_eq!(alloc.alloc_counter(), None);
        assert_eq!(alloc.alloc_counter(), None);
    }
}
