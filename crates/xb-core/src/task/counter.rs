// Copyright 2025 xbalex
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The 32-bit atomic counter the queue's indices and batch counters are
//! built on.

use std::sync::atomic::{AtomicU32, Ordering};

/// A 32-bit counter with sequentially-consistent atomic operations.
///
/// Every operation uses `Ordering::SeqCst`. The work queue's correctness
/// argument relies on all threads observing updates to the ring indices
/// and batch counters in one total order; do not weaken these orderings
/// without re-deriving that argument.
#[derive(Debug)]
pub struct AtomicCounter(AtomicU32);

impl AtomicCounter {
    /// Creates a counter holding `value`.
    pub const fn new(value: u32) -> Self {
        Self(AtomicU32::new(value))
    }

    /// Returns the current value.
    pub fn load(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Overwrites the current value.
    pub fn store(&self, value: u32) {
        self.0.store(value, Ordering::SeqCst);
    }

    /// Adds `delta` (wrapping) and returns the value held *before* the
    /// addition.
    pub fn fetch_add(&self, delta: u32) -> u32 {
        self.0.fetch_add(delta, Ordering::SeqCst)
    }

    /// Replaces the value with `new` only if it currently equals
    /// `expected`.
    ///
    /// ## Returns
    /// `true` if the swap took place, `false` if another thread got there
    /// first.
    pub fn compare_and_swap(&self, expected: u32, new: u32) -> bool {
        self.0
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn load_store_roundtrip() {
        let counter = AtomicCounter::new(7);
        assert_eq!(counter.load(), 7);
        counter.store(42);
        assert_eq!(counter.load(), 42);
    }

    #[test]
    fn fetch_add_returns_previous_value() {
        let counter = AtomicCounter::new(10);
        assert_eq!(counter.fetch_add(5), 10);
        assert_eq!(counter.load(), 15);
    }

    #[test]
    fn compare_and_swap_succeeds_only_on_expected() {
        let counter = AtomicCounter::new(1);
        assert!(!counter.compare_and_swap(0, 9));
        assert_eq!(counter.load(), 1);
        assert!(counter.compare_and_swap(1, 2));
        assert_eq!(counter.load(), 2);
    }

    #[test]
    fn fetch_add_from_many_threads_loses_no_increment() {
        let counter = Arc::new(AtomicCounter::new(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    counter.fetch_add(1);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Thread join failed");
        }
        assert_eq!(counter.load(), 4000);
    }

    #[test]
    fn compare_and_swap_is_won_by_exactly_one_thread() {
        let counter = Arc::new(AtomicCounter::new(0));
        let mut handles = Vec::new();
        for id in 1..=4u32 {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || counter.compare_and_swap(0, id)));
        }
        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("Thread join failed"))
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_ne!(counter.load(), 0);
    }
}
