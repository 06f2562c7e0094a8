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

//! A counting semaphore used as the workers' idle-wake signal.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A counting semaphore built on `Mutex` + `Condvar`.
///
/// The work queue uses this purely as a wake signal: the queue's own
/// atomics, not the semaphore count, are authoritative for whether work
/// exists. The count may therefore drift ahead of real demand (e.g. an
/// extra post during shutdown); a woken thread simply re-checks the queue
/// and blocks again if it finds nothing.
#[derive(Debug)]
pub struct Semaphore {
    count: Mutex<u32>,
    wakeup: Condvar,
}

impl Semaphore {
    /// Creates a semaphore with the given initial count (0 for the work
    /// queue).
    pub fn new(initial: u32) -> Self {
        Self {
            count: Mutex::new(initial),
            wakeup: Condvar::new(),
        }
    }

    /// Increments the count and wakes at most one blocked waiter.
    pub fn post(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        self.wakeup.notify_one();
    }

    /// Blocks until the count is positive, then decrements it.
    ///
    /// ## Arguments
    /// * `timeout` - Maximum time to block; `None` waits indefinitely.
    ///
    /// ## Returns
    /// `true` if the count was acquired, `false` if the timeout elapsed
    /// first.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        match timeout {
            None => {
                while *count == 0 {
                    count = self
                        .wakeup
                        .wait(count)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
            Some(timeout) => {
                while *count == 0 {
                    let (guard, result) = self
                        .wakeup
                        .wait_timeout(count, timeout)
                        .unwrap_or_else(PoisonError::into_inner);
                    count = guard;
                    if result.timed_out() {
                        if *count == 0 {
                            return false;
                        }
                        break;
                    }
                }
            }
        }
        *count -= 1;
        true
    }
}
