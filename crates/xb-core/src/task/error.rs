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

//! Error types for the task system.
//!
//! A lost compare-and-swap race while claiming work is *not* an error —
//! it is expected under contention and reported through the boolean wait
//! hint of `WorkQueue::try_execute_one`.

use std::fmt;
use std::io;

/// An error from queue or worker-pool operations.
#[derive(Debug)]
pub enum TaskError {
    /// The ring buffer has no free slot; the entry was not enqueued and
    /// no queue state was mutated. Retry after the current batch drains,
    /// or submit smaller batches.
    QueueFull,
    /// The requested queue capacity cannot represent even a single live
    /// entry (one slot is always kept empty).
    InvalidCapacity(u32),
    /// Spawning a worker OS thread failed during pool startup.
    Spawn(io::Error),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::QueueFull => {
                write!(f, "Work queue is full; entry was not submitted.")
            }
            TaskError::InvalidCapacity(capacity) => {
                write!(
                    f,
                    "Work queue capacity must be at least 2, got {capacity}."
                )
            }
            TaskError::Spawn(err) => {
                write!(f, "Failed to spawn worker thread: {err}")
            }
        }
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}
