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

//! # Task System
//!
//! A bounded, multi-consumer-safe work queue plus a fixed pool of worker
//! threads. This is the fork/join primitive the engine uses to spread
//! per-frame work across cores:
//!
//! 1. The main thread submits a batch of `(callback, context)` entries
//!    with [`WorkQueue::submit`].
//! 2. Worker threads (and the main thread itself, once it calls
//!    [`WorkQueue::complete_all_work`]) race to claim entries via a
//!    compare-and-swap on the ring's read index. Each entry executes
//!    exactly once.
//! 3. `complete_all_work` returns when every entry of the batch has
//!    finished, then resets the batch counters for the next frame.
//!
//! Claim order follows submission order (FIFO); completion order does not
//! — concurrently running callbacks may finish in any order.
//!
//! All shared counters use sequentially-consistent atomics. That is a
//! deliberate simplification: the correctness argument assumes a single
//! total order over index updates, and no access has been re-derived for
//! weaker orderings.

mod counter;
mod error;
mod queue;
mod semaphore;
mod worker;

pub use counter::AtomicCounter;
pub use error::TaskError;
pub use queue::{WorkCallback, WorkContext, WorkEntry, WorkQueue};
pub use semaphore::Semaphore;
pub use worker::WorkerPool;

/// Stable logical identifier for a thread participating in the task
/// system, independent of the OS thread ID.
///
/// The main/producer thread is conventionally [`MAIN_WORKER_ID`]; pool
/// workers are numbered from 1.
pub type WorkerId = u32;

/// Logical ID of the main/producer thread.
pub const MAIN_WORKER_ID: WorkerId = 0;
