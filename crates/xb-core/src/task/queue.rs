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

//! The bounded work queue: a fixed-capacity ring of callback entries
//! claimed by competing threads through a compare-and-swap on the read
//! index.

use std::any::Any;
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::Arc;

use super::counter::AtomicCounter;
use super::error::TaskError;
use super::semaphore::Semaphore;
use super::WorkerId;

/// The opaque per-job payload handed to a [`WorkCallback`].
///
/// Callbacks downcast this to their concrete type with
/// `context.downcast_ref::<T>()`.
pub type WorkContext = dyn Any + Send + Sync;

/// Signature of a unit of queued work.
///
/// A callback must not panic; the queue machinery propagates no error
/// information back to the producer, so a job reports failures through
/// its own context.
pub type WorkCallback = fn(context: &WorkContext, worker: WorkerId);

/// One slot's worth of work: a callback plus its context.
///
/// Immutable once stored. The queue slot owns the entry until a consumer
/// wins the claim for it; the entry is then taken out and executed
/// exactly once.
#[derive(Clone)]
pub struct WorkEntry {
    callback: WorkCallback,
    context: Arc<WorkContext>,
}

impl WorkEntry {
    /// Pairs a callback with its context.
    pub fn new(callback: WorkCallback, context: Arc<WorkContext>) -> Self {
        Self { callback, context }
    }

    fn execute(self, worker: WorkerId) {
        (self.callback)(self.context.as_ref(), worker);
    }
}

impl fmt::Debug for WorkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkEntry")
            .field("callback", &(self.callback as usize as *const ()))
            .finish()
    }
}

/// A bounded, multi-consumer-safe job queue.
///
/// The ring holds `capacity` slots of which at most `capacity - 1` can be
/// live at once: the slot after `write_index` is never allowed to reach
/// `read_index`, so `write_index == read_index` always means empty, never
/// full.
///
/// ## Producer contract
///
/// At most **one** thread may call [`submit`](Self::submit) on a given
/// queue at any time. This is a documented contract, not a lock — the
/// write index is advanced with a plain store for throughput. Any number
/// of threads may claim work concurrently.
///
/// ## Batches
///
/// A batch is a series of `submit` calls followed by one matching
/// [`complete_all_work`](Self::complete_all_work) barrier. Only one batch
/// may be in flight per queue; the barrier resets the batch counters once
/// it drains.
pub struct WorkQueue {
    slots: Box<[UnsafeCell<Option<WorkEntry>>]>,
    write_index: AtomicCounter,
    read_index: AtomicCounter,
    completion_goal: AtomicCounter,
    completion_count: AtomicCounter,
    semaphore: Semaphore,
    capacity: u32,
}

// SAFETY: the `UnsafeCell` slots are never accessed by two threads at
// once. A slot is written only by the single documented producer, and
// only while it is outside the live window `[read_index, write_index)`;
// it is read (taken) only by the one thread that won the SeqCst
// compare-and-swap advancing `read_index` past it. The producer's SeqCst
// store of `write_index` after filling a slot, and the consumer's SeqCst
// claim before emptying it, order those accesses.
unsafe impl Send for WorkQueue {}
unsafe impl Sync for WorkQueue {}

impl WorkQueue {
    /// Creates a queue with `capacity` ring slots.
    ///
    /// One slot is always kept empty, so the queue holds at most
    /// `capacity - 1` live entries.
    ///
    /// ## Errors
    /// [`TaskError::InvalidCapacity`] if `capacity < 2`.
    pub fn new(capacity: u32) -> Result<Self, TaskError> {
        if capacity < 2 {
            return Err(TaskError::InvalidCapacity(capacity));
        }
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        log::trace!("Work queue created with {capacity} slots.");
        Ok(Self {
            slots,
            write_index: AtomicCounter::new(0),
            read_index: AtomicCounter::new(0),
            completion_goal: AtomicCounter::new(0),
            completion_count: AtomicCounter::new(0),
            semaphore: Semaphore::new(0),
            capacity,
        })
    }

    /// Number of ring slots (one more than the maximum live entry count).
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The idle-wake signal for worker loops.
    ///
    /// Posted once per submitted entry. The queue's atomics, not the
    /// semaphore count, are authoritative for whether work exists; a
    /// woken thread re-checks the queue and blocks again if it finds
    /// nothing.
    pub fn semaphore(&self) -> &Semaphore {
        &self.semaphore
    }

    /// Enqueues one unit of work and wakes one idle worker.
    ///
    /// Single-producer contract: see the type-level docs.
    ///
    /// ## Errors
    /// [`TaskError::QueueFull`] if no free slot exists. No queue state is
    /// mutated in that case — the caller decides whether to retry after
    /// draining or to shed the work.
    pub fn submit(&self, callback: WorkCallback, context: Arc<WorkContext>) -> Result<(), TaskError> {
        let write = self.write_index.load();
        let read = self.read_index.load();
        let next = (write + 1) % self.capacity;
        if next == read {
            log::warn!("Work queue full ({} slots); entry rejected.", self.capacity);
            return Err(TaskError::QueueFull);
        }

        // SAFETY: this thread is the sole producer and slot `write` is
        // outside the live window, so no consumer can touch it until
        // `write_index` is advanced below.
        unsafe {
            *self.slots[write as usize].get() = Some(WorkEntry::new(callback, context));
        }

        self.completion_goal.fetch_add(1);
        self.write_index.store(next);
        self.semaphore.post();
        Ok(())
    }

    /// Attempts to claim and execute one queued entry.
    ///
    /// ## Returns
    /// `true` if the queue looked empty and the caller should block on
    /// the [`semaphore`](Self::semaphore); `false` if an entry was
    /// executed *or* the claim was lost to another thread — in either
    /// case work likely remains and the caller should retry immediately.
    pub fn try_execute_one(&self, worker: WorkerId) -> bool {
        let read = self.read_index.load();
        let write = self.write_index.load();
        if read == write {
            return true;
        }

        let next = (read + 1) % self.capacity;
        if self.read_index.compare_and_swap(read, next) {
            // SAFETY: winning the compare-and-swap grants this thread
            // exclusive ownership of slot `read`; every other consumer
            // saw the swap fail, and the producer will not reuse the slot
            // until the ring wraps past it.
            let entry = unsafe { (*self.slots[read as usize].get()).take() };
            debug_assert!(entry.is_some(), "claimed slot held no entry");
            if let Some(entry) = entry {
                entry.execute(worker);
            }
            self.completion_count.fetch_add(1);
        }
        false
    }

    /// Blocks until every entry of the current batch has finished, then
    /// resets the batch counters to zero.
    ///
    /// The calling thread participates in draining the queue instead of
    /// sleeping — this is the engine's fork/join point, and busy
    /// participation is the deliberate low-latency choice here.
    ///
    /// Must not overlap with an in-flight `submit` from another thread or
    /// with a second barrier on the same queue.
    pub fn complete_all_work(&self, worker: WorkerId) {
        while self.completion_goal.load() != self.completion_count.load() {
            if self.try_execute_one(worker) {
                // Claimed entries are still executing on other threads;
                // stay hot until their completions land.
                std::hint::spin_loop();
            }
        }
        // Quiescent point: goal == count, safe to open the next batch.
        self.completion_goal.store(0);
        self.completion_count.store(0);
    }

    /// Number of submitted entries not yet claimed by any thread.
    pub fn pending(&self) -> u32 {
        let read = self.read_index.load();
        let write = self.write_index.load();
        (write + self.capacity - read) % self.capacity
    }

    /// Number of entries in the current batch that have not finished
    /// executing. Advisory under concurrency.
    pub fn outstanding(&self) -> u32 {
        let count = self.completion_count.load();
        let goal = self.completion_goal.load();
        goal.saturating_sub(count)
    }
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("capacity", &self.capacity)
            .field("pending", &self.pending())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
