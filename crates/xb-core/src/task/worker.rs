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

//! The fixed pool of worker OS threads draining a [`WorkQueue`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::error::TaskError;
use super::queue::WorkQueue;
use super::WorkerId;
use crate::constants::{THREAD_NAME, WORKER_IDLE_WAIT};

/// A fixed-size pool of worker threads sharing one [`WorkQueue`].
///
/// Workers are spawned once at engine startup and run until
/// [`shutdown`](Self::shutdown) (also invoked from `Drop`), which flags
/// them to stop, wakes them, and joins every thread. The queue handle is
/// passed in explicitly — the pool keeps no process-wide state.
///
/// Logical IDs: pool workers are numbered from 1; ID 0
/// ([`MAIN_WORKER_ID`](super::MAIN_WORKER_ID)) is reserved for the
/// main/producer thread, which participates in draining the queue only
/// while inside [`WorkQueue::complete_all_work`].
#[derive(Debug)]
pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` threads draining `queue`.
    ///
    /// ## Errors
    /// [`TaskError::Spawn`] if the OS refuses a thread; workers already
    /// spawned are stopped and joined before the error is returned, so a
    /// failed startup leaves no threads behind.
    pub fn spawn(queue: Arc<WorkQueue>, worker_count: u32) -> Result<Self, TaskError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count as usize);

        for id in 1..=worker_count {
            let worker_queue = Arc::clone(&queue);
            let worker_shutdown = Arc::clone(&shutdown);
            let spawned = thread::Builder::new()
                .name(format!("{THREAD_NAME}{id}"))
                .spawn(move || worker_loop(worker_queue, worker_shutdown, id));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    log::error!("Failed to spawn worker {id}: {err}");
                    stop_workers(&queue, &shutdown, &mut workers);
                    return Err(TaskError::Spawn(err));
                }
            }
        }

        log::info!("Worker pool started with {worker_count} threads.");
        Ok(Self {
            queue,
            shutdown,
            workers,
        })
    }

    /// The queue this pool drains.
    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops and joins every worker. Idempotent.
    ///
    /// Pending queue entries are not drained here; run
    /// [`WorkQueue::complete_all_work`] first if the current batch must
    /// finish.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shutdown.store(true, Ordering::SeqCst);
        // One wake per worker so none stays parked on the semaphore.
        for _ in 0..self.workers.len() {
            self.queue.semaphore().post();
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("A worker thread panicked; its callback broke the no-panic contract.");
            }
        }
        log::info!("Worker pool shut down.");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stop_workers(queue: &WorkQueue, shutdown: &AtomicBool, workers: &mut Vec<JoinHandle<()>>) {
    shutdown.store(true, Ordering::SeqCst);
    for _ in 0..workers.len() {
        queue.semaphore().post();
    }
    for handle in workers.drain(..) {
        let _ = handle.join();
    }
}

/// The two-state worker loop: claim work until the queue looks empty,
/// then park on the semaphore until woken (or the idle wait elapses) and
/// re-check.
///
/// Claiming loops back immediately after executing an entry or losing a
/// claim race — staying hot while work remains is the deliberate
/// low-latency choice here.
fn worker_loop(queue: Arc<WorkQueue>, shutdown: Arc<AtomicBool>, id: WorkerId) {
    log::debug!("Worker {id} running.");
    while !shutdown.load(Ordering::SeqCst) {
        if queue.try_execute_one(id) {
            // The timed wait bounds how long a missed wake can delay
            // shutdown or freshly submitted work.
            queue.semaphore().wait(Some(WORKER_IDLE_WAIT));
        }
    }
    log::debug!("Worker {id} stopping.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::queue::WorkContext;
    use crate::task::MAIN_WORKER_ID;
    use std::sync::atomic::AtomicU32;
    use std::time::{Duration, Instant};

    fn count_execution(context: &WorkContext, _worker: WorkerId) {
        let counter = context
            .downcast_ref::<AtomicU32>()
            .expect("context should be an AtomicU32");
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn pool_drains_a_batch_through_the_barrier() {
        let queue = Arc::new(WorkQueue::new(64).expect("queue creation failed"));
        let mut pool = WorkerPool::spawn(Arc::clone(&queue), 2).expect("pool spawn failed");
        assert_eq!(pool.worker_count(), 2);

        let counter: Arc<AtomicU32> = Arc::new(AtomicU32::new(0));
        for _ in 0..50 {
            queue
                .submit(count_execution, Arc::clone(&counter) as Arc<WorkContext>)
                .expect("submit should succeed");
        }
        queue.complete_all_work(MAIN_WORKER_ID);

        assert_eq!(counter.load(Ordering::Relaxed), 50);
        assert_eq!(queue.outstanding(), 0);
        pool.shutdown();
    }

    #[test]
    fn workers_drain_the_queue_without_a_barrier() {
        let queue = Arc::new(WorkQueue::new(64).expect("queue creation failed"));
        let _pool = WorkerPool::spawn(Arc::clone(&queue), 2).expect("pool spawn failed");

        let counter: Arc<AtomicU32> = Arc::new(AtomicU32::new(0));
        for _ in 0..20 {
            queue
                .submit(count_execution, Arc::clone(&counter) as Arc<WorkContext>)
                .expect("submit should succeed");
        }

        // The semaphore posts alone must wake the workers.
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::Relaxed) < 20 {
            assert!(Instant::now() < deadline, "workers never drained the queue");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn shutdown_joins_all_workers_and_is_idempotent() {
        let queue = Arc::new(WorkQueue::new(16).expect("queue creation failed"));
        let mut pool = WorkerPool::spawn(Arc::clone(&queue), 3).expect("pool spawn failed");
        assert_eq!(pool.worker_count(), 3);

        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);

        // Second call (and the implicit one in Drop) must be a no-op.
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn pool_with_zero_workers_leaves_draining_to_the_barrier() {
        let queue = Arc::new(WorkQueue::new(16).expect("queue creation failed"));
        let pool = WorkerPool::spawn(Arc::clone(&queue), 0).expect("pool spawn failed");
        assert_eq!(pool.worker_count(), 0);

        let counter: Arc<AtomicU32> = Arc::new(AtomicU32::new(0));
        for _ in 0..5 {
            queue
                .submit(count_execution, Arc::clone(&counter) as Arc<WorkContext>)
                .expect("submit should succeed");
        }
        queue.complete_all_work(MAIN_WORKER_ID);
        assert_eq!(counter.load(Ordering::Relaxed), 5);
    }
}
