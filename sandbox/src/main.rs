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

//! Multi-threading smoke test for the work-distribution core: two waves
//! of labelled jobs fanned out across the worker pool, then a fork/join
//! barrier from the main thread.

use std::sync::Arc;

use anyhow::Result;
use xb_core::constants::{THREAD_COUNT, WORK_QUEUE_ENTRIES};
use xb_core::{WorkContext, WorkQueue, WorkerId, WorkerPool, MAIN_WORKER_ID};

fn print_label(context: &WorkContext, worker: WorkerId) {
    let label = context
        .downcast_ref::<String>()
        .expect("context should be a String label");
    println!("thread {worker}: {label}");
}

fn main() -> Result<()> {
    env_logger::init();

    let queue = Arc::new(WorkQueue::new(WORK_QUEUE_ENTRIES)?);
    let mut pool = WorkerPool::spawn(Arc::clone(&queue), THREAD_COUNT)?;

    for wave in ["A", "B"] {
        for index in 0..10 {
            let label: Arc<WorkContext> = Arc::new(format!("job {wave}{index}"));
            queue.submit(print_label, label)?;
        }
    }

    log::info!("All jobs submitted; joining the batch.");
    queue.complete_all_work(MAIN_WORKER_ID);
    log::info!("Batch complete.");

    pool.shutdown();
    Ok(())
}
