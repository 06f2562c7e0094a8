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

//! Engine-wide tunables for the work-distribution core.
//!
//! Deadzone, audio, and window constants live with their own subsystems;
//! only the threading knobs belong here.

use std::time::Duration;

/// Number of slots in the work queue ring. One slot is always kept empty
/// to disambiguate full from empty, so at most `WORK_QUEUE_ENTRIES - 1`
/// entries can be live at once.
pub const WORK_QUEUE_ENTRIES: u32 = 256;

/// Size of the worker pool, excluding the main thread.
pub const THREAD_COUNT: u32 = 3;

/// Base name for worker OS threads; the logical ID is appended.
pub const THREAD_NAME: &str = "xbThread";

/// How long an idle worker sleeps on the semaphore before re-checking the
/// queue and its shutdown flag. A timed wait keeps teardown prompt even if
/// a wake-up is missed.
pub const WORKER_IDLE_WAIT: Duration = Duration::from_millis(100);
