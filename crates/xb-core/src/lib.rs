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

//! # xb-core
//!
//! Work-distribution core of the xb engine: a bounded job queue and a
//! fixed pool of worker threads used to parallelize per-frame engine work.
//!
//! The rest of the engine (windowing, audio, input, rendering) only hands
//! this crate opaque `(callback, context)` pairs; nothing here depends on
//! any of those subsystems.

#![warn(missing_docs)]

pub mod constants;
pub mod task;

pub use task::{
    TaskError, WorkCallback, WorkContext, WorkEntry, WorkQueue, WorkerId, WorkerPool,
    MAIN_WORKER_ID,
};
