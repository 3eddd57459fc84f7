#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Concurrent batch upload of local files into an object storage bucket.
//!
//! A batch walks a directory tree, keeps the regular files whose name starts
//! with a prefix, and pushes each one through a fixed-width pool of upload
//! workers. A file that fails at any step is recorded by path and the batch
//! keeps going; at the end a [`BatchReport`] says how many files made it.
//!
//! ## Flow
//!
//! ```text
//! Orchestrator ──spawn──▶ WorkerPool (W workers, idle)
//!      │
//!      └──discover──▶ work stream (capacity 1) ──▶ worker: open → read → close
//!                                                        → blob name → write → finalize
//!                                                        └─ failure ─▶ ErrorCollector
//! ```
//!
//! The work stream only holds a single job, so discovery never runs far
//! ahead of the workers and at most `W` file contents sit in memory at once.

pub mod blob_name;
pub mod collector;
pub mod config;
pub mod discover;
mod error;
pub mod job;
pub mod load;
pub mod orchestrator;
pub mod pool;
pub mod progress;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use blob_name::assemble_blob_name;
pub use collector::ErrorCollector;
pub use error::{ConfigError, DiscoveryError, UploadError};
pub use job::UploadJob;
pub use load::load_file;
pub use orchestrator::{BatchReport, Orchestrator};
pub use pool::WorkerPool;
pub use source::{LocalFiles, SourceFiles, SourceReader};
