//! rvsnoop: headless driver for the record classification engine.
//!
//! The engine itself lives in [`rvsnoop_core`] and is re-exported here so that
//! integration tests and benchmarks can import everything from one place.
//!
//! ```text
//! JSON lines ──► ingest (tokio task) ──mpsc──► ClassificationTable ──► render
//! ```

pub mod ingest;
pub mod render;

pub use rvsnoop_core::*;
