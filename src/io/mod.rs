//! Reading the input table and publishing results.
//!
//! Kept apart from [`crate::pipeline`] so that a run never interleaves I/O
//! with computation.

pub mod ingest;
pub mod publish;

pub use ingest::{read_table, read_table_from_reader, DEFAULT_DELIMITER};
pub use publish::{publish_outputs, to_writer, write_json, OutputPaths};
