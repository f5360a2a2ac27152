//! Sync pipeline orchestration and domain logic for machine-sync.
//!
//! This crate ties together the GitHub client, header parsing, record
//! mapping, and JSON output into one end-to-end run ([`pipeline::sync`]).

pub mod output;
pub mod pipeline;
pub mod record;

pub use pipeline::{Collected, SilentProgress, SyncProgress, SyncResult, sync};
pub use record::{FIELD_DEFAULTS, FieldDefaults, MATRIX_KEYS, RecordBuilder};
