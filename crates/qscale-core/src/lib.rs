//! qscale-core
//!
//! Pure domain types for questionnaires, answer sheets, medical scales and
//! interpretation reports. No I/O here: this is the shared vocabulary of the
//! scoring pipeline.

pub mod error;
pub mod models;
pub mod store_keys;
