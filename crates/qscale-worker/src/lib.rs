//! qscale-worker
//!
//! Composition root for the evaluation worker: configuration, wiring of
//! stores, engine and dispatcher, and the event intake loop.

pub mod config;
pub mod run;
pub mod state;
