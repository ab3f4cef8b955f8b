//! # ethcoder-observability
//!
//! Structured logging for ethcoder binaries.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to the binary, which calls [`init_tracing`] once at startup.
//! Output is human-readable text or JSON (for ELK, Loki, CloudWatch), with
//! levels configurable per component.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig, LOG_ENV_VAR};
