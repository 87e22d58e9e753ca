//! Application layer (use-cases, policies).
//!
//! Classification and aggregation run here without touching files, the
//! database or the network; `infra` feeds them and persists their output.

pub mod aggregate;
pub mod classify;
pub mod export;
