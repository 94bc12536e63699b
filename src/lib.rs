//! Synthetic CPU load generator with an embedded status server.
//!
//! [`cpu_stress`] keeps a configurable number of cores busy forever while
//! [`server`] answers requests with a system-wide utilization measurement
//! taken from two [`sampler`] snapshots.

pub mod config;
pub mod cpu_stress;
pub mod error;
pub mod report;
pub mod sampler;
pub mod server;
pub mod ticker;
