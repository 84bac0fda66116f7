//! Logger initialization.
//!
//! Everything in the crate logs through the `log` facade:
//! - `trace`: batch splits and layer moves
//! - `debug`: buffer growth, per-render stats, GPU resource (re)creation
//! - `warn`: recoverable backend oddities

mod init;

pub use init::{init_logging, LoggingConfig};
