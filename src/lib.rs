//! pylog-check - verifies how the MLDB python plugin renders `mldb.log()` calls
//!
//! The crate sends one embedded script to a running server's python plugin
//! and compares the returned log records with the expected text:
//! - `log_value`: loggable values and their rendering rules
//! - `script`: embedded script construction
//! - `client`: explicit HTTP client handle for the server
//! - `scenario`: the checked calls, verification and result marker

pub mod client;
pub mod config;
pub mod log_value;
pub mod scenario;
pub mod script;
