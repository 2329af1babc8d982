//! Model health checking.
//!
//! Probes each configured provider's models, records the results in
//! `model-status.json` and reports whether a critical model changed.

mod change;
mod probe;
mod runner;
mod snapshot;
mod state;
mod status;

pub use change::RebuildSignal;
pub use probe::HttpProber;
pub use runner::{CheckPaths, CheckTime, run_check};
