//! Resources compiled into the binary.
//!
//! - `providers.json` - default provider list for `chirp health` without `-p`

/// Default `providers.json`, used when no provider file is given.
pub const DEFAULT_PROVIDERS: &str = include_str!("providers.json");
