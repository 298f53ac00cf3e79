//! Engine configuration
//!
//! The engine takes a plain config struct; loading it from files or the
//! environment is the host's job, so it derives `Deserialize` and
//! sensible defaults and nothing more.

use serde::{Deserialize, Serialize};

/// Tunables for a [`crate::LedgerEngine`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many times a balance write retries after a concurrent-write
    /// conflict before surfacing `ErrorKind::Conflict` to the caller
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}
