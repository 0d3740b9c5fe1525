//! Configuration for the raffle engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file (`RAFFLES_SNAPSHOT_PATH`)
    pub snapshot_path: PathBuf,
    /// Write a snapshot after every change (`RAFFLES_AUTOSAVE`)
    pub autosave: bool,
    /// Seed for deterministic ticket shuffles (`RAFFLES_SHUFFLE_SEED`)
    pub shuffle_seed: Option<u64>,
    /// Maximum nesting of follow-up actions (`RAFFLES_MAX_DISPATCH_DEPTH`)
    pub max_dispatch_depth: usize,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            snapshot_path: env::var("RAFFLES_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            autosave: env::var("RAFFLES_AUTOSAVE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.autosave),
            shuffle_seed: env::var("RAFFLES_SHUFFLE_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
            max_dispatch_depth: env::var("RAFFLES_MAX_DISPATCH_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_dispatch_depth),
            log_filter: env::var("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("raffles.json"),
            autosave: true,
            shuffle_seed: None,
            max_dispatch_depth: 8,
            log_filter: "raffles=info".to_string(),
        }
    }
}
