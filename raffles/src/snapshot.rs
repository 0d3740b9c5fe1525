//! JSON snapshot persistence.
//!
//! The whole state is written as one document:
//!
//! ```json
//! { "schemaVersion": 1, "raffles": [...], "tickets": [...], "resellers": [...], "sales": [...] }
//! ```
//!
//! Money fields are integer cents and commission rates are basis points.

use crate::ledger::ResellerLedger;
use crate::state::RaffleState;
use crate::tickets::TicketBook;
use crate::types::{Raffle, Reseller, Sale, Ticket};
use raffle_core::persistence::{Persistence, PersistenceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshot format version written by this build
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    schema_version: u32,
    raffles: Vec<&'a Raffle>,
    tickets: Vec<&'a Ticket>,
    resellers: Vec<&'a Reseller>,
    sales: &'a [Sale],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    raffles: Vec<Raffle>,
    #[serde(default)]
    tickets: Vec<Ticket>,
    #[serde(default)]
    resellers: Vec<Reseller>,
    #[serde(default)]
    sales: Vec<Sale>,
}

/// Encode the state as a snapshot document
///
/// # Errors
///
/// Returns [`PersistenceError::Serialization`] if encoding fails.
pub fn to_json(state: &RaffleState) -> Result<String, PersistenceError> {
    let snapshot = SnapshotRef {
        schema_version: SCHEMA_VERSION,
        raffles: state.raffles.values().collect(),
        tickets: state.tickets.iter().collect(),
        resellers: state.ledger.iter().collect(),
        sales: state.ledger.sales(),
    };
    serde_json::to_string_pretty(&snapshot).map_err(|e| PersistenceError::Serialization(e.to_string()))
}

/// Decode a snapshot document
///
/// Duplicate ticket rows are dropped (first wins). The outcome of the last
/// command is not part of a snapshot.
///
/// # Errors
///
/// - [`PersistenceError::Serialization`] for malformed JSON
/// - [`PersistenceError::UnsupportedSchema`] for a missing or unknown version
pub fn from_json(json: &str) -> Result<RaffleState, PersistenceError> {
    let snapshot: Snapshot =
        serde_json::from_str(json).map_err(|e| PersistenceError::Serialization(e.to_string()))?;

    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedSchema {
            found: snapshot.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let (tickets, duplicates) = TicketBook::from_rows(snapshot.tickets);
    if duplicates > 0 {
        tracing::warn!(duplicates, "Dropped duplicate ticket rows from snapshot");
    }

    Ok(RaffleState {
        raffles: snapshot.raffles.into_iter().map(|r| (r.id.clone(), r)).collect(),
        tickets,
        ledger: ResellerLedger::from_rows(snapshot.resellers, snapshot.sales),
        last_outcome: None,
    })
}

/// Snapshot file on local disk
///
/// Writes go to a sibling temporary file which is then renamed over the
/// snapshot, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Store backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; a missing file is an empty state
    ///
    /// # Errors
    ///
    /// - [`PersistenceError::Io`] if the file exists but cannot be read
    /// - any error of [`from_json`]
    pub fn load(&self) -> Result<RaffleState, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                let state = from_json(&json)?;
                tracing::info!(
                    path = %self.path.display(),
                    raffles = state.raffles.len(),
                    tickets = state.tickets.len(),
                    "Snapshot loaded"
                );
                Ok(state)
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot found, starting empty");
                Ok(RaffleState::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence<RaffleState> for JsonSnapshotStore {
    fn save(&self, state: &RaffleState) -> Result<(), PersistenceError> {
        let json = to_json(state)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Snapshot written");
        Ok(())
    }
}
