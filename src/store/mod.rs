use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub mod json_file;
pub mod memory;

/// The durable occupancy record, a singleton per lot.
///
/// Gate-open flags are persisted alongside the count so a restart right
/// after a rising edge does not recount the vehicle still sitting on the
/// sensor as a fresh edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub count: u32,
    /// RFC 3339; absent until the first vehicle enters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_entry_at: Option<String>,
    #[serde(default)]
    pub entry_gate_open: bool,
    #[serde(default)]
    pub exit_gate_open: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state: {0}")]
    Read(std::io::Error),
    #[error("failed to parse state: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to write state: {0}")]
    Write(std::io::Error),
}

/// Durable key-value storage for the occupancy record.
///
/// Implementations must make `save` atomic: after a crash, `load` returns
/// either the previous record or the new one, never a torn write.
pub trait StateStore: Send + 'static {
    fn load(&self) -> Result<Option<PersistedState>, StoreError>;
    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

pub fn format_timestamp(timestamp: SystemTime) -> Option<String> {
    OffsetDateTime::from(timestamp).format(&Rfc3339).ok()
}

pub fn parse_timestamp(value: &str) -> Option<SystemTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .map(SystemTime::from)
}
