//! The single cached world-state value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::Result;
use crate::worldstate::{WorldState, parse_worldstate};

/// Fixed key under which the snapshot is persisted. There is no key space.
pub const SNAPSHOT_ID: &str = "worldstate";

/// The cached representation of the upstream feed.
///
/// `parsed_view` is always the projection of `raw_payload`; write paths build
/// snapshots through [`Snapshot::from_payload`] so the two cannot diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Upstream document as received.
    pub raw_payload: Value,
    /// Normalized projection of `raw_payload`.
    pub parsed_view: WorldState,
    /// Upstream change token, if the server supplied one.
    pub etag: Option<String>,
    /// Time of the upstream retrieval that produced this snapshot.
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

impl Snapshot {
    /// Parses `raw_payload` and assembles a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ParseError`] if the payload cannot be projected.
    pub fn from_payload(
        raw_payload: Value,
        etag: Option<String>,
        fetched_at: OffsetDateTime,
    ) -> Result<Self> {
        let parsed_view = parse_worldstate(&raw_payload)?;
        Ok(Self {
            raw_payload,
            parsed_view,
            etag,
            fetched_at,
        })
    }
}
