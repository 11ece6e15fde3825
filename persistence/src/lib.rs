#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snapshot codec and storage port for session rosters.
//!
//! A roster is written as one JSON document holding every field plus the
//! active index. Reading is forgiving: a document that cannot be used at all
//! yields a fresh roster, and a usable document is repaired field by field.

mod decode;
mod document;
mod store;

use std::sync::Arc;

use endless_defence_core::{field_name, FieldId, SESSION_COUNT};
use endless_defence_world::{derive_field_seed, Field, MapModel};
use thiserror::Error;
use tracing::warn;

pub use decode::decode;
pub use document::{encode, SNAPSHOT_VERSION};
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError};

/// Reasons a snapshot document could not be produced or used.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not valid JSON.
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The document is JSON but not an object.
    #[error("snapshot root is not an object")]
    NotAnObject,
    /// The document was written with a different format version.
    #[error("snapshot version {found:?} does not match {expected}")]
    VersionMismatch {
        /// Version found in the document, if it was a number.
        found: Option<f64>,
        /// Version this build reads.
        expected: u32,
    },
    /// The document holds no fields.
    #[error("snapshot holds no fields")]
    NoFields,
    /// Serialising the roster failed.
    #[error("failed to serialise snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Ordered fields of a session plus the index of the active one.
#[derive(Debug)]
pub struct Roster {
    /// Fields in roster order; always [`SESSION_COUNT`] long.
    pub fields: Vec<Field>,
    /// Index of the field that receives commands.
    pub active: usize,
    /// `savedAt` of the document the roster was read from; 0 for a fresh roster.
    pub saved_at: u64,
}

impl Roster {
    /// Creates a roster of fresh fields with the first one active.
    #[must_use]
    pub fn fresh(map: &Arc<MapModel>, seed: u64) -> Self {
        Self {
            fields: (0..SESSION_COUNT)
                .map(|slot| fresh_field(slot, map, seed))
                .collect(),
            active: 0,
            saved_at: 0,
        }
    }
}

/// Folds the save timestamp of a resumed document into the roster seed.
///
/// Fields restored from a snapshot, and fields restarted after it, draw from
/// streams the session that wrote the snapshot never used. A zero timestamp
/// leaves the seed unchanged.
#[must_use]
pub fn resume_seed(seed: u64, saved_at: u64) -> u64 {
    if saved_at == 0 {
        return seed;
    }
    seed ^ saved_at.wrapping_mul(0xd6e8_feb8_6659_fd93).rotate_left(29)
}

/// Creates the fresh field occupying `slot`.
#[must_use]
pub fn fresh_field(slot: usize, map: &Arc<MapModel>, seed: u64) -> Field {
    let id = FieldId::for_slot(slot);
    Field::new(
        id,
        field_name(slot),
        Arc::clone(map),
        derive_field_seed(seed, id, 0),
    )
}

/// Decodes `text`, falling back to a fresh roster when it cannot be used.
#[must_use]
pub fn decode_or_fresh(text: &str, map: &Arc<MapModel>, seed: u64) -> Roster {
    match decode(text, map, seed) {
        Ok(roster) => roster,
        Err(error) => {
            warn!(error = %error, "snapshot_discarded");
            Roster::fresh(map, seed)
        }
    }
}

/// Loads the roster held by `store`, or a fresh one when there is none.
///
/// Storage and decoding failures are logged and answered with a fresh roster.
#[must_use]
pub fn load_roster(store: &dyn SnapshotStore, map: &Arc<MapModel>, seed: u64) -> Roster {
    match store.load() {
        Ok(Some(text)) => decode_or_fresh(&text, map, seed),
        Ok(None) => Roster::fresh(map, seed),
        Err(error) => {
            warn!(error = %error, "snapshot_load_failed");
            Roster::fresh(map, seed)
        }
    }
}
