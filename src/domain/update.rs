use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The minimal, auditable mutation to apply back to the store.
///
/// Produced only after a unique accepted match; never references more than
/// one record and never creates one. The external store collaborator is
/// expected to re-validate `snapshot_fingerprint` against the snapshot it is
/// about to mutate before applying (optimistic concurrency token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstruction {
    /// 1-based data-row position from the snapshot the match was computed on.
    pub target_row_index: usize,
    /// Canonical field name -> new value. Sorted map, so serialization order
    /// is deterministic.
    pub column_assignments: BTreeMap<String, String>,
    /// SHA-256 hex of the snapshot text the match was computed from.
    pub snapshot_fingerprint: String,
}
