//! Record reconciliation: decode -> match -> classify, plus construction of
//! the write-back instruction.
//!
//! One reconcile pass is synchronous and stateless; the snapshot text it is
//! handed is the sole source of truth for that pass and is never cached
//! across requests.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::identity::IdentityQuery;
use crate::domain::record::{FIELD_PASSWORD, FIELD_REGISTRATION_STATUS, FIELD_UPDATED_AT};
use crate::domain::status::{classify, SubscriptionStatus};
use crate::domain::update::UpdateInstruction;
use crate::infrastructure::csv::SnapshotDecoder;

use super::identity_matcher::{find_match, MatchResult};

/// Value written to the registration status column on every update. The
/// backing sheet's consumers expect this exact marker.
pub const REGISTERED_MARKER: &str = "רשום";

/// Result of one read-path reconciliation pass.
#[derive(Debug)]
pub struct ReconcileResult {
    pub matched: MatchResult,
    /// Derived from the matched record's expiry field; absent when nothing
    /// matched, which keeps "not found" distinguishable from `Unknown`.
    pub status: Option<SubscriptionStatus>,
    /// SHA-256 hex of the snapshot text this pass decoded.
    pub snapshot_fingerprint: String,
}

impl ReconcileResult {
    pub fn found(&self) -> bool {
        self.matched.is_match()
    }
}

/// SHA-256 hex fingerprint of a snapshot, the optimistic-concurrency token
/// carried by every update instruction built from it.
pub fn snapshot_fingerprint(snapshot_text: &str) -> String {
    hex::encode(Sha256::digest(snapshot_text.as_bytes()))
}

/// Read path: decode the snapshot, match the query, classify the expiry.
pub fn reconcile(
    snapshot_text: &str,
    query: &IdentityQuery,
    now: DateTime<Utc>,
) -> Result<ReconcileResult> {
    let records = SnapshotDecoder::new().decode(snapshot_text)?;
    let matched = find_match(&records, query);

    let status = matched
        .record
        .as_ref()
        .map(|record| classify(record.expiry().unwrap_or(""), now));

    debug!(
        records = records.len(),
        found = matched.is_match(),
        matched_field_count = matched.matched_field_count(),
        qualifying_candidates = matched.qualifying_candidates,
        "Reconciled query against snapshot"
    );

    Ok(ReconcileResult {
        matched,
        status,
        snapshot_fingerprint: snapshot_fingerprint(snapshot_text),
    })
}

/// Write path: build the minimal update for a previously accepted match.
///
/// The instruction touches exactly the caller-supplied fields plus the fixed
/// registration status marker and the update timestamp. It never creates a
/// row; without an accepted match this fails with `NoMatchingRecord`.
pub fn build_update(
    matched: &MatchResult,
    assignments: &BTreeMap<String, String>,
    now: DateTime<Utc>,
    fingerprint: &str,
) -> Result<UpdateInstruction> {
    let record = matched.record.as_ref().ok_or_else(|| {
        AppError::NoMatchingRecord("the quorum rule accepted no record".to_string())
    })?;

    let mut column_assignments = BTreeMap::new();
    for (name, value) in assignments {
        // The password column is read-only; it can never be assigned.
        if name == FIELD_PASSWORD {
            warn!(row_index = record.row_index, "Dropped password assignment from update");
            continue;
        }
        column_assignments.insert(name.clone(), value.clone());
    }

    column_assignments.insert(
        FIELD_REGISTRATION_STATUS.to_string(),
        REGISTERED_MARKER.to_string(),
    );
    column_assignments.insert(
        FIELD_UPDATED_AT.to_string(),
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    Ok(UpdateInstruction {
        target_row_index: record.row_index,
        column_assignments,
        snapshot_fingerprint: fingerprint.to_string(),
    })
}
