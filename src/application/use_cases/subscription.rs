//! Orchestration over the sheet store collaborator: fetch a fresh snapshot,
//! run the reconciler, and on the write path hand the update instruction
//! back to the store. Each call fetches its own snapshot; nothing is cached
//! between requests, so concurrent invocations never share state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::error::Result;
use crate::domain::identity::IdentityQuery;
use crate::infrastructure::sheets::SheetStore;

use super::reconciler::{build_update, reconcile, ReconcileResult};

/// Outcome reported to the caller after a successful registration write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub target_row_index: usize,
    pub matched_field_count: usize,
    pub qualifying_candidates: usize,
}

pub struct SubscriptionUseCase {
    store: Arc<dyn SheetStore>,
}

impl SubscriptionUseCase {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self { store }
    }

    /// Read path: fetch the current snapshot and reconcile the query.
    pub async fn lookup(&self, query: &IdentityQuery) -> Result<ReconcileResult> {
        let snapshot = self.store.fetch_snapshot().await?;
        reconcile(&snapshot, query, Utc::now())
    }

    /// Write path: reconcile, build the update for the accepted match, and
    /// apply it through the store. Fails with `NoMatchingRecord` when the
    /// quorum rule accepts nothing; no row is ever created.
    pub async fn register(
        &self,
        query: &IdentityQuery,
        assignments: BTreeMap<String, String>,
    ) -> Result<RegistrationOutcome> {
        let snapshot = self.store.fetch_snapshot().await?;
        let result = reconcile(&snapshot, query, Utc::now())?;

        let update = build_update(
            &result.matched,
            &assignments,
            Utc::now(),
            &result.snapshot_fingerprint,
        )?;
        self.store.apply_update(&update).await?;

        info!(
            target_row_index = update.target_row_index,
            matched_field_count = result.matched.matched_field_count(),
            "Registration update applied"
        );

        Ok(RegistrationOutcome {
            target_row_index: update.target_row_index,
            matched_field_count: result.matched.matched_field_count(),
            qualifying_candidates: result.matched.qualifying_candidates,
        })
    }
}
