// ============================================================
// SHEET STORE COLLABORATOR
// ============================================================
// Transport boundary to the externally-maintained spreadsheet. The core
// never fetches inside its own logic; it receives snapshot text from here
// and hands update instructions back. Retry/backoff stays on this side of
// the boundary and is owned by the store endpoint contract, not the core.

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::domain::update::UpdateInstruction;
use crate::infrastructure::config::AppConfig;

/// The external tabular store, as the core sees it.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Fetch the full current export as delimited text.
    async fn fetch_snapshot(&self) -> Result<String>;

    /// Hand one update instruction to the store-mutation endpoint.
    async fn apply_update(&self, update: &UpdateInstruction) -> Result<()>;
}

/// reqwest-backed client for a Google-Sheets-style CSV export plus a script
/// endpoint that applies updates.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    snapshot_url: String,
    update_url: String,
}

impl GoogleSheetsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            snapshot_url: config.snapshot_url.clone(),
            update_url: config.update_url.clone(),
        }
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn fetch_snapshot(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.snapshot_url)
            .send()
            .await
            .map_err(|e| AppError::TransportError(format!("snapshot fetch failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Snapshot endpoint returned an error status");
            return Err(AppError::TransportError(format!(
                "snapshot endpoint returned {}",
                status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::TransportError(format!("snapshot body unreadable: {}", e)))?;

        info!(bytes = text.len(), "Fetched snapshot");
        Ok(text)
    }

    async fn apply_update(&self, update: &UpdateInstruction) -> Result<()> {
        let response = self
            .http
            .post(&self.update_url)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::TransportError(format!("update post failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Update endpoint rejected the instruction");
            return Err(AppError::TransportError(format!(
                "update endpoint returned {}",
                status
            )));
        }

        info!(
            target_row_index = update.target_row_index,
            columns = update.column_assignments.len(),
            "Update applied"
        );
        Ok(())
    }
}
