//! Fire-and-forget recording of finished calculations.
//!
//! A sink failure never reaches the user: [`dispatch`] runs the sink on a
//! background task and only logs what went wrong.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tax_core::{
    CalculationRepository, NewCalculationRecord, RequestMetadata, SaveCalculationResponse,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::logging::log_task_error;

/// Destination for analytics records.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(
        &self,
        record: &NewCalculationRecord,
        metadata: &RequestMetadata,
    ) -> Result<()>;
}

/// Writes records to a [`CalculationRepository`] under a fresh session id.
pub struct RepositorySink {
    repository: Arc<dyn CalculationRepository>,
}

impl RepositorySink {
    pub fn new(repository: Arc<dyn CalculationRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AnalyticsSink for RepositorySink {
    async fn record(
        &self,
        record: &NewCalculationRecord,
        metadata: &RequestMetadata,
    ) -> Result<()> {
        let session_id = Uuid::new_v4().to_string();
        let stored = self
            .repository
            .save_calculation(&session_id, record, metadata)
            .await
            .context("failed to store calculation")?;
        tracing::debug!(id = stored.id, %session_id, "calculation recorded");
        Ok(())
    }
}

/// Posts records to a remote `/api/save-calculation` endpoint.
pub struct HttpAnalyticsSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalyticsSink {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tax-allocation/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    /// The remote side reads the client address from its own request, so
    /// `metadata` is not forwarded.
    async fn record(
        &self,
        record: &NewCalculationRecord,
        _metadata: &RequestMetadata,
    ) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.endpoint))?;

        let status = response.status();
        let body: SaveCalculationResponse = response
            .json()
            .await
            .with_context(|| format!("unreadable reply from {} ({status})", self.endpoint))?;

        if !status.is_success() || !body.success {
            anyhow::bail!(
                "{} rejected calculation ({status}): {}",
                self.endpoint,
                body.error.as_deref().unwrap_or("no reason given")
            );
        }
        tracing::debug!(endpoint = %self.endpoint, session_id = ?body.session_id, "calculation posted");
        Ok(())
    }
}

/// Hands `record` to `sink` on a background task. The caller never waits on
/// the returned handle in request paths.
pub fn dispatch(
    sink: Arc<dyn AnalyticsSink>,
    record: NewCalculationRecord,
    metadata: RequestMetadata,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        log_task_error("save-calculation", sink.record(&record, &metadata).await);
    })
}
