//! The analysis pipeline seam.
//!
//! The engine treats the pipeline as one opaque call per item: it either
//! returns normally, meaning the analysis service computed the result and
//! persisted it as a child record of the fingerprint type, or it fails.
//! What the modules actually do is the service's business.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use anncache_common::PipelineSpec;

use crate::error::PipelineError;
use crate::item::Item;
use crate::store::DEFAULT_HTTP_TIMEOUT_SECS;

/// One blocking analysis call per item.
#[async_trait]
pub trait AnalysisPipeline: Send + Sync {
    /// Run the full pipeline on `item`. On success the result is cached
    /// server-side; the engine sees nothing but the Ok.
    async fn process(&self, item: &Item) -> Result<(), PipelineError>;
}

/// Client for an HTTP analysis service.
pub struct HttpPipeline {
    client: Client,
    base_url: String,
    spec: PipelineSpec,
}

impl HttpPipeline {
    pub fn new(base_url: impl Into<String>, spec: PipelineSpec) -> Result<Self, reqwest::Error> {
        let timeout_secs = std::env::var("ANNCACHE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spec,
        })
    }

    fn pipeline_url(&self) -> String {
        format!("{}/pipeline", self.base_url)
    }
}

#[async_trait]
impl AnalysisPipeline for HttpPipeline {
    async fn process(&self, item: &Item) -> Result<(), PipelineError> {
        let request = json!({
            "index": item.index,
            "type": item.doc_type,
            "id": item.id,
            "field": item.field,
            "modules": self.spec.modules(),
        });

        let response = self
            .client
            .post(self.pipeline_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(PipelineError::Failed {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}
