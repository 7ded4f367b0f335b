//! Coverage service client: registers the pull-request coverage threshold.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::{ClientConfig, RestClient};
use crate::{Configuration, CoverageThreshold, ProviderError};

const SERVICE: &str = "coverage";

pub struct CoverageClient {
    client: RestClient,
}

impl CoverageClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: RestClient::new(
                SERVICE,
                &config.coverage_api_url,
                config.timeout,
                HeaderMap::new(),
            )?,
        })
    }

    async fn write_threshold(&self, method: Method, cfg: &Configuration) -> Result<(), ProviderError> {
        let Some(threshold) = cfg.code_coverage_pull_request_threshold else {
            debug!(id = %cfg.id, "no coverage threshold configured, nothing to register");
            return Ok(());
        };

        let req = self
            .client
            .request(method, &["repositories", cfg.id.as_str(), "thresholds"])?
            .json(&json!({ "pull_request": threshold }));
        self.client.send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl CoverageThreshold for CoverageClient {
    async fn set_threshold(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        self.write_threshold(Method::POST, cfg).await
    }

    async fn update_threshold(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        self.write_threshold(Method::PUT, cfg).await
    }
}
