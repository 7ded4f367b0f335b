//! Release tracking client: lists an application as release-process enabled.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::json;

use super::{required, ClientConfig, RestClient};
use crate::{Configuration, ProviderError, ReleaseTracking};

const SERVICE: &str = "release-tracking";

pub struct ReleaseTrackingClient {
    client: RestClient,
}

impl ReleaseTrackingClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: RestClient::new(
                SERVICE,
                &config.release_tracking_url,
                config.timeout,
                HeaderMap::new(),
            )?,
        })
    }
}

#[async_trait]
impl ReleaseTracking for ReleaseTrackingClient {
    async fn enable(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        let repository_url = required(SERVICE, "repository_url", &cfg.repository_url)?;

        let req = self.client.request(Method::POST, &["applications"])?.json(&json!({
            "name": name,
            "repository_url": repository_url,
            "workflow": cfg.workflow_type.to_string(),
        }));
        self.client.send(req).await?;
        Ok(())
    }

    async fn disable(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        let req = self.client.request(Method::DELETE, &["applications", name])?;
        self.client.send_removal(req).await
    }
}
