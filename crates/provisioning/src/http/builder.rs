//! CI proxy client: creates and deletes the CI and build-server jobs.
//!
//! The proxy provisions both jobs in one call and answers with a single
//! provider/URL pair, which is recorded as both the CI and the build-server
//! endpoint.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{required, ClientConfig, RestClient};
use crate::{Configuration, JobBuilder, ProviderError};

const SERVICE: &str = "ci-proxy";

pub struct CiProxyBuilder {
    client: RestClient,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    url: String,
    provider: String,
}

impl CiProxyBuilder {
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: RestClient::new(SERVICE, &config.ci_proxy_url, config.timeout, HeaderMap::new())?,
        })
    }
}

#[async_trait]
impl JobBuilder for CiProxyBuilder {
    async fn create_job(&self, cfg: &mut Configuration) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        let technology = required(SERVICE, "technology", &cfg.technology)?;
        let repository_url = required(SERVICE, "repository_url", &cfg.repository_url)?;

        let req = self.client.request(Method::POST, &["job"])?.json(&json!({
            "name": name,
            "technology": technology,
            "repository_url": repository_url,
        }));
        let resp = self.client.send(req).await?;
        let job: JobResponse = self.client.json(resp).await?;

        info!(id = %cfg.id, provider = %job.provider, url = %job.url, "CI job provisioned");
        cfg.continuous_integration_provider = Some(job.provider.clone());
        cfg.continuous_integration_url = Some(job.url.clone());
        cfg.build_server_provider = Some(job.provider);
        cfg.build_server_url = Some(job.url);
        Ok(())
    }

    async fn delete_job(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        let req = self.client.request(Method::DELETE, &["job", name])?;
        self.client.send_removal(req).await
    }
}
