//! Application registry client.
//!
//! Source of the application metadata (name, technology, repository) and
//! owner of the per-application "release process" flag.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::{required, ClientConfig, RestClient};
use crate::{ApplicationRegistry, Configuration, ProviderError};

const SERVICE: &str = "app-registry";

pub struct RegistryClient {
    client: RestClient,
}

#[derive(Debug, Deserialize)]
struct ApplicationResponse {
    name: String,
    technology: String,
    repository_url: String,
}

impl RegistryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: RestClient::new(
                SERVICE,
                &config.app_registry_url,
                config.timeout,
                HeaderMap::new(),
            )?,
        })
    }

    async fn set_release_process(&self, name: &str, enabled: bool) -> Result<(), ProviderError> {
        let req = self
            .client
            .request(Method::PUT, &["applications", name, "release-process"])?
            .json(&json!({ "enabled": enabled }));
        self.client.send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationRegistry for RegistryClient {
    async fn fetch_application_data(&self, cfg: &mut Configuration) -> Result<(), ProviderError> {
        let req = self.client.request(Method::GET, &["applications", cfg.id.as_str()])?;
        let resp = self.client.send(req).await?;
        let app: ApplicationResponse = self.client.json(resp).await?;

        cfg.application_name = Some(app.name);
        cfg.technology = Some(app.technology);
        cfg.repository_url = Some(app.repository_url);
        Ok(())
    }

    async fn enable_release_process_field(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        self.set_release_process(name, true).await
    }

    async fn disable_release_process_field(
        &self,
        cfg: &Configuration,
    ) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        match self.set_release_process(name, false).await {
            // Application gone from the registry: nothing left to switch off.
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    async fn update_application_technology(
        &self,
        cfg: &Configuration,
    ) -> Result<(), ProviderError> {
        let name = required(SERVICE, "application_name", &cfg.application_name)?;
        let technology = required(SERVICE, "technology", &cfg.technology)?;

        let req = self
            .client
            .request(Method::PUT, &["applications", name, "technology"])?
            .json(&json!({ "technology": technology }));
        self.client.send(req).await?;
        Ok(())
    }
}
