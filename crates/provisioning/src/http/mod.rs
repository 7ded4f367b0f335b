//! reqwest-backed implementations of the collaborator traits.
//!
//! Every client wraps a [`RestClient`]: a base URL, a bounded request
//! timeout, default headers and uniform status handling. A timeout surfaces
//! as [`ProviderError::Transport`] like any other failed request.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::ProviderError;

pub mod builder;
pub mod coverage;
pub mod github;
pub mod registry;
pub mod release_tracking;

pub use builder::CiProxyBuilder;
pub use coverage::CoverageClient;
pub use github::GithubWorkflow;
pub use registry::RegistryClient;
pub use release_tracking::ReleaseTrackingClient;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Endpoints and limits shared by all HTTP collaborators.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub github_api_url: String,
    /// Sent as a bearer token when present.
    pub github_token: Option<String>,
    pub ci_proxy_url: String,
    pub coverage_api_url: String,
    pub release_tracking_url: String,
    pub app_registry_url: String,
    /// Upper bound for a single request, connect included.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".into(),
            github_token: None,
            ci_proxy_url: "http://localhost:8081".into(),
            coverage_api_url: "http://localhost:8082".into(),
            release_tracking_url: "http://localhost:8083".into(),
            app_registry_url: "http://localhost:8084".into(),
            timeout: Duration::from_secs(2),
        }
    }
}

// ---------------------------------------------------------------------------
// RestClient
// ---------------------------------------------------------------------------

/// Thin JSON client bound to one service.
#[derive(Debug, Clone)]
pub struct RestClient {
    service: &'static str,
    base_url: Url,
    http: reqwest::Client,
}

impl RestClient {
    /// Build a client for `service` rooted at `base_url`.
    ///
    /// `headers` are added on top of the JSON `Accept`/`Content-Type` pair.
    pub fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
        headers: HeaderMap,
    ) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url).map_err(|e| ProviderError::Config {
            service,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.extend(headers);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::Config {
                service,
                message: e.to_string(),
            })?;

        Ok(Self {
            service,
            base_url,
            http,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Absolute URL for the path `segments`, each one percent-encoded so
    /// ids containing `/`, `?` or `#` stay inside their segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Config {
                service: self.service,
                message: format!("'{}' cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ProviderError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    /// Send `req` and fail on any non-2xx status.
    pub async fn send(&self, req: RequestBuilder) -> Result<Response, ProviderError> {
        let resp = req.send().await.map_err(|e| ProviderError::Transport {
            service: self.service,
            message: e.to_string(),
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            service: self.service,
            status: status.as_u16(),
            message,
        })
    }

    /// Like [`send`](Self::send) but treats `404` as "already gone".
    ///
    /// Removal calls use this so that re-running a teardown is harmless.
    pub async fn send_removal(&self, req: RequestBuilder) -> Result<(), ProviderError> {
        match self.send(req).await {
            Ok(_) => Ok(()),
            Err(ProviderError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                debug!(service = self.service, "resource already removed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, ProviderError> {
        resp.json::<T>().await.map_err(|e| ProviderError::Decode {
            service: self.service,
            message: e.to_string(),
        })
    }
}

/// Borrow a field the call cannot proceed without.
pub(crate) fn required<'a>(
    service: &'static str,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ProviderError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProviderError::MissingField { service, field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path_without_double_slash() {
        let client =
            RestClient::new("ci-proxy", "http://ci.local/", Duration::from_secs(1), HeaderMap::new())
                .expect("valid client");
        let url = client.url(&["job", "app"]).expect("valid url");
        assert_eq!(url.as_str(), "http://ci.local/job/app");
    }

    #[test]
    fn url_keeps_base_path_and_encodes_segments() {
        let client =
            RestClient::new("registry", "http://apps.local/api", Duration::from_secs(1), HeaderMap::new())
                .expect("valid client");
        let url = client
            .url(&["applications", "team/app?x#y"])
            .expect("valid url");
        assert_eq!(url.as_str(), "http://apps.local/api/applications/team%2Fapp%3Fx%23y");
    }

    #[test]
    fn non_base_url_is_a_config_error() {
        let client =
            RestClient::new("registry", "mailto:ops@example.com", Duration::from_secs(1), HeaderMap::new())
                .expect("parsable url");
        assert!(matches!(
            client.url(&["applications"]),
            Err(ProviderError::Config { service: "registry", .. })
        ));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = RestClient::new("ci-proxy", "not a url", Duration::from_secs(1), HeaderMap::new())
            .expect_err("should reject");
        assert!(matches!(err, ProviderError::Config { service: "ci-proxy", .. }));
    }

    #[test]
    fn blank_required_field_is_missing() {
        let blank = Some("  ".to_string());
        assert!(matches!(
            required("registry", "technology", &blank),
            Err(ProviderError::MissingField { field: "technology", .. })
        ));
        assert_eq!(required("registry", "technology", &Some("go".into())), Ok("go"));
    }
}
