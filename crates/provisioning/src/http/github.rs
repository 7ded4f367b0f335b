//! GitHub branch protection for the configured workflow.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use url::Url;

use super::{required, ClientConfig, RestClient};
use crate::workflow::{BranchPolicy, WorkflowPolicy};
use crate::{BranchWorkflow, Configuration, ProviderError};

const SERVICE: &str = "github";

/// Applies and removes workflow branch protection through the GitHub API.
pub struct GithubWorkflow {
    client: RestClient,
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

impl GithubWorkflow {
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("release-process"));
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &config.github_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ProviderError::Config {
                    service: SERVICE,
                    message: format!("invalid token: {e}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            client: RestClient::new(SERVICE, &config.github_api_url, config.timeout, headers)?,
        })
    }

    async fn protect_branch(
        &self,
        repo: &RepoSlug,
        branch: &BranchPolicy,
    ) -> Result<(), ProviderError> {
        let req = self
            .client
            .request(Method::PUT, &repo.path(&["branches", branch.name, "protection"]))?
            .json(&protection_body(branch));
        self.client.send(req).await?;
        Ok(())
    }

    /// Create `branch` pointing at the head of `from`.
    async fn create_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        from: &str,
    ) -> Result<(), ProviderError> {
        let req = self.client.request(Method::GET, &repo.path(&["branches", from]))?;
        let resp = self.client.send(req).await?;
        let head: BranchResponse = self.client.json(resp).await?;

        let req = self
            .client
            .request(Method::POST, &repo.path(&["git", "refs"]))?
            .json(&json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": head.commit.sha,
        }));
        self.client.send(req).await?;
        info!(repo = %repo, branch, from, "created missing branch");
        Ok(())
    }

    async fn set_default_branch(&self, repo: &RepoSlug, branch: &str) -> Result<(), ProviderError> {
        let req = self
            .client
            .request(Method::PATCH, &repo.path(&[]))?
            .json(&json!({ "default_branch": branch }));
        self.client.send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl BranchWorkflow for GithubWorkflow {
    async fn set_workflow(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let repo = RepoSlug::from_configuration(cfg)?;
        let policy = WorkflowPolicy::for_configuration(cfg);

        for branch in policy.stable_branches() {
            match self.protect_branch(&repo, branch).await {
                Ok(()) => {}
                // GitHub answers 404 when the branch does not exist yet.
                Err(e) if e.is_not_found() => {
                    let from = policy
                        .releasable_branch()
                        .filter(|r| r.name != branch.name)
                        .ok_or(e)?;
                    self.create_branch(&repo, branch.name, from.name).await?;
                    self.protect_branch(&repo, branch).await?;
                }
                Err(e) => return Err(e),
            }
            info!(
                repo = %repo,
                branch = branch.name,
                accept_pr_from = ?branch.accept_pr_from,
                "branch protected"
            );
        }

        self.set_default_branch(&repo, policy.default_branch).await
    }

    async fn unset_workflow(&self, cfg: &Configuration) -> Result<(), ProviderError> {
        let repo = RepoSlug::from_configuration(cfg)?;
        let policy = WorkflowPolicy::for_configuration(cfg);

        for branch in policy.stable_branches() {
            let path = repo.path(&["branches", branch.name, "protection"]);
            self.client
                .send_removal(self.client.request(Method::DELETE, &path)?)
                .await?;
        }

        match policy.releasable_branch() {
            Some(releasable) => self.set_default_branch(&repo, releasable.name).await,
            None => Ok(()),
        }
    }
}

fn protection_body(branch: &BranchPolicy) -> Value {
    json!({
        "required_status_checks": {
            "strict": branch.strict_status_checks,
            "contexts": branch.required_status_checks,
        },
        "enforce_admins": branch.enforce_admins,
        "required_pull_request_reviews": {
            "dismiss_stale_reviews": false,
        },
        "restrictions": null,
    })
}

// ---------------------------------------------------------------------------
// RepoSlug
// ---------------------------------------------------------------------------

/// `owner/name` pair parsed from the repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn from_configuration(cfg: &Configuration) -> Result<Self, ProviderError> {
        let raw = required(SERVICE, "repository_url", &cfg.repository_url)?;
        Self::parse(raw).ok_or_else(|| ProviderError::Decode {
            service: SERVICE,
            message: format!("cannot derive owner/name from '{raw}'"),
        })
    }

    fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?.to_string();
        let name = segments.next()?.trim_end_matches(".git").to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self { owner, name })
    }
}

impl RepoSlug {
    /// `repos/{owner}/{name}` followed by `rest`.
    fn path<'a>(&'a self, rest: &[&'a str]) -> Vec<&'a str> {
        let mut segments = vec!["repos", self.owner.as_str(), self.name.as_str()];
        segments.extend_from_slice(rest);
        segments
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
