//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! The domain `Configuration` lives in the `provisioning` crate and is
//! assembled from these rows by the engine's record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// configurations
// ---------------------------------------------------------------------------

/// A persisted configuration row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConfigurationRow {
    pub id: String,
    pub application_name: Option<String>,
    pub technology: Option<String>,
    pub repository_url: Option<String>,
    pub workflow_type: String,
    pub continuous_integration_provider: Option<String>,
    pub continuous_integration_url: Option<String>,
    pub build_server_provider: Option<String>,
    pub build_server_url: Option<String>,
    pub code_coverage_pull_request_threshold: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on insert and update.
///
/// Timestamps are left to the database.
#[derive(Debug, Clone, Default)]
pub struct NewConfiguration {
    pub id: String,
    pub application_name: Option<String>,
    pub technology: Option<String>,
    pub repository_url: Option<String>,
    pub workflow_type: String,
    pub continuous_integration_provider: Option<String>,
    pub continuous_integration_url: Option<String>,
    pub build_server_provider: Option<String>,
    pub build_server_url: Option<String>,
    pub code_coverage_pull_request_threshold: Option<f64>,
}

// ---------------------------------------------------------------------------
// required_status_checks
// ---------------------------------------------------------------------------

/// One required status check belonging to a configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequiredStatusCheckRow {
    pub id: i64,
    pub configuration_id: String,
    pub check_name: String,
    /// Keeps the checks in the order they were submitted.
    pub position: i32,
}
