//! Record store abstraction.
//!
//! The orchestrator only sees [`RecordStore`]; [`PgRecordStore`] backs it
//! with the `db` crate's Postgres repository functions.

use async_trait::async_trait;
use db::{
    models::{ConfigurationRow, NewConfiguration, RequiredStatusCheckRow},
    repository::{configurations, status_checks},
    DbError, DbPool,
};
use provisioning::{Configuration, WorkflowType};

/// Durable storage for configurations and their status checks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when no configuration has this id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, DbError>;

    /// Persist a new configuration. A duplicate id is `DbError::Conflict`.
    async fn insert(&self, cfg: &Configuration) -> Result<Configuration, DbError>;

    /// Overwrite the stored columns and replace the status checks with
    /// `cfg.required_status_checks`, atomically.
    async fn update(&self, cfg: &Configuration) -> Result<Configuration, DbError>;

    /// Remove the configuration and its status checks.
    async fn delete(&self, cfg: &Configuration) -> Result<(), DbError>;
}

// ---------------------------------------------------------------------------
// PgRecordStore
// ---------------------------------------------------------------------------

pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: ConfigurationRow) -> Result<Configuration, DbError> {
        let checks = status_checks::list_status_checks(&self.pool, &row.id).await?;
        into_configuration(row, checks)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, DbError> {
        match configurations::get_configuration(&self.pool, id).await? {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
        let row = configurations::insert_configuration(
            &self.pool,
            &to_new_configuration(cfg),
            &cfg.required_status_checks,
        )
        .await?;
        self.load(row).await
    }

    async fn update(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
        let row = configurations::update_configuration(
            &self.pool,
            &to_new_configuration(cfg),
            &cfg.required_status_checks,
        )
        .await?;
        self.load(row).await
    }

    async fn delete(&self, cfg: &Configuration) -> Result<(), DbError> {
        configurations::delete_configuration(&self.pool, &cfg.id).await
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn to_new_configuration(cfg: &Configuration) -> NewConfiguration {
    NewConfiguration {
        id: cfg.id.clone(),
        application_name: cfg.application_name.clone(),
        technology: cfg.technology.clone(),
        repository_url: cfg.repository_url.clone(),
        workflow_type: cfg.workflow_type.to_string(),
        continuous_integration_provider: cfg.continuous_integration_provider.clone(),
        continuous_integration_url: cfg.continuous_integration_url.clone(),
        build_server_provider: cfg.build_server_provider.clone(),
        build_server_url: cfg.build_server_url.clone(),
        code_coverage_pull_request_threshold: cfg.code_coverage_pull_request_threshold,
    }
}

fn into_configuration(
    row: ConfigurationRow,
    checks: Vec<RequiredStatusCheckRow>,
) -> Result<Configuration, DbError> {
    let workflow_type = row
        .workflow_type
        .parse::<WorkflowType>()
        .map_err(DbError::InvalidData)?;

    Ok(Configuration {
        id: row.id,
        application_name: row.application_name,
        technology: row.technology,
        repository_url: row.repository_url,
        workflow_type,
        required_status_checks: checks.into_iter().map(|c| c.check_name).collect(),
        continuous_integration_provider: row.continuous_integration_provider,
        continuous_integration_url: row.continuous_integration_url,
        build_server_provider: row.build_server_provider,
        build_server_url: row.build_server_url,
        code_coverage_pull_request_threshold: row.code_coverage_pull_request_threshold,
        created_at: Some(row.created_at),
        updated_at: Some(row.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(workflow_type: &str) -> ConfigurationRow {
        let now = Utc::now();
        ConfigurationRow {
            id: "repo-a".into(),
            application_name: Some("repo-a".into()),
            technology: Some("java".into()),
            repository_url: Some("https://github.com/acme/repo-a".into()),
            workflow_type: workflow_type.into(),
            continuous_integration_provider: Some("jenkins".into()),
            continuous_integration_url: Some("https://ci.example.com/job/repo-a/".into()),
            build_server_provider: Some("jenkins".into()),
            build_server_url: Some("https://ci.example.com/job/repo-a/".into()),
            code_coverage_pull_request_threshold: Some(80.0),
            created_at: now,
            updated_at: now,
        }
    }

    fn check(name: &str, position: i32) -> RequiredStatusCheckRow {
        RequiredStatusCheckRow {
            id: position as i64 + 1,
            configuration_id: "repo-a".into(),
            check_name: name.into(),
            position,
        }
    }

    #[test]
    fn row_maps_onto_configuration() {
        let cfg = into_configuration(row("gitflow"), vec![check("ci", 0), check("coverage", 1)])
            .expect("valid row");

        assert_eq!(cfg.workflow_type, WorkflowType::Gitflow);
        assert_eq!(cfg.required_status_checks, vec!["ci", "coverage"]);
        assert!(cfg.has_ci_job());
        assert!(cfg.created_at.is_some());

        let back = to_new_configuration(&cfg);
        assert_eq!(back.workflow_type, "gitflow");
        assert_eq!(back.code_coverage_pull_request_threshold, Some(80.0));
    }

    #[test]
    fn unknown_stored_workflow_type_is_invalid_data() {
        let err = into_configuration(row("trunk"), Vec::new()).expect_err("bad workflow type");
        assert!(matches!(err, DbError::InvalidData(_)));
    }
}
