//! Configuration CRUD operations.

use sqlx::PgPool;

use crate::{
    models::{ConfigurationRow, NewConfiguration},
    repository::status_checks,
    DbError,
};

const COLUMNS: &str = "id, application_name, technology, repository_url, workflow_type, \
     continuous_integration_provider, continuous_integration_url, \
     build_server_provider, build_server_url, code_coverage_pull_request_threshold, \
     created_at, updated_at";

/// Fetch a configuration by its repository key.
///
/// Absence is `Ok(None)`; only real failures are errors.
pub async fn get_configuration(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ConfigurationRow>, DbError> {
    let row = sqlx::query_as::<_, ConfigurationRow>(&format!(
        "SELECT {COLUMNS} FROM configurations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a configuration and its status checks in one transaction.
///
/// Returns `DbError::Conflict` if a configuration with the same id exists.
pub async fn insert_configuration(
    pool: &PgPool,
    new: &NewConfiguration,
    checks: &[String],
) -> Result<ConfigurationRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ConfigurationRow>(&format!(
        r#"
        INSERT INTO configurations
            (id, application_name, technology, repository_url, workflow_type,
             continuous_integration_provider, continuous_integration_url,
             build_server_provider, build_server_url, code_coverage_pull_request_threshold)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.id)
    .bind(&new.application_name)
    .bind(&new.technology)
    .bind(&new.repository_url)
    .bind(&new.workflow_type)
    .bind(&new.continuous_integration_provider)
    .bind(&new.continuous_integration_url)
    .bind(&new.build_server_provider)
    .bind(&new.build_server_url)
    .bind(new.code_coverage_pull_request_threshold)
    .fetch_one(&mut *tx)
    .await
    .map_err(DbError::from_write)?;

    status_checks::insert_status_checks(&mut tx, &new.id, checks).await?;
    tx.commit().await?;

    Ok(row)
}

/// Update every mutable column of a configuration and replace its status
/// checks with `checks`, all in one transaction.
///
/// Returns `DbError::NotFound` if no row was updated; nothing is changed
/// then.
pub async fn update_configuration(
    pool: &PgPool,
    new: &NewConfiguration,
    checks: &[String],
) -> Result<ConfigurationRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ConfigurationRow>(&format!(
        r#"
        UPDATE configurations
        SET application_name = $2,
            technology = $3,
            repository_url = $4,
            workflow_type = $5,
            continuous_integration_provider = $6,
            continuous_integration_url = $7,
            build_server_provider = $8,
            build_server_url = $9,
            code_coverage_pull_request_threshold = $10,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.id)
    .bind(&new.application_name)
    .bind(&new.technology)
    .bind(&new.repository_url)
    .bind(&new.workflow_type)
    .bind(&new.continuous_integration_provider)
    .bind(&new.continuous_integration_url)
    .bind(&new.build_server_provider)
    .bind(&new.build_server_url)
    .bind(new.code_coverage_pull_request_threshold)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    status_checks::delete_status_checks(&mut tx, &new.id).await?;
    status_checks::insert_status_checks(&mut tx, &new.id, checks).await?;
    tx.commit().await?;

    Ok(row)
}

/// Permanently delete a configuration; its status checks cascade.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_configuration(pool: &PgPool, id: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM configurations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
