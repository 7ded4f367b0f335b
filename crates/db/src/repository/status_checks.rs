//! `required_status_checks` child rows.

use sqlx::{PgConnection, PgPool};

use crate::{models::RequiredStatusCheckRow, DbError};

/// All status checks of a configuration, in submission order.
pub async fn list_status_checks(
    pool: &PgPool,
    configuration_id: &str,
) -> Result<Vec<RequiredStatusCheckRow>, DbError> {
    let rows = sqlx::query_as::<_, RequiredStatusCheckRow>(
        r#"
        SELECT id, configuration_id, check_name, position
        FROM required_status_checks
        WHERE configuration_id = $1
        ORDER BY position ASC, id ASC
        "#,
    )
    .bind(configuration_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert `checks` for a configuration, numbering them in order.
pub async fn insert_status_checks(
    conn: &mut PgConnection,
    configuration_id: &str,
    checks: &[String],
) -> Result<(), DbError> {
    for (position, check) in checks.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO required_status_checks (configuration_id, check_name, position)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(configuration_id)
        .bind(check)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Remove every status check of a configuration.
pub async fn delete_status_checks(
    conn: &mut PgConnection,
    configuration_id: &str,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM required_status_checks WHERE configuration_id = $1")
        .bind(configuration_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
