//! # Staff Repository
//!
//! Active staff in creation order drive auto-assignment, so every listing
//! here sorts by `created_at, id`. The `id` tiebreak keeps the order total
//! when two staff share a timestamp.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use slotwise_core::Staff;

/// Looks up an active staff member of the tenant.
pub async fn find_active(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        r#"
        SELECT id, tenant_id, name, is_active, created_at
        FROM staff
        WHERE tenant_id = ?1 AND id = ?2 AND is_active = 1
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(staff)
}

/// Active staff of the tenant, oldest first.
pub async fn list_active(conn: &mut SqliteConnection, tenant_id: &str) -> DbResult<Vec<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        r#"
        SELECT id, tenant_id, name, is_active, created_at
        FROM staff
        WHERE tenant_id = ?1 AND is_active = 1
        ORDER BY created_at, id
        "#,
    )
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(staff)
}

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    pub async fn get_active(&self, tenant_id: &str, id: &str) -> DbResult<Option<Staff>> {
        let mut conn = self.pool.acquire().await?;
        find_active(&mut conn, tenant_id, id).await
    }

    pub async fn list_active(&self, tenant_id: &str) -> DbResult<Vec<Staff>> {
        let mut conn = self.pool.acquire().await?;
        list_active(&mut conn, tenant_id).await
    }

    pub async fn insert(&self, staff: &Staff) -> DbResult<()> {
        debug!(id = %staff.id, tenant_id = %staff.tenant_id, "Inserting staff");

        sqlx::query(
            r#"
            INSERT INTO staff (id, tenant_id, name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.tenant_id)
        .bind(&staff.name)
        .bind(staff.is_active)
        .bind(staff.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_active(&self, tenant_id: &str, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE staff SET is_active = ?3 WHERE tenant_id = ?1 AND id = ?2")
            .bind(tenant_id)
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }

        Ok(())
    }
}
