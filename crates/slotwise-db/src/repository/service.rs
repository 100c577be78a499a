//! # Service Repository
//!
//! Services (menus) define how long a booking occupies a staff member.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use slotwise_core::Service;

const SERVICE_COLUMNS: &str =
    "id, tenant_id, name, duration_minutes, price_cents, is_active, created_at";

/// Looks up a service that can be booked right now: same tenant, active.
pub async fn find_bookable(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Service>> {
    let sql = format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE tenant_id = ?1 AND id = ?2 AND is_active = 1"
    );

    let service = sqlx::query_as::<_, Service>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(service)
}

/// Repository for service database operations.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    /// Gets a service regardless of its active flag.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE tenant_id = ?1 AND id = ?2");

        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }

    /// Gets a service only if it can be booked.
    pub async fn get_bookable(&self, tenant_id: &str, id: &str) -> DbResult<Option<Service>> {
        let mut conn = self.pool.acquire().await?;
        find_bookable(&mut conn, tenant_id, id).await
    }

    /// Lists active services for a booking page, by name.
    pub async fn list_active(&self, tenant_id: &str) -> DbResult<Vec<Service>> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE tenant_id = ?1 AND is_active = 1 ORDER BY name, id"
        );

        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(services)
    }

    pub async fn insert(&self, service: &Service) -> DbResult<()> {
        debug!(id = %service.id, duration = service.duration_minutes, "Inserting service");

        sqlx::query(
            r#"
            INSERT INTO services (
                id, tenant_id, name, duration_minutes, price_cents, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&service.id)
        .bind(&service.tenant_id)
        .bind(&service.name)
        .bind(service.duration_minutes)
        .bind(service.price_cents)
        .bind(service.is_active)
        .bind(service.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Activates or retires a service.
    pub async fn set_active(&self, tenant_id: &str, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE services SET is_active = ?3 WHERE tenant_id = ?1 AND id = ?2")
            .bind(tenant_id)
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        Ok(())
    }
}
