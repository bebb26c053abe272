use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldnotes_model::{
    MachineId, ServiceId, ServicePatch, ServiceRecord, SparePartId, UserId,
};
use sqlx::{FromRow, PgPool};

use crate::database::ports::services::{NewService, ServicesRepository};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresServicesRepository {
    pool: PgPool,
}

impl PostgresServicesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: i32,
    machine_id: i32,
    spare_part_id: Option<i32>,
    performed_by: i32,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ServiceRow> for ServiceRecord {
    fn from(row: ServiceRow) -> Self {
        ServiceRecord {
            id: ServiceId::new(row.id),
            machine_id: MachineId::new(row.machine_id),
            spare_part_id: row.spare_part_id.map(SparePartId::new),
            performed_by: UserId::new(row.performed_by),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SERVICE_COLUMNS: &str = "id, machine_id, spare_part_id, performed_by, \
    notes, created_at, updated_at";

#[async_trait]
impl ServicesRepository for PostgresServicesRepository {
    async fn create(&self, service: NewService) -> Result<ServiceRecord> {
        let sql = format!(
            r#"
            INSERT INTO services (machine_id, spare_part_id, performed_by, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(service.machine_id.get())
            .bind(service.spare_part_id.map(SparePartId::get))
            .bind(service.performed_by.get())
            .bind(service.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to create service", e))?;

        Ok(row.into())
    }

    async fn get(&self, id: ServiceId) -> Result<Option<ServiceRecord>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to fetch service", e))?;

        Ok(row.map(ServiceRecord::from))
    }

    async fn list(&self) -> Result<Vec<ServiceRecord>> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ServiceRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to list services", e))?;

        Ok(rows.into_iter().map(ServiceRecord::from).collect())
    }

    async fn update(
        &self,
        id: ServiceId,
        patch: ServicePatch,
    ) -> Result<Option<ServiceRecord>> {
        let sql = format!(
            r#"
            UPDATE services SET
                machine_id = COALESCE($2, machine_id),
                spare_part_id = COALESCE($3, spare_part_id),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id.get())
            .bind(patch.machine_id.map(MachineId::get))
            .bind(patch.spare_part_id.map(SparePartId::get))
            .bind(patch.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to update service", e))?;

        Ok(row.map(ServiceRecord::from))
    }

    async fn delete(&self, id: ServiceId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to delete service", e))?;

        Ok(result.rows_affected() > 0)
    }
}
