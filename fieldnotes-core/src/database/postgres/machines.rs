use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fieldnotes_model::{MachineCode, MachineId, MachineRecord, NewMachine};
use sqlx::{FromRow, PgPool};

use crate::database::ports::machines::MachinesRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresMachinesRepository {
    pool: PgPool,
}

impl PostgresMachinesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MachineRow {
    id: i32,
    machine_code: String,
    category: String,
    brand: String,
    model: String,
    arrived_date: NaiveDate,
    location: String,
    sub_location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<MachineRow> for MachineRecord {
    fn from(row: MachineRow) -> Self {
        MachineRecord {
            id: MachineId::new(row.id),
            machine_code: row.machine_code,
            category: row.category,
            brand: row.brand,
            model: row.model,
            arrived_date: row.arrived_date,
            location: row.location,
            sub_location: row.sub_location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MACHINE_COLUMNS: &str = "id, machine_code, category, brand, model, \
    arrived_date, location, sub_location, created_at, updated_at";

#[async_trait]
impl MachinesRepository for PostgresMachinesRepository {
    async fn find_by_code(
        &self,
        code: &MachineCode,
    ) -> Result<Option<MachineRecord>> {
        let sql = format!(
            "SELECT {MACHINE_COLUMNS} FROM machines WHERE machine_code = $1 LIMIT 1"
        );
        let row = sqlx::query_as::<_, MachineRow>(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to look up machine", e))?;

        Ok(row.map(MachineRecord::from))
    }

    async fn get(&self, id: MachineId) -> Result<Option<MachineRecord>> {
        let sql = format!("SELECT {MACHINE_COLUMNS} FROM machines WHERE id = $1");
        let row = sqlx::query_as::<_, MachineRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to fetch machine", e))?;

        Ok(row.map(MachineRecord::from))
    }

    async fn create(&self, machine: NewMachine) -> Result<MachineRecord> {
        let sql = format!(
            r#"
            INSERT INTO machines
                (machine_code, category, brand, model, arrived_date, location, sub_location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MACHINE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MachineRow>(&sql)
            .bind(machine.machine_code.as_str())
            .bind(machine.category)
            .bind(machine.brand)
            .bind(machine.model)
            .bind(machine.arrived_date)
            .bind(machine.location)
            .bind(machine.sub_location)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to create machine", e))?;

        Ok(row.into())
    }
}
