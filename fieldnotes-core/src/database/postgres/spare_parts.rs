use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fieldnotes_model::{
    NewSparePart, Page, SparePart, SparePartId, SparePartPatch,
};
use sqlx::{FromRow, PgPool};

use crate::database::ports::spare_parts::SparePartsRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresSparePartsRepository {
    pool: PgPool,
}

impl PostgresSparePartsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SparePartRow {
    id: i32,
    part_code: String,
    category: String,
    brand: String,
    model: String,
    arrived_date: NaiveDate,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SparePartRow> for SparePart {
    fn from(row: SparePartRow) -> Self {
        SparePart {
            id: SparePartId::new(row.id),
            part_code: row.part_code,
            category: row.category,
            brand: row.brand,
            model: row.model,
            arrived_date: row.arrived_date,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PART_COLUMNS: &str = "id, part_code, category, brand, model, \
    arrived_date, quantity, created_at, updated_at";

/// `%term%` with LIKE metacharacters in `term` matched literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl SparePartsRepository for PostgresSparePartsRepository {
    async fn create(&self, part: NewSparePart) -> Result<SparePart> {
        let sql = format!(
            r#"
            INSERT INTO spare_parts
                (part_code, category, brand, model, arrived_date, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PART_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SparePartRow>(&sql)
            .bind(part.part_code)
            .bind(part.category)
            .bind(part.brand)
            .bind(part.model)
            .bind(part.arrived_date)
            .bind(part.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CoreError::from_query("Failed to create spare part", e)
            })?;

        Ok(row.into())
    }

    async fn get(&self, id: SparePartId) -> Result<Option<SparePart>> {
        let sql =
            format!("SELECT {PART_COLUMNS} FROM spare_parts WHERE id = $1");
        let row = sqlx::query_as::<_, SparePartRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to fetch spare part", e))?;

        Ok(row.map(SparePart::from))
    }

    async fn update(
        &self,
        id: SparePartId,
        patch: SparePartPatch,
    ) -> Result<Option<SparePart>> {
        let sql = format!(
            r#"
            UPDATE spare_parts SET
                part_code = COALESCE($2, part_code),
                category = COALESCE($3, category),
                brand = COALESCE($4, brand),
                model = COALESCE($5, model),
                arrived_date = COALESCE($6, arrived_date),
                quantity = COALESCE($7, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PART_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SparePartRow>(&sql)
            .bind(id.get())
            .bind(patch.part_code)
            .bind(patch.category)
            .bind(patch.brand)
            .bind(patch.model)
            .bind(patch.arrived_date)
            .bind(patch.quantity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                CoreError::from_query("Failed to update spare part", e)
            })?;

        Ok(row.map(SparePart::from))
    }

    async fn delete(&self, id: SparePartId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spare_parts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                CoreError::from_query("Failed to delete spare part", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        term: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SparePart>> {
        let rows = match term {
            Some(term) => {
                let sql = format!(
                    r#"
                    SELECT {PART_COLUMNS} FROM spare_parts
                    WHERE part_code ILIKE $1 OR model ILIKE $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#
                );
                sqlx::query_as::<_, SparePartRow>(&sql)
                    .bind(contains_pattern(term))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {PART_COLUMNS} FROM spare_parts
                    ORDER BY created_at DESC, id DESC
                    LIMIT $1
                    "#
                );
                sqlx::query_as::<_, SparePartRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| CoreError::from_query("Failed to search spare parts", e))?;

        Ok(rows.into_iter().map(SparePart::from).collect())
    }

    async fn list(&self, page: Page) -> Result<Vec<SparePart>> {
        let sql = format!(
            r#"
            SELECT {PART_COLUMNS} FROM spare_parts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, SparePartRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::from_query("Failed to list spare parts", e))?;

        Ok(rows.into_iter().map(SparePart::from).collect())
    }

    async fn low_stock(&self, threshold: i32) -> Result<Vec<SparePart>> {
        let sql = format!(
            r#"
            SELECT {PART_COLUMNS} FROM spare_parts
            WHERE quantity <= $1
            ORDER BY quantity ASC, id ASC
            "#
        );
        let rows = sqlx::query_as::<_, SparePartRow>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                CoreError::from_query("Failed to fetch low stock parts", e)
            })?;

        Ok(rows.into_iter().map(SparePart::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("bolt"), "%bolt%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
