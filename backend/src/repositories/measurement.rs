//! Measurement repository
//!
//! Besides the measurement catalogue, owns the measurement and amount columns
//! of recipe ingredient links.

use async_trait::async_trait;
use salad_recipes_shared::Measurement;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, MeasurementRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeasurementRecord {
    pub id: Uuid,
    pub name: String,
    pub grams: i32,
}

impl From<MeasurementRecord> for Measurement {
    fn from(record: MeasurementRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            grams: record.grams,
        }
    }
}

impl From<&Measurement> for MeasurementRecord {
    fn from(measurement: &Measurement) -> Self {
        Self {
            id: measurement.id,
            name: measurement.name.clone(),
            grams: measurement.grams,
        }
    }
}

/// Measurement of one recipe ingredient link
#[derive(Debug, Clone, sqlx::FromRow)]
struct LinkedMeasurementRecord {
    id: Uuid,
    name: String,
    grams: i32,
    amount: i32,
}

#[derive(Clone)]
pub struct PgMeasurementRepository {
    pool: PgPool,
}

impl PgMeasurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeasurementRepository for PgMeasurementRepository {
    async fn create(&self, measurement: &Measurement) -> RepositoryResult<Uuid> {
        let record = MeasurementRecord {
            id: Uuid::new_v4(),
            ..MeasurementRecord::from(measurement)
        };

        sqlx::query("INSERT INTO measurement (id, name, grams) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(&record.name)
            .bind(record.grams)
            .execute(&self.pool)
            .await
            .context("creating measurement")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Measurement> {
        sqlx::query_as::<_, MeasurementRecord>(
            "SELECT id, name, grams FROM measurement WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(Measurement::from)
        .context("getting measurement by id")
    }

    async fn get_by_recipe_id(
        &self,
        ingredient_id: Uuid,
        recipe_id: Uuid,
    ) -> RepositoryResult<(Measurement, i32)> {
        // A link without a measurement yields no row
        let record = sqlx::query_as::<_, LinkedMeasurementRecord>(
            r#"
            SELECT m.id, m.name, m.grams, ri.amount
            FROM recipe_ingredient ri
            JOIN measurement m ON m.id = ri.measurement_id
            WHERE ri.ingredient_id = $1 AND ri.recipe_id = $2
            "#,
        )
        .bind(ingredient_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .context("getting measurement by recipe id")?;

        Ok((
            Measurement {
                id: record.id,
                name: record.name,
                grams: record.grams,
            },
            record.amount,
        ))
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Measurement>> {
        let records = sqlx::query_as::<_, MeasurementRecord>(
            "SELECT id, name, grams FROM measurement ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("getting all measurements")?;

        Ok(records.into_iter().map(Measurement::from).collect())
    }

    async fn update_link(
        &self,
        link_id: Uuid,
        measurement_id: Uuid,
        amount: i32,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE recipe_ingredient SET measurement_id = $1, amount = $2 WHERE id = $3",
        )
        .bind(measurement_id)
        .bind(amount)
        .bind(link_id)
        .execute(&self.pool)
        .await
        .context("updating recipe ingredient link")?;

        expect_updated(result, "updating recipe ingredient link")
    }

    async fn update(&self, measurement: &Measurement) -> RepositoryResult<()> {
        let record = MeasurementRecord::from(measurement);

        let result = sqlx::query("UPDATE measurement SET name = $1, grams = $2 WHERE id = $3")
            .bind(&record.name)
            .bind(record.grams)
            .bind(record.id)
            .execute(&self.pool)
            .await
            .context("updating measurement")?;

        expect_updated(result, "updating measurement")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM measurement WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting measurement by id")?;

        expect_deleted(result, "deleting measurement by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let cup = Measurement {
            id: Uuid::new_v4(),
            name: "cup".to_string(),
            grams: 240,
        };

        let record = MeasurementRecord::from(&cup);
        assert_eq!(record.grams, 240);
        assert_eq!(Measurement::from(record), cup);
    }
}
