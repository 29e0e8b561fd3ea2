//! Ingredient type repository

use async_trait::async_trait;
use salad_recipes_shared::IngredientType;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, IngredientTypeRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientTypeRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<IngredientTypeRecord> for IngredientType {
    fn from(record: IngredientTypeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
        }
    }
}

impl From<&IngredientType> for IngredientTypeRecord {
    fn from(ingredient_type: &IngredientType) -> Self {
        Self {
            id: ingredient_type.id,
            name: ingredient_type.name.clone(),
            description: ingredient_type.description.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PgIngredientTypeRepository {
    pool: PgPool,
}

impl PgIngredientTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngredientTypeRepository for PgIngredientTypeRepository {
    async fn create(&self, ingredient_type: &IngredientType) -> RepositoryResult<Uuid> {
        let record = IngredientTypeRecord {
            id: Uuid::new_v4(),
            ..IngredientTypeRecord::from(ingredient_type)
        };

        sqlx::query("INSERT INTO ingredient_type (id, name, description) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .execute(&self.pool)
            .await
            .context("creating ingredient type")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<IngredientType> {
        sqlx::query_as::<_, IngredientTypeRecord>(
            "SELECT id, name, description FROM ingredient_type WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(IngredientType::from)
        .context("getting ingredient type by id")
    }

    async fn get_all(&self) -> RepositoryResult<Vec<IngredientType>> {
        let records = sqlx::query_as::<_, IngredientTypeRecord>(
            "SELECT id, name, description FROM ingredient_type ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("getting all ingredient types")?;

        Ok(records.into_iter().map(IngredientType::from).collect())
    }

    async fn update(&self, ingredient_type: &IngredientType) -> RepositoryResult<()> {
        let record = IngredientTypeRecord::from(ingredient_type);

        let result =
            sqlx::query("UPDATE ingredient_type SET name = $1, description = $2 WHERE id = $3")
                .bind(&record.name)
                .bind(&record.description)
                .bind(record.id)
                .execute(&self.pool)
                .await
                .context("updating ingredient type")?;

        expect_updated(result, "updating ingredient type")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM ingredient_type WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting ingredient type by id")?;

        expect_deleted(result, "deleting ingredient type by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let greens = IngredientType {
            id: Uuid::new_v4(),
            name: "greens".to_string(),
            description: String::new(),
        };

        let record = IngredientTypeRecord::from(&greens);
        assert_eq!(record.name, "greens");
        assert_eq!(IngredientType::from(record), greens);
    }
}
