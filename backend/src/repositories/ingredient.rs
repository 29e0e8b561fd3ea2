//! Ingredient repository
//!
//! Recipes reference ingredients through `recipe_ingredient` link rows; a
//! link is removed by its (recipe, ingredient) pair.

use async_trait::async_trait;
use salad_recipes_shared::{page_count, page_offset, Ingredient, IngredientLink, Page, PAGE_SIZE};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, IngredientRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: Uuid,
    pub type_id: Uuid,
    pub name: String,
    pub calories: i32,
}

impl From<IngredientRecord> for Ingredient {
    fn from(record: IngredientRecord) -> Self {
        Self {
            id: record.id,
            type_id: record.type_id,
            name: record.name,
            calories: record.calories,
        }
    }
}

impl From<&Ingredient> for IngredientRecord {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            type_id: ingredient.type_id,
            name: ingredient.name.clone(),
            calories: ingredient.calories,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientLinkRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub measurement_id: Option<Uuid>,
    pub amount: i32,
}

impl From<IngredientLinkRecord> for IngredientLink {
    fn from(record: IngredientLinkRecord) -> Self {
        Self {
            id: record.id,
            recipe_id: record.recipe_id,
            ingredient_id: record.ingredient_id,
            measurement_id: record.measurement_id,
            amount: record.amount,
        }
    }
}

#[derive(Clone)]
pub struct PgIngredientRepository {
    pool: PgPool,
}

impl PgIngredientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngredientRepository for PgIngredientRepository {
    async fn create(&self, ingredient: &Ingredient) -> RepositoryResult<Uuid> {
        let record = IngredientRecord {
            id: Uuid::new_v4(),
            ..IngredientRecord::from(ingredient)
        };

        sqlx::query(
            "INSERT INTO ingredient (id, type_id, name, calories) VALUES ($1, $2, $3, $4)",
        )
        .bind(record.id)
        .bind(record.type_id)
        .bind(&record.name)
        .bind(record.calories)
        .execute(&self.pool)
        .await
        .context("creating ingredient")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Ingredient> {
        sqlx::query_as::<_, IngredientRecord>(
            "SELECT id, type_id, name, calories FROM ingredient WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(Ingredient::from)
        .context("getting ingredient by id")
    }

    async fn get_all(&self, page: u32) -> RepositoryResult<Page<Ingredient>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredient")
            .fetch_one(&self.pool)
            .await
            .context("getting all ingredients (counting)")?;

        let records = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, type_id, name, calories
            FROM ingredient
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await
        .context("getting all ingredients")?;

        Ok(Page::new(
            records.into_iter().map(Ingredient::from).collect(),
            page_count(total),
        ))
    }

    async fn get_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<Vec<Ingredient>> {
        let records = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT i.id, i.type_id, i.name, i.calories
            FROM ingredient i
            JOIN recipe_ingredient ri ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("getting all ingredients by recipe id")?;

        Ok(records.into_iter().map(Ingredient::from).collect())
    }

    async fn get_links_by_recipe_id(
        &self,
        recipe_id: Uuid,
    ) -> RepositoryResult<Vec<IngredientLink>> {
        let records = sqlx::query_as::<_, IngredientLinkRecord>(
            r#"
            SELECT id, recipe_id, ingredient_id, measurement_id, amount
            FROM recipe_ingredient
            WHERE recipe_id = $1
            ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("getting ingredient links by recipe id")?;

        Ok(records.into_iter().map(IngredientLink::from).collect())
    }

    async fn link(&self, recipe_id: Uuid, ingredient_id: Uuid) -> RepositoryResult<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO recipe_ingredient (id, recipe_id, ingredient_id) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(&self.pool)
        .await
        .context("linking ingredient to recipe")?;

        debug!(recipe_id = %recipe_id, ingredient_id = %ingredient_id, link_id = %id, "Linked ingredient");
        Ok(id)
    }

    async fn unlink(&self, recipe_id: Uuid, ingredient_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(
            "DELETE FROM recipe_ingredient WHERE recipe_id = $1 AND ingredient_id = $2",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(&self.pool)
        .await
        .context("unlinking ingredient from recipe")?;

        expect_deleted(result, "unlinking ingredient from recipe")
    }

    async fn update(&self, ingredient: &Ingredient) -> RepositoryResult<()> {
        let record = IngredientRecord::from(ingredient);

        let result = sqlx::query(
            "UPDATE ingredient SET type_id = $1, name = $2, calories = $3 WHERE id = $4",
        )
        .bind(record.type_id)
        .bind(&record.name)
        .bind(record.calories)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .context("updating ingredient")?;

        expect_updated(result, "updating ingredient")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM ingredient WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting ingredient by id")?;

        expect_deleted(result, "deleting ingredient by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let feta = Ingredient {
            id: Uuid::new_v4(),
            type_id: Uuid::new_v4(),
            name: "feta".to_string(),
            calories: 264,
        };

        let record = IngredientRecord::from(&feta);
        assert_eq!(record.type_id, feta.type_id);
        assert_eq!(Ingredient::from(record), feta);
    }

    #[test]
    fn test_link_record_keeps_missing_measurement() {
        let record = IngredientLinkRecord {
            id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            measurement_id: None,
            amount: 0,
        };

        let link = IngredientLink::from(record.clone());
        assert_eq!(link.measurement_id, None);
        assert_eq!(link.ingredient_id, record.ingredient_id);
    }
}
