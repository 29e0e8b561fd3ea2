//! Recipe repository

use async_trait::async_trait;
use salad_recipes_shared::validation::{validate_servings, validate_time_to_cook};
use salad_recipes_shared::{page_count, Page, Recipe, RecipeFilter, RecipeStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::listing::{filtered, push_page};
use super::{expect_deleted, expect_updated, validated, RecipeRepository};
use crate::error::{DbResultExt, RepositoryResult};

/// Recipe row; `status` holds the integer code
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub salad_id: Uuid,
    pub status: i32,
    pub number_of_servings: i32,
    pub time_to_cook: i32,
    pub rating: Option<f32>,
}

impl TryFrom<RecipeRecord> for Recipe {
    type Error = sqlx::Error;

    fn try_from(record: RecipeRecord) -> Result<Self, Self::Error> {
        let status = RecipeStatus::from_code(record.status).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown recipe status {}", record.status).into())
        })?;

        Ok(Self {
            id: record.id,
            salad_id: record.salad_id,
            status,
            number_of_servings: record.number_of_servings,
            time_to_cook: record.time_to_cook,
            rating: record.rating,
        })
    }
}

impl From<&Recipe> for RecipeRecord {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            salad_id: recipe.salad_id,
            status: recipe.status.code(),
            number_of_servings: recipe.number_of_servings,
            time_to_cook: recipe.time_to_cook,
            rating: recipe.rating,
        }
    }
}

fn validate(recipe: &Recipe, context: &'static str) -> RepositoryResult<()> {
    validated(validate_servings(recipe.number_of_servings), context)?;
    validated(validate_time_to_cook(recipe.time_to_cook), context)
}

#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, recipe: &Recipe) -> RepositoryResult<Uuid> {
        validate(recipe, "creating recipe")?;
        let record = RecipeRecord {
            id: Uuid::new_v4(),
            ..RecipeRecord::from(recipe)
        };

        sqlx::query(
            r#"
            INSERT INTO recipe (id, salad_id, status, number_of_servings, time_to_cook, rating)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.salad_id)
        .bind(record.status)
        .bind(record.number_of_servings)
        .bind(record.time_to_cook)
        .bind(record.rating)
        .execute(&self.pool)
        .await
        .context("creating recipe")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Recipe> {
        sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT id, salad_id, status, number_of_servings, time_to_cook, rating
            FROM recipe
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .and_then(Recipe::try_from)
        .context("getting recipe by id")
    }

    async fn get_by_salad_id(&self, salad_id: Uuid) -> RepositoryResult<Recipe> {
        sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT id, salad_id, status, number_of_servings, time_to_cook, rating
            FROM recipe
            WHERE salad_id = $1
            "#,
        )
        .bind(salad_id)
        .fetch_one(&self.pool)
        .await
        .and_then(Recipe::try_from)
        .context("getting recipe by salad id")
    }

    async fn get_all(&self, filter: &RecipeFilter, page: u32) -> RepositoryResult<Page<Recipe>> {
        let total = filtered("SELECT COUNT(*)", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("getting all recipes (counting)")?;

        let mut query = filtered(
            "SELECT r.id, r.salad_id, r.status, r.number_of_servings, r.time_to_cook, r.rating",
            filter,
        );
        push_page(&mut query, page);
        let records = query
            .build_query_as::<RecipeRecord>()
            .fetch_all(&self.pool)
            .await
            .context("getting all recipes")?;

        let recipes = records
            .into_iter()
            .map(Recipe::try_from)
            .collect::<Result<Vec<_>, _>>()
            .context("getting all recipes")?;

        Ok(Page::new(recipes, page_count(total)))
    }

    async fn update(&self, recipe: &Recipe) -> RepositoryResult<()> {
        validate(recipe, "updating recipe")?;
        let record = RecipeRecord::from(recipe);

        let result = sqlx::query(
            r#"
            UPDATE recipe
            SET salad_id = $1, status = $2, number_of_servings = $3,
                time_to_cook = $4, rating = $5
            WHERE id = $6
            "#,
        )
        .bind(record.salad_id)
        .bind(record.status)
        .bind(record.number_of_servings)
        .bind(record.time_to_cook)
        .bind(record.rating)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .context("updating recipe")?;

        expect_updated(result, "updating recipe")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM recipe WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting recipe by id")?;

        expect_deleted(result, "deleting recipe by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: i32) -> RecipeRecord {
        RecipeRecord {
            id: Uuid::new_v4(),
            salad_id: Uuid::new_v4(),
            status,
            number_of_servings: 2,
            time_to_cook: 15,
            rating: None,
        }
    }

    #[test]
    fn test_record_status_decodes() {
        let recipe = Recipe::try_from(record(3)).unwrap();
        assert_eq!(recipe.status, RecipeStatus::Published);
        assert_eq!(recipe.rating, None);
    }

    #[test]
    fn test_status_code_survives_round_trip() {
        let recipe = Recipe {
            rating: Some(4.5),
            status: RecipeStatus::Rejected,
            ..Recipe::try_from(record(1)).unwrap()
        };

        let stored = RecipeRecord::from(&recipe);
        assert_eq!(stored.status, 4);
        assert_eq!(Recipe::try_from(stored).unwrap(), recipe);
    }

    #[test]
    fn test_unknown_status_is_decode_error() {
        let err = Recipe::try_from(record(42)).unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }

    #[test]
    fn test_validation_rejects_zero_servings() {
        let recipe = Recipe {
            number_of_servings: 0,
            ..Recipe::try_from(record(1)).unwrap()
        };
        let err = validate(&recipe, "creating recipe").unwrap_err();
        assert!(err.to_string().starts_with("creating recipe: "));
    }
}
