//! Database repositories
//!
//! One repository per entity. Each PostgreSQL implementation owns a clone of
//! the pool it was constructed with; callers depend on the traits below.

pub mod auth;
pub mod comment;
pub mod ingredient;
pub mod ingredient_type;
pub mod keyword;
pub mod listing;
pub mod measurement;
pub mod recipe;
pub mod recipe_step;
pub mod salad;
pub mod salad_type;
pub mod step_order;
pub mod user;

use std::collections::HashMap;

use async_trait::async_trait;
use salad_recipes_shared::{
    Comment, Ingredient, IngredientLink, IngredientType, KeyWord, Measurement, Page, Recipe,
    RecipeFilter, RecipeStep, Salad, SaladType, User, UserAuth,
};
use sqlx::postgres::PgQueryResult;
use sqlx::{Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use crate::error::{DbResultExt, RepositoryError, RepositoryResult};

pub use auth::PgAuthRepository;
pub use comment::PgCommentRepository;
pub use ingredient::PgIngredientRepository;
pub use ingredient_type::PgIngredientTypeRepository;
pub use keyword::PgKeywordRepository;
pub use measurement::PgMeasurementRepository;
pub use recipe::PgRecipeRepository;
pub use recipe_step::PgRecipeStepRepository;
pub use salad::PgSaladRepository;
pub use salad_type::PgSaladTypeRepository;
pub use user::PgUserRepository;

// ================================
// Repository Trait Definitions
// ================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user under a generated id
    async fn create(&self, user: &User) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<User>;
    async fn get_by_username(&self, username: &str) -> RepositoryResult<User>;
    async fn get_all(&self, page: u32) -> RepositoryResult<Page<User>>;
    async fn update(&self, user: &User) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Register an account; an empty role becomes the default role
    async fn register(&self, user: &User) -> RepositoryResult<Uuid>;
    async fn get_by_username(&self, username: &str) -> RepositoryResult<UserAuth>;
}

#[async_trait]
pub trait SaladRepository: Send + Sync {
    async fn create(&self, salad: &Salad) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Salad>;
    /// Salads whose recipe passes the filter, best rated first
    async fn get_all(&self, filter: &RecipeFilter, page: u32) -> RepositoryResult<Page<Salad>>;
    async fn get_all_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<Salad>>;
    /// Salads the user has commented on
    async fn get_all_rated_by_user(&self, user_id: Uuid, page: u32)
        -> RepositoryResult<Page<Salad>>;
    async fn update(&self, salad: &Salad) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, recipe: &Recipe) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Recipe>;
    async fn get_by_salad_id(&self, salad_id: Uuid) -> RepositoryResult<Recipe>;
    async fn get_all(&self, filter: &RecipeFilter, page: u32) -> RepositoryResult<Page<Recipe>>;
    async fn update(&self, recipe: &Recipe) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

/// Ordered steps of a recipe
///
/// Implementations keep the step numbers of every recipe dense (`1..=N`).
#[async_trait]
pub trait RecipeStepRepository: Send + Sync {
    /// Append a step after the last one of its recipe
    async fn create(&self, step: &RecipeStep) -> RepositoryResult<RecipeStep>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<RecipeStep>;
    /// Steps ordered by number; empty when the recipe has none
    async fn get_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<Vec<RecipeStep>>;
    /// Rewrite a step and move it to `step.step_num`
    async fn update(&self, step: &RecipeStep) -> RepositoryResult<()>;
    /// Remove a step and close the gap it leaves
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
    async fn delete_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait IngredientRepository: Send + Sync {
    async fn create(&self, ingredient: &Ingredient) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Ingredient>;
    async fn get_all(&self, page: u32) -> RepositoryResult<Page<Ingredient>>;
    async fn get_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<Vec<Ingredient>>;
    /// Link rows of a recipe, with their measurement and amount
    async fn get_links_by_recipe_id(&self, recipe_id: Uuid)
        -> RepositoryResult<Vec<IngredientLink>>;
    /// Attach an ingredient to a recipe, returning the link id
    async fn link(&self, recipe_id: Uuid, ingredient_id: Uuid) -> RepositoryResult<Uuid>;
    async fn unlink(&self, recipe_id: Uuid, ingredient_id: Uuid) -> RepositoryResult<()>;
    async fn update(&self, ingredient: &Ingredient) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait IngredientTypeRepository: Send + Sync {
    async fn create(&self, ingredient_type: &IngredientType) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<IngredientType>;
    async fn get_all(&self) -> RepositoryResult<Vec<IngredientType>>;
    async fn update(&self, ingredient_type: &IngredientType) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    async fn create(&self, measurement: &Measurement) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Measurement>;
    /// Measurement and amount of an ingredient within a recipe
    async fn get_by_recipe_id(
        &self,
        ingredient_id: Uuid,
        recipe_id: Uuid,
    ) -> RepositoryResult<(Measurement, i32)>;
    async fn get_all(&self) -> RepositoryResult<Vec<Measurement>>;
    /// Set the measurement and amount of a recipe ingredient link
    async fn update_link(
        &self,
        link_id: Uuid,
        measurement_id: Uuid,
        amount: i32,
    ) -> RepositoryResult<()>;
    async fn update(&self, measurement: &Measurement) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait SaladTypeRepository: Send + Sync {
    async fn create(&self, salad_type: &SaladType) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<SaladType>;
    async fn get_all(&self, page: u32) -> RepositoryResult<Page<SaladType>>;
    async fn get_all_by_salad_id(&self, salad_id: Uuid) -> RepositoryResult<Vec<SaladType>>;
    /// Tag a salad with a type, returning the link id
    async fn link(&self, salad_id: Uuid, type_id: Uuid) -> RepositoryResult<Uuid>;
    async fn unlink(&self, salad_id: Uuid, type_id: Uuid) -> RepositoryResult<()>;
    async fn update(&self, salad_type: &SaladType) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait KeywordRepository: Send + Sync {
    async fn create(&self, word: &KeyWord) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<KeyWord>;
    /// Every keyword as a word -> id map
    async fn get_all(&self) -> RepositoryResult<HashMap<String, Uuid>>;
    async fn update(&self, word: &KeyWord) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> RepositoryResult<Uuid>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Comment>;
    async fn get_by_salad_and_user(
        &self,
        salad_id: Uuid,
        user_id: Uuid,
    ) -> RepositoryResult<Comment>;
    async fn get_all_by_salad_id(
        &self,
        salad_id: Uuid,
        page: u32,
    ) -> RepositoryResult<Page<Comment>>;
    async fn update(&self, comment: &Comment) -> RepositoryResult<()>;
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;
}

// ================================
// Shared helpers
// ================================

/// Full-row updates report a missing row as a store error
pub(crate) fn expect_updated(
    result: PgQueryResult,
    context: &'static str,
) -> RepositoryResult<()> {
    if result.rows_affected() == 0 {
        return Err(RepositoryError::database(context, sqlx::Error::RowNotFound));
    }
    Ok(())
}

/// Deleting an absent row is a not-found error
pub(crate) fn expect_deleted(
    result: PgQueryResult,
    context: &'static str,
) -> RepositoryResult<()> {
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound { context });
    }
    Ok(())
}

/// Map a validation failure onto the repository error of an operation
pub(crate) fn validated(result: Result<(), String>, context: &'static str) -> RepositoryResult<()> {
    result.map_err(|message| RepositoryError::validation(context, message))
}

/// Commit `tx` when `result` is Ok, roll it back otherwise
///
/// A failed rollback is merged into the returned error.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: RepositoryResult<T>,
    commit_context: &'static str,
) -> RepositoryResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.context(commit_context)?;
            Ok(value)
        }
        Err(error) => match tx.rollback().await {
            Ok(()) => Err(error),
            Err(rollback) => {
                warn!(error = %error, rollback = %rollback, "Rollback failed");
                Err(error.with_rollback(rollback))
            }
        },
    }
}
