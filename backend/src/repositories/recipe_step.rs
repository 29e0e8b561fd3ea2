//! Recipe step repository
//!
//! Keeps the step numbers of every recipe dense across create, move and
//! delete. Each of them runs in one transaction that first locks the parent
//! recipe row, so writers of the same recipe are serialized. Moves and
//! deletes then lock the step rows, apply at most one range shift planned by
//! [`step_order`] and write the target row. Any failure rolls the
//! transaction back.
//!
//! [`update_in`](PgRecipeStepRepository::update_in) and
//! [`delete_by_id_in`](PgRecipeStepRepository::delete_by_id_in) take a
//! connection so callers can run them inside their own transaction; the
//! operation then works under a savepoint and never aborts the outer one.

use async_trait::async_trait;
use salad_recipes_shared::validation::validate_step_name;
use salad_recipes_shared::RecipeStep;
use sqlx::{Connection, PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::step_order::{plan_delete, plan_move, RangeShift};
use super::{expect_deleted, finish, validated, RecipeStepRepository};
use crate::error::{DbResultExt, RepositoryError, RepositoryResult};

/// Recipe step row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecipeStepRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub description: String,
    pub step_num: i32,
}

impl From<RecipeStepRecord> for RecipeStep {
    fn from(record: RecipeStepRecord) -> Self {
        Self {
            id: record.id,
            recipe_id: record.recipe_id,
            name: record.name,
            description: record.description,
            step_num: record.step_num,
        }
    }
}

impl From<&RecipeStep> for RecipeStepRecord {
    fn from(step: &RecipeStep) -> Self {
        Self {
            id: step.id,
            recipe_id: step.recipe_id,
            name: step.name.clone(),
            description: step.description.clone(),
            step_num: step.step_num,
        }
    }
}

/// Position of one step inside its locked recipe
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
struct StepPosition {
    id: Uuid,
    step_num: i32,
}

/// PostgreSQL implementation of [`RecipeStepRepository`]
#[derive(Clone)]
pub struct PgRecipeStepRepository {
    pool: PgPool,
}

impl PgRecipeStepRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Move and rewrite a step on `conn`
    ///
    /// Opens a transaction, or a savepoint when `conn` is already inside one.
    pub async fn update_in(conn: &mut PgConnection, step: &RecipeStep) -> RepositoryResult<()> {
        validated(validate_step_name(&step.name), "updating recipe step")?;

        let mut tx = conn
            .begin()
            .await
            .context("updating recipe step (starting transaction)")?;
        let result = move_step(&mut tx, step).await;
        finish(tx, result, "updating recipe step (committing transaction)").await
    }

    /// Delete a step on `conn` and close the gap it leaves
    pub async fn delete_by_id_in(conn: &mut PgConnection, id: Uuid) -> RepositoryResult<()> {
        let mut tx = conn
            .begin()
            .await
            .context("deleting recipe step by id (starting transaction)")?;
        let result = delete_step(&mut tx, id).await;
        finish(tx, result, "deleting recipe step by id (committing transaction)").await
    }
}

/// Take the per-recipe writer lock
///
/// A missing recipe locks nothing; the write that follows then fails on its
/// foreign key or finds no steps.
async fn lock_recipe(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    context: &'static str,
) -> RepositoryResult<()> {
    sqlx::query("SELECT id FROM recipe WHERE id = $1 FOR UPDATE")
        .bind(recipe_id)
        .execute(conn)
        .await
        .context(context)?;

    Ok(())
}

/// Lock every step of a recipe, ordered by number
async fn lock_steps(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    context: &'static str,
) -> RepositoryResult<Vec<StepPosition>> {
    sqlx::query_as::<_, StepPosition>(
        r#"
        SELECT id, step_num
        FROM recipe_step
        WHERE recipe_id = $1
        ORDER BY step_num
        FOR UPDATE
        "#,
    )
    .bind(recipe_id)
    .fetch_all(conn)
    .await
    .context(context)
}

/// Apply `shift` to every step of the recipe except `moving`
async fn shift_steps(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    moving: Uuid,
    shift: RangeShift,
    context: &'static str,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        UPDATE recipe_step
        SET step_num = step_num + $1
        WHERE recipe_id = $2
          AND id <> $3
          AND step_num BETWEEN $4 AND $5
        "#,
    )
    .bind(shift.delta)
    .bind(recipe_id)
    .bind(moving)
    .bind(shift.from)
    .bind(shift.to)
    .execute(conn)
    .await
    .context(context)?;

    Ok(())
}

async fn insert_step(conn: &mut PgConnection, step: &RecipeStep) -> RepositoryResult<RecipeStep> {
    lock_recipe(&mut *conn, step.recipe_id, "creating recipe step (locking recipe)").await?;
    let new = RecipeStepRecord {
        id: Uuid::new_v4(),
        ..RecipeStepRecord::from(step)
    };

    let record = sqlx::query_as::<_, RecipeStepRecord>(
        r#"
        INSERT INTO recipe_step (id, recipe_id, name, description, step_num)
        SELECT $1, $2, $3, $4, COALESCE(MAX(step_num), 0) + 1
        FROM recipe_step
        WHERE recipe_id = $2
        RETURNING id, recipe_id, name, description, step_num
        "#,
    )
    .bind(new.id)
    .bind(new.recipe_id)
    .bind(&new.name)
    .bind(&new.description)
    .fetch_one(&mut *conn)
    .await
    .context("creating recipe step")?;

    debug!(
        recipe_id = %record.recipe_id,
        step_id = %record.id,
        step_num = record.step_num,
        "Created recipe step"
    );

    Ok(record.into())
}

async fn move_step(conn: &mut PgConnection, step: &RecipeStep) -> RepositoryResult<()> {
    const CONTEXT: &str = "updating recipe step";

    lock_recipe(&mut *conn, step.recipe_id, "updating recipe step (locking recipe)").await?;
    let steps = lock_steps(
        &mut *conn,
        step.recipe_id,
        "updating recipe step (checking max step num)",
    )
    .await?;
    let max = steps.iter().map(|s| s.step_num).max().unwrap_or(0);

    let current = match steps.iter().find(|s| s.id == step.id) {
        Some(found) => found.step_num,
        None => {
            let owner = sqlx::query_scalar::<_, Uuid>(
                "SELECT recipe_id FROM recipe_step WHERE id = $1",
            )
            .bind(step.id)
            .fetch_one(&mut *conn)
            .await
            .context("updating recipe step (checking current step num)")?;

            return Err(RepositoryError::StepRecipeMismatch {
                context: CONTEXT,
                step_id: step.id,
                recipe_id: owner,
            });
        }
    };

    let plan = plan_move(current, step.step_num, max).map_err(|e| {
        RepositoryError::StepOutOfRange {
            context: CONTEXT,
            requested: e.requested,
            max: e.max,
        }
    })?;

    debug!(
        recipe_id = %step.recipe_id,
        step_id = %step.id,
        from = current,
        to = plan.target,
        "Moving recipe step"
    );

    if let Some(shift) = plan.shift {
        shift_steps(
            &mut *conn,
            step.recipe_id,
            step.id,
            shift,
            "updating recipe step (moving other steps)",
        )
        .await?;
    }

    let record = RecipeStepRecord {
        step_num: plan.target,
        ..RecipeStepRecord::from(step)
    };
    sqlx::query(
        r#"
        UPDATE recipe_step
        SET name = $1, description = $2, step_num = $3
        WHERE id = $4
        "#,
    )
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.step_num)
    .bind(record.id)
    .execute(&mut *conn)
    .await
    .context(CONTEXT)?;

    Ok(())
}

async fn delete_step(conn: &mut PgConnection, id: Uuid) -> RepositoryResult<()> {
    const CONTEXT: &str = "deleting recipe step by id";

    let recipe_id = sqlx::query_scalar::<_, Uuid>("SELECT recipe_id FROM recipe_step WHERE id = $1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .context("deleting recipe step by id (getting recipe id)")?;

    lock_recipe(&mut *conn, recipe_id, "deleting recipe step by id (locking recipe)").await?;
    let steps = lock_steps(&mut *conn, recipe_id, "deleting recipe step by id (locking steps)").await?;
    let removed = steps
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.step_num)
        .ok_or(RepositoryError::NotFound { context: CONTEXT })?;
    let max = steps.iter().map(|s| s.step_num).max().unwrap_or(removed);

    debug!(recipe_id = %recipe_id, step_id = %id, step_num = removed, "Deleting recipe step");

    if let Some(shift) = plan_delete(removed, max) {
        shift_steps(
            &mut *conn,
            recipe_id,
            id,
            shift,
            "deleting recipe step by id (moving other steps)",
        )
        .await?;
    }

    let result = sqlx::query("DELETE FROM recipe_step WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context(CONTEXT)?;

    expect_deleted(result, CONTEXT)
}

#[async_trait]
impl RecipeStepRepository for PgRecipeStepRepository {
    async fn create(&self, step: &RecipeStep) -> RepositoryResult<RecipeStep> {
        validated(validate_step_name(&step.name), "creating recipe step")?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("creating recipe step (starting transaction)")?;
        let result = insert_step(&mut tx, step).await;
        finish(tx, result, "creating recipe step (committing transaction)").await
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<RecipeStep> {
        sqlx::query_as::<_, RecipeStepRecord>(
            r#"
            SELECT id, recipe_id, name, description, step_num
            FROM recipe_step
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(RecipeStep::from)
        .context("getting recipe step by id")
    }

    async fn get_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<Vec<RecipeStep>> {
        let records = sqlx::query_as::<_, RecipeStepRecord>(
            r#"
            SELECT id, recipe_id, name, description, step_num
            FROM recipe_step
            WHERE recipe_id = $1
            ORDER BY step_num ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("getting all recipe steps")?;

        Ok(records.into_iter().map(RecipeStep::from).collect())
    }

    async fn update(&self, step: &RecipeStep) -> RepositoryResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("updating recipe step (acquiring connection)")?;
        Self::update_in(&mut conn, step).await
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("deleting recipe step by id (acquiring connection)")?;
        Self::delete_by_id_in(&mut conn, id).await
    }

    async fn delete_all_by_recipe_id(&self, recipe_id: Uuid) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM recipe_step WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .context("deleting all recipe steps by id")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_conversion() {
        let step = RecipeStep {
            id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            name: "chop".to_string(),
            description: "chop the cucumbers".to_string(),
            step_num: 3,
        };

        let record = RecipeStepRecord::from(&step);
        assert_eq!(record.step_num, 3);
        assert_eq!(RecipeStep::from(record), step);
    }
}
