//! Salad repository

use async_trait::async_trait;
use salad_recipes_shared::{page_count, page_offset, Page, RecipeFilter, Salad, PAGE_SIZE};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::listing::{filtered, push_page};
use super::{expect_deleted, expect_updated, SaladRepository};
use crate::error::{DbResultExt, RepositoryResult};

/// Salad row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaladRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<SaladRecord> for Salad {
    fn from(record: SaladRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            name: record.name,
            description: record.description,
        }
    }
}

impl From<&Salad> for SaladRecord {
    fn from(salad: &Salad) -> Self {
        Self {
            id: salad.id,
            author_id: salad.author_id,
            name: salad.name.clone(),
            description: salad.description.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PgSaladRepository {
    pool: PgPool,
}

impl PgSaladRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaladRepository for PgSaladRepository {
    async fn create(&self, salad: &Salad) -> RepositoryResult<Uuid> {
        let record = SaladRecord {
            id: Uuid::new_v4(),
            ..SaladRecord::from(salad)
        };

        sqlx::query(
            r#"
            INSERT INTO salad (id, author_id, name, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(record.author_id)
        .bind(&record.name)
        .bind(&record.description)
        .execute(&self.pool)
        .await
        .context("creating salad")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Salad> {
        sqlx::query_as::<_, SaladRecord>(
            "SELECT id, author_id, name, description FROM salad WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(Salad::from)
        .context("getting salad by id")
    }

    async fn get_all(&self, filter: &RecipeFilter, page: u32) -> RepositoryResult<Page<Salad>> {
        debug!(
            ingredients = filter.available_ingredients.len(),
            types = filter.salad_types.len(),
            min_rate = filter.min_rate,
            status = ?filter.status,
            page,
            "Listing salads"
        );

        let total = filtered("SELECT COUNT(*)", filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("getting all salads (counting)")?;

        let mut query = filtered("SELECT s.id, s.author_id, s.name, s.description", filter);
        push_page(&mut query, page);
        let records = query
            .build_query_as::<SaladRecord>()
            .fetch_all(&self.pool)
            .await
            .context("getting all salads")?;

        Ok(Page::new(
            records.into_iter().map(Salad::from).collect(),
            page_count(total),
        ))
    }

    async fn get_all_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<Salad>> {
        let records = sqlx::query_as::<_, SaladRecord>(
            r#"
            SELECT id, author_id, name, description
            FROM salad
            WHERE author_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("getting all salads by user id")?;

        Ok(records.into_iter().map(Salad::from).collect())
    }

    async fn get_all_rated_by_user(
        &self,
        user_id: Uuid,
        page: u32,
    ) -> RepositoryResult<Page<Salad>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comment WHERE author_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("getting salads rated by user (counting)")?;

        let records = sqlx::query_as::<_, SaladRecord>(
            r#"
            SELECT s.id, s.author_id, s.name, s.description
            FROM salad s
            JOIN comment c ON c.salad_id = s.id
            WHERE c.author_id = $1
            ORDER BY c.rating DESC, s.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await
        .context("getting salads rated by user")?;

        Ok(Page::new(
            records.into_iter().map(Salad::from).collect(),
            page_count(total),
        ))
    }

    async fn update(&self, salad: &Salad) -> RepositoryResult<()> {
        let record = SaladRecord::from(salad);

        let result = sqlx::query(
            r#"
            UPDATE salad
            SET author_id = $1, name = $2, description = $3
            WHERE id = $4
            "#,
        )
        .bind(record.author_id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .context("updating salad")?;

        expect_updated(result, "updating salad")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM salad WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting salad by id")?;

        expect_deleted(result, "deleting salad by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let salad = Salad {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            name: "Caesar".to_string(),
            description: "romaine, croutons and parmesan".to_string(),
        };

        let record = SaladRecord::from(&salad);
        assert_eq!(record.author_id, salad.author_id);
        assert_eq!(Salad::from(record), salad);
    }
}
