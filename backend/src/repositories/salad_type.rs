//! Salad type repository

use async_trait::async_trait;
use salad_recipes_shared::{page_count, page_offset, Page, SaladType, PAGE_SIZE};
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, SaladTypeRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaladTypeRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<SaladTypeRecord> for SaladType {
    fn from(record: SaladTypeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
        }
    }
}

impl From<&SaladType> for SaladTypeRecord {
    fn from(salad_type: &SaladType) -> Self {
        Self {
            id: salad_type.id,
            name: salad_type.name.clone(),
            description: salad_type.description.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PgSaladTypeRepository {
    pool: PgPool,
}

impl PgSaladTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaladTypeRepository for PgSaladTypeRepository {
    async fn create(&self, salad_type: &SaladType) -> RepositoryResult<Uuid> {
        let record = SaladTypeRecord {
            id: Uuid::new_v4(),
            ..SaladTypeRecord::from(salad_type)
        };

        sqlx::query("INSERT INTO salad_type (id, name, description) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .execute(&self.pool)
            .await
            .context("creating salad type")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<SaladType> {
        sqlx::query_as::<_, SaladTypeRecord>(
            "SELECT id, name, description FROM salad_type WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(SaladType::from)
        .context("getting salad type by id")
    }

    async fn get_all(&self, page: u32) -> RepositoryResult<Page<SaladType>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM salad_type")
            .fetch_one(&self.pool)
            .await
            .context("getting all salad types (counting)")?;

        let records = sqlx::query_as::<_, SaladTypeRecord>(
            r#"
            SELECT id, name, description
            FROM salad_type
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await
        .context("getting all salad types")?;

        Ok(Page::new(
            records.into_iter().map(SaladType::from).collect(),
            page_count(total),
        ))
    }

    async fn get_all_by_salad_id(&self, salad_id: Uuid) -> RepositoryResult<Vec<SaladType>> {
        let records = sqlx::query_as::<_, SaladTypeRecord>(
            r#"
            SELECT st.id, st.name, st.description
            FROM salad_type st
            JOIN types_of_salads ts ON ts.type_id = st.id
            WHERE ts.salad_id = $1
            ORDER BY st.name
            "#,
        )
        .bind(salad_id)
        .fetch_all(&self.pool)
        .await
        .context("getting all salad types by salad id")?;

        Ok(records.into_iter().map(SaladType::from).collect())
    }

    async fn link(&self, salad_id: Uuid, type_id: Uuid) -> RepositoryResult<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO types_of_salads (id, salad_id, type_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(salad_id)
            .bind(type_id)
            .execute(&self.pool)
            .await
            .context("linking salad type")?;

        Ok(id)
    }

    async fn unlink(&self, salad_id: Uuid, type_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM types_of_salads WHERE salad_id = $1 AND type_id = $2")
            .bind(salad_id)
            .bind(type_id)
            .execute(&self.pool)
            .await
            .context("unlinking salad type")?;

        expect_deleted(result, "unlinking salad type")
    }

    async fn update(&self, salad_type: &SaladType) -> RepositoryResult<()> {
        let record = SaladTypeRecord::from(salad_type);

        let result = sqlx::query("UPDATE salad_type SET name = $1, description = $2 WHERE id = $3")
            .bind(&record.name)
            .bind(&record.description)
            .bind(record.id)
            .execute(&self.pool)
            .await
            .context("updating salad type")?;

        expect_updated(result, "updating salad type")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM salad_type WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting salad type by id")?;

        expect_deleted(result, "deleting salad type by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let warm = SaladType {
            id: Uuid::new_v4(),
            name: "warm".to_string(),
            description: "served straight from the pan".to_string(),
        };
        assert_eq!(SaladType::from(SaladTypeRecord::from(&warm)), warm);
    }
}
