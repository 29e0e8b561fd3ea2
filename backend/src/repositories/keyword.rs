//! Keyword repository
//!
//! Words are stored lowercase so content checks can match them without
//! regard to case.

use std::collections::HashMap;

use async_trait::async_trait;
use salad_recipes_shared::KeyWord;
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, KeywordRepository};
use crate::error::{DbResultExt, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeyWordRecord {
    pub id: Uuid,
    pub word: String,
}

impl From<KeyWordRecord> for KeyWord {
    fn from(record: KeyWordRecord) -> Self {
        Self {
            id: record.id,
            word: record.word,
        }
    }
}

impl From<&KeyWord> for KeyWordRecord {
    fn from(word: &KeyWord) -> Self {
        Self {
            id: word.id,
            word: word.word.clone(),
        }
    }
}

/// Lowercased, trimmed form of a keyword
fn normalize(word: &str, context: &'static str) -> RepositoryResult<String> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(RepositoryError::validation(context, "Keyword cannot be empty"));
    }
    Ok(word)
}

#[derive(Clone)]
pub struct PgKeywordRepository {
    pool: PgPool,
}

impl PgKeywordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeywordRepository for PgKeywordRepository {
    async fn create(&self, word: &KeyWord) -> RepositoryResult<Uuid> {
        let record = KeyWordRecord {
            id: Uuid::new_v4(),
            word: normalize(&word.word, "creating keyword")?,
        };

        sqlx::query("INSERT INTO word (id, word) VALUES ($1, $2)")
            .bind(record.id)
            .bind(&record.word)
            .execute(&self.pool)
            .await
            .context("creating keyword")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<KeyWord> {
        sqlx::query_as::<_, KeyWordRecord>("SELECT id, word FROM word WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(KeyWord::from)
            .context("getting keyword by id")
    }

    async fn get_all(&self) -> RepositoryResult<HashMap<String, Uuid>> {
        let records = sqlx::query_as::<_, KeyWordRecord>("SELECT id, word FROM word")
            .fetch_all(&self.pool)
            .await
            .context("getting all keywords")?;

        Ok(records.into_iter().map(|r| (r.word, r.id)).collect())
    }

    async fn update(&self, word: &KeyWord) -> RepositoryResult<()> {
        let record = KeyWordRecord {
            word: normalize(&word.word, "updating keyword")?,
            ..KeyWordRecord::from(word)
        };

        let result = sqlx::query("UPDATE word SET word = $1 WHERE id = $2")
            .bind(&record.word)
            .bind(record.id)
            .execute(&self.pool)
            .await
            .context("updating keyword")?;

        expect_updated(result, "updating keyword")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM word WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting keyword by id")?;

        expect_deleted(result, "deleting keyword by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("  Spam ", "creating keyword").unwrap(), "spam");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        let err = normalize("   ", "creating keyword").unwrap_err();
        assert_eq!(err.to_string(), "creating keyword: Keyword cannot be empty");
    }

    #[test]
    fn test_record_round_trip() {
        let word = KeyWord {
            id: Uuid::new_v4(),
            word: "spam".to_string(),
        };
        assert_eq!(KeyWord::from(KeyWordRecord::from(&word)), word);
    }
}
