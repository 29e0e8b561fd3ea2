//! Comment repository
//!
//! A user reviews a salad at most once; the store rejects a second comment
//! by the same author on the same salad with a unique violation.

use async_trait::async_trait;
use salad_recipes_shared::validation::{validate_comment_rating, validate_comment_text};
use salad_recipes_shared::{page_count, page_offset, Comment, Page, PAGE_SIZE};
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, validated, CommentRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub salad_id: Uuid,
    pub text: String,
    pub rating: i32,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            salad_id: record.salad_id,
            text: record.text,
            rating: record.rating,
        }
    }
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            salad_id: comment.salad_id,
            text: comment.text.clone(),
            rating: comment.rating,
        }
    }
}

fn validate(comment: &Comment, context: &'static str) -> RepositoryResult<()> {
    validated(validate_comment_rating(comment.rating), context)?;
    validated(validate_comment_text(&comment.text), context)
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: &Comment) -> RepositoryResult<Uuid> {
        validate(comment, "creating comment")?;
        let record = CommentRecord {
            id: Uuid::new_v4(),
            ..CommentRecord::from(comment)
        };

        sqlx::query(
            r#"
            INSERT INTO comment (id, author_id, salad_id, text, rating)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(record.author_id)
        .bind(record.salad_id)
        .bind(&record.text)
        .bind(record.rating)
        .execute(&self.pool)
        .await
        .context("creating comment")?;

        Ok(record.id)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Comment> {
        sqlx::query_as::<_, CommentRecord>(
            "SELECT id, author_id, salad_id, text, rating FROM comment WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(Comment::from)
        .context("getting comment by id")
    }

    async fn get_by_salad_and_user(
        &self,
        salad_id: Uuid,
        user_id: Uuid,
    ) -> RepositoryResult<Comment> {
        sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT id, author_id, salad_id, text, rating
            FROM comment
            WHERE salad_id = $1 AND author_id = $2
            "#,
        )
        .bind(salad_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map(Comment::from)
        .context("getting comment by salad and user")
    }

    async fn get_all_by_salad_id(
        &self,
        salad_id: Uuid,
        page: u32,
    ) -> RepositoryResult<Page<Comment>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comment WHERE salad_id = $1")
            .bind(salad_id)
            .fetch_one(&self.pool)
            .await
            .context("getting all comments by salad id (counting)")?;

        let records = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT id, author_id, salad_id, text, rating
            FROM comment
            WHERE salad_id = $1
            ORDER BY rating DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(salad_id)
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await
        .context("getting all comments by salad id")?;

        Ok(Page::new(
            records.into_iter().map(Comment::from).collect(),
            page_count(total),
        ))
    }

    async fn update(&self, comment: &Comment) -> RepositoryResult<()> {
        validate(comment, "updating comment")?;
        let record = CommentRecord::from(comment);

        let result = sqlx::query(
            r#"
            UPDATE comment
            SET author_id = $1, salad_id = $2, text = $3, rating = $4
            WHERE id = $5
            "#,
        )
        .bind(record.author_id)
        .bind(record.salad_id)
        .bind(&record.text)
        .bind(record.rating)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .context("updating comment")?;

        expect_updated(result, "updating comment")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM comment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting comment by id")?;

        expect_deleted(result, "deleting comment by id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "tasty", false)]
    #[case(6, "tasty", false)]
    #[case(3, "   ", false)]
    #[case(1, "ok", true)]
    #[case(5, "great", true)]
    fn test_comment_validation(#[case] rating: i32, #[case] text: &str, #[case] valid: bool) {
        let comment = Comment {
            id: Uuid::nil(),
            author_id: Uuid::new_v4(),
            salad_id: Uuid::new_v4(),
            text: text.to_string(),
            rating,
        };
        assert_eq!(validate(&comment, "creating comment").is_ok(), valid);
    }

    #[test]
    fn test_record_round_trip() {
        let comment = Comment {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            salad_id: Uuid::new_v4(),
            text: "too much dressing".to_string(),
            rating: 2,
        };

        let record = CommentRecord::from(&comment);
        assert_eq!(record.rating, 2);
        assert_eq!(Comment::from(record), comment);
    }
}
