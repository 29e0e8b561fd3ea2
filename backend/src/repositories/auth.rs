//! Account registration and credential lookups

use async_trait::async_trait;
use salad_recipes_shared::{User, UserAuth};
use sqlx::PgPool;
use uuid::Uuid;

use super::{user, AuthRepository};
use crate::error::{DbResultExt, RepositoryResult};

#[derive(Debug, Clone, sqlx::FromRow)]
struct CredentialsRecord {
    id: Uuid,
    password: String,
    role: String,
}

impl From<CredentialsRecord> for UserAuth {
    fn from(record: CredentialsRecord) -> Self {
        Self {
            id: record.id,
            hashed_password: record.password,
            role: record.role,
        }
    }
}

#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn register(&self, user: &User) -> RepositoryResult<Uuid> {
        user::insert(&self.pool, user, "registering user").await
    }

    async fn get_by_username(&self, username: &str) -> RepositoryResult<UserAuth> {
        sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, password, role FROM users WHERE login = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map(UserAuth::from)
        .context("getting user credentials by username")
    }
}
