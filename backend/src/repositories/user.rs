//! User repository for database operations

use async_trait::async_trait;
use salad_recipes_shared::validation::{validate_email, validate_username};
use salad_recipes_shared::{page_count, page_offset, Page, User, DEFAULT_ROLE, PAGE_SIZE};
use sqlx::PgPool;
use uuid::Uuid;

use super::{expect_deleted, expect_updated, validated, UserRepository};
use crate::error::{DbResultExt, RepositoryResult};

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub login: String,
    pub password: String,
    pub email: String,
    pub role: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            username: record.login,
            password: record.password,
            email: record.email,
            role: record.role,
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            login: user.username.clone(),
            password: user.password.clone(),
            email: user.email.clone(),
            role: role_or_default(user).to_string(),
        }
    }
}

pub(crate) fn validate(user: &User, context: &'static str) -> RepositoryResult<()> {
    validated(validate_username(&user.username), context)?;
    validated(validate_email(&user.email), context)
}

/// Role stored for `user`, falling back to the default one
pub(crate) fn role_or_default(user: &User) -> &str {
    if user.role.trim().is_empty() {
        DEFAULT_ROLE
    } else {
        &user.role
    }
}

/// Insert `user` under a fresh id
pub(crate) async fn insert(
    pool: &PgPool,
    user: &User,
    context: &'static str,
) -> RepositoryResult<Uuid> {
    validate(user, context)?;
    let record = UserRecord {
        id: Uuid::new_v4(),
        ..UserRecord::from(user)
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, name, login, password, email, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.login)
    .bind(&record.password)
    .bind(&record.email)
    .bind(&record.role)
    .execute(pool)
    .await
    .context(context)?;

    Ok(record.id)
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> RepositoryResult<Uuid> {
        insert(&self.pool, user, "creating user").await
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, login, password, email, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map(User::from)
        .context("getting user by id")
    }

    async fn get_by_username(&self, username: &str) -> RepositoryResult<User> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, login, password, email, role
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map(User::from)
        .context("getting user by username")
    }

    async fn get_all(&self, page: u32) -> RepositoryResult<Page<User>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("getting all users (counting)")?;

        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, login, password, email, role
            FROM users
            ORDER BY login
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await
        .context("getting all users")?;

        Ok(Page::new(
            records.into_iter().map(User::from).collect(),
            page_count(total),
        ))
    }

    async fn update(&self, user: &User) -> RepositoryResult<()> {
        validate(user, "updating user")?;
        let record = UserRecord::from(user);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $1, login = $2, password = $3, email = $4, role = $5
            WHERE id = $6
            "#,
        )
        .bind(&record.name)
        .bind(&record.login)
        .bind(&record.password)
        .bind(&record.email)
        .bind(&record.role)
        .bind(record.id)
        .execute(&self.pool)
        .await
        .context("updating user")?;

        expect_updated(result, "updating user")
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting user by id")?;

        expect_deleted(result, "deleting user by id")
    }
}
