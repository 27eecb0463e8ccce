//! Postgres user store over a sqlx pool.
//!
//! The unique indexes created by the migrations are the authoritative
//! uniqueness check: a `23505` violation on insert is mapped back to the
//! matching `Conflict` tag, so concurrent signups racing past the HTTP
//! layer's pre-checks still resolve to the same 400.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::users::{ConflictField, NewUser, StoreError, User, UserStore};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email_address: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_superuser: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email_address: row.email_address,
            name: row.name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
        }
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(StoreError::Database)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::Migrate)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email_address, name, password_hash, is_active, is_superuser
            FROM users
            WHERE email_address = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email_address, name, password_hash, is_active, is_superuser
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Database)?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email_address, name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email_address, name, password_hash, is_active, is_superuser
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email_address)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(User::from(row))
    }
}

fn map_insert_error(error: sqlx::Error) -> StoreError {
    let conflict = match &error {
        sqlx::Error::Database(db_error)
            if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
        {
            match db_error.constraint() {
                Some("users_email_address_key") => Some(ConflictField::Email),
                Some("users_username_key") => Some(ConflictField::Username),
                _ => None,
            }
        }
        _ => None,
    };

    match conflict {
        Some(field) => StoreError::Conflict(field),
        None => StoreError::Database(error),
    }
}
