//! Handle database requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::user::{Profile, UpdateUser, User, UserId};

/// Errors raised by the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("stored document is malformed: {0}")]
    Document(String),
}

/// Port for user persistence.
///
/// `None` means no record matched the identifier.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new record. The store assigns its identifier.
    async fn insert(&self, profile: &Profile) -> Result<User, StoreError>;
    /// Every stored record.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    /// Merge supplied fields and return the post-update record.
    async fn update_by_id(
        &self,
        id: &UserId,
        patch: &UpdateUser,
    ) -> Result<Option<User>, StoreError>;
    /// Remove a record and return it.
    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// User record as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: String,
    document: Json<Profile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = StoreError;

    fn try_from(record: UserRecord) -> Result<Self, StoreError> {
        Ok(Self {
            id: UserId::parse(&record.id)
                .map_err(|err| StoreError::Document(err.to_string()))?,
            profile: record.document.0,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// PostgreSQL user repository.
///
/// Users are kept as JSONB documents keyed by their identifier.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, profile: &Profile) -> Result<User, StoreError> {
        let id = UserId::generate();

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, document)
            VALUES ($1, $2)
            RETURNING id, document, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(Json(profile))
        .fetch_one(&self.pool)
        .await?;

        record.try_into()
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, document, created_at, updated_at FROM users ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, document, created_at, updated_at FROM users WHERE id = $1"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn update_by_id(
        &self,
        id: &UserId,
        patch: &UpdateUser,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET document = document || $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, document, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"DELETE FROM users WHERE id = $1 RETURNING id, document, created_at, updated_at"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }
}
