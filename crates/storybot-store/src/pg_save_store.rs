//! `PostgreSQL` implementation of the `SaveStore` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use storybot_core::error::DomainError;
use storybot_core::repository::{SaveStore, StoredSave};
use storybot_core::save::{SaveDocument, UserId};

/// PostgreSQL-backed save store.
///
/// Each write replaces the whole document and bumps `version`; a write whose
/// expected version no longer matches the row is rejected, so two events for
/// the same user cannot both commit from the same read.
#[derive(Debug, Clone)]
pub struct PgSaveStore {
    pool: PgPool,
}

impl PgSaveStore {
    /// Creates a new `PgSaveStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, user_id: UserId) -> Result<i64, DomainError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM user_saves WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map_or(0, |(version,)| version))
    }
}

fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("save store: {e}"))
}

#[async_trait]
impl SaveStore for PgSaveStore {
    async fn get_save(&self, user_id: UserId) -> Result<StoredSave, DomainError> {
        let row: Option<(i64, Json<SaveDocument>)> =
            sqlx::query_as("SELECT version, document FROM user_saves WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;

        Ok(match row {
            Some((version, Json(document))) => StoredSave {
                user_id,
                version,
                document,
            },
            None => StoredSave::empty(user_id),
        })
    }

    async fn put_save(
        &self,
        user_id: UserId,
        expected_version: i64,
        document: &SaveDocument,
    ) -> Result<(), DomainError> {
        let written = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO user_saves (user_id, version, document, updated_at) \
                 VALUES ($1, 1, $2, NOW()) \
                 ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(Json(document))
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE user_saves \
                 SET version = version + 1, document = $3, updated_at = NOW() \
                 WHERE user_id = $1 AND version = $2",
            )
            .bind(user_id)
            .bind(expected_version)
            .bind(Json(document))
            .execute(&self.pool)
            .await
        };
        let result = written.map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            let actual = self.current_version(user_id).await?;
            return Err(DomainError::ConcurrencyConflict {
                user_id,
                expected: expected_version,
                actual,
            });
        }

        debug!(user_id, version = expected_version + 1, "save written");
        Ok(())
    }
}
