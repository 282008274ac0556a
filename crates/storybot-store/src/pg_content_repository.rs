//! `PostgreSQL` implementation of the `ContentRepository` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;

use storybot_core::content::{ChapterId, PROLOGUE_CHAPTER, StoryContent, StoryId};
use storybot_core::error::DomainError;
use storybot_core::repository::ContentRepository;

/// Story content stored as one JSONB document per chapter.
#[derive(Debug, Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    /// Creates a new `PgContentRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts chapters, replacing any already stored under the same key.
    /// All chapters are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails.
    pub async fn upsert_chapters(&self, chapters: &[StoryContent]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        for chapter in chapters {
            sqlx::query(
                "INSERT INTO story_chapters (story_id, chapter_id, content) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (story_id, chapter_id) DO UPDATE SET content = EXCLUDED.content",
            )
            .bind(i64::from(chapter.story_id))
            .bind(i64::from(chapter.chapter_id))
            .bind(Json(chapter))
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;
        }
        tx.commit().await.map_err(infrastructure)?;

        info!(chapters = chapters.len(), "story chapters imported");
        Ok(())
    }
}

fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("content store: {e}"))
}

fn into_chapters(rows: Vec<(Json<StoryContent>,)>) -> Vec<StoryContent> {
    rows.into_iter().map(|(Json(content),)| content).collect()
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn get_chapter(
        &self,
        story_id: StoryId,
        chapter_id: ChapterId,
    ) -> Result<StoryContent, DomainError> {
        let row: Option<(Json<StoryContent>,)> = sqlx::query_as(
            "SELECT content FROM story_chapters WHERE story_id = $1 AND chapter_id = $2",
        )
        .bind(i64::from(story_id))
        .bind(i64::from(chapter_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(|(Json(content),)| content)
            .ok_or(DomainError::ContentNotFound {
                story_id,
                chapter_id: Some(chapter_id),
            })
    }

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<StoryContent>, DomainError> {
        let rows: Vec<(Json<StoryContent>,)> = sqlx::query_as(
            "SELECT content FROM story_chapters WHERE story_id = $1 ORDER BY chapter_id",
        )
        .bind(i64::from(story_id))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(into_chapters(rows))
    }

    async fn list_prologues(&self) -> Result<Vec<StoryContent>, DomainError> {
        let rows: Vec<(Json<StoryContent>,)> = sqlx::query_as(
            "SELECT content FROM story_chapters WHERE chapter_id = $1 ORDER BY story_id",
        )
        .bind(i64::from(PROLOGUE_CHAPTER))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(into_chapters(rows))
    }
}
