//! Integration tests for `PgSaveStore`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use storybot_core::error::DomainError;
use storybot_core::repository::SaveStore;
use storybot_core::save::{Cursor, SaveDocument};
use storybot_store::pg_save_store::PgSaveStore;

fn played_document() -> SaveDocument {
    let mut document = SaveDocument {
        current: Cursor::positioned(0, 1, "sea", 0),
        last_event_at: Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()),
        ..SaveDocument::default()
    };
    let stats = document.chapter_stats_mut(0, 1);
    stats.obtained_endings.extend([0, 2]);
    stats.obtained_achievements.insert(1);
    document.chapter_stats_mut(1, 0);
    document
}

// --- get_save ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_save_returns_empty_document_for_new_user(pool: PgPool) {
    let store = PgSaveStore::new(pool);

    let stored = store.get_save(101).await.unwrap();

    assert_eq!(stored.version, 0);
    assert_eq!(stored.document, SaveDocument::default());
}

// --- put_save + get_save ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_first_write_creates_version_one(pool: PgPool) {
    // Arrange
    let store = PgSaveStore::new(pool);
    let document = played_document();

    // Act
    store.put_save(102, 0, &document).await.unwrap();

    // Assert
    let stored = store.get_save(102).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.document, document);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_replaces_whole_document(pool: PgPool) {
    // Arrange
    let store = PgSaveStore::new(pool);
    store.put_save(103, 0, &played_document()).await.unwrap();
    let replacement = SaveDocument {
        current: Cursor::story(1),
        ..SaveDocument::default()
    };

    // Act
    store.put_save(103, 1, &replacement).await.unwrap();

    // Assert
    let stored = store.get_save(103).await.unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.document, replacement);
    assert!(stored.document.stories_stats.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_absent_and_empty_stats_survive_storage(pool: PgPool) {
    let store = PgSaveStore::new(pool);
    store.put_save(104, 0, &played_document()).await.unwrap();

    let stored = store.get_save(104).await.unwrap().document;

    assert!(stored.chapter_stats(1, 0).unwrap().obtained_endings.is_empty());
    assert!(stored.chapter_stats(1, 1).is_none());
    assert!(stored.story_stats(2).is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_zero_cursor_fields_are_stored_as_present(pool: PgPool) {
    // Arrange
    let store = PgSaveStore::new(pool.clone());
    let document = SaveDocument {
        current: Cursor::positioned(0, 0, "intro", 0),
        ..SaveDocument::default()
    };

    // Act
    store.put_save(105, 0, &document).await.unwrap();

    // Assert
    let (raw,): (serde_json::Value,) =
        sqlx::query_as("SELECT document FROM user_saves WHERE user_id = $1")
            .bind(105_i64)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(raw["current"]["story"], 0);
    assert_eq!(raw["current"]["position"], 0);
    assert!(raw["current"].get("pending_achievement").is_none());
}

// --- user isolation ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_user_isolation(pool: PgPool) {
    let store = PgSaveStore::new(pool);

    store.put_save(106, 0, &played_document()).await.unwrap();

    assert_eq!(store.get_save(107).await.unwrap().version, 0);
}

// --- concurrency ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrency_conflict_on_stale_version(pool: PgPool) {
    // Arrange
    let store = PgSaveStore::new(pool);
    store.put_save(108, 0, &played_document()).await.unwrap();
    store
        .put_save(108, 1, &SaveDocument::default())
        .await
        .unwrap();

    // Act
    let result = store.put_save(108, 1, &played_document()).await;

    // Assert
    match result.unwrap_err() {
        DomainError::ConcurrencyConflict {
            user_id,
            expected,
            actual,
        } => {
            assert_eq!(user_id, 108);
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(
        store.get_save(108).await.unwrap().document,
        SaveDocument::default()
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrency_conflict_on_second_first_write(pool: PgPool) {
    let store = PgSaveStore::new(pool);
    store.put_save(109, 0, &played_document()).await.unwrap();

    let result = store.put_save(109, 0, &SaveDocument::default()).await;

    assert!(matches!(
        result,
        Err(DomainError::ConcurrencyConflict {
            expected: 0,
            actual: 1,
            ..
        })
    ));
}
