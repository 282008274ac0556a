//! Command handlers for the session controller.
//!
//! Each handler reads the user's save, runs the pure narrative core, and
//! writes the whole document back with the version it was read at. A handler
//! either commits exactly one new document or returns an error having written
//! nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storybot_core::clock::Clock;
use storybot_core::command::Command;
use storybot_core::content::StoryId;
use storybot_core::error::DomainError;
use storybot_core::repository::{ContentRepository, SaveStore, StoredSave};
use storybot_core::save::{Cursor, SaveDocument};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::{Advance, ChooseNumber, ResetProgress};
use crate::domain::menu::Menu;
use crate::domain::mutator;
use crate::domain::resolver::{self, NavigationInput, Presentation};

/// What the user should see after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// The user's cursor after the command.
    pub cursor: Cursor,
    /// The element, ending or chapter choice reached, if any.
    pub presentation: Option<Presentation>,
    /// A story or chapter menu to offer, if any.
    pub menu: Option<Menu>,
}

/// Handles the `Advance` command: resolves the input against the user's
/// cursor and persists the resulting save.
///
/// # Errors
///
/// - `DomainError::StaleEvent` if the event is not newer than the last one
///   applied.
/// - Any resolver error if the input does not fit the cursor or the content.
/// - `DomainError::ConcurrencyConflict` or `DomainError::Infrastructure` if
///   the save cannot be read or written.
pub async fn handle_advance(
    command: &Advance,
    clock: &dyn Clock,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Reply, DomainError> {
    let stored = saves.get_save(command.user_id).await?;
    ensure_fresh(&stored.document, command.sent_at)?;

    navigate(
        command,
        stored,
        &command.input,
        command.sent_at,
        clock,
        content,
        saves,
    )
    .await
}

/// Handles the `ChooseNumber` command: interprets the number by the cursor's
/// stage, then proceeds as `Advance`.
///
/// A number naming no story or chapter is reported as
/// `DomainError::InvalidInput` rather than missing content.
///
/// # Errors
///
/// Returns the same errors as [`handle_advance`].
pub async fn handle_choose_number(
    command: &ChooseNumber,
    clock: &dyn Clock,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Reply, DomainError> {
    let stored = saves.get_save(command.user_id).await?;
    ensure_fresh(&stored.document, command.sent_at)?;

    let input = NavigationInput::from_number(&stored.document.current, command.number)
        .inspect_err(|e| {
            warn!(correlation_id = %command.correlation_id, error = %e, "number not accepted");
        })?;
    let chosen_story = stored.document.current.story;

    match navigate(
        command,
        stored,
        &input,
        command.sent_at,
        clock,
        content,
        saves,
    )
    .await
    {
        Err(e @ DomainError::ContentNotFound { .. }) => {
            if number_missed_menu(&input, chosen_story, content).await? {
                Err(DomainError::InvalidInput(format!(
                    "{} is not on the list",
                    command.number
                )))
            } else {
                Err(e)
            }
        }
        other => other,
    }
}

/// Whether missing content after a numbered selection means the number named
/// no menu entry. A chapter selection in a story that has no chapters left is
/// a stale cursor, not a typo.
async fn number_missed_menu(
    input: &NavigationInput,
    chosen_story: Option<StoryId>,
    content: &dyn ContentRepository,
) -> Result<bool, DomainError> {
    match (input, chosen_story) {
        (NavigationInput::SelectStory { .. }, _) => Ok(true),
        (NavigationInput::SelectChapter { .. }, Some(story)) => {
            Ok(!content.list_chapters(story).await?.is_empty())
        }
        _ => Ok(false),
    }
}

/// Handles the `ResetProgress` command: clears the cursor and offers the
/// story menu. Completion stats are kept.
///
/// # Errors
///
/// - `DomainError::StaleEvent` if the event is not newer than the last one
///   applied.
/// - `DomainError::ConcurrencyConflict` or `DomainError::Infrastructure` if
///   content or the save cannot be read or written.
pub async fn handle_reset(
    command: &ResetProgress,
    clock: &dyn Clock,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Reply, DomainError> {
    let stored = saves.get_save(command.user_id).await?;
    ensure_fresh(&stored.document, command.sent_at)?;

    let menu = Menu::stories(&content.list_prologues().await?);

    let mut next = stored.document.clone();
    next.current = Cursor::default();
    stamp(&mut next, command.sent_at, clock);
    saves
        .put_save(stored.user_id, stored.version, &next)
        .await?;

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        user_id = command.user_id,
        "progress reset"
    );

    Ok(Reply {
        cursor: next.current,
        presentation: None,
        menu: Some(menu),
    })
}

/// Builds the chapter menu of a story.
pub(crate) async fn chapter_menu(
    content: &dyn ContentRepository,
    story_id: StoryId,
) -> Result<Menu, DomainError> {
    let chapters = content.list_chapters(story_id).await?;
    if chapters.is_empty() {
        return Err(DomainError::ContentNotFound {
            story_id,
            chapter_id: None,
        });
    }
    Ok(Menu::chapters(story_id, &chapters))
}

fn ensure_fresh(save: &SaveDocument, sent_at: Option<DateTime<Utc>>) -> Result<(), DomainError> {
    match (save.last_event_at, sent_at) {
        (Some(last), Some(sent)) if sent <= last => Err(DomainError::StaleEvent),
        _ => Ok(()),
    }
}

fn stamp(document: &mut SaveDocument, sent_at: Option<DateTime<Utc>>, clock: &dyn Clock) {
    if sent_at.is_some() {
        document.last_event_at = sent_at;
    }
    document.updated_at = Some(clock.now());
}

async fn navigate(
    command: &dyn Command,
    stored: StoredSave,
    input: &NavigationInput,
    sent_at: Option<DateTime<Utc>>,
    clock: &dyn Clock,
    content: &dyn ContentRepository,
    saves: &dyn SaveStore,
) -> Result<Reply, DomainError> {
    let correlation_id: Uuid = command.correlation_id();
    let current = &stored.document.current;

    let key = resolver::content_key(current, input).inspect_err(|e| {
        warn!(%correlation_id, user_id = stored.user_id, error = %e, "input not accepted at stage");
    })?;
    let chapter = content.get_chapter(key.story_id, key.chapter_id).await?;
    let mut resolution = resolver::resolve(&chapter, current, input).inspect_err(|e| {
        warn!(
            %correlation_id,
            user_id = stored.user_id,
            kind = e.kind().as_str(),
            error = %e,
            "navigation rejected"
        );
    })?;

    let menu = match &resolution.presentation {
        Presentation::ChapterChoice(_) | Presentation::Ending(_) => {
            Some(chapter_menu(content, key.story_id).await?)
        }
        Presentation::Content(_) => None,
    };
    // A chapter choice only remembers a last chapter the story still has.
    if let (Presentation::ChapterChoice(_), Some(menu)) = (&resolution.presentation, &menu) {
        if resolution
            .cursor
            .chapter
            .is_some_and(|chapter| !menu.ids().contains(&chapter))
        {
            resolution.cursor.chapter = None;
        }
    }

    let mut next = mutator::apply(&stored.document, &resolution);
    stamp(&mut next, sent_at, clock);
    saves
        .put_save(stored.user_id, stored.version, &next)
        .await?;

    info!(
        %correlation_id,
        command_type = command.command_type(),
        user_id = stored.user_id,
        story_id = key.story_id,
        chapter_id = key.chapter_id,
        ending = ?resolution.obtained_ending(),
        achievement = ?resolution.granted_achievement(),
        "navigation applied"
    );

    Ok(Reply {
        cursor: next.current,
        presentation: Some(resolution.presentation),
        menu,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use storybot_content::application::repository::InMemoryContentRepository;
    use storybot_core::content::ENDING_STORYLINE;
    use storybot_core::error::ErrorKind;
    use storybot_core::save::CursorStage;
    use storybot_test_support::{
        FailingContentRepository, FailingSaveStore, FixedClock, InMemorySaveStore, fixtures,
    };

    use super::*;

    const USER: i64 = 42;

    fn content() -> InMemoryContentRepository {
        InMemoryContentRepository::new(fixtures::catalog())
    }

    fn advance(input: NavigationInput) -> Advance {
        Advance {
            correlation_id: Uuid::new_v4(),
            user_id: USER,
            input,
            sent_at: None,
        }
    }

    fn choose(number: i64) -> ChooseNumber {
        ChooseNumber {
            correlation_id: Uuid::new_v4(),
            user_id: USER,
            number,
            sent_at: None,
        }
    }

    fn at(cursor: Cursor) -> InMemorySaveStore {
        InMemorySaveStore::with_save(
            USER,
            SaveDocument {
                current: cursor,
                ..SaveDocument::default()
            },
        )
    }

    #[tokio::test]
    async fn test_first_contact_selects_story_and_offers_chapters() {
        // Arrange
        let clock = FixedClock::standard();
        let saves = InMemorySaveStore::new();

        // Act
        let reply = handle_choose_number(&choose(1), &clock, &content(), &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(reply.cursor, Cursor::story(0));
        assert!(matches!(
            reply.presentation,
            Some(Presentation::ChapterChoice(_))
        ));
        assert_eq!(reply.menu.unwrap().ids(), vec![0, 1]);
        let writes = saves.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, 0);
        assert_eq!(writes[0].2.updated_at, Some(clock.0));
    }

    #[tokio::test]
    async fn test_play_through_prologue_records_ending_and_achievement() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = content();
        let saves = at(Cursor::story(0));

        // Act
        handle_choose_number(&choose(0), &clock, &repo, &saves)
            .await
            .unwrap();
        handle_choose_number(&choose(1), &clock, &repo, &saves)
            .await
            .unwrap();
        let reply = handle_choose_number(&choose(1), &clock, &repo, &saves)
            .await
            .unwrap();

        // Assert
        match reply.presentation {
            Some(Presentation::Ending(view)) => {
                assert!(view.is_canonical);
                assert!(view.is_prologue);
                assert_eq!(view.remaining_alternatives_count, 0);
                assert_eq!(view.achievement.unwrap().name, "Polite");
            }
            other => panic!("expected Ending, got {other:?}"),
        }
        assert!(matches!(reply.menu, Some(Menu::Chapters { .. })));
        let save = saves.document(USER).unwrap();
        let stats = save.chapter_stats(0, 0).unwrap();
        assert!(stats.obtained_endings.contains(&0));
        assert!(stats.obtained_achievements.contains(&0));
        assert_eq!(
            save.current.stage(),
            CursorStage::ChapterSelection {
                story: 0,
                last_chapter: Some(0)
            }
        );
    }

    #[tokio::test]
    async fn test_chapter_selectable_after_ending() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = content();
        let saves = at(Cursor::positioned(0, 0, "intro", 1));
        handle_choose_number(&choose(1), &clock, &repo, &saves)
            .await
            .unwrap();

        // Act
        let reply = handle_choose_number(&choose(1), &clock, &repo, &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(reply.cursor, Cursor::positioned(0, 1, "harbor", 0));
        assert!(reply.menu.is_none());
    }

    #[tokio::test]
    async fn test_option_out_of_range_leaves_save_untouched() {
        // Arrange
        let clock = FixedClock::standard();
        let saves = at(Cursor::positioned(0, 1, "harbor", 0));
        let before = saves.document(USER).unwrap();

        // Act
        let result = handle_choose_number(&choose(3), &clock, &content(), &saves).await;

        // Assert
        match result.unwrap_err() {
            DomainError::OptionOutOfRange { index, available } => {
                assert_eq!(index, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected OptionOutOfRange, got {other:?}"),
        }
        assert!(saves.writes().is_empty());
        assert_eq!(saves.document(USER).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_story_number_is_user_input_error() {
        let clock = FixedClock::standard();
        let saves = InMemorySaveStore::new();

        let result = handle_choose_number(&choose(9), &clock, &content(), &saves).await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert!(saves.writes().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_chapter_number_is_user_input_error() {
        let clock = FixedClock::standard();
        let saves = at(Cursor::story(0));

        let result = handle_choose_number(&choose(5), &clock, &content(), &saves).await;

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(saves.writes().is_empty());
    }

    #[tokio::test]
    async fn test_chapter_number_in_removed_story_is_content_integrity_error() {
        // Arrange
        let clock = FixedClock::standard();
        let saves = at(Cursor::story(9));

        // Act
        let result = handle_choose_number(&choose(0), &clock, &content(), &saves).await;

        // Assert
        match result.unwrap_err() {
            err @ DomainError::ContentNotFound { .. } => {
                assert_eq!(err.kind(), ErrorKind::ContentIntegrity);
            }
            other => panic!("expected ContentNotFound, got {other:?}"),
        }
        assert!(saves.writes().is_empty());
    }

    #[tokio::test]
    async fn test_direct_chapter_choice_forgets_unknown_last_chapter() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = content();
        let saves = at(Cursor::positioned(0, 1, "sea", 0));
        let unknown = Cursor {
            chapter: Some(99),
            ..Cursor::story(0)
        };
        let known = Cursor {
            chapter: Some(1),
            ..Cursor::story(0)
        };

        // Act
        let forgotten = handle_advance(
            &advance(NavigationInput::DirectCursor { cursor: unknown }),
            &clock,
            &repo,
            &saves,
        )
        .await
        .unwrap();
        let kept = handle_advance(
            &advance(NavigationInput::DirectCursor {
                cursor: known.clone(),
            }),
            &clock,
            &repo,
            &saves,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(forgotten.cursor, Cursor::story(0));
        assert_eq!(kept.cursor, known);
        assert_eq!(saves.document(USER).unwrap().current, known);
    }

    #[tokio::test]
    async fn test_forged_direct_cursor_is_content_integrity_error() {
        // Arrange
        let clock = FixedClock::standard();
        let saves = at(Cursor::positioned(0, 1, "sea", 0));
        let forged = Cursor::positioned(0, 1, ENDING_STORYLINE, 8);

        // Act
        let result = handle_advance(
            &advance(NavigationInput::DirectCursor { cursor: forged }),
            &clock,
            &content(),
            &saves,
        )
        .await;

        // Assert
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ContentIntegrity);
        assert!(saves.writes().is_empty());
    }

    #[tokio::test]
    async fn test_direct_cursor_from_option_view_advances() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = content();
        let saves = at(Cursor::story(0));
        let reply = handle_advance(
            &advance(NavigationInput::SelectChapter { chapter: 1 }),
            &clock,
            &repo,
            &saves,
        )
        .await
        .unwrap();
        let Some(Presentation::Content(view)) = reply.presentation else {
            panic!("expected Content");
        };
        let button = view.options[1].next.clone();

        // Act
        let reply = handle_advance(
            &advance(NavigationInput::DirectCursor { cursor: button }),
            &clock,
            &repo,
            &saves,
        )
        .await
        .unwrap();

        // Assert
        assert!(matches!(reply.presentation, Some(Presentation::Ending(_))));
        let stats = saves.document(USER).unwrap();
        let stats = stats.chapter_stats(0, 1).unwrap();
        assert!(stats.obtained_endings.contains(&1));
        assert!(stats.obtained_achievements.contains(&1));
    }

    #[tokio::test]
    async fn test_stale_event_is_discarded() {
        // Arrange
        let clock = FixedClock::standard();
        let sent = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let saves = InMemorySaveStore::with_save(
            USER,
            SaveDocument {
                current: Cursor::positioned(0, 1, "harbor", 0),
                last_event_at: Some(sent),
                ..SaveDocument::default()
            },
        );
        let mut command = choose(1);
        command.sent_at = Some(sent);

        // Act
        let stale = handle_choose_number(&command, &clock, &content(), &saves).await;
        command.sent_at = Some(sent + Duration::seconds(1));
        let fresh = handle_choose_number(&command, &clock, &content(), &saves).await;

        // Assert
        assert!(matches!(stale, Err(DomainError::StaleEvent)));
        assert!(fresh.is_ok());
        let writes = saves.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].2.last_event_at, command.sent_at);
    }

    #[tokio::test]
    async fn test_reset_keeps_stats_and_offers_stories() {
        // Arrange
        let clock = FixedClock::standard();
        let mut document = SaveDocument {
            current: Cursor::positioned(0, 1, "sea", 0),
            ..SaveDocument::default()
        };
        document.chapter_stats_mut(0, 1).obtained_endings.insert(2);
        let saves = InMemorySaveStore::with_save(USER, document);
        let command = ResetProgress {
            correlation_id: Uuid::new_v4(),
            user_id: USER,
            sent_at: None,
        };

        // Act
        let reply = handle_reset(&command, &clock, &content(), &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(reply.cursor, Cursor::default());
        assert_eq!(reply.menu.unwrap().ids(), vec![0, 1]);
        let save = saves.document(USER).unwrap();
        assert_eq!(save.current, Cursor::default());
        assert!(save.chapter_stats(0, 1).unwrap().obtained_endings.contains(&2));
    }

    #[tokio::test]
    async fn test_failed_write_reports_persistence_error() {
        let clock = FixedClock::standard();
        let saves = FailingSaveStore::on_write();

        let result = handle_choose_number(&choose(1), &clock, &content(), &saves).await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_content_lookup_failure_writes_nothing() {
        let clock = FixedClock::standard();
        let saves = InMemorySaveStore::new();

        let result =
            handle_choose_number(&choose(1), &clock, &FailingContentRepository, &saves).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(saves.writes().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_write_is_rejected() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = content();
        let saves = InMemorySaveStore::new();
        let stale_read = saves.get_save(USER).await.unwrap();
        handle_choose_number(&choose(2), &clock, &repo, &saves)
            .await
            .unwrap();

        // Act
        let result = navigate(
            &choose(1),
            stale_read,
            &NavigationInput::SelectStory { story: 0 },
            None,
            &clock,
            &repo,
            &saves,
        )
        .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict {
                expected: 0,
                actual: 1,
                ..
            })
        ));
    }
}
