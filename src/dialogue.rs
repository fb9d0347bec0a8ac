//! Interactive translation dialogue.
//!
//! ```text
//! Idle ──begin──► AwaitingSourceLanguage ──src──► AwaitingTargetLanguage ──tgt──► AwaitingText
//!  ▲                                                                                 │
//!  └────────────────────────── text (translated, empty or failed) ───────────────────┘
//! ```
//!
//! `begin` is accepted from every state and restarts the flow. All transitions
//! are synchronous critical sections on the [`SessionStore`]; only the
//! translation request itself is awaited, after the chat is already `Idle`.

use teloxide::types::ChatId;

use crate::errors::{error_logging, AppResult, InvalidInput};
use crate::languages::{find_language, Language};
use crate::services::Translator;
use crate::session::{DialogueState, SessionStore};

/// Which selection a language button belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStep {
    Source,
    Target,
}

/// Result of a language button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    SourceSelected(Language),
    TargetSelected(Language),
    /// The press did not match the current step and left the state untouched
    Ignored,
}

/// Result of offering a free-text message to the dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// No translation was pending; the text belongs to other handlers
    PassThrough,
    Translated { text: String },
    /// The provider failed or returned nothing
    Unavailable,
}

/// Translation dialogue engine over the shared session store
#[derive(Clone, Debug)]
pub struct TranslationDialogue {
    sessions: SessionStore,
}

impl TranslationDialogue {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Start (or restart) the flow, dropping any earlier selections
    pub fn begin(&self, chat_id: ChatId) {
        self.sessions.with_session(chat_id, |session| {
            session.dialogue = DialogueState::AwaitingSourceLanguage;
        });
    }

    /// Apply a language selection.
    ///
    /// A press for the wrong step is ignored without validating the code, so a
    /// stale keyboard can never move the dialogue.
    pub fn select(
        &self,
        chat_id: ChatId,
        step: LanguageStep,
        code: &str,
    ) -> AppResult<SelectionOutcome> {
        self.sessions.with_session(chat_id, |session| {
            let next = match (step, &session.dialogue) {
                (LanguageStep::Source, DialogueState::AwaitingSourceLanguage) => {
                    let source = find_language(code)
                        .ok_or_else(|| InvalidInput::Language(code.to_string()))?;
                    (
                        DialogueState::AwaitingTargetLanguage { source },
                        SelectionOutcome::SourceSelected(source),
                    )
                }
                (LanguageStep::Target, DialogueState::AwaitingTargetLanguage { source }) => {
                    let target = find_language(code)
                        .ok_or_else(|| InvalidInput::Language(code.to_string()))?;
                    (
                        DialogueState::AwaitingText {
                            source: *source,
                            target,
                        },
                        SelectionOutcome::TargetSelected(target),
                    )
                }
                _ => return Ok(SelectionOutcome::Ignored),
            };

            session.dialogue = next.0;
            Ok(next.1)
        })
    }

    /// Take the selected language pair if text is awaited, resetting to `Idle`
    pub fn take_pending(&self, chat_id: ChatId) -> Option<(Language, Language)> {
        self.sessions
            .with_session(chat_id, |session| match session.dialogue {
                DialogueState::AwaitingText { source, target } => {
                    session.dialogue = DialogueState::Idle;
                    Some((source, target))
                }
                _ => None,
            })
    }

    /// Offer a free-text message to the dialogue.
    ///
    /// The chat is back in `Idle` before the provider is called, whatever
    /// the provider does afterwards.
    pub async fn handle_text(
        &self,
        chat_id: ChatId,
        text: &str,
        translator: &dyn Translator,
    ) -> TextOutcome {
        let Some((source, target)) = self.take_pending(chat_id) else {
            return TextOutcome::PassThrough;
        };

        match translator.translate(text, source.code, target.code).await {
            Ok(translated) if !translated.trim().is_empty() => {
                TextOutcome::Translated { text: translated }
            }
            Ok(_) => {
                tracing::warn!(
                    chat_id = %chat_id,
                    source = source.code,
                    target = target.code,
                    "Translation came back empty"
                );
                TextOutcome::Unavailable
            }
            Err(e) => {
                error_logging::log_external_error(
                    &e,
                    "translation",
                    "handle_text",
                    Some(chat_id.0),
                );
                TextOutcome::Unavailable
            }
        }
    }

    pub fn state(&self, chat_id: ChatId) -> DialogueState {
        self.sessions.dialogue_state(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_selection_for_wrong_step_is_ignored() {
        let dialogue = TranslationDialogue::new(SessionStore::new());
        let chat = ChatId(1);

        // Idle chat: both kinds of press are ignored
        assert_eq!(
            dialogue.select(chat, LanguageStep::Source, "en").unwrap(),
            SelectionOutcome::Ignored
        );
        assert_eq!(dialogue.state(chat), DialogueState::Idle);

        dialogue.begin(chat);
        assert_eq!(
            dialogue.select(chat, LanguageStep::Target, "ru").unwrap(),
            SelectionOutcome::Ignored
        );
        assert_eq!(dialogue.state(chat), DialogueState::AwaitingSourceLanguage);
    }

    #[test]
    fn test_unknown_language_keeps_state() {
        let dialogue = TranslationDialogue::new(SessionStore::new());
        let chat = ChatId(2);
        dialogue.begin(chat);

        let err = dialogue.select(chat, LanguageStep::Source, "xx").unwrap_err();
        assert_eq!(
            err,
            AppError::InvalidInput(InvalidInput::Language("xx".to_string()))
        );
        assert_eq!(dialogue.state(chat), DialogueState::AwaitingSourceLanguage);
    }

    #[test]
    fn test_take_pending_resets_to_idle() {
        let dialogue = TranslationDialogue::new(SessionStore::new());
        let chat = ChatId(3);
        assert!(dialogue.take_pending(chat).is_none());

        dialogue.begin(chat);
        dialogue.select(chat, LanguageStep::Source, "de").unwrap();
        dialogue.select(chat, LanguageStep::Target, "de").unwrap();

        let (source, target) = dialogue.take_pending(chat).unwrap();
        assert_eq!(source.code, "de");
        assert_eq!(target.code, "de");
        assert_eq!(dialogue.state(chat), DialogueState::Idle);
        assert!(dialogue.take_pending(chat).is_none());
    }
}
