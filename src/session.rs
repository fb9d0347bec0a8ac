//! Per-chat session store.
//!
//! One `SessionStore` is constructed at process start and shared (it is a
//! cheap `Arc` clone) by the dispatcher, the dialogue engine and the
//! scheduled notifications. Sessions are created lazily on first access and
//! live for the process lifetime.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;

use crate::languages::Language;

/// Stage of the interactive translation dialogue.
///
/// Selected languages live inside the variants, so they exist exactly while
/// the dialogue is past the corresponding step and vanish on `Idle`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingSourceLanguage,
    AwaitingTargetLanguage {
        source: Language,
    },
    AwaitingText {
        source: Language,
        target: Language,
    },
}

impl DialogueState {
    pub fn source_language(&self) -> Option<Language> {
        match self {
            DialogueState::AwaitingTargetLanguage { source }
            | DialogueState::AwaitingText { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn target_language(&self) -> Option<Language> {
        match self {
            DialogueState::AwaitingText { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Transient state of one chat
#[derive(Clone, Debug, Default)]
pub struct ChatSession {
    pub default_city: Option<String>,
    pub dialogue: DialogueState,
    /// Telegram UI language last seen in this chat, used for scheduled messages
    pub language_code: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ChatId, ChatSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the chat's session as one critical section.
    ///
    /// The closure is synchronous, so a read-modify-write can never be
    /// interleaved with another handler suspended on I/O.
    pub fn with_session<R>(&self, chat_id: ChatId, f: impl FnOnce(&mut ChatSession) -> R) -> R {
        let mut sessions = self.sessions.lock();
        f(sessions.entry(chat_id).or_default())
    }

    /// Copy of the chat's session; does not create one
    pub fn snapshot(&self, chat_id: ChatId) -> ChatSession {
        self.sessions
            .lock()
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn dialogue_state(&self, chat_id: ChatId) -> DialogueState {
        self.snapshot(chat_id).dialogue
    }

    pub fn default_city(&self, chat_id: ChatId) -> Option<String> {
        self.sessions
            .lock()
            .get(&chat_id)
            .and_then(|session| session.default_city.clone())
    }

    pub fn set_default_city(&self, chat_id: ChatId, city: impl Into<String>) {
        let city = city.into();
        self.with_session(chat_id, |session| session.default_city = Some(city));
    }

    pub fn language_code(&self, chat_id: ChatId) -> Option<String> {
        self.sessions
            .lock()
            .get(&chat_id)
            .and_then(|session| session.language_code.clone())
    }

    /// Remember the UI language of the latest interaction
    pub fn remember_language(&self, chat_id: ChatId, language_code: Option<&str>) {
        if let Some(code) = language_code {
            self.with_session(chat_id, |session| {
                if session.language_code.as_deref() != Some(code) {
                    session.language_code = Some(code.to_string());
                }
            });
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
