//! Per-chat to-do lists kept in memory.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use teloxide::types::ChatId;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, Default)]
pub struct TodoStore {
    lists: Arc<Mutex<HashMap<ChatId, Vec<String>>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task; returns its 1-based position
    pub fn add(&self, chat_id: ChatId, task: impl Into<String>) -> usize {
        let mut lists = self.lists.lock();
        let list = lists.entry(chat_id).or_default();
        list.push(task.into());
        list.len()
    }

    pub fn list(&self, chat_id: ChatId) -> Vec<String> {
        self.lists.lock().get(&chat_id).cloned().unwrap_or_default()
    }

    /// Remove the task at a 1-based position
    pub fn remove(&self, chat_id: ChatId, position: usize) -> AppResult<String> {
        let mut lists = self.lists.lock();
        match lists.get_mut(&chat_id) {
            Some(list) if (1..=list.len()).contains(&position) => Ok(list.remove(position - 1)),
            _ => Err(AppError::NotFound(format!("task #{}", position))),
        }
    }
}
