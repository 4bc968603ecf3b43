pub mod item;

use crate::core::error::AssistError;
use crate::orchestrator::events::{AppEvent, EventBus};
use crate::shell::bridge::Bridge;
use item::{ChatItem, MAX_ITEMS};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    History,
    Bookmarks,
}

/// Recent prompts and bookmarks, mirrored to disk through the bridge on
/// every change.
pub struct ChatStore {
    bridge: Arc<Bridge>,
    bus: EventBus,
    history: Vec<ChatItem>,
    bookmarks: Vec<ChatItem>,
}

impl ChatStore {
    /// Loads both lists once. A list that fails to load starts empty.
    pub fn load(bridge: Arc<Bridge>, bus: EventBus) -> Self {
        let history = bridge.load_history().data.unwrap_or_default();
        let bookmarks = bridge.load_bookmarks().data.unwrap_or_default();

        tracing::info!(
            "loaded {} history items and {} bookmarks",
            history.len(),
            bookmarks.len()
        );
        Self {
            bridge,
            bus,
            history,
            bookmarks,
        }
    }

    pub fn history(&self) -> &[ChatItem] {
        &self.history
    }

    pub fn bookmarks(&self) -> &[ChatItem] {
        &self.bookmarks
    }

    pub fn list(&self, kind: ListKind) -> &[ChatItem] {
        match kind {
            ListKind::History => &self.history,
            ListKind::Bookmarks => &self.bookmarks,
        }
    }

    /// Puts an entry's full text back into the prompt input.
    pub fn recall(&self, kind: ListKind, index: usize) -> Option<&ChatItem> {
        let item = self.list(kind).get(index)?;
        self.bus.publish(AppEvent::InputFieldSet(item.full_text.clone()));
        Some(item)
    }

    /// Records a submitted prompt at the head of the history.
    pub fn on_new_chat(&mut self, text: &str) -> &ChatItem {
        let item = ChatItem::new(text, &self.history);
        self.history.insert(0, item);
        self.history.truncate(MAX_ITEMS);
        self.persist_history();
        &self.history[0]
    }

    /// Moves a history entry into the bookmarks.
    pub fn pin(&mut self, id: i64) -> Result<&ChatItem, AssistError> {
        if self.bookmarks.len() >= MAX_ITEMS {
            return Err(AssistError::PinLimitReached(MAX_ITEMS));
        }
        let position = self
            .history
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AssistError::NotFound(format!("history item {}", id)))?;

        let source = self.history.remove(position);
        let pinned = source.relabelled_for(&self.bookmarks);
        self.bookmarks.push(pinned);

        self.persist_history();
        self.persist_bookmarks();
        Ok(&self.bookmarks[self.bookmarks.len() - 1])
    }

    /// Removes a bookmark. Unknown ids are ignored.
    pub fn unpin(&mut self, id: i64) {
        self.bookmarks.retain(|item| item.id != id);
        self.persist_bookmarks();
    }

    fn persist_history(&self) {
        let response = self.bridge.save_history(&self.history);
        if !response.success {
            tracing::warn!(
                "history kept in memory only: {}",
                response.error.unwrap_or_default()
            );
        }
    }

    fn persist_bookmarks(&self) {
        let response = self.bridge.save_bookmarks(&self.bookmarks);
        if !response.success {
            tracing::warn!(
                "bookmarks kept in memory only: {}",
                response.error.unwrap_or_default()
            );
        }
    }
}
