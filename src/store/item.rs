use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in either the history or the bookmarks.
pub const MAX_ITEMS: usize = 5;

/// Characters kept in a label before it is cut off with an ellipsis.
pub const LABEL_CHARS: usize = 20;

/// A recent-history or bookmarked prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatItem {
    pub id: i64,
    pub text: String,
    #[serde(rename = "fullText")]
    pub full_text: String,
}

impl ChatItem {
    /// Creates an item whose id does not collide with any id in `existing`.
    pub fn new(full_text: &str, existing: &[ChatItem]) -> Self {
        Self {
            id: next_id(existing),
            text: label(full_text),
            full_text: full_text.to_string(),
        }
    }

    /// Copies this item with a fresh id for `existing`.
    pub fn relabelled_for(&self, existing: &[ChatItem]) -> Self {
        Self {
            id: next_id(existing),
            text: self.text.clone(),
            full_text: self.full_text.clone(),
        }
    }
}

/// Short label shown in the lists.
pub fn label(full_text: &str) -> String {
    let trimmed = full_text.trim();
    if trimmed.chars().count() <= LABEL_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(LABEL_CHARS).collect();
        format!("{}...", head)
    }
}

fn next_id(existing: &[ChatItem]) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    if existing.iter().any(|item| item.id == now) {
        existing.iter().map(|item| item.id).max().unwrap_or(now) + 1
    } else {
        now
    }
}
