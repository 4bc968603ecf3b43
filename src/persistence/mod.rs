//! On-disk state: the chat history and bookmark lists as pretty-printed JSON
//! arrays, and the last generated script as a single overwritten file.

use crate::config::Config;
use crate::core::error::AssistError;
use crate::store::item::{ChatItem, MAX_ITEMS};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "chat_history.json";
pub const BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    data_dir: PathBuf,
    script_dir: PathBuf,
    script_file_name: String,
}

impl PersistenceGateway {
    pub fn new(data_dir: PathBuf, script_dir: PathBuf, script_file_name: String) -> Self {
        Self {
            data_dir,
            script_dir,
            script_file_name,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.data_dir(),
            config.script_dir(),
            config.script_file_name.clone(),
        )
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE)
    }

    pub fn script_path(&self) -> PathBuf {
        self.script_dir.join(&self.script_file_name)
    }

    pub fn save_history(&self, items: &[ChatItem]) -> Result<(), AssistError> {
        save_items(&self.history_path(), items)
    }

    pub fn load_history(&self) -> Result<Vec<ChatItem>, AssistError> {
        load_items(&self.history_path())
    }

    pub fn save_bookmarks(&self, items: &[ChatItem]) -> Result<(), AssistError> {
        save_items(&self.bookmarks_path(), items)
    }

    pub fn load_bookmarks(&self) -> Result<Vec<ChatItem>, AssistError> {
        load_items(&self.bookmarks_path())
    }

    /// Overwrites the script file and returns where it was written.
    pub fn save_script_file(&self, content: &str) -> Result<PathBuf, AssistError> {
        fs::create_dir_all(&self.script_dir)?;
        let path = self.script_path();
        fs::write(&path, content)?;
        tracing::info!("script written to {}", path.display());
        Ok(path)
    }
}

fn save_items(path: &Path, items: &[ChatItem]) -> Result<(), AssistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    tracing::debug!("saved {} items to {}", items.len(), path.display());
    Ok(())
}

fn load_items(path: &Path) -> Result<Vec<ChatItem>, AssistError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let values: Vec<Value> = serde_json::from_str(&contents)?;
    let mut items: Vec<ChatItem> = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<ChatItem>(value) {
            Ok(item) if items.iter().any(|existing| existing.id == item.id) => {
                tracing::warn!("dropping duplicate id {} in {}", item.id, path.display());
            }
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!("dropping malformed entry in {}: {}", path.display(), e);
            }
        }
    }

    if items.len() > MAX_ITEMS {
        tracing::warn!(
            "{} holds {} items, keeping the first {}",
            path.display(),
            items.len(),
            MAX_ITEMS
        );
        items.truncate(MAX_ITEMS);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gateway(root: &Path) -> PersistenceGateway {
        PersistenceGateway::new(
            root.join("data"),
            root.join("lisp"),
            "direction.lsp".to_string(),
        )
    }

    fn item(id: i64, text: &str) -> ChatItem {
        ChatItem {
            id,
            text: text.to_string(),
            full_text: format!("{} (full)", text),
        }
    }

    #[test]
    fn history_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        let items = vec![item(3, "c"), item(1, "a"), item(2, "b")];

        gw.save_history(&items).unwrap();
        assert_eq!(gw.load_history().unwrap(), items);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());

        assert!(gw.load_bookmarks().unwrap().is_empty());

        gw.save_bookmarks(&[item(1, "a")]).unwrap();
        fs::remove_file(gw.bookmarks_path()).unwrap();
        assert!(gw.load_bookmarks().unwrap().is_empty());
    }

    #[test]
    fn repeated_loads_are_identical() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        gw.save_bookmarks(&[item(1, "a"), item(2, "b")]).unwrap();

        assert_eq!(gw.load_bookmarks().unwrap(), gw.load_bookmarks().unwrap());
    }

    #[test]
    fn saved_json_is_pretty_printed() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        gw.save_history(&[item(7, "x")]).unwrap();

        let raw = fs::read_to_string(gw.history_path()).unwrap();
        assert!(raw.contains("\n  {"));
        assert!(raw.contains("\"fullText\""));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(
            gw.history_path(),
            r#"[
                {"id": 1, "text": "ok", "fullText": "ok"},
                {"id": "two", "text": "bad id", "fullText": "bad"},
                {"id": 3, "text": "missing full text"},
                {"id": 1, "text": "dup", "fullText": "dup"},
                {"id": 4, "text": "ok too", "fullText": "ok too"}
            ]"#,
        )
        .unwrap();

        let loaded = gw.load_history().unwrap();
        let ids: Vec<i64> = loaded.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn oversized_lists_are_truncated() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        let items: Vec<ChatItem> = (1..=8).map(|i| item(i, "n")).collect();
        gw.save_history(&items).unwrap();

        let loaded = gw.load_history().unwrap();
        assert_eq!(loaded.len(), MAX_ITEMS);
        assert_eq!(loaded[0].id, 1);
    }

    #[test]
    fn non_array_document_is_an_error() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(gw.bookmarks_path(), "{\"id\": 1}").unwrap();

        assert!(matches!(
            gw.load_bookmarks(),
            Err(AssistError::Serialization(_))
        ));
    }

    #[test]
    fn script_file_is_overwritten() {
        let dir = tempdir().unwrap();
        let gw = gateway(dir.path());

        let first = gw.save_script_file("(princ \"one\")").unwrap();
        let second = gw.save_script_file("(princ \"two\")").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("lisp").join("direction.lsp"));
        assert_eq!(fs::read_to_string(second).unwrap(), "(princ \"two\")");
    }
}
