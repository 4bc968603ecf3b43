use crate::persistence::PersistenceGateway;
use crate::shell::window::Window;
use crate::store::item::ChatItem;
use serde::Serialize;
use std::sync::Arc;

/// Result envelope handed back to the front end. Failures are carried in
/// `error` and never raised across the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ChatItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    fn ok() -> Self {
        Self {
            success: true,
            file_path: None,
            data: None,
            error: None,
        }
    }

    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            file_path: None,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// The only surface the front end gets onto the shell: persistence of the
/// two lists and the script, plus the always-on-top toggle.
pub struct Bridge {
    gateway: PersistenceGateway,
    window: Arc<dyn Window>,
}

impl Bridge {
    pub fn new(gateway: PersistenceGateway, window: Arc<dyn Window>) -> Self {
        Self { gateway, window }
    }

    pub fn save_lisp_file(&self, content: &str) -> BridgeResponse {
        match self.gateway.save_script_file(content) {
            Ok(path) => BridgeResponse {
                file_path: Some(path.display().to_string()),
                ..BridgeResponse::ok()
            },
            Err(e) => {
                tracing::error!("failed to save script file: {}", e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn save_history(&self, items: &[ChatItem]) -> BridgeResponse {
        match self.gateway.save_history(items) {
            Ok(()) => BridgeResponse::ok(),
            Err(e) => {
                tracing::error!("failed to save history: {}", e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn load_history(&self) -> BridgeResponse {
        match self.gateway.load_history() {
            Ok(items) => BridgeResponse {
                data: Some(items),
                ..BridgeResponse::ok()
            },
            Err(e) => {
                tracing::error!("failed to load history: {}", e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn save_bookmarks(&self, items: &[ChatItem]) -> BridgeResponse {
        match self.gateway.save_bookmarks(items) {
            Ok(()) => BridgeResponse::ok(),
            Err(e) => {
                tracing::error!("failed to save bookmarks: {}", e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn load_bookmarks(&self) -> BridgeResponse {
        match self.gateway.load_bookmarks() {
            Ok(items) => BridgeResponse {
                data: Some(items),
                ..BridgeResponse::ok()
            },
            Err(e) => {
                tracing::error!("failed to load bookmarks: {}", e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn set_always_on_top(&self, value: bool) -> BridgeResponse {
        match self.window.set_always_on_top(value) {
            Ok(()) => BridgeResponse::ok(),
            Err(e) => {
                tracing::warn!("always-on-top({}) failed: {}", value, e);
                BridgeResponse::failure(e)
            }
        }
    }

    pub fn is_always_on_top(&self) -> bool {
        self.window.is_always_on_top()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::error::AssistError;
    use std::fs;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Window double whose always-on-top call can be made to fail.
    pub(crate) struct FakeWindow {
        pub fail: bool,
        pub on_top: AtomicBool,
        pub focused: AtomicUsize,
    }

    impl FakeWindow {
        pub(crate) fn new(fail: bool) -> Self {
            Self {
                fail,
                on_top: AtomicBool::new(false),
                focused: AtomicUsize::new(0),
            }
        }
    }

    impl Window for FakeWindow {
        fn set_always_on_top(&self, value: bool) -> Result<(), AssistError> {
            if self.fail {
                return Err(AssistError::Window("unsupported platform".to_string()));
            }
            self.on_top.store(value, Ordering::SeqCst);
            Ok(())
        }

        fn is_always_on_top(&self) -> bool {
            self.on_top.load(Ordering::SeqCst)
        }

        fn focus(&self) {
            self.focused.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bridge(root: &std::path::Path, fail_window: bool) -> Bridge {
        Bridge::new(
            PersistenceGateway::new(
                root.join("data"),
                root.join("lisp"),
                "direction.lsp".to_string(),
            ),
            Arc::new(FakeWindow::new(fail_window)),
        )
    }

    #[test]
    fn missing_bookmarks_is_success_with_empty_data() {
        let dir = tempdir().unwrap();
        let response = bridge(dir.path(), false).load_bookmarks();

        assert!(response.success);
        assert_eq!(response.data, Some(vec![]));
        assert_eq!(response.error, None);
    }

    #[test]
    fn save_lisp_file_reports_path() {
        let dir = tempdir().unwrap();
        let response = bridge(dir.path(), false).save_lisp_file("(command \"CIRCLE\")");

        assert!(response.success);
        let path = response.file_path.unwrap();
        assert!(path.ends_with("direction.lsp"));
        assert_eq!(fs::read_to_string(path).unwrap(), "(command \"CIRCLE\")");
    }

    #[test]
    fn corrupt_history_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        let b = bridge(dir.path(), false);
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data").join("chat_history.json"), "not json").unwrap();

        let response = b.load_history();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert!(response.error.unwrap().contains("JSON"));
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A file where the data directory should be makes create_dir_all fail.
        fs::write(dir.path().join("data"), "").unwrap();

        let response = bridge(dir.path(), false).save_history(&[]);
        assert!(!response.success);
        assert!(response.error.is_some());
    }

    #[test]
    fn failing_always_on_top_leaves_flag_unset() {
        let dir = tempdir().unwrap();
        let b = bridge(dir.path(), true);

        let response = b.set_always_on_top(true);
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Window error: unsupported platform")
        );
        assert!(!b.is_always_on_top());
    }

    #[test]
    fn response_serializes_in_camel_case() {
        let dir = tempdir().unwrap();
        let response = bridge(dir.path(), false).save_lisp_file("(princ)");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert!(json.get("filePath").is_some());
        assert!(json.get("error").is_none());
        assert!(json.get("data").is_none());
    }
}
