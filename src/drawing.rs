use crate::core::error::AssistError;
use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

static SELECTION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"選択オブジェクトの数:\s*(\d+)").expect("valid regex"));
static CENTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"中心座標:\s*([^\r\n]+)").expect("valid regex"));

/// Name of the selection set the CAD host creates for the current selection.
pub const SELECTION_SET: &str = "ss_elec";

/// What the CAD host reported about the open drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawingContext {
    pub raw: String,
    pub selection_count: u32,
    pub has_selection_set: bool,
    pub center: Option<String>,
}

impl DrawingContext {
    pub fn parse(raw: &str) -> Self {
        let selection_count = SELECTION_COUNT
            .captures(raw)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);
        let center = CENTER
            .captures(raw)
            .map(|caps| caps[1].trim().to_string())
            .filter(|c| !c.is_empty());

        Self {
            raw: raw.to_string(),
            selection_count,
            has_selection_set: raw.contains(SELECTION_SET),
            center,
        }
    }

    /// Reads the host's dump; a missing file means an empty drawing state.
    pub async fn load(path: &Path) -> Result<Self, AssistError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(Self::parse(&raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn with_selection_count(mut self, count: Option<u32>) -> Self {
        if let Some(count) = count {
            self.selection_count = count;
        }
        self
    }

    /// System instruction for the code-generation model.
    pub fn code_system_prompt(&self) -> String {
        let selection = if self.has_selection_set {
            format!(
                "- 選択セット{set}が既に存在します。新しい選択セットは作らず、対象には直接{set}を使用してください。",
                set = SELECTION_SET
            )
        } else {
            "- 選択セットが存在しない場合は、必要に応じてssgetで選択セットを作成するか、ユーザーに選択させてください。".to_string()
        };
        let center = self.center.as_deref().unwrap_or("0,0");
        let state = if self.raw.trim().is_empty() {
            "(図面情報なし)"
        } else {
            self.raw.trim()
        };

        format!(
            "あなたはAutoLISPコードを生成するアシスタントです。以下のルールに従ってください。\n\
             # 現在の図面状態\n{state}\n\
             # 基本ルール\n\
             - AutoLISPコードを1つだけ出力し、代替案は提示しないでください。\n\
             - コードブロックやマークダウンは使わず、説明文やコメントも含めないでください。\n\
             # 選択オブジェクトの取り扱い\n\
             - 選択オブジェクトの数は {count} です。\n\
             {selection}\n\
             # 基点の取り扱い\n\
             - 基点が指定されていない場合は、図面の中心座標（{center}）を基点として使用してください。\n\
             # 指示語の取り扱い\n\
             - 「この」「これを」などの指示語は、選択セットがある場合はそれを指します。",
            count = self.selection_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DUMP: &str = "# 図面情報\n選択オブジェクトの数: 3\n中心座標: 120.5,80.25,0\n(setq ss_elec (ssget \"_I\"))\n";

    #[test]
    fn parses_host_dump() {
        let ctx = DrawingContext::parse(DUMP);
        assert_eq!(ctx.selection_count, 3);
        assert_eq!(ctx.center.as_deref(), Some("120.5,80.25,0"));
        assert!(ctx.has_selection_set);
    }

    #[test]
    fn missing_fields_fall_back() {
        let ctx = DrawingContext::parse("nothing useful");
        assert_eq!(ctx.selection_count, 0);
        assert_eq!(ctx.center, None);
        assert!(!ctx.has_selection_set);
        assert!(ctx.code_system_prompt().contains("（0,0）"));
    }

    #[tokio::test]
    async fn missing_file_is_empty_state() {
        let dir = tempdir().unwrap();
        let ctx = DrawingContext::load(&dir.path().join("output.md")).await.unwrap();
        assert_eq!(ctx, DrawingContext::default());
    }

    #[tokio::test]
    async fn dump_on_disk_is_parsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.md");
        std::fs::write(&path, DUMP).unwrap();

        let ctx = DrawingContext::load(&path).await.unwrap();
        assert_eq!(ctx.selection_count, 3);
        assert!(ctx.has_selection_set);
    }

    #[test]
    fn prompt_reflects_selection_set_and_override() {
        let prompt = DrawingContext::parse(DUMP)
            .with_selection_count(Some(7))
            .code_system_prompt();
        assert!(prompt.contains("選択オブジェクトの数は 7 です"));
        assert!(prompt.contains("直接ss_elecを使用"));
        assert!(prompt.contains("（120.5,80.25,0）"));
    }
}
