use crate::core::error::AssistError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    DeepSeek,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Some(Provider::Groq),
            "deepseek" => Some(Provider::DeepSeek),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::DeepSeek => "deepseek-chat",
        }
    }

    /// Environment variable consulted when the config file has no key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Provider settings after config, environment and defaults are merged.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: HashMap<Provider, ProviderConfig>,
    pub code_provider: Provider,
    pub explain_provider: Provider,
    pub show_code: bool,
    pub show_chat: bool,
    pub always_on_top: bool,
    pub data_dir: Option<PathBuf>,
    pub script_dir: Option<PathBuf>,
    pub script_file_name: String,
    pub drawing_state_file: Option<PathBuf>,
    pub caption_revert_secs: u64,
    pub request_timeout_secs: u64,
    pub instance_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            code_provider: Provider::Groq,
            explain_provider: Provider::DeepSeek,
            show_code: true,
            show_chat: true,
            always_on_top: false,
            data_dir: None,
            script_dir: None,
            script_file_name: "direction.lsp".to_string(),
            drawing_state_file: None,
            caption_revert_secs: 5,
            request_timeout_secs: 60,
            instance_port: 47631,
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".acadchat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn load() -> Result<Config, AssistError> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the config at `path`, writing a default one when it is missing.
    pub fn load_from(path: &Path) -> Result<Config, AssistError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config = serde_yml::from_str::<Config>(&contents)
                .map_err(|e| AssistError::Config(format!("Parse {}: {}", path.display(), e)))?;
            return Ok(config);
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("could not write default config to {}: {}", path.display(), e);
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AssistError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Self::config_dir)
    }

    pub fn script_dir(&self) -> PathBuf {
        self.script_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("lisp"))
    }

    pub fn drawing_state_path(&self) -> PathBuf {
        self.drawing_state_file
            .clone()
            .unwrap_or_else(|| self.script_dir().join("output.md"))
    }

    pub fn resolve(&self, provider: Provider) -> ResolvedProvider {
        let configured = self.providers.get(&provider).cloned().unwrap_or_default();

        let api_key = configured
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env::var(provider.api_key_env()).ok())
            .filter(|k| !k.trim().is_empty());

        ResolvedProvider {
            provider,
            api_key,
            base_url: configured
                .base_url
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            model: configured
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.code_provider, Provider::Groq);
        assert_eq!(config.explain_provider, Provider::DeepSeek);
        assert_eq!(config.script_file_name, "direction.lsp");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "show_chat: false\nscript_file_name: direction2.lsp\nproviders:\n  groq:\n    model: llama-3.1-8b-instant\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.show_chat);
        assert!(config.show_code);
        assert_eq!(config.script_file_name, "direction2.lsp");

        let groq = config.resolve(Provider::Groq);
        assert_eq!(groq.model, "llama-3.1-8b-instant");
        assert_eq!(groq.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "show_code: [not, a, bool").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(AssistError::Config(_))
        ));
    }

    #[test]
    fn configured_provider_overrides_defaults() {
        let mut config = Config::default();
        config.providers.insert(
            Provider::DeepSeek,
            ProviderConfig {
                api_key: Some("sk-test".to_string()),
                base_url: Some("http://localhost:9999".to_string()),
                model: None,
            },
        );

        let resolved = config.resolve(Provider::DeepSeek);
        assert_eq!(resolved.api_key.as_deref(), Some("sk-test"));
        assert_eq!(resolved.base_url, "http://localhost:9999");
        assert_eq!(resolved.model, "deepseek-chat");
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!(Provider::from_str("Groq"), Some(Provider::Groq));
        assert_eq!(Provider::from_str("DEEPSEEK"), Some(Provider::DeepSeek));
        assert_eq!(Provider::from_str("openai"), None);
    }

    #[test]
    fn paths_derive_from_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/acad")),
            ..Config::default()
        };
        assert_eq!(config.script_dir(), PathBuf::from("/tmp/acad/lisp"));
        assert_eq!(
            config.drawing_state_path(),
            PathBuf::from("/tmp/acad/lisp/output.md")
        );
    }
}
