use crate::config::{Config, Provider};
use crate::core::error::AssistError;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "AutoLISP assistant for AutoCAD", long_about = None)]
pub struct Args {
    /// Number of objects selected in the drawing, as passed by the CAD host
    pub selection_count: Option<u32>,

    /// Run a single request and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Show generated scripts in the conversation [default: from config]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_code: Option<bool>,

    /// Ask for an explanation after each script [default: from config]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_chat: Option<bool>,

    /// Keep the window above the CAD application
    #[arg(long)]
    pub always_on_top: bool,

    /// Provider for script generation [possible values: groq, deepseek]
    #[arg(long)]
    pub code_provider: Option<String>,

    /// Provider for explanations [possible values: groq, deepseek]
    #[arg(long)]
    pub explain_provider: Option<String>,
}

fn parse_provider(name: &str) -> Result<Provider, AssistError> {
    Provider::from_str(name).ok_or_else(|| {
        AssistError::Config(format!(
            "Unknown provider '{}' (expected groq or deepseek)",
            name
        ))
    })
}

impl Args {
    /// Command-line flags take precedence over the config file.
    pub fn apply_to(&self, config: &mut Config) -> Result<(), AssistError> {
        if let Some(show_code) = self.show_code {
            config.show_code = show_code;
        }
        if let Some(show_chat) = self.show_chat {
            config.show_chat = show_chat;
        }
        if self.always_on_top {
            config.always_on_top = true;
        }
        if let Some(name) = &self.code_provider {
            config.code_provider = parse_provider(name)?;
        }
        if let Some(name) = &self.explain_provider {
            config.explain_provider = parse_provider(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_selection_count_and_flags() {
        let args = Args::try_parse_from([
            "acadchat",
            "3",
            "--show-code",
            "--show-chat",
            "false",
            "--code-provider",
            "deepseek",
        ])
        .unwrap();
        assert_eq!(args.selection_count, Some(3));
        assert_eq!(args.show_code, Some(true));
        assert_eq!(args.show_chat, Some(false));

        let mut config = Config {
            show_code: false,
            ..Config::default()
        };
        args.apply_to(&mut config).unwrap();
        assert!(config.show_code);
        assert!(!config.show_chat);
        assert_eq!(config.code_provider, Provider::DeepSeek);
        assert_eq!(config.explain_provider, Provider::DeepSeek);
    }

    #[test]
    fn absent_flags_keep_config() {
        let args = Args::try_parse_from(["acadchat", "--prompt", "円を描いて"]).unwrap();
        let mut config = Config {
            show_chat: false,
            ..Config::default()
        };
        args.apply_to(&mut config).unwrap();

        assert_eq!(args.prompt.as_deref(), Some("円を描いて"));
        assert_eq!(args.selection_count, None);
        assert!(!config.show_chat);
        assert!(config.show_code);
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let args = Args {
            explain_provider: Some("openai".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            args.apply_to(&mut Config::default()),
            Err(AssistError::Config(_))
        ));
    }
}
