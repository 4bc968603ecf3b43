use crate::core::error::AssistError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod base_client;
pub mod deepseek;
pub mod factory;
pub mod groq;
pub mod openai_compatible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn get_response(&self, messages: &[Message]) -> Result<String, AssistError>;
}

/// Strip markdown fencing from a model response, keeping the code inside.
pub fn process_response(content: &str) -> String {
    let content = content.trim();

    if content.is_empty() {
        return String::new();
    }

    if let Some(start_idx) = content.find("```") {
        let after_start = &content[start_idx + 3..];
        let code_block = match after_start.find("```") {
            Some(end_idx) => &after_start[..end_idx],
            None => after_start,
        };

        // Remove language specifier if present
        if let Some(first_newline) = code_block.find('\n') {
            let first_line = code_block[..first_newline].trim();
            if !first_line.starts_with('(') {
                return code_block[first_newline + 1..].trim().to_string();
            }
        }
        return code_block.trim().to_string();
    }

    content.to_string()
}
