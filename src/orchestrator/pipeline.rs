use crate::core::error::AssistError;
use crate::drawing::DrawingContext;
use crate::providers::{LLMProvider, Message, Role};
use crate::script::{extract_lisp, wrap_command};
use std::path::PathBuf;

pub const CLOSING_PHRASE: &str = "このコードを実行しました！";

const EXPLAIN_SYSTEM_PROMPT: &str = "あなたはAutoCAD作業を手伝う明るいアシスタントキャラクターです。\
ユーザーの依頼に対して生成されたAutoLISPコードが何をするのかを、専門用語を避けて日本語で2〜3文で短く説明してください。\
コードそのものは繰り返さないでください。\
最後は必ず「このコードを実行しました！」で締めくくってください。";

const EXPLAIN_REQUEST: &str = "このコードが何をするのか説明してください。";

/// Output of the code stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    /// The model reply as received.
    pub raw: String,
    /// The extracted Lisp body.
    pub code: String,
}

impl GeneratedScript {
    /// The body wrapped as a runnable `CODE` command.
    pub fn command_source(&self) -> String {
        wrap_command(&self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub text: String,
}

/// Turns the conversation into a script for the CAD host.
pub struct CodeStage {
    provider: Box<dyn LLMProvider>,
    drawing_state_path: PathBuf,
}

impl CodeStage {
    pub fn new(provider: Box<dyn LLMProvider>, drawing_state_path: PathBuf) -> Self {
        Self {
            provider,
            drawing_state_path,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn run(
        &self,
        history: &[Message],
        selection_count: Option<u32>,
    ) -> Result<GeneratedScript, AssistError> {
        let drawing = match DrawingContext::load(&self.drawing_state_path).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(
                    "could not read drawing state {}: {}",
                    self.drawing_state_path.display(),
                    e
                );
                DrawingContext::default()
            }
        }
        .with_selection_count(selection_count);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::new(Role::System, drawing.code_system_prompt()));
        messages.extend_from_slice(history);

        tracing::debug!(
            "code stage via {} with {} messages",
            self.provider.name(),
            messages.len()
        );
        let raw = self.provider.get_response(&messages).await?;
        let code = extract_lisp(&raw)?;
        Ok(GeneratedScript { raw, code })
    }
}

/// Describes a generated script in plain language.
pub struct ExplanationStage {
    provider: Box<dyn LLMProvider>,
}

impl ExplanationStage {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn run(
        &self,
        request: &str,
        script: &GeneratedScript,
    ) -> Result<Explanation, AssistError> {
        let messages = [
            Message::new(Role::System, EXPLAIN_SYSTEM_PROMPT),
            Message::new(Role::User, request),
            Message::new(Role::Assistant, script.code.clone()),
            Message::new(Role::User, EXPLAIN_REQUEST),
        ];

        tracing::debug!("explanation stage via {}", self.provider.name());
        let reply = self.provider.get_response(&messages).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(AssistError::Api("empty explanation".to_string()));
        }

        Ok(Explanation {
            text: close_explanation(reply),
        })
    }
}

/// Ends `reply` with exactly one closing phrase. A closing phrase the model
/// already wrote is kept once, whatever punctuation trails it.
fn close_explanation(reply: &str) -> String {
    let is_trailing = |c: char| c.is_whitespace() || matches!(c, '!' | '！' | '。' | '.');
    let phrase = CLOSING_PHRASE.trim_end_matches(is_trailing);
    let body = reply.trim_end_matches(is_trailing);
    match body.strip_suffix(phrase) {
        Some(head) => format!("{}{}", head, CLOSING_PHRASE),
        None => format!("{}\n{}", reply, CLOSING_PHRASE),
    }
}
