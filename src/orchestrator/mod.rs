pub mod caption;
pub mod events;
pub mod message;
pub mod pipeline;

use crate::core::error::AssistError;
use crate::shell::bridge::Bridge;
use caption::CaptionTimer;
use events::{AppEvent, EventBus};
use message::{Conversation, Message, MessageKind, Sender};
use pipeline::{CodeStage, Explanation, ExplanationStage, GeneratedScript};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const APOLOGY: &str = "申し訳ありません。エラーが発生しました。";

const THINKING_CAPTION: &str = "考え中...";
const DONE_CAPTION: &str = "できました！";
const ERROR_CAPTION: &str = "うまくいきませんでした…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed {
        script: GeneratedScript,
        explanation: Option<Explanation>,
    },
    /// A stage failed and the apology was shown instead.
    Failed,
}

pub struct OrchestratorOptions {
    pub show_code: bool,
    pub show_chat: bool,
    pub caption_revert: Duration,
}

/// Owns the conversation and runs one two-stage turn at a time.
pub struct Orchestrator {
    conversation: Mutex<Conversation>,
    code_stage: CodeStage,
    explanation_stage: ExplanationStage,
    bridge: Arc<Bridge>,
    bus: EventBus,
    caption: CaptionTimer,
    busy: AtomicBool,
    show_code: AtomicBool,
    show_chat: AtomicBool,
    selection_count: Mutex<Option<u32>>,
}

/// Clears the busy flag however the turn ends.
struct TurnGuard<'a>(&'a AtomicBool);

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Orchestrator {
    pub fn new(
        code_stage: CodeStage,
        explanation_stage: ExplanationStage,
        bridge: Arc<Bridge>,
        bus: EventBus,
        options: OrchestratorOptions,
    ) -> Self {
        tracing::info!(
            "code stage: {}, explanation stage: {}",
            code_stage.provider_name(),
            explanation_stage.provider_name()
        );
        Self {
            conversation: Mutex::new(Conversation::new()),
            code_stage,
            explanation_stage,
            bridge,
            caption: CaptionTimer::new(options.caption_revert, bus.clone()),
            bus,
            busy: AtomicBool::new(false),
            show_code: AtomicBool::new(options.show_code),
            show_chat: AtomicBool::new(options.show_chat),
            selection_count: Mutex::new(None),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn messages(&self) -> Vec<Message> {
        self.conversation().messages().to_vec()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn show_code(&self) -> bool {
        self.show_code.load(Ordering::SeqCst)
    }

    pub fn set_show_code(&self, value: bool) {
        self.show_code.store(value, Ordering::SeqCst);
    }

    pub fn show_chat(&self) -> bool {
        self.show_chat.load(Ordering::SeqCst)
    }

    pub fn set_show_chat(&self, value: bool) {
        self.show_chat.store(value, Ordering::SeqCst);
    }

    pub fn selection_count(&self) -> Option<u32> {
        *self
            .selection_count
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Count forwarded by the CAD host; overrides the drawing-state dump.
    pub fn set_selection_count(&self, count: u32) {
        *self
            .selection_count
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(count);
        self.bus.publish(AppEvent::SelectionCount(count));
    }

    /// Back to the greeting.
    pub fn reset(&self) {
        self.conversation().reset();
        self.bus.publish(AppEvent::ConversationReset);
    }

    /// Runs one turn. Stage failures end in the apology message rather than
    /// an error; only bad input or an overlapping turn are returned as `Err`.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome, AssistError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistError::Input("empty prompt".to_string()));
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AssistError::TurnInProgress);
        }
        let _guard = TurnGuard(&self.busy);

        self.caption.cancel();
        let history = {
            let mut conversation = self.conversation();
            conversation.push(Sender::User, MessageKind::Text, text);
            conversation.completion_history()
        };
        self.bus.publish(AppEvent::NewChat(text.to_string()));
        self.bus
            .publish(AppEvent::HoverCaptionSet(THINKING_CAPTION.to_string()));

        let outcome = match self.run_stages(text, &history).await {
            Ok(outcome) => {
                self.bus
                    .publish(AppEvent::HoverCaptionSet(DONE_CAPTION.to_string()));
                outcome
            }
            Err(e) => {
                tracing::warn!("turn failed: {}", e);
                self.push_bot(MessageKind::Text, APOLOGY);
                self.bus
                    .publish(AppEvent::HoverCaptionSet(ERROR_CAPTION.to_string()));
                self.bus.publish(AppEvent::ResponseComplete);
                TurnOutcome::Failed
            }
        };
        self.caption.restart();
        Ok(outcome)
    }

    async fn run_stages(
        &self,
        request: &str,
        history: &[crate::providers::Message],
    ) -> Result<TurnOutcome, AssistError> {
        let script = self
            .code_stage
            .run(history, self.selection_count())
            .await?;

        let bridge = self.bridge.clone();
        let source = script.command_source();
        let saved = tokio::task::spawn_blocking(move || bridge.save_lisp_file(&source))
            .await
            .map_err(|e| AssistError::Unknown(format!("script writer stopped: {}", e)))?;
        if !saved.success {
            tracing::warn!("script not written: {}", saved.error.unwrap_or_default());
        }

        if self.show_code() {
            self.push_bot(MessageKind::Script, &script.code);
        }
        self.bus.publish(AppEvent::CodeReady(script.code.clone()));

        if !self.show_chat() {
            self.bus.publish(AppEvent::ResponseComplete);
            return Ok(TurnOutcome::Completed {
                script,
                explanation: None,
            });
        }

        let explanation = self.explanation_stage.run(request, &script).await?;
        self.push_bot(MessageKind::Text, &explanation.text);
        self.bus
            .publish(AppEvent::ResponseReady(explanation.text.clone()));

        Ok(TurnOutcome::Completed {
            script,
            explanation: Some(explanation),
        })
    }

    fn push_bot(&self, kind: MessageKind, content: &str) {
        self.conversation().push(Sender::Bot, kind, content);
    }

    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(|e| e.into_inner())
    }
}
