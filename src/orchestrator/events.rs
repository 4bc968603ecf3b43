use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Signals raised by the orchestrator and shell for presentation widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The user submitted a prompt.
    NewChat(String),
    /// The code stage produced a script.
    CodeReady(String),
    /// The explanation stage produced text.
    ResponseReady(String),
    /// The turn finished without an explanation.
    ResponseComplete,
    HoverCaptionSet(String),
    HoverCaptionClear,
    /// Pre-fill the prompt input.
    InputFieldSet(String),
    ConversationReset,
    /// Selection count passed in by the CAD host.
    SelectionCount(u32),
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: AppEvent) {
        tracing::trace!("event: {:?}", event);
        // No subscribers is fine; nothing is rendering yet.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
