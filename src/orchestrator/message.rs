use crate::providers::{self, Role};

pub const GREETING: &str = "こんにちは！AutoCADについて、ご質問がございましたらお気軽にどうぞ。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// How a message should be rendered. Set when the message is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Script,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub sender: Sender,
    pub kind: MessageKind,
}

/// The visible conversation, oldest first.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        conversation.push(Sender::Bot, MessageKind::Text, GREETING);
        conversation
    }

    pub fn push(&mut self, sender: Sender, kind: MessageKind, content: &str) -> Message {
        let message = Message {
            id: self.next_id,
            content: content.to_string(),
            sender,
            kind,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Back to the greeting alone. Ids keep increasing across resets.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.push(Sender::Bot, MessageKind::Text, GREETING);
    }

    /// The conversation as role-tagged completion messages.
    pub fn completion_history(&self) -> Vec<providers::Message> {
        self.messages
            .iter()
            .map(|m| {
                let role = match m.sender {
                    Sender::User => Role::User,
                    Sender::Bot => Role::Assistant,
                };
                providers::Message::new(role, m.content.clone())
            })
            .collect()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
