use super::{
    ChatState,
    handler::{
        BookmarksCommand, ChatToggleCommand, ClearCommand, CodeToggleCommand, HelpCommand,
        HistoryCommand, PinCommand, QuitCommand, TopCommand, UnpinCommand, UseCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::AssistError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Runs a line that starts with `/`.
    pub fn execute_line(
        &self,
        line: &str,
        state: &mut ChatState,
    ) -> Result<Option<String>, AssistError> {
        let mut parts = line.trim_start_matches('/').split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();
        self.execute(command, &args, state)
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, AssistError> {
        self.registry.execute(command, args, state)
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("history", HistoryCommand);
    registry.register("bookmarks", BookmarksCommand);
    registry.register("pin", PinCommand);
    registry.register("unpin", UnpinCommand);
    registry.register("use", UseCommand);
    registry.register("code", CodeToggleCommand);
    registry.register("chat", ChatToggleCommand);
    registry.register("top", TopCommand);

    CommandDispatcher::new(Arc::new(registry))
}
