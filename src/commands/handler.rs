use super::ChatState;
use crate::core::error::AssistError;
use crate::store::ListKind;
use crate::store::item::ChatItem;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, AssistError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct HistoryCommand;
pub struct BookmarksCommand;
pub struct PinCommand;
pub struct UnpinCommand;
pub struct UseCommand;
pub struct CodeToggleCommand;
pub struct ChatToggleCommand;
pub struct TopCommand;

/// Resolves a 1-based position from the command line.
fn parse_position(arg: Option<&&str>, len: usize) -> Result<usize, AssistError> {
    let arg = arg.ok_or_else(|| AssistError::Input("Missing item number".to_string()))?;
    match arg.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(AssistError::NotFound(format!("item {}", arg))),
    }
}

/// `on`, `off`, or nothing to flip the current value.
fn parse_switch(args: &[&str], current: bool) -> Result<bool, AssistError> {
    match args.first().copied() {
        None => Ok(!current),
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        Some(other) => Err(AssistError::Input(format!(
            "Expected on or off, got '{}'",
            other
        ))),
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn format_items(title: &str, items: &[ChatItem]) -> String {
    let mut lines = vec![style(title).bold().underlined().to_string()];
    if items.is_empty() {
        lines.push(format!("  {}", style("(なし)").dim()));
    }
    for (index, item) in items.iter().enumerate() {
        lines.push(format!(
            "  {} {}",
            style(format!("{}.", index + 1)).bold().cyan(),
            item.text
        ));
    }
    lines.join("\n")
}

impl CommandHandler for QuitCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, AssistError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the assistant"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, AssistError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            HistoryCommand.help().to_string(),
            BookmarksCommand.help().to_string(),
            PinCommand.help().to_string(),
            UnpinCommand.help().to_string(),
            UseCommand.help().to_string(),
            CodeToggleCommand.help().to_string(),
            ChatToggleCommand.help().to_string(),
            TopCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, AssistError> {
        state.orchestrator.reset();
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/clear - Start a new conversation"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, AssistError> {
        Ok(Some(format_items("履歴", state.store.history())))
    }

    fn help(&self) -> &'static str {
        "/history - List recent prompts"
    }
}

impl CommandHandler for BookmarksCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, AssistError> {
        Ok(Some(format_items("ピン留め", state.store.bookmarks())))
    }

    fn help(&self) -> &'static str {
        "/bookmarks - List pinned prompts"
    }
}

impl CommandHandler for PinCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let index = parse_position(args.first(), state.store.history().len())?;
        let id = state.store.history()[index].id;
        let pinned = state.store.pin(id)?;
        Ok(Some(format!("Pinned: {}", pinned.text)))
    }

    fn help(&self) -> &'static str {
        "/pin <n> - Pin history entry n"
    }
}

impl CommandHandler for UnpinCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let index = parse_position(args.first(), state.store.bookmarks().len())?;
        let item = state.store.bookmarks()[index].clone();
        state.store.unpin(item.id);
        Ok(Some(format!("Unpinned: {}", item.text)))
    }

    fn help(&self) -> &'static str {
        "/unpin <n> - Remove pinned entry n"
    }
}

impl CommandHandler for UseCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let (kind, position) = match args {
            ["b", rest @ ..] | ["bookmarks", rest @ ..] => (ListKind::Bookmarks, rest.first()),
            _ => (ListKind::History, args.first()),
        };
        let index = parse_position(position, state.store.list(kind).len())?;
        state.store.recall(kind, index);
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/use [b] <n> - Put history (or pinned, with b) entry n back into the prompt"
    }
}

impl CommandHandler for CodeToggleCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let value = parse_switch(args, state.orchestrator.show_code())?;
        state.orchestrator.set_show_code(value);
        Ok(Some(format!("Show code: {}", on_off(value))))
    }

    fn help(&self) -> &'static str {
        "/code [on|off] - Show generated scripts in the conversation"
    }
}

impl CommandHandler for ChatToggleCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let value = parse_switch(args, state.orchestrator.show_chat())?;
        state.orchestrator.set_show_chat(value);
        Ok(Some(format!("Explanations: {}", on_off(value))))
    }

    fn help(&self) -> &'static str {
        "/chat [on|off] - Ask for an explanation after each script"
    }
}

impl CommandHandler for TopCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, AssistError> {
        let value = parse_switch(args, state.bridge.is_always_on_top())?;
        let response = state.bridge.set_always_on_top(value);
        if !response.success {
            return Err(AssistError::Window(format!(
                "always on top stays {}: {}",
                on_off(state.bridge.is_always_on_top()),
                response.error.unwrap_or_default()
            )));
        }
        Ok(Some(format!("Always on top: {}", on_off(value))))
    }

    fn help(&self) -> &'static str {
        "/top [on|off] - Keep the window above the CAD application"
    }
}
