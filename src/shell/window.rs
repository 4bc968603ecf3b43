use crate::core::error::AssistError;
use console::Term;
use is_terminal::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

/// The single top-level window the front end renders into.
pub trait Window: Send + Sync {
    fn set_always_on_top(&self, value: bool) -> Result<(), AssistError>;
    fn is_always_on_top(&self) -> bool;
    /// Brings the window forward, e.g. when a second launch is attempted.
    fn focus(&self);
}

/// Window backed by the controlling terminal.
pub struct TerminalWindow {
    always_on_top: AtomicBool,
}

impl TerminalWindow {
    pub fn new() -> Result<Self, AssistError> {
        if !std::io::stdout().is_terminal() && !std::io::stderr().is_terminal() {
            tracing::debug!("no terminal attached; window operations are best effort");
        }
        Ok(Self {
            always_on_top: AtomicBool::new(false),
        })
    }
}

impl Window for TerminalWindow {
    fn set_always_on_top(&self, value: bool) -> Result<(), AssistError> {
        if !std::io::stdout().is_terminal() {
            return Err(AssistError::Window(
                "always-on-top needs an attached terminal".to_string(),
            ));
        }
        let title = if value {
            "\x1b]0;acadchat [pinned]\x07"
        } else {
            "\x1b]0;acadchat\x07"
        };
        Term::stdout()
            .write_str(title)
            .map_err(|e| AssistError::Window(format!("Failed to update terminal: {}", e)))?;
        self.always_on_top.store(value, Ordering::SeqCst);
        Ok(())
    }

    fn is_always_on_top(&self) -> bool {
        self.always_on_top.load(Ordering::SeqCst)
    }

    fn focus(&self) {
        tracing::info!("focus requested by another launch");
        let _ = Term::stdout().write_str("\x07");
    }
}
