use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::AssistError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::{self, MatchingBracketValidator, Validator};
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub type PromptEditor = Editor<AssistantHelper, FileHistory>;

const INPUT_HISTORY_FILE: &str = "input_history.txt";

/// Completes slash command names.
pub struct CommandCompleter {
    command_registry: CommandDispatcher,
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some(typed) = line.get(1..pos).filter(|_| line.starts_with('/')) else {
            return Ok((pos, Vec::new()));
        };
        if typed.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches = self
            .command_registry
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(typed))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect();
        Ok((1, matches))
    }
}

/// Line editor helper: command completion, history hints, and paren
/// matching for inline Lisp.
pub struct AssistantHelper {
    completer: CommandCompleter,
    highlighter: MatchingBracketHighlighter,
    hinter: HistoryHinter,
    validator: MatchingBracketValidator,
}

impl AssistantHelper {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            completer: CommandCompleter { command_registry },
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter::new(),
            validator: MatchingBracketValidator::new(),
        }
    }
}

impl Helper for AssistantHelper {}

impl Completer for AssistantHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for AssistantHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for AssistantHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }

    fn highlight_char(&self, line: &str, pos: usize, kind: CmdKind) -> bool {
        self.highlighter.highlight_char(line, pos, kind)
    }
}

impl Validator for AssistantHelper {
    fn validate(
        &self,
        ctx: &mut validate::ValidationContext,
    ) -> rustyline::Result<validate::ValidationResult> {
        self.validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join(INPUT_HISTORY_FILE)
}

/// Creates the line editor and loads earlier input from `history_path`.
pub fn create_editor(
    command_registry: CommandDispatcher,
    history_path: &Path,
) -> Result<PromptEditor, AssistError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| AssistError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(AssistantHelper::new(command_registry)));

    if let Err(e) = editor.load_history(history_path) {
        tracing::debug!("no input history at {}: {}", history_path.display(), e);
    }

    Ok(editor)
}

/// Reads one line. `initial` pre-fills the input, e.g. with a recalled
/// prompt. Returns `None` on Ctrl-C or Ctrl-D.
pub fn read_input(
    editor: &mut PromptEditor,
    caption: Option<&str>,
    initial: Option<&str>,
) -> Result<Option<String>, AssistError> {
    let prompt = match caption {
        Some(caption) => format!(
            "{} {} ",
            style(format!("[{}]", caption)).dim(),
            style(">").bold().cyan()
        ),
        None => format!("{} ", style(">").bold().cyan()),
    };

    let line = match initial {
        Some(text) => editor.readline_with_initial(&prompt, (text, "")),
        None => editor.readline(&prompt),
    };

    match line {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(&line).map_err(|e| {
                    AssistError::Input(format!("Failed to add history entry: {}", e))
                })?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(AssistError::Input(format!("Input error: {}", err))),
    }
}

pub fn save_history(editor: &mut PromptEditor, history_path: &Path) -> Result<(), AssistError> {
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    editor
        .save_history(history_path)
        .map_err(|e| AssistError::Input(format!("Failed to save history: {}", e)))
}
