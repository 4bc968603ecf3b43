use crate::cli::Args;
use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::config::Config;
use crate::core::error::AssistError;
use crate::display;
use crate::input;
use crate::orchestrator::events::AppEvent;
use crate::orchestrator::message::GREETING;
use crate::orchestrator::TurnOutcome;
use is_terminal::IsTerminal;
use std::io::{self, Read};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub const PIN_LIMIT_ALERT: &str =
    "ピン留めは5件までです。既存のピン留めを削除してから試してください。";

pub struct Application {
    args: Args,
    config: Config,
    state: ChatState,
    command_dispatcher: CommandDispatcher,
    events: broadcast::Receiver<AppEvent>,
    caption: Option<String>,
    pending_input: Option<String>,
}

impl Application {
    pub fn new(
        args: Args,
        config: Config,
        state: ChatState,
        command_dispatcher: CommandDispatcher,
    ) -> Self {
        let events = state.orchestrator.events().subscribe();
        Self {
            args,
            config,
            state,
            command_dispatcher,
            events,
            caption: None,
            pending_input: None,
        }
    }

    pub async fn run(&mut self) -> Result<(), AssistError> {
        if let Some(count) = self.args.selection_count {
            self.state.orchestrator.set_selection_count(count);
        }

        let piped = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| AssistError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        match (self.args.prompt.clone(), piped) {
            (Some(prompt), _) => self.handle_single_turn(&prompt).await,
            (None, Some(piped)) if !piped.trim().is_empty() => {
                self.handle_single_turn(piped.trim()).await
            }
            (None, Some(_)) => Err(AssistError::Input("No prompt provided".to_string())),
            (None, None) => self.handle_interactive().await,
        }
    }

    async fn handle_single_turn(&mut self, prompt: &str) -> Result<(), AssistError> {
        self.drain_events();
        self.run_turn(prompt).await;
        Ok(())
    }

    async fn handle_interactive(&mut self) -> Result<(), AssistError> {
        display::display_response(GREETING);
        display::display_info("Type '/help' for commands. Press Ctrl+D or type /quit to exit.");

        let history_path = input::history_path(&self.config.data_dir());
        let mut editor = input::create_editor(self.command_dispatcher.clone(), &history_path)?;

        while self.state.should_continue {
            self.drain_events();
            let initial = self.pending_input.take();
            let Some(line) =
                input::read_input(&mut editor, self.caption.as_deref(), initial.as_deref())?
            else {
                break;
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('/') {
                match self.command_dispatcher.execute_line(line, &mut self.state) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => report(&e),
                }
                continue;
            }

            self.run_turn(line).await;
        }

        if let Err(e) = input::save_history(&mut editor, &history_path) {
            tracing::warn!("input history not saved: {}", e);
        }
        Ok(())
    }

    /// Runs one turn while rendering its events as they arrive.
    async fn run_turn(&mut self, prompt: &str) {
        let orchestrator = self.state.orchestrator.clone();
        let turn = orchestrator.submit(prompt);
        tokio::pin!(turn);

        let outcome = loop {
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Ok(event) => self.on_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {}
                },
                outcome = &mut turn => break outcome,
            }
        };
        self.drain_events();

        match outcome {
            Ok(TurnOutcome::Completed { .. }) => {}
            Ok(TurnOutcome::Failed) => {
                if let Some(apology) = self.state.orchestrator.messages().last() {
                    display::display_response(&apology.content);
                }
            }
            Err(e) => report(&e),
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.on_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("skipped {} events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::NewChat(text) => {
                self.state.store.on_new_chat(&text);
            }
            AppEvent::CodeReady(code) => {
                if self.state.orchestrator.show_code() {
                    display::display_script(&code);
                }
            }
            AppEvent::ResponseReady(text) => display::display_explanation(&text),
            AppEvent::ResponseComplete => tracing::debug!("turn complete"),
            AppEvent::HoverCaptionSet(caption) => {
                display::display_caption(&caption);
                self.caption = Some(caption);
            }
            AppEvent::HoverCaptionClear => self.caption = None,
            AppEvent::InputFieldSet(text) => self.pending_input = Some(text),
            AppEvent::ConversationReset => display::display_response(GREETING),
            AppEvent::SelectionCount(count) => {
                display::display_info(&format!("選択オブジェクト: {}", count));
            }
        }
    }
}

fn report(error: &AssistError) {
    match error {
        AssistError::PinLimitReached(_) => display::display_alert(PIN_LIMIT_ALERT),
        AssistError::TurnInProgress => display::display_alert("前の応答を待っています。"),
        other => display::display_error(&other.to_string()),
    }
}
