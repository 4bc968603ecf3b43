use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod commands;
mod config;
mod core;
mod display;
mod drawing;
mod input;
mod orchestrator;
mod persistence;
mod providers;
mod script;
mod shell;
mod store;
mod utils;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::{ChatState, create_command_registry};
use crate::config::Config;
use crate::core::error::AssistError;
use crate::orchestrator::events::EventBus;
use crate::orchestrator::pipeline::{CodeStage, ExplanationStage};
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::providers::factory::ProviderFactory;
use crate::shell::window::{TerminalWindow, Window};
use crate::shell::{AppContext, Launch};
use crate::store::ChatStore;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acadchat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!("fatal: {}", e);
        display::display_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AssistError> {
    let args = Args::parse();
    let mut config = Config::load()?;
    args.apply_to(&mut config)?;

    let window: Arc<dyn Window> = Arc::new(TerminalWindow::new()?);
    let mut context = match AppContext::init(&config, window).await? {
        Launch::Started(context) => context,
        Launch::AlreadyRunning => return Ok(()),
    };
    let bridge = context.bridge();

    let factory = ProviderFactory::new();
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let code_provider = factory.create(&config.resolve(config.code_provider), timeout)?;
    let explain_provider = factory.create(&config.resolve(config.explain_provider), timeout)?;

    let bus = EventBus::new();
    let orchestrator = Arc::new(Orchestrator::new(
        CodeStage::new(code_provider, config.drawing_state_path()),
        ExplanationStage::new(explain_provider),
        bridge.clone(),
        bus.clone(),
        OrchestratorOptions {
            show_code: config.show_code,
            show_chat: config.show_chat,
            caption_revert: Duration::from_secs(config.caption_revert_secs),
        },
    ));
    let store = ChatStore::load(bridge.clone(), bus);
    let state = ChatState::new(orchestrator, store, bridge);

    let mut app = Application::new(args, config, state, create_command_registry());
    let result = app.run().await;

    context.shutdown();
    result
}
