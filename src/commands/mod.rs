pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::orchestrator::Orchestrator;
use crate::shell::bridge::Bridge;
use crate::store::ChatStore;
pub use dispatcher::create_command_registry;
use std::sync::Arc;

/// What slash commands can act on.
pub struct ChatState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: ChatStore,
    pub bridge: Arc<Bridge>,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(orchestrator: Arc<Orchestrator>, store: ChatStore, bridge: Arc<Bridge>) -> Self {
        Self {
            orchestrator,
            store,
            bridge,
            should_continue: true,
        }
    }
}
