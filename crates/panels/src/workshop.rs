//! Agent Workshop: a strategy reviewed from three fixed viewpoints.

use gateway::AiGateway;
use shared::ngo::{DebateTranscript, Viewpoint};
use std::sync::Arc;

use crate::action::{ActionOutcome, ActionSlot, PromptAction};
use crate::PanelError;

pub struct AgentWorkshopPanel {
    gateway: Arc<AiGateway>,
    debate: PromptAction<DebateTranscript>,
}

impl AgentWorkshopPanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            debate: PromptAction::new("workshop_debate"),
        }
    }

    pub fn set_strategy(&self, text: impl Into<String>) {
        self.debate.set_input(text);
    }

    pub fn strategy(&self) -> String {
        self.debate.input()
    }

    pub fn debate(&self) -> ActionSlot<DebateTranscript> {
        self.debate.slot()
    }

    /// Text for one role of the last completed debate.
    pub fn viewpoint(&self, viewpoint: Viewpoint) -> Option<String> {
        self.debate
            .value()
            .map(|transcript| transcript.viewpoint(viewpoint).to_string())
    }

    pub async fn run_debate(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.debate
            .run(|strategy| async move { gateway.workshop_debate(&strategy).await })
            .await
    }

    pub fn teardown(&self) {
        self.debate.teardown();
    }
}
