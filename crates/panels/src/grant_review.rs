//! Grant Catalyst: paste a call for proposals, get a fit summary back.

use gateway::AiGateway;
use std::sync::Arc;

use crate::action::{ActionOutcome, ActionSlot, PromptAction};
use crate::PanelError;

pub struct GrantReviewPanel {
    gateway: Arc<AiGateway>,
    analysis: PromptAction<String>,
}

impl GrantReviewPanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            analysis: PromptAction::new("grant_analysis"),
        }
    }

    pub fn set_grant_text(&self, text: impl Into<String>) {
        self.analysis.set_input(text);
    }

    pub fn grant_text(&self) -> String {
        self.analysis.input()
    }

    pub fn analysis(&self) -> ActionSlot<String> {
        self.analysis.slot()
    }

    pub async fn analyze(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.analysis
            .run(|text| async move { gateway.analyze_grant(&text).await })
            .await
    }

    pub fn teardown(&self) {
        self.analysis.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::testing::{Scripted, ScriptedTransport};
    use shared::settings::GatewaySettings;

    #[tokio::test]
    async fn test_analysis_is_stored() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text("Strong fit: education focus matches."));
        let panel = GrantReviewPanel::new(Arc::new(AiGateway::new(
            transport.clone(),
            GatewaySettings::default(),
        )));

        panel.set_grant_text("Fund for rural literacy, up to $50k.");
        assert_eq!(panel.analyze().await.unwrap(), ActionOutcome::Completed);

        assert_eq!(
            panel.analysis().value.as_deref(),
            Some("Strong fit: education focus matches.")
        );
        let prompt = transport.calls()[0].request.contents[0].parts[0]
            .text
            .clone()
            .unwrap();
        assert!(prompt.ends_with("Grant Text: Fund for rural literacy, up to $50k."));
    }

    #[tokio::test]
    async fn test_empty_grant_text_is_ignored() {
        let transport = Arc::new(ScriptedTransport::new());
        let panel = GrantReviewPanel::new(Arc::new(AiGateway::new(
            transport.clone(),
            GatewaySettings::default(),
        )));
        assert_eq!(panel.analyze().await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(transport.call_count(), 0);
    }
}
