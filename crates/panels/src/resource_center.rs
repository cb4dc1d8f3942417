//! Nexus Core: free-form technical questions answered by the advisor model.

use gateway::AiGateway;
use std::sync::Arc;

use crate::action::{ActionOutcome, ActionSlot, PromptAction};
use crate::PanelError;

/// Canned questions offered next to the query box.
pub const QUICK_TOPICS: [&str; 4] = [
    "Scale strategy for distributed teams",
    "Open-source AI implementation kits",
    "Secure cloud architectures for sensitive data",
    "Optimizing donor retention logic",
];

pub struct ResourceCenterPanel {
    gateway: Arc<AiGateway>,
    advice: PromptAction<String>,
}

impl ResourceCenterPanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            advice: PromptAction::new("resource_advice"),
        }
    }

    pub fn quick_topics(&self) -> &'static [&'static str] {
        &QUICK_TOPICS
    }

    /// Fill the query box with quick topic `index`. Returns false when out of range.
    pub fn pick_topic(&self, index: usize) -> bool {
        match QUICK_TOPICS.get(index) {
            Some(topic) => {
                self.advice.set_input(*topic);
                true
            }
            None => false,
        }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.advice.set_input(query);
    }

    pub fn query(&self) -> String {
        self.advice.input()
    }

    pub fn advice(&self) -> ActionSlot<String> {
        self.advice.slot()
    }

    pub async fn ask(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.advice
            .run(|query| async move { gateway.resource_advice(&query).await })
            .await
    }

    pub fn teardown(&self) {
        self.advice.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::testing::{Scripted, ScriptedTransport};
    use shared::error::GatewayError;
    use shared::settings::GatewaySettings;

    fn panel(transport: &Arc<ScriptedTransport>) -> ResourceCenterPanel {
        ResourceCenterPanel::new(Arc::new(AiGateway::new(
            transport.clone(),
            GatewaySettings::default(),
        )))
    }

    #[tokio::test]
    async fn test_quick_topic_becomes_query() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text("Use a donor CRM with cohort tracking."));
        let panel = panel(&transport);

        assert!(panel.pick_topic(3));
        assert!(!panel.pick_topic(9));
        assert_eq!(panel.query(), "Optimizing donor retention logic");

        panel.ask().await.unwrap();
        let prompt = transport.calls()[0].request.contents[0].parts[0]
            .text
            .clone()
            .unwrap();
        assert_eq!(prompt, "NGO technical advisor: Optimizing donor retention logic");
        assert_eq!(
            panel.advice().value.as_deref(),
            Some("Use a donor CRM with cohort tracking.")
        );
    }

    #[tokio::test]
    async fn test_quota_error_marks_failed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::Fail(GatewayError::Status {
            status: 429,
            body: "quota".into(),
        }));
        let panel = panel(&transport);
        panel.set_query("backups?");

        assert!(panel.ask().await.is_err());
        let slot = panel.advice();
        assert!(slot.error().unwrap().contains("429"));
        assert!(slot.value.is_none());
    }
}
