//! Synergy Matching: rank the roster against a chosen project.

use gateway::AiGateway;
use parking_lot::Mutex;
use shared::catalog;
use shared::ngo::{Project, Volunteer};
use std::sync::Arc;

use crate::action::{run_action, ActionGuard, ActionOutcome, ActionSlot};
use crate::PanelError;

pub struct VolunteerMatchPanel {
    gateway: Arc<AiGateway>,
    projects: Vec<Project>,
    selected: Mutex<Option<String>>,
    /// Unranked catalog roster; every match ranks this list.
    roster_input: Vec<Volunteer>,
    roster: Mutex<ActionSlot<Vec<Volunteer>>>,
    guard: ActionGuard,
}

impl VolunteerMatchPanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self::with_catalog(gateway, catalog::projects(), catalog::volunteers())
    }

    pub fn with_catalog(
        gateway: Arc<AiGateway>,
        projects: Vec<Project>,
        volunteers: Vec<Volunteer>,
    ) -> Self {
        let selected = projects.first().map(|p| p.id.clone());
        Self {
            gateway,
            projects,
            selected: Mutex::new(selected),
            roster: Mutex::new(ActionSlot::with_value(volunteers.clone())),
            roster_input: volunteers,
            guard: ActionGuard::default(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Currently displayed roster, ranked once a match has completed.
    pub fn volunteers(&self) -> Vec<Volunteer> {
        self.roster.lock().value.clone().unwrap_or_default()
    }

    pub fn roster(&self) -> ActionSlot<Vec<Volunteer>> {
        self.roster.lock().clone()
    }

    pub fn selected_project(&self) -> Option<Project> {
        let selected = self.selected.lock();
        let id = selected.as_deref()?;
        self.projects.iter().find(|p| p.id == id).cloned()
    }

    /// Returns false for an unknown project id; the selection is unchanged then.
    pub fn select_project(&self, project_id: &str) -> bool {
        if self.projects.iter().any(|p| p.id == project_id) {
            *self.selected.lock() = Some(project_id.to_string());
            true
        } else {
            false
        }
    }

    /// Rank the roster for the selected project. The first project is
    /// selected until another is picked.
    pub async fn run_match(&self) -> Result<ActionOutcome, PanelError> {
        let Some(project) = self.selected_project() else {
            return Ok(ActionOutcome::Skipped);
        };
        let volunteers = &self.roster_input;
        let gateway = &self.gateway;
        run_action(
            "volunteer_match",
            &self.guard,
            &self.roster,
            async move { gateway.match_volunteers(&project, volunteers).await },
        )
        .await
    }

    pub async fn match_project(&self, project_id: &str) -> Result<ActionOutcome, PanelError> {
        if !self.select_project(project_id) {
            tracing::debug!(project = project_id, "unknown project");
            return Ok(ActionOutcome::Skipped);
        }
        self.run_match().await
    }

    pub fn teardown(&self) {
        self.guard.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::testing::{Scripted, ScriptedTransport};
    use shared::error::GatewayError;
    use shared::settings::GatewaySettings;

    fn panel(transport: &Arc<ScriptedTransport>) -> VolunteerMatchPanel {
        VolunteerMatchPanel::new(Arc::new(AiGateway::new(
            transport.clone(),
            GatewaySettings::default(),
        )))
    }

    fn ids(panel: &VolunteerMatchPanel) -> Vec<String> {
        panel.volunteers().into_iter().map(|v| v.id).collect()
    }

    #[tokio::test]
    async fn test_match_reorders_roster() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text(
            r#"[{"id":"1","matchScore":92},{"id":"3","matchScore":40}]"#,
        ));
        let panel = panel(&transport);
        assert_eq!(ids(&panel), vec!["1", "2", "3", "4"]);

        assert_eq!(panel.match_project("p1").await.unwrap(), ActionOutcome::Completed);
        assert_eq!(ids(&panel), vec!["1", "3", "2", "4"]);
        assert_eq!(panel.volunteers()[0].match_score, Some(92.0));
        assert_eq!(panel.selected_project().unwrap().name, "Digital Core Redesign");
    }

    #[tokio::test]
    async fn test_first_project_selected_by_default() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text("[]"));
        let panel = panel(&transport);
        assert_eq!(panel.selected_project().unwrap().id, "p1");

        assert_eq!(panel.run_match().await.unwrap(), ActionOutcome::Completed);
        let calls = transport.calls();
        let prompt = calls[0].request.contents[0].parts[0].text.clone().unwrap();
        assert!(prompt.contains("Digital Core Redesign"));
    }

    #[tokio::test]
    async fn test_unknown_project_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let panel = panel(&transport);
        assert_eq!(panel.match_project("nope").await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(panel.selected_project().unwrap().id, "p1");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_catalog_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let gateway = Arc::new(AiGateway::new(transport.clone(), GatewaySettings::default()));
        let panel = VolunteerMatchPanel::with_catalog(gateway, Vec::new(), catalog::volunteers());
        assert!(panel.selected_project().is_none());
        assert_eq!(panel.run_match().await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_each_match_ranks_catalog_order() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text(r#"[{"id":"4","matchScore":80}]"#));
        transport.push(Scripted::text(
            r#"[{"id":"1","matchScore":92},{"id":"3","matchScore":40}]"#,
        ));
        let panel = panel(&transport);

        panel.match_project("p2").await.unwrap();
        assert_eq!(ids(&panel), vec!["4", "1", "2", "3"]);

        panel.match_project("p1").await.unwrap();
        assert_eq!(ids(&panel), vec!["1", "3", "2", "4"]);
        assert_eq!(panel.volunteers()[3].match_score, Some(0.0));

        let calls = transport.calls();
        let second = calls[1].request.contents[0].parts[0].text.clone().unwrap();
        assert!(!second.contains("matchScore\":"));
        let first = calls[0].request.contents[0].parts[0].text.clone().unwrap();
        let roster_json = |p: &str| p[p.find("Volunteers: ").unwrap()..].to_string();
        assert_eq!(roster_json(&first), roster_json(&second));
    }

    #[tokio::test]
    async fn test_rematch_uses_current_selection() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text("[]"));
        transport.push(Scripted::text("[]"));
        let panel = panel(&transport);

        panel.match_project("p2").await.unwrap();
        panel.run_match().await.unwrap();

        let calls = transport.calls();
        let prompt = calls[1].request.contents[0].parts[0].text.clone().unwrap();
        assert!(prompt.contains("Global Awareness Phase II"));
    }

    #[tokio::test]
    async fn test_malformed_ranking_keeps_displayed_list() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::text(r#"[{"id":"4","matchScore":80}]"#));
        transport.push(Scripted::text("not json"));
        let panel = panel(&transport);

        panel.match_project("p2").await.unwrap();
        let before = panel.volunteers();
        assert_eq!(before[0].id, "4");

        let err = panel.run_match().await.unwrap_err();
        assert!(matches!(err, PanelError::Gateway(GatewayError::Malformed(_))));
        assert_eq!(panel.volunteers(), before);
        assert!(panel.roster().error().is_some());
    }
}
