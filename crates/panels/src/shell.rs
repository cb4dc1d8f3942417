//! Composition root: session user, active tab and the one mounted panel.
//!
//! Switching tabs unmounts the old panel, which cancels whatever it had in
//! flight, and mounts a fresh one. Nothing survives an unmount.

use gateway::AiGateway;
use shared::ngo::User;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::dashboard::DashboardPanel;
use crate::grant_review::GrantReviewPanel;
use crate::impact::ImpactPanel;
use crate::intelligence::IntelligencePanel;
use crate::resource_center::ResourceCenterPanel;
use crate::volunteer_match::VolunteerMatchPanel;
use crate::workshop::AgentWorkshopPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    VolunteerMatch,
    GrantReview,
    ResourceCenter,
    ImpactModeling,
    AgentWorkshop,
    NexusIntelligence,
}

impl Tab {
    /// Sidebar order.
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Dashboard,
            Tab::NexusIntelligence,
            Tab::ImpactModeling,
            Tab::AgentWorkshop,
            Tab::VolunteerMatch,
            Tab::GrantReview,
            Tab::ResourceCenter,
        ]
    }

    /// Heading shown above the mounted panel.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Mission Control",
            Tab::VolunteerMatch => "Synergy Matching",
            Tab::GrantReview => "Grant Catalyst",
            Tab::ResourceCenter => "Nexus Core",
            Tab::ImpactModeling => "Impact Forecasting",
            Tab::AgentWorkshop => "Agent Workshop",
            Tab::NexusIntelligence => "Nexus Intelligence",
        }
    }

    pub fn sidebar_label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Control Center",
            Tab::VolunteerMatch => "Synergy Match",
            Tab::GrantReview => "Grant Catalyst",
            Tab::ResourceCenter => "Nexus Core",
            Tab::ImpactModeling => "Impact Forecast",
            Tab::AgentWorkshop => "Agent Workshop",
            Tab::NexusIntelligence => "Nexus Intelligence",
        }
    }

    /// Short name accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::VolunteerMatch => "match",
            Tab::GrantReview => "grants",
            Tab::ResourceCenter => "resources",
            Tab::ImpactModeling => "impact",
            Tab::AgentWorkshop => "workshop",
            Tab::NexusIntelligence => "intelligence",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tab `{0}`")]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    /// Accepts the slug, the title or the sidebar label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tab::all()
            .iter()
            .copied()
            .find(|tab| {
                [tab.slug(), tab.title(), tab.sidebar_label()]
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| UnknownTab(wanted.to_string()))
    }
}

/// The mounted panel. Cloning shares the same controller.
#[derive(Clone)]
pub enum Panel {
    Dashboard(Arc<DashboardPanel>),
    VolunteerMatch(Arc<VolunteerMatchPanel>),
    GrantReview(Arc<GrantReviewPanel>),
    ResourceCenter(Arc<ResourceCenterPanel>),
    ImpactModeling(Arc<ImpactPanel>),
    AgentWorkshop(Arc<AgentWorkshopPanel>),
    NexusIntelligence(Arc<IntelligencePanel>),
}

impl Panel {
    pub fn mount(tab: Tab, gateway: &Arc<AiGateway>) -> Self {
        let gateway = gateway.clone();
        match tab {
            Tab::Dashboard => Panel::Dashboard(Arc::new(DashboardPanel::new())),
            Tab::VolunteerMatch => Panel::VolunteerMatch(Arc::new(VolunteerMatchPanel::new(gateway))),
            Tab::GrantReview => Panel::GrantReview(Arc::new(GrantReviewPanel::new(gateway))),
            Tab::ResourceCenter => Panel::ResourceCenter(Arc::new(ResourceCenterPanel::new(gateway))),
            Tab::ImpactModeling => Panel::ImpactModeling(Arc::new(ImpactPanel::new(gateway))),
            Tab::AgentWorkshop => Panel::AgentWorkshop(Arc::new(AgentWorkshopPanel::new(gateway))),
            Tab::NexusIntelligence => {
                Panel::NexusIntelligence(Arc::new(IntelligencePanel::new(gateway)))
            }
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Panel::Dashboard(_) => Tab::Dashboard,
            Panel::VolunteerMatch(_) => Tab::VolunteerMatch,
            Panel::GrantReview(_) => Tab::GrantReview,
            Panel::ResourceCenter(_) => Tab::ResourceCenter,
            Panel::ImpactModeling(_) => Tab::ImpactModeling,
            Panel::AgentWorkshop(_) => Tab::AgentWorkshop,
            Panel::NexusIntelligence(_) => Tab::NexusIntelligence,
        }
    }

    /// Cancel in-flight work. Tasks still holding the panel see `Cancelled`.
    pub fn teardown(&self) {
        match self {
            Panel::Dashboard(_) => {}
            Panel::VolunteerMatch(p) => p.teardown(),
            Panel::GrantReview(p) => p.teardown(),
            Panel::ResourceCenter(p) => p.teardown(),
            Panel::ImpactModeling(p) => p.teardown(),
            Panel::AgentWorkshop(p) => p.teardown(),
            Panel::NexusIntelligence(p) => p.teardown(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub org: String,
}

pub struct Shell {
    gateway: Arc<AiGateway>,
    user: Option<User>,
    active: Tab,
    panel: Option<Panel>,
}

impl Shell {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            user: None,
            active: Tab::default(),
            panel: None,
        }
    }

    pub fn gateway(&self) -> &Arc<AiGateway> {
        &self.gateway
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    /// Mounted panel; `None` while signed out.
    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    /// Local stub: any form is accepted and the credentials are not checked.
    pub fn login(&mut self, form: LoginForm) -> &User {
        let name = non_blank(form.name).unwrap_or_else(|| "John Doe".to_string());
        let org = non_blank(form.org).unwrap_or_else(|| "Global Relief".to_string());
        tracing::info!(user = %name, org = %org, "signed in");

        if let Some(old) = self.panel.take() {
            old.teardown();
        }
        self.panel = Some(Panel::mount(self.active, &self.gateway));
        self.user.insert(User {
            id: "u1".to_string(),
            name,
            email: form.email,
            org,
            role: "Project Director".to_string(),
            avatar: None,
        })
    }

    pub fn logout(&mut self) {
        if let Some(panel) = self.panel.take() {
            panel.teardown();
        }
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.name, "signed out");
        }
    }

    /// Switch to `tab`. Returns false when it is already active.
    pub fn navigate(&mut self, tab: Tab) -> bool {
        if tab == self.active {
            return false;
        }
        tracing::debug!(from = %self.active, to = %tab, "navigate");
        self.active = tab;
        if self.user.is_some() {
            if let Some(old) = self.panel.replace(Panel::mount(tab, &self.gateway)) {
                old.teardown();
            }
        }
        true
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(panel) = self.panel.take() {
            panel.teardown();
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionOutcome;
    use gateway::testing::{Scripted, ScriptedTransport};
    use shared::settings::GatewaySettings;

    fn shell(transport: &Arc<ScriptedTransport>) -> Shell {
        Shell::new(Arc::new(AiGateway::new(
            transport.clone(),
            GatewaySettings::default(),
        )))
    }

    #[test]
    fn test_login_fills_defaults() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut shell = shell(&transport);
        assert!(shell.panel().is_none());

        let user = shell
            .login(LoginForm {
                email: "ops@relief.org".into(),
                password: "anything".into(),
                ..Default::default()
            })
            .clone();

        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.org, "Global Relief");
        assert_eq!(user.email, "ops@relief.org");
        assert_eq!(user.role, "Project Director");
        assert_eq!(shell.panel().map(Panel::tab), Some(Tab::Dashboard));
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("impact".parse::<Tab>(), Ok(Tab::ImpactModeling));
        assert_eq!("Nexus Core".parse::<Tab>(), Ok(Tab::ResourceCenter));
        assert_eq!("synergy match".parse::<Tab>(), Ok(Tab::VolunteerMatch));
        assert_eq!("nowhere".parse::<Tab>(), Err(UnknownTab("nowhere".into())));
        assert_eq!(Tab::all().len(), 7);
    }

    #[test]
    fn test_navigate_same_tab_keeps_panel() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut shell = shell(&transport);
        shell.login(LoginForm::default());
        shell.navigate(Tab::GrantReview);

        let Some(Panel::GrantReview(before)) = shell.panel().cloned() else {
            panic!("grant panel not mounted");
        };
        before.set_grant_text("draft");

        assert!(!shell.navigate(Tab::GrantReview));
        let Some(Panel::GrantReview(after)) = shell.panel().cloned() else {
            panic!("grant panel not mounted");
        };
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_navigate_away_cancels_and_resets() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::Hang);
        let mut shell = shell(&transport);
        shell.login(LoginForm::default());
        shell.navigate(Tab::GrantReview);

        let Some(Panel::GrantReview(grants)) = shell.panel().cloned() else {
            panic!("grant panel not mounted");
        };
        grants.set_grant_text("Rural literacy fund");
        let pending = tokio::spawn({
            let grants = grants.clone();
            async move { grants.analyze().await }
        });
        while !grants.analysis().is_pending() {
            tokio::task::yield_now().await;
        }

        shell.navigate(Tab::Dashboard);
        assert_eq!(pending.await.unwrap().unwrap(), ActionOutcome::Cancelled);

        shell.navigate(Tab::GrantReview);
        let Some(Panel::GrantReview(fresh)) = shell.panel().cloned() else {
            panic!("grant panel not mounted");
        };
        assert!(fresh.grant_text().is_empty());
        assert!(fresh.analysis().value.is_none());
    }

    #[test]
    fn test_logout_unmounts_and_keeps_tab() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut shell = shell(&transport);
        shell.login(LoginForm {
            name: "Ana".into(),
            org: "Water First".into(),
            ..Default::default()
        });
        shell.navigate(Tab::AgentWorkshop);
        shell.logout();

        assert!(shell.user().is_none());
        assert!(shell.panel().is_none());
        assert_eq!(shell.active_tab(), Tab::AgentWorkshop);

        shell.login(LoginForm::default());
        assert_eq!(shell.panel().map(Panel::tab), Some(Tab::AgentWorkshop));
    }
}
