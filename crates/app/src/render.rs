//! Plain-text views of shell and panel state.

use panels::action::{ActionSlot, ActionStatus};
use panels::chat::ChatSnapshot;
use panels::dashboard::DashboardPanel;
use panels::{Panel, Tab};
use shared::chat::ChatRole;
use shared::ngo::{ForecastResult, Project, User, Viewpoint, Volunteer};
use std::fmt::Write;

pub fn user_line(user: &User) -> String {
    format!("{} ({}, {})", user.name, user.role, user.org)
}

pub fn tabs(active: Tab) -> String {
    let mut out = String::new();
    for tab in Tab::all() {
        let marker = if *tab == active { '*' } else { ' ' };
        let _ = writeln!(out, "{} {:<14} {}", marker, tab.slug(), tab.sidebar_label());
    }
    out
}

fn slot<T>(out: &mut String, label: &str, slot: &ActionSlot<T>, body: impl Fn(&T) -> String) {
    match &slot.status {
        ActionStatus::Pending => {
            let _ = writeln!(out, "[{}] working...", label);
        }
        ActionStatus::Failed(msg) => {
            let _ = writeln!(out, "[{}] failed: {}", label, msg);
        }
        ActionStatus::Idle => {}
    }
    if let Some(value) = &slot.value {
        let _ = writeln!(out, "[{}]\n{}", label, body(value));
    }
}

pub fn dashboard(panel: &DashboardPanel) -> String {
    let mut out = String::new();
    for card in panel.stat_cards() {
        let _ = writeln!(out, "{:<14} {:>8}  {}", card.title, card.value, card.trend);
    }
    out.push('\n');
    for point in panel.activity() {
        let _ = writeln!(
            out,
            "{}  volunteers {:>3}  grants {:>2}",
            point.month, point.volunteers, point.grants
        );
    }
    let totals = panel.totals();
    let _ = writeln!(
        out,
        "total volunteers {}  grants {}",
        totals.volunteers, totals.grants
    );
    out
}

pub fn roster(volunteers: &[Volunteer]) -> String {
    let mut out = String::new();
    for v in volunteers {
        let score = v
            .match_score
            .map(|s| format!("{:>5.1}", s))
            .unwrap_or_else(|| "    -".to_string());
        let _ = writeln!(
            out,
            "{} {:<3} {:<15} {:<12} {}",
            score,
            v.initials(),
            v.name,
            v.location,
            v.skills.join(", ")
        );
    }
    out
}

pub fn projects(projects: &[Project], selected: Option<&Project>) -> String {
    let mut out = String::new();
    for project in projects {
        let marker = if selected.is_some_and(|s| s.id == project.id) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<3} {} [{}]",
            marker,
            project.id,
            project.name,
            project.required_skills.join(", ")
        );
    }
    out
}

pub fn forecast(result: &ForecastResult) -> String {
    let branding = match &result.branding_image {
        Some(uri) => format!("branding: {} bytes of image data", uri.len()),
        None => "branding: none".to_string(),
    };
    format!("{}\n{}", result.prediction_text, branding)
}

pub fn transcript(chat: &ChatSnapshot) -> String {
    let mut out = String::new();
    for message in &chat.messages {
        let who = match message.role {
            ChatRole::User => "you",
            ChatRole::Model => "lumina",
        };
        let _ = writeln!(out, "{}> {}", who, message.text);
    }
    if let Some(err) = &chat.last_error {
        let _ = writeln!(out, "(last turn failed: {})", err);
    }
    out
}

pub fn panel(panel: &Panel) -> String {
    let mut out = format!("== {} ==\n", panel.tab().title());
    match panel {
        Panel::Dashboard(p) => out.push_str(&dashboard(p)),
        Panel::VolunteerMatch(p) => {
            out.push_str(&projects(p.projects(), p.selected_project().as_ref()));
            let ranked = p.roster();
            slot(&mut out, "roster", &ranked, |list| roster(list));
        }
        Panel::GrantReview(p) => slot(&mut out, "analysis", &p.analysis(), |s| s.clone()),
        Panel::ResourceCenter(p) => {
            for (i, topic) in p.quick_topics().iter().enumerate() {
                let _ = writeln!(out, "topic {}: {}", i + 1, topic);
            }
            slot(&mut out, "advice", &p.advice(), |s| s.clone());
        }
        Panel::ImpactModeling(p) => slot(&mut out, "forecast", &p.forecast_slot(), forecast),
        Panel::AgentWorkshop(p) => slot(&mut out, "debate", &p.debate(), |d| {
            Viewpoint::all()
                .iter()
                .map(|v| format!("{}: {}", v.title(), d.viewpoint(*v)))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Panel::NexusIntelligence(p) => {
            let _ = writeln!(out, "mode: {}", p.mode().label());
            out.push_str(&transcript(&p.chat().snapshot()));
            slot(&mut out, "vision", &p.vision(), |s| s.clone());
            slot(&mut out, "reasoning", &p.reasoning(), |s| s.clone());
            slot(&mut out, "fast", &p.fast_answer(), |s| s.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::catalog;

    #[test]
    fn test_tabs_mark_active() {
        let out = tabs(Tab::GrantReview);
        let active: Vec<&str> = out.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].contains("Grant Catalyst"));
    }

    #[test]
    fn test_roster_shows_scores_when_ranked() {
        let mut list = catalog::volunteers();
        list[0].match_score = Some(92.0);
        let out = roster(&list);
        let first = out.lines().next().unwrap();
        assert!(first.starts_with(" 92.0 AJ  Alice Johnson"));
        assert!(out.lines().nth(1).unwrap().starts_with("    - BS"));
    }

    #[test]
    fn test_projects_mark_selection() {
        let list = catalog::projects();
        let out = projects(&list, Some(&list[1]));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("  p1  Digital Core Redesign"));
        assert_eq!(lines[1], "* p2  Global Awareness Phase II [Marketing, Social Media]");
    }

    #[test]
    fn test_failed_slot_keeps_previous_value_visible() {
        let mut s = ActionSlot::with_value("Strong fit".to_string());
        s.status = ActionStatus::Failed("gemini error 500: internal".into());
        let mut out = String::new();
        slot(&mut out, "analysis", &s, |v| v.clone());
        assert_eq!(
            out,
            "[analysis] failed: gemini error 500: internal\n[analysis]\nStrong fit\n"
        );
    }

    #[test]
    fn test_dashboard_lists_totals() {
        let out = dashboard(&DashboardPanel::new());
        assert!(out.contains("Capital Flow"));
        assert!(out.ends_with("total volunteers 132  grants 29\n"));
    }
}
