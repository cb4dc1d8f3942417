//! Built-in roster, projects and dashboard figures.
//!
//! A real deployment would load these from the organisation's own records.

use crate::ngo::{Project, ProjectStatus, Volunteer};

fn volunteer(id: &str, name: &str, skills: &[&str], bio: &str, location: &str) -> Volunteer {
    Volunteer {
        id: id.into(),
        name: name.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        bio: bio.into(),
        location: location.into(),
        match_score: None,
    }
}

pub fn volunteers() -> Vec<Volunteer> {
    vec![
        volunteer(
            "1",
            "Alice Johnson",
            &["Web Dev", "React", "TypeScript"],
            "Senior engineer focused on accessible infrastructure and digital equality.",
            "London, UK",
        ),
        volunteer(
            "2",
            "Bob Smith",
            &["Social Media", "Marketing"],
            "Outreach specialist for humanitarian campaigns.",
            "NYC, USA",
        ),
        volunteer(
            "3",
            "Charlie Davis",
            &["Fundraising", "Strategy"],
            "Major-donor liaison with a long record of secured capital.",
            "Austin, TX",
        ),
        volunteer(
            "4",
            "Dana Lee",
            &["Data Analysis", "Python"],
            "Predictive modeling specialist focused on resource optimization.",
            "Toronto, CA",
        ),
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "p1".into(),
            name: "Digital Core Redesign".into(),
            description: "Rebuilding the platform that coordinates our global programmes.".into(),
            status: ProjectStatus::Planning,
            required_skills: vec!["React".into(), "Web Dev".into(), "UI/UX".into()],
            branding_url: None,
        },
        Project {
            id: "p2".into(),
            name: "Global Awareness Phase II".into(),
            description: "Multi-channel climate action awareness initiative.".into(),
            status: ProjectStatus::Planning,
            required_skills: vec!["Marketing".into(), "Social Media".into()],
            branding_url: None,
        },
    ]
}

/// One month of dashboard activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityPoint {
    pub month: &'static str,
    pub volunteers: u32,
    pub grants: u32,
}

pub fn activity() -> Vec<ActivityPoint> {
    [
        ("Jan", 12, 2),
        ("Feb", 19, 4),
        ("Mar", 15, 3),
        ("Apr", 22, 5),
        ("May", 30, 7),
        ("Jun", 34, 8),
    ]
    .into_iter()
    .map(|(month, volunteers, grants)| ActivityPoint {
        month,
        volunteers,
        grants,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: &'static str,
    pub trend: &'static str,
}

pub fn stat_cards() -> Vec<StatCard> {
    [
        ("Active Force", "2,543", "+14.2%"),
        ("Synergy Ops", "18", "+5.4%"),
        ("Capital Flow", "$1.4M", "+28.1%"),
        ("Global Rank", "#4", "+2.0%"),
    ]
    .into_iter()
    .map(|(title, value, trend)| StatCard { title, value, trend })
    .collect()
}
