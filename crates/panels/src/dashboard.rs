//! Mission Control overview. Static figures only, no model calls.

use shared::catalog::{self, ActivityPoint, StatCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityTotals {
    pub volunteers: u32,
    pub grants: u32,
}

pub struct DashboardPanel {
    activity: Vec<ActivityPoint>,
    cards: Vec<StatCard>,
}

impl Default for DashboardPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardPanel {
    pub fn new() -> Self {
        Self {
            activity: catalog::activity(),
            cards: catalog::stat_cards(),
        }
    }

    pub fn activity(&self) -> &[ActivityPoint] {
        &self.activity
    }

    pub fn stat_cards(&self) -> &[StatCard] {
        &self.cards
    }

    /// Sums over the whole activity series.
    pub fn totals(&self) -> ActivityTotals {
        self.activity
            .iter()
            .fold(ActivityTotals::default(), |acc, p| ActivityTotals {
                volunteers: acc.volunteers + p.volunteers,
                grants: acc.grants + p.grants,
            })
    }

    /// Month with the most volunteer sign-ups.
    pub fn peak_month(&self) -> Option<&ActivityPoint> {
        self.activity.iter().max_by_key(|p| p.volunteers)
    }
}
