use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub week: u32,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub played: bool,
}

impl Fixture {
    pub fn new(week: u32, home: impl Into<String>, away: impl Into<String>, played: bool) -> Self {
        Self {
            week,
            home: home.into(),
            away: away.into(),
            played,
        }
    }
}

/// Season fixture list. Order within a week is kept as given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    fixtures: Vec<Fixture>,
}

impl Schedule {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn week_fixtures(&self, week: u32, unplayed_only: bool) -> Vec<&Fixture> {
        self.fixtures
            .iter()
            .filter(|f| f.week == week)
            .filter(|f| !unplayed_only || !f.played)
            .collect()
    }

    /// Weeks that still hold at least one unplayed fixture, ascending.
    pub fn remaining_weeks(&self) -> Vec<u32> {
        let mut weeks: Vec<u32> = self
            .fixtures
            .iter()
            .filter(|f| !f.played)
            .map(|f| f.week)
            .collect();
        weeks.sort_unstable();
        weeks.dedup();
        weeks
    }

    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.fixtures
            .iter()
            .flat_map(|f| [f.home.as_str(), f.away.as_str()])
    }
}
