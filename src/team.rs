use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => write!(f, "home"),
            Venue::Away => write!(f, "away"),
        }
    }
}

/// Running home/away scoring record for one team.
///
/// Built once from historical aggregates, then mutated by the league after
/// every simulated match within a single trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub matches_home: u32,
    pub goals_scored_home: u32,
    pub goals_conceded_home: u32,
    pub matches_away: u32,
    pub goals_scored_away: u32,
    pub goals_conceded_away: u32,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matches_home: 0,
            goals_scored_home: 0,
            goals_conceded_home: 0,
            matches_away: 0,
            goals_scored_away: 0,
            goals_conceded_away: 0,
        }
    }

    pub fn with_home(mut self, matches: u32, scored: u32, conceded: u32) -> Self {
        self.matches_home = matches;
        self.goals_scored_home = scored;
        self.goals_conceded_home = conceded;
        self
    }

    pub fn with_away(mut self, matches: u32, scored: u32, conceded: u32) -> Self {
        self.matches_away = matches;
        self.goals_scored_away = scored;
        self.goals_conceded_away = conceded;
        self
    }

    /// Absorb one more home match.
    pub fn update_home(&mut self, goals_scored: u32, goals_conceded: u32) {
        self.goals_scored_home += goals_scored;
        self.goals_conceded_home += goals_conceded;
        self.matches_home += 1;
    }

    /// Absorb one more away match.
    pub fn update_away(&mut self, goals_scored: u32, goals_conceded: u32) {
        self.goals_scored_away += goals_scored;
        self.goals_conceded_away += goals_conceded;
        self.matches_away += 1;
    }

    pub fn mean_goals_scored_home(&self) -> Result<f64> {
        if self.matches_home == 0 {
            return Err(self.no_matches(Venue::Home));
        }
        Ok(self.goals_scored_home as f64 / self.matches_home as f64)
    }

    pub fn mean_goals_scored_away(&self) -> Result<f64> {
        if self.matches_away == 0 {
            return Err(self.no_matches(Venue::Away));
        }
        Ok(self.goals_scored_away as f64 / self.matches_away as f64)
    }

    fn no_matches(&self, venue: Venue) -> SimError {
        SimError::NoMatchesPlayed {
            team: self.name.clone(),
            venue,
        }
    }
}
