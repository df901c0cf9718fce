use std::fs;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::league::League;
use crate::rank::Rank;
use crate::schedule::Schedule;
use crate::simulation::Simulation;
use crate::team::Team;

/// One row of a home-only or away-only ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRow {
    pub team: String,
    pub matches: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    #[serde(default)]
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonInput {
    pub home_table: Vec<VenueRow>,
    pub away_table: Vec<VenueRow>,
    pub fixtures: Schedule,
}

impl SeasonInput {
    pub fn load(path: &Path) -> AnyResult<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read season input {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> AnyResult<Self> {
        serde_json::from_str(raw).context("invalid season input json")
    }

    /// Baseline league plus a rank seeded with the points already secured.
    pub fn build(self) -> Result<(Simulation, Rank)> {
        let teams = init_teams(&self.home_table, &self.away_table)?;
        let rank = init_rank(&self.home_table, &self.away_table)?;
        let league = League::from_roster(teams)?;
        let sim = Simulation::new(league, self.fixtures)?;
        Ok((sim, rank))
    }
}

fn away_row<'a>(away: &'a [VenueRow], team: &str) -> Result<&'a VenueRow> {
    away.iter()
        .find(|r| r.team == team)
        .ok_or_else(|| SimError::UnknownTeam(team.to_string()))
}

/// Teams in home-table order, joined with their away row by name.
pub fn init_teams(home: &[VenueRow], away: &[VenueRow]) -> Result<Vec<Team>> {
    home.iter()
        .map(|h| {
            let a = away_row(away, &h.team)?;
            Ok(Team::new(h.team.clone())
                .with_home(h.matches, h.goals_for, h.goals_against)
                .with_away(a.matches, a.goals_for, a.goals_against))
        })
        .collect()
}

pub fn init_rank(home: &[VenueRow], away: &[VenueRow]) -> Result<Rank> {
    let fixed = home
        .iter()
        .map(|h| Ok((h.team.clone(), h.points + away_row(away, &h.team)?.points)))
        .collect::<Result<Vec<_>>>()?;
    Rank::new(fixed)
}
