use thiserror::Error;

use crate::team::Venue;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("duplicate team in roster: {0}")]
    DuplicateTeam(String),

    #[error("trial points missing team {0}")]
    MissingTrialPoints(String),

    #[error("{team} has no recorded {venue} matches")]
    NoMatchesPlayed { team: String, venue: Venue },

    #[error("no trials recorded yet")]
    NoTrials,

    #[error("league-average goals conceded {venue} is {value}, cannot normalise strengths")]
    DegenerateLeagueAverage { venue: Venue, value: f64 },

    #[error("invalid poisson rate {0}")]
    InvalidLambda(f64),

    #[error("max_goals must be at least 1")]
    InvalidMaxGoals,
}
