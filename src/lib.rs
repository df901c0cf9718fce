//! Monte Carlo estimate of a league's final standings.
//!
//! Remaining fixtures are simulated with a Poisson goal model built from each
//! team's home/away scoring record, and many independent trials are averaged
//! into expected points with a standard deviation per team.

pub mod config;
pub mod distribution;
pub mod error;
pub mod league;
pub mod rank;
pub mod roster;
pub mod schedule;
pub mod simulation;
pub mod team;

pub use config::SimConfig;
pub use distribution::Prob3;
pub use error::{Result, SimError};
pub use league::League;
pub use rank::Rank;
pub use schedule::{Fixture, Schedule};
pub use simulation::{ExpectedTable, Simulation, StandingRow};
pub use team::{Team, Venue};
