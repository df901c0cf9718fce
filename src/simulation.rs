use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::distribution::Prob3;
use crate::error::Result;
use crate::league::League;
use crate::rank::Rank;
use crate::schedule::Schedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team: String,
    pub expected_points: f64,
    pub std_dev: f64,
}

/// Expected final table, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedTable {
    pub trials: usize,
    pub rows: Vec<StandingRow>,
}

impl ExpectedTable {
    pub fn from_rank(rank: &Rank) -> Result<Self> {
        let std: HashMap<String, f64> = rank.final_rank_std()?.into_iter().collect();
        let rows = rank
            .final_rank()?
            .into_iter()
            .map(|(team, expected_points)| {
                let std_dev = std.get(&team).copied().unwrap_or(0.0);
                StandingRow {
                    team,
                    expected_points,
                    std_dev,
                }
            })
            .collect();
        Ok(Self {
            trials: rank.trial_count(),
            rows,
        })
    }

    pub fn row(&self, team: &str) -> Option<&StandingRow> {
        self.rows.iter().find(|r| r.team == team)
    }
}

/// Drives independent trials of the remaining season from one immutable
/// baseline league.
#[derive(Debug, Clone)]
pub struct Simulation {
    baseline: League,
    schedule: Schedule,
    weeks: Vec<u32>,
}

impl Simulation {
    pub fn new(baseline: League, schedule: Schedule) -> Result<Self> {
        baseline.validate_schedule(&schedule)?;
        let weeks = schedule.remaining_weeks();
        Ok(Self {
            baseline,
            schedule,
            weeks,
        })
    }

    pub fn baseline(&self) -> &League {
        &self.baseline
    }

    pub fn remaining_weeks(&self) -> &[u32] {
        &self.weeks
    }

    /// One complete future: a fresh copy of the baseline advanced through
    /// every remaining week in order.
    pub fn run_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HashMap<String, u32>> {
        let mut league = self.baseline.clone();
        for &week in &self.weeks {
            league.simulate_schedule_week(&self.schedule, week, rng)?;
        }
        Ok(league.output_points().clone())
    }

    /// Run `config.trials` trials in parallel and record them into `rank`
    /// in trial order. On any failure nothing is recorded.
    pub fn run(&self, rank: &mut Rank, config: &SimConfig) -> Result<()> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        info!(
            "simulating {} trials over {} weeks (seed {}, {} threads)",
            config.trials,
            self.weeks.len(),
            seed,
            config.threads
        );
        let started = Instant::now();

        let pool = build_pool(config.threads);
        let results = with_pool(&pool, || {
            (0..config.trials)
                .into_par_iter()
                .map(|trial| {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(trial as u64));
                    self.run_trial(&mut rng)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        for points in &results {
            rank.record_trial(points)?;
        }
        info!(
            "{} trials done in {:.2?}",
            results.len(),
            started.elapsed()
        );
        Ok(())
    }

    pub fn expected_table(&self, rank: &mut Rank, config: &SimConfig) -> Result<ExpectedTable> {
        self.run(rank, config)?;
        ExpectedTable::from_rank(rank)
    }

    /// Win/draw/loss for one upcoming fixture, computed on the baseline
    /// without sampling.
    pub fn fixture_probabilities(&self, home: &str, away: &str, max_goals: usize) -> Result<Prob3> {
        self.baseline.fixture_probabilities(home, away, max_goals)
    }

    pub fn week_loss_probabilities(&self, week: u32, max_goals: usize) -> Result<HashMap<String, f64>> {
        self.baseline
            .week_loss_probabilities(&self.schedule, week, max_goals)
    }
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            debug!("falling back to global rayon pool: {e}");
            None
        }
    }
}

fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Fixture;
    use crate::team::Team;
    use crate::error::SimError;

    fn league() -> League {
        League::from_roster(vec![
            Team::new("A").with_home(5, 10, 4).with_away(5, 7, 6),
            Team::new("B").with_home(5, 6, 6).with_away(5, 5, 8),
            Team::new("C").with_home(5, 4, 9).with_away(5, 3, 10),
        ])
        .unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::new(vec![
            Fixture::new(10, "A", "B", true),
            Fixture::new(11, "B", "C", false),
            Fixture::new(12, "C", "A", false),
            Fixture::new(13, "A", "C", false),
        ])
    }

    #[test]
    fn unknown_fixture_team_is_rejected_up_front() {
        let s = Schedule::new(vec![Fixture::new(1, "A", "Q", false)]);
        let err = Simulation::new(league(), s).unwrap_err();
        assert_eq!(err, SimError::UnknownTeam("Q".to_string()));
    }

    #[test]
    fn trial_leaves_baseline_untouched() {
        let sim = Simulation::new(league(), schedule()).unwrap();
        let before = sim.baseline().teams().cloned().collect::<Vec<_>>();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let points = sim.run_trial(&mut rng).unwrap();
        let after = sim.baseline().teams().cloned().collect::<Vec<_>>();
        assert_eq!(before, after);
        assert!(sim.baseline().output_points().values().all(|&p| p == 0));

        // Three unplayed fixtures, 2 or 3 points each.
        let total: u32 = points.values().sum();
        assert!((6..=9).contains(&total));
    }

    #[test]
    fn run_is_deterministic_across_thread_counts() {
        let sim = Simulation::new(league(), schedule()).unwrap();
        let fixed = vec![("A".to_string(), 3), ("B".to_string(), 0), ("C".to_string(), 0)];

        let mut one = Rank::new(fixed.clone()).unwrap();
        sim.run(&mut one, &SimConfig::default().with_trials(200).with_seed(99).with_threads(1))
            .unwrap();
        let mut four = Rank::new(fixed).unwrap();
        sim.run(&mut four, &SimConfig::default().with_trials(200).with_seed(99).with_threads(4))
            .unwrap();

        assert_eq!(one.collected_points("A").unwrap(), four.collected_points("A").unwrap());
        assert_eq!(one.final_rank().unwrap(), four.final_rank().unwrap());
    }

    #[test]
    fn failed_run_records_nothing() {
        let broken = League::new(
            vec![
                Team::new("A").with_home(0, 0, 0).with_away(1, 1, 1),
                Team::new("B").with_home(1, 1, 1).with_away(1, 1, 1),
            ],
            1.0,
            1.0,
        )
        .unwrap();
        let sim = Simulation::new(broken, Schedule::new(vec![Fixture::new(1, "A", "B", false)]))
            .unwrap();
        let mut rank = Rank::new(vec![("A".to_string(), 0), ("B".to_string(), 0)]).unwrap();
        let err = sim
            .run(&mut rank, &SimConfig::default().with_trials(10).with_seed(1))
            .unwrap_err();
        assert!(matches!(err, SimError::NoMatchesPlayed { .. }));
        assert_eq!(rank.trial_count(), 0);
    }
}
