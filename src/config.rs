use std::env;

use crate::league::MPMA_MAX_GOALS;

const DEFAULT_TRIALS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub trials: usize,
    /// Base seed; trial `i` runs on `seed + i`. `None` picks one at random.
    pub seed: Option<u64>,
    pub threads: usize,
    pub max_goals: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            threads: default_threads(),
            max_goals: MPMA_MAX_GOALS,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            trials: env_parse::<usize>("SIM_TRIALS")
                .unwrap_or(d.trials)
                .clamp(1, 10_000_000),
            seed: env_parse::<u64>("SIM_SEED").or(d.seed),
            threads: env_parse::<usize>("SIM_THREADS")
                .unwrap_or(d.threads)
                .clamp(1, 64),
            max_goals: env_parse::<usize>("SIM_MAX_GOALS")
                .unwrap_or(d.max_goals)
                .clamp(1, 40),
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(2, 32)
}
