use std::ops::Range;

use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

pub fn classify_outcome(goals_home: u32, goals_away: u32) -> Outcome {
    if goals_home > goals_away {
        Outcome::Home
    } else if goals_home < goals_away {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// Home-win / draw / away-win probabilities of one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn total(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

fn check_lambda(lambda: f64) -> Result<f64> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(SimError::InvalidLambda(lambda));
    }
    Ok(lambda)
}

/// Poisson probability mass for every goal count in `ks`.
pub fn poisson_pmf(lambda: f64, ks: Range<usize>) -> Result<Vec<f64>> {
    let lambda = check_lambda(lambda)?;
    if ks.is_empty() {
        return Ok(Vec::new());
    }

    // p(k) = p(k-1) * lambda / k, walked from k = 0.
    let mut p = (-lambda).exp();
    let mut out = Vec::with_capacity(ks.len());
    for k in 0..ks.end {
        if k > 0 {
            p *= lambda / k as f64;
        }
        if k >= ks.start {
            out.push(p);
        }
    }
    Ok(out)
}

/// One draw from Poisson(`lambda`) using the caller's random source.
pub fn poisson_sample<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> Result<u32> {
    let lambda = check_lambda(lambda)?;
    if lambda == 0.0 {
        return Ok(0);
    }
    let dist = Poisson::new(lambda).map_err(|_| SimError::InvalidLambda(lambda))?;
    let draw: f64 = dist.sample(rng);
    Ok(draw as u32)
}

/// Joint scoreline matrix of two independent goal distributions.
/// Rows are home goals, columns are away goals.
pub fn joint_matrix(home_pmf: &[f64], away_pmf: &[f64]) -> Vec<Vec<f64>> {
    home_pmf
        .iter()
        .map(|p_h| away_pmf.iter().map(|p_a| p_h * p_a).collect())
        .collect()
}

/// Home win is the strictly lower triangle, draw the diagonal, away win the
/// strictly upper triangle.
pub fn outcome_probabilities(matrix: &[Vec<f64>]) -> Prob3 {
    let mut home = 0.0;
    let mut draw = 0.0;
    let mut away = 0.0;
    for (i, row) in matrix.iter().enumerate() {
        for (j, p) in row.iter().enumerate() {
            match i.cmp(&j) {
                std::cmp::Ordering::Greater => home += p,
                std::cmp::Ordering::Equal => draw += p,
                std::cmp::Ordering::Less => away += p,
            }
        }
    }
    Prob3 { home, draw, away }
}

/// Collapse every bin at or beyond `cutoff` into a single "cutoff or more"
/// bin. The result always has `cutoff + 1` entries.
pub fn truncate_tail(pmf: &[f64], cutoff: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(cutoff + 1);
    out.extend_from_slice(&pmf[..cutoff.min(pmf.len())]);
    out.resize(cutoff, 0.0);
    let tail: f64 = pmf.iter().skip(cutoff).sum();
    out.push(tail);
    out
}
