use std::collections::HashMap;

use crate::error::{Result, SimError};

/// Collects every trial's simulated points on top of the points each team
/// has already secured.
#[derive(Debug, Clone)]
pub struct Rank {
    order: Vec<String>,
    fixed_points: HashMap<String, u32>,
    collected_points: HashMap<String, Vec<u32>>,
    trial_count: usize,
}

impl Rank {
    /// `fixed_points` order is kept and used to break ties in [`Rank::final_rank`].
    pub fn new(fixed_points: Vec<(String, u32)>) -> Result<Self> {
        let mut order = Vec::with_capacity(fixed_points.len());
        let mut fixed = HashMap::with_capacity(fixed_points.len());
        for (name, pts) in fixed_points {
            if fixed.insert(name.clone(), pts).is_some() {
                return Err(SimError::DuplicateTeam(name));
            }
            order.push(name);
        }
        let collected_points = order.iter().map(|n| (n.clone(), Vec::new())).collect();
        Ok(Self {
            order,
            fixed_points: fixed,
            collected_points,
            trial_count: 0,
        })
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn teams(&self) -> &[String] {
        &self.order
    }

    pub fn fixed_points(&self, team: &str) -> Result<u32> {
        self.fixed_points
            .get(team)
            .copied()
            .ok_or_else(|| SimError::UnknownTeam(team.to_string()))
    }

    pub fn collected_points(&self, team: &str) -> Result<&[u32]> {
        self.collected_points
            .get(team)
            .map(Vec::as_slice)
            .ok_or_else(|| SimError::UnknownTeam(team.to_string()))
    }

    /// Append one trial's points. Nothing is recorded if a team is missing.
    pub fn record_trial(&mut self, trial_points: &HashMap<String, u32>) -> Result<()> {
        if let Some(missing) = self.order.iter().find(|n| !trial_points.contains_key(*n)) {
            return Err(SimError::MissingTrialPoints(missing.clone()));
        }
        for name in &self.order {
            if let (Some(pts), Some(seq)) =
                (trial_points.get(name), self.collected_points.get_mut(name))
            {
                seq.push(*pts);
            }
        }
        self.trial_count += 1;
        Ok(())
    }

    /// Mean simulated points plus fixed points, best first.
    pub fn final_rank(&self) -> Result<Vec<(String, f64)>> {
        self.ensure_trials()?;
        let mut rows = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let expected = mean(self.collected_points(name)?) + self.fixed_points(name)? as f64;
            rows.push((name.clone(), expected));
        }
        rows.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(rows)
    }

    /// Population standard deviation of the simulated points, in roster order.
    pub fn final_rank_std(&self) -> Result<Vec<(String, f64)>> {
        self.ensure_trials()?;
        self.order
            .iter()
            .map(|name| Ok((name.clone(), std_dev(self.collected_points(name)?))))
            .collect()
    }

    fn ensure_trials(&self) -> Result<()> {
        if self.trial_count == 0 {
            return Err(SimError::NoTrials);
        }
        Ok(())
    }
}

fn mean(xs: &[u32]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().map(|&x| x as f64).sum::<f64>() / xs.len() as f64
}

fn std_dev(xs: &[u32]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|&x| (x as f64 - m).powi(2)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}
