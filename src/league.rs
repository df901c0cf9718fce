use std::collections::HashMap;

use log::trace;
use rand::Rng;

use crate::distribution::{self, Prob3};
use crate::error::{Result, SimError};
use crate::schedule::{Fixture, Schedule};
use crate::team::{Team, Venue};

/// Goal bins used for the per-week loss probabilities.
pub const MPMA_MAX_GOALS: usize = 12;

/// One possible future of the season: every team's running record, the
/// points collected so far in this future, and the league-wide defensive
/// averages used to normalise team strengths.
#[derive(Debug, Clone)]
pub struct League {
    order: Vec<String>,
    teams: HashMap<String, Team>,
    points: HashMap<String, u32>,
    avg_conceded_home: f64,
    avg_conceded_away: f64,
}

impl League {
    pub fn new(teams: Vec<Team>, avg_conceded_home: f64, avg_conceded_away: f64) -> Result<Self> {
        let mut order = Vec::with_capacity(teams.len());
        let mut map = HashMap::with_capacity(teams.len());
        for team in teams {
            if map.contains_key(&team.name) {
                return Err(SimError::DuplicateTeam(team.name));
            }
            order.push(team.name.clone());
            map.insert(team.name.clone(), team);
        }
        let points = order.iter().map(|name| (name.clone(), 0)).collect();
        Ok(Self {
            order,
            teams: map,
            points,
            avg_conceded_home,
            avg_conceded_away,
        })
    }

    /// Baseline averages taken as goals conceded per team, at home and away.
    pub fn from_roster(teams: Vec<Team>) -> Result<Self> {
        let n = teams.len().max(1) as f64;
        let home: u64 = teams.iter().map(|t| t.goals_conceded_home as u64).sum();
        let away: u64 = teams.iter().map(|t| t.goals_conceded_away as u64).sum();
        Self::new(teams, home as f64 / n, away as f64 / n)
    }

    pub fn team(&self, name: &str) -> Result<&Team> {
        self.teams
            .get(name)
            .ok_or_else(|| SimError::UnknownTeam(name.to_string()))
    }

    /// Teams in roster order.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.order.iter().filter_map(|name| self.teams.get(name))
    }

    pub fn team_count(&self) -> usize {
        self.order.len()
    }

    pub fn league_avg_goals_conceded_home(&self) -> f64 {
        self.avg_conceded_home
    }

    pub fn league_avg_goals_conceded_away(&self) -> f64 {
        self.avg_conceded_away
    }

    /// Every team named by the schedule must be in the roster.
    pub fn validate_schedule(&self, schedule: &Schedule) -> Result<()> {
        for name in schedule.team_names() {
            self.team(name)?;
        }
        Ok(())
    }

    /// Attack-adjusted expected goals `(lambda_home, lambda_away)`.
    pub fn expected_goals(&self, home: &str, away: &str) -> Result<(f64, f64)> {
        let h = self.team(home)?;
        let a = self.team(away)?;
        let avg_away = checked_average(self.avg_conceded_away, Venue::Away)?;
        let avg_home = checked_average(self.avg_conceded_home, Venue::Home)?;

        let lambda_home = h.mean_goals_scored_home()? * a.goals_conceded_away as f64 / avg_away;
        let lambda_away = a.mean_goals_scored_away()? * h.goals_conceded_home as f64 / avg_home;
        Ok((lambda_home, lambda_away))
    }

    pub fn simulate_match<R: Rng + ?Sized>(
        &self,
        home: &str,
        away: &str,
        rng: &mut R,
    ) -> Result<(u32, u32)> {
        let (lambda_home, lambda_away) = self.expected_goals(home, away)?;
        let goals_home = distribution::poisson_sample(lambda_home, rng)?;
        let goals_away = distribution::poisson_sample(lambda_away, rng)?;
        Ok((goals_home, goals_away))
    }

    /// Goal pmfs over `0..max_goals` for both sides, not yet combined.
    pub fn match_outcome_distribution(
        &self,
        home: &str,
        away: &str,
        max_goals: usize,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        if max_goals == 0 {
            return Err(SimError::InvalidMaxGoals);
        }
        let (lambda_home, lambda_away) = self.expected_goals(home, away)?;
        Ok((
            distribution::poisson_pmf(lambda_home, 0..max_goals)?,
            distribution::poisson_pmf(lambda_away, 0..max_goals)?,
        ))
    }

    pub fn fixture_probabilities(&self, home: &str, away: &str, max_goals: usize) -> Result<Prob3> {
        let (pmf_home, pmf_away) = self.match_outcome_distribution(home, away, max_goals)?;
        let matrix = distribution::joint_matrix(&pmf_home, &pmf_away);
        Ok(distribution::outcome_probabilities(&matrix))
    }

    /// Probability that each team loses its unplayed fixture of `week`.
    pub fn week_loss_probabilities(
        &self,
        schedule: &Schedule,
        week: u32,
        max_goals: usize,
    ) -> Result<HashMap<String, f64>> {
        let mut out = HashMap::new();
        for fixture in schedule.week_fixtures(week, true) {
            let p = self.fixture_probabilities(&fixture.home, &fixture.away, max_goals)?;
            out.insert(fixture.home.clone(), p.away);
            out.insert(fixture.away.clone(), p.home);
        }
        Ok(out)
    }

    pub fn attribute_points(
        &mut self,
        goals_home: u32,
        goals_away: u32,
        home: &str,
        away: &str,
    ) -> Result<()> {
        self.team(home)?;
        self.team(away)?;
        let (pts_home, pts_away) = match distribution::classify_outcome(goals_home, goals_away) {
            distribution::Outcome::Home => (3, 0),
            distribution::Outcome::Draw => (1, 1),
            distribution::Outcome::Away => (0, 3),
        };
        *self.points.entry(home.to_string()).or_insert(0) += pts_home;
        *self.points.entry(away.to_string()).or_insert(0) += pts_away;
        Ok(())
    }

    /// Each side absorbs the scoreline from its own perspective.
    pub fn update_team_records(
        &mut self,
        goals_home: u32,
        goals_away: u32,
        home: &str,
        away: &str,
    ) -> Result<()> {
        self.team(away)?;
        self.teams
            .get_mut(home)
            .ok_or_else(|| SimError::UnknownTeam(home.to_string()))?
            .update_home(goals_home, goals_away);
        self.teams
            .get_mut(away)
            .ok_or_else(|| SimError::UnknownTeam(away.to_string()))?
            .update_away(goals_away, goals_home);
        Ok(())
    }

    /// Play out one week's fixtures in order, then shift the league-wide
    /// defensive averages by this week's conceded goals per team.
    pub fn simulate_week<R: Rng + ?Sized>(&mut self, fixtures: &[&Fixture], rng: &mut R) -> Result<()> {
        let mut week_conceded_home = 0u64;
        let mut week_conceded_away = 0u64;

        for fixture in fixtures.iter().filter(|f| !f.played) {
            let (goals_home, goals_away) = self.simulate_match(&fixture.home, &fixture.away, rng)?;
            self.attribute_points(goals_home, goals_away, &fixture.home, &fixture.away)?;
            self.update_team_records(goals_home, goals_away, &fixture.home, &fixture.away)?;
            week_conceded_home += goals_away as u64;
            week_conceded_away += goals_home as u64;
            trace!(
                "week {} {} {}-{} {}",
                fixture.week, fixture.home, goals_home, goals_away, fixture.away
            );
        }

        let n = self.team_count().max(1) as f64;
        self.avg_conceded_home += week_conceded_home as f64 / n;
        self.avg_conceded_away += week_conceded_away as f64 / n;
        Ok(())
    }

    pub fn simulate_schedule_week<R: Rng + ?Sized>(
        &mut self,
        schedule: &Schedule,
        week: u32,
        rng: &mut R,
    ) -> Result<()> {
        let fixtures = schedule.week_fixtures(week, true);
        self.simulate_week(&fixtures, rng)
    }

    pub fn output_points(&self) -> &HashMap<String, u32> {
        &self.points
    }
}

fn checked_average(value: f64, venue: Venue) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::DegenerateLeagueAverage { venue, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pair() -> League {
        let a = Team::new("A").with_home(10, 20, 10).with_away(10, 15, 12);
        let b = Team::new("B").with_home(10, 15, 12).with_away(10, 20, 10);
        League::new(vec![a, b], 1.0, 1.0).unwrap()
    }

    #[test]
    fn expected_goals_follow_strength_formula() {
        let league = pair();
        let (lh, la) = league.expected_goals("A", "B").unwrap();
        // A scores 2.0 per home game, B concedes 10 away; B scores 2.0 per away game, A concedes 10 at home.
        assert_eq!(lh, 2.0 * 10.0 / 1.0);
        assert_eq!(la, 2.0 * 10.0 / 1.0);

        let (lh, la) = league.expected_goals("B", "A").unwrap();
        assert_eq!(lh, 1.5 * 12.0);
        assert_eq!(la, 1.5 * 12.0);
    }

    #[test]
    fn expected_goals_scale_with_league_average() {
        let a = Team::new("A").with_home(4, 8, 4).with_away(4, 4, 6);
        let b = Team::new("B").with_home(4, 6, 2).with_away(4, 2, 8);
        let league = League::new(vec![a, b], 4.0, 2.0).unwrap();
        let (lh, la) = league.expected_goals("A", "B").unwrap();
        assert!((lh - 2.0 * 8.0 / 2.0).abs() < 1e-12);
        assert!((la - 0.5 * 4.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn zero_league_average_fails_loudly() {
        let a = Team::new("A").with_home(1, 1, 1).with_away(1, 1, 1);
        let b = Team::new("B").with_home(1, 1, 1).with_away(1, 1, 1);
        let league = League::new(vec![a, b], 1.0, 0.0).unwrap();
        assert_eq!(
            league.expected_goals("A", "B"),
            Err(SimError::DegenerateLeagueAverage {
                venue: Venue::Away,
                value: 0.0
            })
        );
    }

    #[test]
    fn unknown_team_is_reported() {
        let league = pair();
        assert_eq!(
            league.expected_goals("A", "Z"),
            Err(SimError::UnknownTeam("Z".to_string()))
        );
    }

    #[test]
    fn duplicate_team_is_rejected() {
        let err = League::new(vec![Team::new("A"), Team::new("A")], 1.0, 1.0).unwrap_err();
        assert_eq!(err, SimError::DuplicateTeam("A".to_string()));
    }

    #[test]
    fn from_roster_uses_conceded_per_team() {
        let a = Team::new("A").with_home(5, 5, 6).with_away(5, 5, 9);
        let b = Team::new("B").with_home(5, 5, 4).with_away(5, 5, 3);
        let league = League::from_roster(vec![a, b]).unwrap();
        assert_eq!(league.league_avg_goals_conceded_home(), 5.0);
        assert_eq!(league.league_avg_goals_conceded_away(), 6.0);
    }

    #[test]
    fn points_follow_result() {
        let mut league = pair();
        league.attribute_points(2, 1, "A", "B").unwrap();
        assert_eq!(league.output_points()["A"], 3);
        assert_eq!(league.output_points()["B"], 0);

        league.attribute_points(1, 1, "A", "B").unwrap();
        assert_eq!(league.output_points()["A"], 4);
        assert_eq!(league.output_points()["B"], 1);

        league.attribute_points(0, 3, "A", "B").unwrap();
        assert_eq!(league.output_points()["A"], 4);
        assert_eq!(league.output_points()["B"], 4);
    }

    #[test]
    fn points_for_unknown_team_are_not_created() {
        let mut league = pair();
        assert!(league.attribute_points(1, 0, "A", "Z").is_err());
        assert!(!league.output_points().contains_key("Z"));
        assert_eq!(league.output_points()["A"], 0);
    }

    #[test]
    fn records_absorb_each_side_of_the_scoreline() {
        let mut league = pair();
        league.update_team_records(3, 1, "A", "B").unwrap();
        let a = league.team("A").unwrap();
        assert_eq!((a.matches_home, a.goals_scored_home, a.goals_conceded_home), (11, 23, 11));
        let b = league.team("B").unwrap();
        assert_eq!((b.matches_away, b.goals_scored_away, b.goals_conceded_away), (11, 21, 13));
    }

    #[test]
    fn week_shifts_league_averages_by_conceded_per_team() {
        let mut league = pair();
        let fixtures = [Fixture::new(1, "A", "B", false)];
        let refs: Vec<&Fixture> = fixtures.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        league.simulate_week(&refs, &mut rng).unwrap();

        let a = league.team("A").unwrap();
        let b = league.team("B").unwrap();
        let goals_home = a.goals_scored_home - 20;
        let goals_away = b.goals_scored_away - 20;
        assert_eq!(a.goals_conceded_home - 10, goals_away);
        assert_eq!(b.goals_conceded_away - 10, goals_home);

        assert!((league.league_avg_goals_conceded_home() - (1.0 + goals_away as f64 / 2.0)).abs() < 1e-12);
        assert!((league.league_avg_goals_conceded_away() - (1.0 + goals_home as f64 / 2.0)).abs() < 1e-12);

        let total: u32 = league.output_points().values().sum();
        assert!(total == 3 || total == 2);
    }

    #[test]
    fn played_fixtures_are_skipped() {
        let mut league = pair();
        let fixtures = [Fixture::new(1, "A", "B", true)];
        let refs: Vec<&Fixture> = fixtures.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        league.simulate_week(&refs, &mut rng).unwrap();
        assert_eq!(league.team("A").unwrap().matches_home, 10);
        assert_eq!(league.league_avg_goals_conceded_home(), 1.0);
    }

    #[test]
    fn fixture_probabilities_sum_to_one() {
        let a = Team::new("A").with_home(10, 18, 9).with_away(10, 12, 14);
        let b = Team::new("B").with_home(10, 11, 13).with_away(10, 8, 17);
        let league = League::from_roster(vec![a, b]).unwrap();
        let p = league.fixture_probabilities("A", "B", 30).unwrap();
        assert!((p.total() - 1.0).abs() < 1e-6);
        assert!(p.home > p.away);
    }

    #[test]
    fn zero_goal_bins_are_rejected() {
        assert_eq!(
            pair().match_outcome_distribution("A", "B", 0),
            Err(SimError::InvalidMaxGoals)
        );
    }

    #[test]
    fn loss_probabilities_swap_sides() {
        let a = Team::new("A").with_home(10, 18, 9).with_away(10, 12, 14);
        let b = Team::new("B").with_home(10, 11, 13).with_away(10, 8, 17);
        let league = League::from_roster(vec![a, b]).unwrap();
        let schedule = Schedule::new(vec![Fixture::new(5, "A", "B", false)]);
        let p = league.fixture_probabilities("A", "B", MPMA_MAX_GOALS).unwrap();
        let loss = league
            .week_loss_probabilities(&schedule, 5, MPMA_MAX_GOALS)
            .unwrap();
        assert_eq!(loss["A"], p.away);
        assert_eq!(loss["B"], p.home);
        assert!(loss["A"] < loss["B"]);
    }
}
