use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use env_logger::Env;
use log::warn;

use league_finisher::roster::SeasonInput;
use league_finisher::{ExpectedTable, SimConfig};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = parse_input_path().ok_or_else(|| {
        anyhow!("usage: league_finisher <season.json> [--trials N] [--seed N] [--threads N] [--week N] [--json]")
    })?;

    let mut config = SimConfig::from_env();
    if let Some(trials) = parse_u64_arg("--trials") {
        config = config.with_trials(trials as usize);
    }
    if let Some(seed) = parse_u64_arg("--seed") {
        config = config.with_seed(seed);
    }
    if let Some(threads) = parse_u64_arg("--threads") {
        config = config.with_threads(threads as usize);
    }

    let input = SeasonInput::load(&path)?;
    let (sim, mut rank) = input.build().context("invalid season input")?;

    if let Some(week) = parse_u64_arg("--week") {
        let week = week as u32;
        let loss = sim.week_loss_probabilities(week, config.max_goals)?;
        if loss.is_empty() {
            warn!("week {week} has no unplayed fixtures");
        }
        let mut rows = loss.into_iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        println!("Week {week} loss probability");
        for (team, p) in rows {
            println!("{:<24} {:>6.1}%", team, p * 100.0);
        }
        println!();
    }

    let table = sim.expected_table(&mut rank, &config)?;
    if has_flag("--json") {
        let json = serde_json::to_string_pretty(&table).context("serialize expected table")?;
        println!("{json}");
    } else {
        print_table(&table);
    }

    Ok(())
}

fn print_table(table: &ExpectedTable) {
    println!("Expected final standings ({} trials)", table.trials);
    println!("{:>3}  {:<24} {:>8} {:>7}", "#", "Team", "Pts", "Std");
    for (idx, row) in table.rows.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>8.2} {:>7.2}",
            idx + 1,
            row.team,
            row.expected_points,
            row.std_dev
        );
    }
}

fn parse_input_path() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=') && arg != "--json";
            continue;
        }
        return Some(PathBuf::from(arg));
    }
    std::env::var("SIM_INPUT").ok().map(PathBuf::from)
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<u64>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<u64>()
        {
            return Some(v);
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
