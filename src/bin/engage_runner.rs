//! Headless Engagement Runner
//!
//! Fights one friendly unit against one enemy unit without a backend and
//! prints every round as JSON. Useful for tuning and regression checks.

use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use wargame_engagement::core::config::{load_config, EngineConfig};
use wargame_engagement::core::error::{EngageError, Result};
use wargame_engagement::core::types::UnitId;
use wargame_engagement::engagement::{
    EngagementData, FirstStrike, FirstStrikePolicy, MathParams, Round, RoundAction, RoundOutcome,
    OutcomeContext, SeededFactor, TacticsAnswers, UnitModifiers, UnitProfile, UnitType,
};

/// Headless Engagement Runner - resolve a duel and print each round
#[derive(Parser, Debug)]
#[command(name = "engage_runner")]
#[command(about = "Resolve a one-on-one engagement and output JSON per round")]
struct Args {
    /// Engine config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Friendly unit type, e.g. "Infantry" or "Armored Mechanized"
    #[arg(long, default_value = "Infantry")]
    friendly: String,

    /// Enemy unit type
    #[arg(long, default_value = "Infantry")]
    enemy: String,

    /// Friendly modifiers as JSON, e.g. '{"unitSize":"Company"}'
    #[arg(long, default_value = "{}")]
    friendly_mods: String,

    /// Enemy modifiers as JSON
    #[arg(long, default_value = "{}")]
    enemy_mods: String,

    /// Friendly answers as seven 0/1 digits:
    /// awareness logistics coverage gps comms fire pattern
    #[arg(long, default_value = "0000000")]
    friendly_tactics: String,

    /// Enemy answers, same layout
    #[arg(long, default_value = "0000000")]
    enemy_tactics: String,

    /// Override the configured first-strike policy (every-round, first-round-only)
    #[arg(long)]
    policy: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds even if both units stand
    #[arg(long, default_value_t = 50)]
    max_rounds: u32,
}

/// JSON output for one round
#[derive(Serialize)]
struct RoundReport {
    round: u32,
    first_strike: Option<FirstStrike>,
    friendly: EngagementData,
    enemy: EngagementData,
}

/// JSON output for the whole run
#[derive(Serialize)]
struct RunReport {
    friendly_type: String,
    enemy_type: String,
    seed: u64,
    policy: FirstStrikePolicy,
    rounds: Vec<RoundReport>,
    finished: bool,
    friendly_total_score: Option<u32>,
    enemy_total_score: Option<u32>,
    is_win: Option<bool>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wargame_engagement=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to encode report: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(policy) = &args.policy {
        config.first_strike_policy = parse_wire(policy)?;
    }

    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    let mut factors = SeededFactor::new(seed, config.random_factor_min, config.random_factor_max);

    let friendly = profile(1, &args.friendly, &args.friendly_mods)?;
    let enemy = profile(2, &args.enemy, &args.enemy_mods)?;
    let ours = parse_tactics(&args.friendly_tactics)?;
    let theirs = parse_tactics(&args.enemy_tactics)?;

    let mut round = Round::new(
        friendly,
        vec![enemy],
        config.first_strike_policy,
        MathParams::from(&config),
    )?;

    let mut rounds = Vec::new();
    let mut last_outcome = None;

    while !round.is_finished() && rounds.len() < args.max_rounds as usize {
        let script = [
            RoundAction::SelectEnemy {
                unit_id: UnitId(2),
                tactics: theirs,
            },
            RoundAction::StartEngagement,
            RoundAction::AnswerDetection {
                did_isr: ours.awareness,
                comms_good: ours.comms,
            },
            RoundAction::Next,
            RoundAction::AnswerEngagement {
                has_cas: ours.coverage,
                gps_jammed: ours.gps,
                defending_critical: ours.logistics,
            },
            RoundAction::CalculateEngagement,
            RoundAction::Next,
            RoundAction::AnswerAccuracy {
                target_in_outer_soi: ours.pattern,
                fire: ours.fire,
            },
            RoundAction::CalculateAccuracy,
            RoundAction::Next,
        ];
        for action in script {
            round = round.apply(action, &mut factors)?;
        }

        let outcome = RoundOutcome::from_round(&round, &OutcomeContext::default())?;
        rounds.push(RoundReport {
            round: outcome.round_number,
            first_strike: outcome.first_strike,
            friendly: outcome.friendly,
            enemy: outcome.enemy,
        });
        round = round.apply(RoundAction::Continue, &mut factors)?;
        last_outcome = Some(outcome);
    }

    let finished = round.is_finished();
    let scored = last_outcome.filter(|_| finished);
    Ok(RunReport {
        friendly_type: args.friendly.clone(),
        enemy_type: args.enemy.clone(),
        seed,
        policy: config.first_strike_policy,
        rounds,
        finished,
        friendly_total_score: scored.as_ref().map(RoundOutcome::friendly_total_score),
        enemy_total_score: scored.as_ref().map(RoundOutcome::enemy_total_score),
        is_win: scored.as_ref().map(RoundOutcome::is_win),
    })
}

fn profile(id: u32, type_name: &str, mods: &str) -> Result<UnitProfile> {
    let unit_type = UnitType::from_name(type_name);
    if unit_type == UnitType::Other {
        tracing::warn!(unit_type = type_name, "unknown unit type, stats will be zero");
    }
    let mut unit = UnitProfile::new(UnitId(id), type_name, unit_type);
    unit.modifiers = serde_json::from_str::<UnitModifiers>(mods)?;
    Ok(unit)
}

/// Decode a value by its wire name, e.g. a policy in kebab-case
fn parse_wire<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(text.to_string()))?)
}

fn parse_tactics(digits: &str) -> Result<TacticsAnswers> {
    let bits: Vec<bool> = digits
        .chars()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            _ => Err(EngageError::Config(format!("tactics must be 0/1 digits, got '{}'", digits))),
        })
        .collect::<Result<_>>()?;

    let [awareness, logistics, coverage, gps, comms, fire, pattern] = bits[..] else {
        return Err(EngageError::Config(format!(
            "tactics need exactly seven digits, got {}",
            bits.len()
        )));
    };
    Ok(TacticsAnswers {
        awareness,
        logistics,
        coverage,
        gps,
        comms,
        fire,
        pattern,
    })
}
