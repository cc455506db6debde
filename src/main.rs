//! Wargame Engagement - Console Entry Point
//!
//! Loads the engine config, connects to the unit hierarchy backend and
//! walks the player through engagement rounds one phase at a time.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use wargame_engagement::api::ApiClient;
use wargame_engagement::core::config::{load_config, DEFAULT_CONFIG_PATH};
use wargame_engagement::core::error::Result;
use wargame_engagement::core::types::{SectionId, UnitId};
use wargame_engagement::engagement::{Phase, Round, RoundAction, SeededFactor};
use wargame_engagement::session::{ContinueOutcome, EngagementSession};

type Session = EngagementSession<ApiClient, SeededFactor>;

#[derive(Parser, Debug)]
#[command(name = "wargame-engagement")]
#[command(about = "Resolve combat engagements round by round")]
struct Args {
    /// Engine config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Section to load on startup
    #[arg(long)]
    section: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wargame_engagement=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    tracing::info!(config = %args.config.display(), backend = %config.api.base_url, "engagement engine starting");

    let rt = Runtime::new()?;
    let client = ApiClient::new(&config.api)?;
    let factors = SeededFactor::from_config(&config);
    let mut session = EngagementSession::new(client, config, factors);

    if let Some(section) = args.section {
        if let Err(e) = rt.block_on(session.load_section(SectionId(section))) {
            println!("Could not load section {}: {}", section, e);
        }
    }

    print_help();

    loop {
        print!("{}> ", prompt(&session));
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        if command == "quit" || command == "q" {
            break;
        }

        if let Err(e) = run_command(&rt, &mut session, command, rest) {
            println!("Error: {}", e);
        }
    }

    println!("\nGoodbye.");
    Ok(())
}

fn print_help() {
    println!("\n=== ENGAGEMENT RESOLUTION ===");
    println!();
    println!("Commands:");
    println!("  load <section>              - Fetch friendly and enemy rosters");
    println!("  units                       - List loaded units");
    println!("  open <friendly id>          - Open a round for one of our units");
    println!("  select <enemy id>           - Pick the opposing unit (Setup)");
    println!("  start                       - Begin the engagement (Setup)");
    println!("  detect <isr> <comms>        - Answer detection questions (y/n)");
    println!("  engage <cas> <gps-jammed> <critical> - Answer engagement questions");
    println!("  aim <outer-soi> <fire>      - Answer accuracy questions");
    println!("  calc                        - Run the current phase's calculation");
    println!("  next / back                 - Move between phases");
    println!("  continue / c                - Acknowledge the summary");
    println!("  status / s                  - Show the round");
    println!("  exit                        - Abandon the round");
    println!("  quit / q                    - Leave");
    println!();
}

fn prompt(session: &Session) -> String {
    match session.round() {
        Some(round) => format!("[round {} {}] ", round.round_number(), round.phase().name()),
        None => String::new(),
    }
}

fn run_command(rt: &Runtime, session: &mut Session, command: &str, rest: &[&str]) -> Result<()> {
    match command {
        "help" | "h" => print_help(),
        "load" => match rest.first().and_then(|s| s.parse::<u32>().ok()) {
            Some(section) => {
                rt.block_on(session.load_section(SectionId(section)))?;
                display_units(session);
            }
            None => println!("Usage: load <section>"),
        },
        "units" | "u" => display_units(session),
        "open" => match parse_id(rest) {
            Some(id) => {
                let round = session.open(id)?;
                display_round(round);
            }
            None => println!("Usage: open <friendly id>"),
        },
        "select" => match parse_id(rest) {
            Some(id) => {
                let round = rt.block_on(session.select_enemy(id))?;
                display_round(round);
            }
            None => println!("Usage: select <enemy id>"),
        },
        "start" => {
            let round = session.act(RoundAction::StartEngagement)?;
            display_round(round);
        }
        "detect" => match parse_answers::<2>(rest) {
            Some([did_isr, comms_good]) => {
                session.act(RoundAction::AnswerDetection { did_isr, comms_good })?;
            }
            None => println!("Usage: detect <isr y/n> <comms y/n>"),
        },
        "engage" => match parse_answers::<3>(rest) {
            Some([has_cas, gps_jammed, defending_critical]) => {
                session.act(RoundAction::AnswerEngagement {
                    has_cas,
                    gps_jammed,
                    defending_critical,
                })?;
            }
            None => println!("Usage: engage <cas y/n> <gps-jammed y/n> <critical y/n>"),
        },
        "aim" => match parse_answers::<2>(rest) {
            Some([target_in_outer_soi, fire]) => {
                session.act(RoundAction::AnswerAccuracy {
                    target_in_outer_soi,
                    fire,
                })?;
            }
            None => println!("Usage: aim <outer-soi y/n> <fire y/n>"),
        },
        "calc" => {
            let action = match session.round().map(Round::phase) {
                Some(Phase::Accuracy) => RoundAction::CalculateAccuracy,
                _ => RoundAction::CalculateEngagement,
            };
            let round = session.act(action)?;
            display_round(round);
        }
        "next" | "n" => {
            let round = session.act(RoundAction::Next)?;
            display_round(round);
        }
        "back" | "b" => {
            let round = session.act(RoundAction::Back)?;
            display_round(round);
        }
        "continue" | "c" => match rt.block_on(session.continue_round())? {
            ContinueOutcome::NextRound => {
                if let Some(round) = session.round() {
                    display_round(round);
                }
            }
            ContinueOutcome::Ended { outcome, submit_error } => {
                println!(
                    "Engagement over after {} round(s): friendly {} vs enemy {} -> {}",
                    outcome.round_number,
                    outcome.friendly_total_score(),
                    outcome.enemy_total_score(),
                    if outcome.is_win() { "WIN" } else { "LOSS" }
                );
                if let Some(error) = submit_error {
                    println!("Outcome was not saved: {}", error);
                }
            }
        },
        "status" | "s" => match session.round() {
            Some(round) => display_round(round),
            None => println!("No round open."),
        },
        "exit" => session.exit(),
        _ => println!("Unknown command. Type 'help' for the list."),
    }
    Ok(())
}

fn parse_id(rest: &[&str]) -> Option<UnitId> {
    rest.first()?.parse::<u32>().ok().map(UnitId)
}

fn parse_answers<const N: usize>(rest: &[&str]) -> Option<[bool; N]> {
    if rest.len() != N {
        return None;
    }
    let mut answers = [false; N];
    for (slot, word) in answers.iter_mut().zip(rest) {
        *slot = match word.to_ascii_lowercase().as_str() {
            "y" | "yes" | "1" | "true" => true,
            "n" | "no" | "0" | "false" => false,
            _ => return None,
        };
    }
    Some(answers)
}

fn display_units(session: &Session) {
    let Some(section) = session.section() else {
        println!("No section loaded.");
        return;
    };
    println!("Section {}", section);
    println!("  Friendly:");
    for unit in session.friendly_units() {
        println!("    {:>4}  {:<24} {:<20} health {:.1}", unit.id, unit.name, unit.unit_type.name(), unit.health);
    }
    println!("  Enemy:");
    for unit in session.enemy_roster() {
        println!("    {:>4}  {:<24} {:<20} health {:.1}", unit.id, unit.name, unit.unit_type.name(), unit.health);
    }
}

fn display_round(round: &Round) {
    let friendly = round.friendly();
    println!();
    println!(
        "Round {} - {} ({}/{})",
        round.round_number(),
        round.phase().name(),
        round.phase_index() + 1,
        Phase::ALL.len()
    );
    println!("  Friendly: {} {} ({})", friendly.unit.id, friendly.unit.name, friendly.unit.unit_type.name());
    match round.enemy() {
        Some(enemy) => println!("  Enemy:    {} {} ({})", enemy.unit.id, enemy.unit.name, enemy.unit.unit_type.name()),
        None => println!("  Enemy:    (none selected, {} available)", round.roster().len()),
    }

    if let Some(enemy) = round.enemy() {
        if round.phase() != Phase::Setup {
            println!("                 friendly     enemy");
            let rows = [
                ("P", friendly.data.p, enemy.data.p),
                ("Ph", friendly.data.ph, enemy.data.ph),
                ("d_r", friendly.data.d_r, enemy.data.d_r),
                ("D", friendly.data.d, enemy.data.d),
                ("Fi", friendly.data.f_i, enemy.data.f_i),
                ("Fn", friendly.data.f_n, enemy.data.f_n),
            ];
            for (label, ours, theirs) in rows {
                println!("  {:<8} {:>12.4} {:>10.4}", label, ours, theirs);
            }
        }
    }

    if let Some(strike) = round.first_strike() {
        println!("  First strike by {:?} for {:.2}", strike.striker, strike.damage);
    }
    println!();
}
