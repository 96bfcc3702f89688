//! Command-line runner: one headless battle between two parties.

use clap::Parser;
use party_battle::battle::{Battle, BattleLog, BattleRng, NoPacing, SleepPacer};
use party_battle::character::factory::load_templates;
use party_battle::prefab_parties::{create_party_from_templates, get_prefab_party, template_for};
use party_battle::{
    CharacterTemplate, DataError, GameConfig, NotificationKind, Priority, Session, Source,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Turn-based party battle simulator
#[derive(Parser, Debug)]
#[command(name = "party-battle")]
#[command(about = "Turn-based party battle simulator")]
#[command(version)]
struct Args {
    /// RON file with engine settings; defaults are used when omitted
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// RON list of extra character templates, looked up by role before the built-ins
    #[arg(long, value_name = "TEMPLATES_FILE")]
    templates: Option<PathBuf>,

    /// Player roles (comma separated) or a prefab party id
    #[arg(long, value_delimiter = ',', default_value = "adventurers")]
    party: Vec<String>,

    /// Enemy roles (comma separated) or a prefab party id
    #[arg(long, value_delimiter = ',', default_value = "warband")]
    enemies: Vec<String>,

    /// Seed for a reproducible battle
    #[arg(long)]
    seed: Option<u64>,

    /// Print the result and notification log as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Wait between turns and rounds using the configured delays
    #[arg(long)]
    pace: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Battle failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let custom = match &args.templates {
        Some(path) => load_templates(path)?,
        None => Vec::new(),
    };
    let session = Session::new(config);

    let players = create_party_from_templates(&session, resolve_roles(&args.party, &custom)?)?;
    let enemies = create_party_from_templates(&session, resolve_roles(&args.enemies, &custom)?)?;
    info!(players = players.len(), enemies = enemies.len(), "Parties assembled");

    let log = BattleLog::attach(session.bus());
    if !args.json {
        // Live text output, one line per hinted broadcast. HIGH so a cause
        // prints before the notifications its handlers publish.
        session.bus().subscribe(
            Source::Broadcast,
            NotificationKind::Any,
            Priority::HIGH,
            |_, notification| {
                if let Some(hint) = notification.hint() {
                    println!("{}", hint.plain_text());
                }
                Ok(())
            },
        );
    }

    let rng = match args.seed {
        Some(seed) => BattleRng::from_seed(seed),
        None => BattleRng::new_random(),
    };
    let battle = Battle::new(&session).with_rng(rng);
    let mut battle = if args.pace {
        let settings = &session.config().battle;
        battle.with_pacer(SleepPacer::from_millis(
            settings.turn_delay_ms,
            settings.round_delay_ms,
        ))
    } else {
        battle.with_pacer(NoPacing)
    };

    let result = battle.start(&players, &enemies)?;

    if args.json {
        let report = serde_json::json!({
            "result": result,
            "log": log.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{} after {} round(s)", result.outcome, result.rounds);
        for snapshot in result.players.iter().chain(&result.enemies) {
            println!(
                "  {:<12} {:>4}/{:<4} {}",
                snapshot.name,
                snapshot.health,
                snapshot.max_health,
                if snapshot.alive { "" } else { "(defeated)" }
            );
        }
    }
    Ok(())
}

/// A single prefab party id expands to its roles; anything else is a role list.
fn resolve_roles(
    names: &[String],
    custom: &[CharacterTemplate],
) -> Result<Vec<CharacterTemplate>, DataError> {
    let roles = match names {
        [single] => get_prefab_party(single).map_or_else(|| names.to_vec(), |party| party.roles),
        _ => names.to_vec(),
    };
    roles
        .iter()
        .map(|role| {
            let wanted = role.to_lowercase();
            match custom.iter().find(|t| t.role.to_lowercase() == wanted) {
                Some(template) => Ok(template.clone()),
                None => template_for(role),
            }
        })
        .collect()
}
