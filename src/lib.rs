pub mod accuracy;
pub mod damage;
pub mod engine;
pub mod error;
pub mod events;
pub mod model;
pub mod scheduler;
pub mod stats;
pub mod types;

pub use crate::engine::{Combat, CombatOptions, FleeOutcome, PhaseOutcome, TurnReport};
pub use crate::error::CombatError;
pub use crate::events::{CombatEndReason, CombatEvent, CombatState, EventLog, EventSink};
pub use crate::model::{Combatant, Move, RosterFile, Side, Trainer, Weather};

use crate::events::{Tee, TracingSink};
use crate::model::{MAX_STAGE, MIN_STAGE};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Fight(usize),
    Run,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub roster_path: PathBuf,
    pub seed: u64,
    pub pacing: Duration,
    pub weather: Option<Weather>,
    pub actions: Vec<Action>,
    pub json_log: Option<PathBuf>,
}

pub fn load_roster(path: &Path) -> anyhow::Result<RosterFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_roster(&parsed)?;
    Ok(parsed)
}

pub fn validate_roster(roster: &RosterFile) -> anyhow::Result<()> {
    for trainer in [&roster.player, &roster.rival] {
        if trainer.team.is_empty() {
            anyhow::bail!("Trainer {} has no combatants", trainer.name);
        }
        for mon in &trainer.team {
            validate_combatant(mon)
                .with_context(|| format!("Invalid combatant in {}'s team", trainer.name))?;
        }
    }
    Ok(())
}

fn validate_combatant(mon: &Combatant) -> anyhow::Result<()> {
    if mon.types.is_empty() || mon.types.len() > 2 {
        anyhow::bail!("{} must have one or two types, got {}", mon.name, mon.types.len());
    }
    if mon.moves.is_empty() {
        anyhow::bail!("{} knows no moves", mon.name);
    }
    if mon.hp.current > mon.hp.total {
        anyhow::bail!(
            "{} has {} HP out of {}",
            mon.name,
            mon.hp.current,
            mon.hp.total
        );
    }
    for stat in [model::Stat::Accuracy, model::Stat::Evasion] {
        if mon.stat(stat).current == 0 {
            anyhow::bail!("{}'s {} must be positive", mon.name, stat);
        }
    }
    for stat in model::Stat::ALL {
        let stage = mon.stat(stat).stage;
        if !(MIN_STAGE..=MAX_STAGE).contains(&stage) {
            anyhow::bail!("{}'s {} stage {} is out of range", mon.name, stat, stage);
        }
    }
    Ok(())
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let roster = load_roster(&opts.roster_path)?;
    let weather = opts.weather.or(roster.weather);
    let printer = |event: CombatEvent| {
        if let CombatEvent::Log { text } = event {
            println!("{text}");
        }
    };
    let sink = Tee(Tee(printer, TracingSink), EventLog::new());
    let mut combat = Combat::with_options(
        roster.player,
        roster.rival,
        weather,
        sink,
        SmallRng::seed_from_u64(opts.seed),
        CombatOptions::paced(opts.pacing),
    )?;
    for action in &opts.actions {
        if combat.is_over() {
            break;
        }
        match action {
            Action::Fight(index) => {
                combat.fight(Some(*index))?;
            }
            Action::Run => {
                combat.run()?;
            }
        }
    }
    for side in [Side::Player, Side::Rival] {
        let mon = combat.active(side);
        println!(
            "{}'s {}: {}/{} HP",
            combat.trainer(side).name,
            mon.name,
            mon.hp.current,
            mon.hp.total
        );
    }
    if let Some(path) = &opts.json_log {
        let log = &combat.sink().1;
        let out = serde_json::to_string_pretty(&log.to_json())?;
        std::fs::write(path, out)
            .with_context(|| format!("Failed to write log to {}", path.display()))?;
        println!("Wrote event log to {}", path.display());
    }
    Ok(())
}
