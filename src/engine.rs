//! Combat session state machine.
//!
//! A [`Combat`] owns both trainers, the injected RNG, and the event sink.
//! Input is only accepted in [`CombatState::Waiting`]; a successful flee
//! moves the session to [`CombatState::Ended`] for good.

use crate::accuracy::{roll_flee, roll_hit};
use crate::damage::{calculate_damage, DamageRolls};
use crate::error::{CombatError, Result};
use crate::events::{CombatEndReason, CombatEvent, CombatState, EventSink};
use crate::model::{
    Combatant, EffectSubject, EffectTarget, Move, MoveNature, MoveSlot, Side, Stat, Trainer,
    Weather,
};
use crate::scheduler::determine_order;
use crate::stats::{apply_stage_delta, StageChange};
use crate::types::type_effectiveness;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Engine tunables.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CombatOptions {
    /// Pause after every log line. Zero disables pacing.
    pub pacing: Duration,
}

impl CombatOptions {
    pub fn paced(pacing: Duration) -> Self {
        Self { pacing }
    }
}

/// What a single phase did.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseOutcome {
    Missed,
    Damaged { amount: u32, critical: bool },
    /// The defender is immune to the move's element.
    NoEffect,
    StatChanged { target: Side, stat: Stat, from: i8, to: i8 },
    /// The target stage was already at +6 or -6.
    StatCapped { target: Side, stat: Stat },
    /// Status, confusion, and recoil effects are carried as data only.
    Unsupported { subject: EffectSubject },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhaseReport {
    pub side: Side,
    pub move_name: String,
    pub outcome: PhaseOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    pub first: Side,
    pub phases: Vec<PhaseReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FleeOutcome {
    Escaped,
    /// The rival still took its phase.
    Failed(TurnReport),
}

pub struct Combat<S: EventSink, R: Rng = SmallRng> {
    player: Trainer,
    rival: Trainer,
    weather: Option<Weather>,
    player_move: Option<Move>,
    rival_move: Option<Move>,
    run_attempts: u32,
    state: CombatState,
    options: CombatOptions,
    sink: S,
    rng: R,
}

impl<S: EventSink> Combat<S, SmallRng> {
    /// Session driven by a `SmallRng` seeded from `seed`.
    pub fn seeded(
        player: Trainer,
        rival: Trainer,
        weather: Option<Weather>,
        sink: S,
        seed: u64,
    ) -> Result<Self> {
        Self::new(player, rival, weather, sink, SmallRng::seed_from_u64(seed))
    }
}

impl<S: EventSink, R: Rng> Combat<S, R> {
    pub fn new(
        player: Trainer,
        rival: Trainer,
        weather: Option<Weather>,
        sink: S,
        rng: R,
    ) -> Result<Self> {
        Self::with_options(player, rival, weather, sink, rng, CombatOptions::default())
    }

    /// Validates the rosters, then announces `Waiting` and both active combatants.
    ///
    /// Fails when either trainer has an empty team or the rival's active
    /// combatant knows no moves to pick from.
    pub fn with_options(
        player: Trainer,
        rival: Trainer,
        weather: Option<Weather>,
        sink: S,
        rng: R,
        options: CombatOptions,
    ) -> Result<Self> {
        for trainer in [&player, &rival] {
            if trainer.team.is_empty() {
                return Err(CombatError::EmptyRoster {
                    trainer: trainer.name.clone(),
                });
            }
        }
        if rival.team[0].moves.is_empty() {
            return Err(CombatError::NoMoves {
                combatant: rival.team[0].name.clone(),
            });
        }
        let mut combat = Combat {
            player,
            rival,
            weather,
            player_move: None,
            rival_move: None,
            run_attempts: 0,
            state: CombatState::Waiting,
            options,
            sink,
            rng,
        };
        tracing::debug!(
            player = %combat.player().name,
            rival = %combat.rival().name,
            ?weather,
            "combat started"
        );
        combat.sink.emit(CombatEvent::State {
            state: CombatState::Waiting,
        });
        combat.emit_snapshot(Side::Player);
        combat.emit_snapshot(Side::Rival);
        Ok(combat)
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, CombatState::Ended(_))
    }

    pub fn weather(&self) -> Option<Weather> {
        self.weather
    }

    /// Flee attempts made so far. Never decreases.
    pub fn flee_attempts(&self) -> u32 {
        self.run_attempts
    }

    pub fn player(&self) -> &Combatant {
        &self.player.team[0]
    }

    pub fn rival(&self) -> &Combatant {
        &self.rival.team[0]
    }

    pub fn active(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => self.player(),
            Side::Rival => self.rival(),
        }
    }

    pub fn trainer(&self, side: Side) -> &Trainer {
        match side {
            Side::Player => &self.player,
            Side::Rival => &self.rival,
        }
    }

    /// The player's selectable moves.
    pub fn moves(&self) -> &[MoveSlot] {
        &self.player().moves
    }

    /// Moves chosen for the most recent turn.
    pub fn last_moves(&self) -> (Option<&Move>, Option<&Move>) {
        (self.player_move.as_ref(), self.rival_move.as_ref())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Plays a turn with the player's move at `move_index`.
    ///
    /// `None` stands for the forced/struggle path, which is rejected. The
    /// rival picks uniformly among its known moves.
    pub fn fight(&mut self, move_index: Option<usize>) -> Result<TurnReport> {
        self.ensure_waiting()?;
        let index = move_index.ok_or(CombatError::NoMoveSelected)?;
        let moves = &self.player().moves;
        let slot = moves.get(index).ok_or(CombatError::InvalidMoveIndex {
            index,
            len: moves.len(),
        })?;
        if !slot.active {
            return Err(CombatError::MoveUnavailable { index });
        }
        let player_move = slot.mv.clone();
        let rival_move = self.choose_rival_move();
        self.player_move = Some(player_move.clone());
        self.rival_move = Some(rival_move.clone());
        Ok(self.turn(Some(&player_move), &rival_move))
    }

    /// Attempts to flee.
    ///
    /// On success the session ends with [`CombatEndReason::PlayerFled`]. On
    /// failure the player forfeits its phase and only the rival acts.
    pub fn run(&mut self) -> Result<FleeOutcome> {
        self.ensure_waiting()?;
        self.set_state(CombatState::Busy);
        let escaped = roll_flee(
            &self.player.team[0],
            &self.rival.team[0],
            &mut self.run_attempts,
            &mut self.rng,
        );
        let name = self.player().name.clone();
        tracing::debug!(%name, escaped, attempts = self.run_attempts, "flee attempt");
        if escaped {
            self.log(format!("{name} fled"));
            self.end(CombatEndReason::PlayerFled);
            return Ok(FleeOutcome::Escaped);
        }
        self.log(format!("{name} couldn't flee"));
        let rival_move = self.choose_rival_move();
        self.player_move = None;
        self.rival_move = Some(rival_move.clone());
        Ok(FleeOutcome::Failed(self.turn(None, &rival_move)))
    }

    fn ensure_waiting(&self) -> Result<()> {
        match self.state {
            CombatState::Waiting => Ok(()),
            CombatState::Busy => Err(CombatError::Busy),
            CombatState::Ended(_) => Err(CombatError::SessionEnded),
        }
    }

    fn choose_rival_move(&mut self) -> Move {
        let moves = &self.rival.team[0].moves;
        let idx = self.rng.gen_range(0..moves.len());
        moves[idx].mv.clone()
    }

    fn turn(&mut self, player_move: Option<&Move>, rival_move: &Move) -> TurnReport {
        self.set_state(CombatState::Busy);
        let mut phases = Vec::with_capacity(2);
        let first = match player_move {
            Some(player_move) => {
                let first = determine_order(
                    player_move,
                    &self.player.team[0],
                    rival_move,
                    &self.rival.team[0],
                    &mut self.rng,
                );
                let (first_move, second_move) = match first {
                    Side::Player => (player_move, rival_move),
                    Side::Rival => (rival_move, player_move),
                };
                phases.push(self.phase(first, first_move));
                phases.push(self.phase(first.opponent(), second_move));
                first
            }
            None => {
                phases.push(self.phase(Side::Rival, rival_move));
                Side::Rival
            }
        };
        self.set_state(CombatState::Waiting);
        TurnReport { first, phases }
    }

    fn phase(&mut self, side: Side, mv: &Move) -> PhaseReport {
        let user = self.active(side).name.clone();
        self.log(format!("{user} used {}", mv.name));
        let outcome = {
            let (attacker, defender) = actives_mut(&mut self.player, &mut self.rival, side);
            resolve_phase(side, mv, attacker, defender, self.weather, &mut self.rng)
        };
        tracing::debug!(?side, move_name = %mv.name, ?outcome, "phase resolved");
        match &outcome {
            PhaseOutcome::Missed => self.log("Miss".to_string()),
            PhaseOutcome::Damaged { amount, critical } => {
                if *critical {
                    self.log("A critical hit!".to_string());
                }
                self.log(format!("Dealt {amount} damage"));
                self.emit_snapshot(side.opponent());
            }
            PhaseOutcome::NoEffect => self.log("Doesn't affect".to_string()),
            PhaseOutcome::StatChanged {
                target,
                stat,
                from,
                to,
            } => {
                let name = self.active(*target).name.clone();
                let verb = if to > from {
                    "rose"
                } else if to < from {
                    "fell"
                } else {
                    "didn't change"
                };
                self.log(format!("{name}'s {stat} {verb}"));
                self.emit_snapshot(*target);
            }
            PhaseOutcome::StatCapped { .. } => {
                self.log("Can't change stat stage more".to_string())
            }
            PhaseOutcome::Unsupported { .. } => self.log("Nothing happened".to_string()),
        }
        PhaseReport {
            side,
            move_name: mv.name.clone(),
            outcome,
        }
    }

    fn end(&mut self, reason: CombatEndReason) {
        tracing::info!(?reason, "combat ended");
        self.sink.emit(CombatEvent::CombatEnd { reason });
        self.set_state(CombatState::Ended(reason));
    }

    fn set_state(&mut self, state: CombatState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.sink.emit(CombatEvent::State { state });
    }

    fn emit_snapshot(&mut self, side: Side) {
        let combatant = self.active(side).clone();
        self.sink.emit(CombatEvent::Snapshot { side, combatant });
    }

    fn log(&mut self, text: String) {
        self.sink.emit(CombatEvent::Log { text });
        if !self.options.pacing.is_zero() {
            std::thread::sleep(self.options.pacing);
        }
    }
}

/// Active combatants as (acting, opposing) for `side`.
fn actives_mut<'a>(
    player: &'a mut Trainer,
    rival: &'a mut Trainer,
    side: Side,
) -> (&'a mut Combatant, &'a mut Combatant) {
    let player_active = &mut player.team[0];
    let rival_active = &mut rival.team[0];
    match side {
        Side::Player => (player_active, rival_active),
        Side::Rival => (rival_active, player_active),
    }
}

/// Applies one move from `attacker` (on `side`) to the combatants.
pub(crate) fn resolve_phase<R: Rng + ?Sized>(
    side: Side,
    mv: &Move,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    weather: Option<Weather>,
    rng: &mut R,
) -> PhaseOutcome {
    if !roll_hit(mv, attacker, defender, rng) {
        return PhaseOutcome::Missed;
    }
    match &mv.nature {
        MoveNature::Attack { .. } => {
            let rolls = DamageRolls::roll(rng);
            let amount = calculate_damage(mv, attacker, defender, weather, rolls);
            defender.take_damage(amount);
            PhaseOutcome::Damaged {
                amount,
                critical: rolls.critical,
            }
        }
        MoveNature::Effect {
            subject,
            target,
            stat,
            stages,
        } => {
            // Immunity is checked against the defender even for self-targeted effects.
            if type_effectiveness(mv.element, &defender.types) == 0.0 {
                return PhaseOutcome::NoEffect;
            }
            let stat = match (subject, stat) {
                (EffectSubject::Stat, Some(stat)) => *stat,
                _ => return PhaseOutcome::Unsupported { subject: *subject },
            };
            let (target_side, target_mon) = match target {
                EffectTarget::Rival => (side.opponent(), defender),
                EffectTarget::User => (side, attacker),
            };
            match apply_stage_delta(target_mon.stat_mut(stat), *stages) {
                StageChange::Capped => PhaseOutcome::StatCapped {
                    target: target_side,
                    stat,
                },
                StageChange::Changed { from, to } => PhaseOutcome::StatChanged {
                    target: target_side,
                    stat,
                    from,
                    to,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::model::{BaseStats, MoveKind};
    use crate::types::Element;
    use rand::rngs::mock::StepRng;

    fn mon(name: &str, types: &[Element], speed: u32) -> Combatant {
        Combatant::new(
            name,
            20,
            types,
            BaseStats {
                hp: 60,
                attack: 40,
                defense: 40,
                special_attack: 40,
                special_defense: 40,
                speed,
            },
        )
    }

    fn growl() -> Move {
        Move::stat_effect("Growl", Element::Normal, EffectTarget::Rival, Stat::Attack, -1, 0)
    }

    #[test]
    fn resolve_phase_applies_damage() {
        let tackle = Move::attack("Tackle", MoveKind::Physical, Element::Normal, 40, 0);
        let mut attacker = mon("A", &[Element::Normal], 10);
        let mut defender = mon("B", &[Element::Water], 10);
        let mut rng = SmallRng::seed_from_u64(11);
        let outcome = resolve_phase(
            Side::Player,
            &tackle,
            &mut attacker,
            &mut defender,
            None,
            &mut rng,
        );
        match outcome {
            PhaseOutcome::Damaged { amount, .. } => {
                assert!(amount > 0);
                assert_eq!(defender.hp.current, 60 - amount);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hp_floors_at_zero() {
        let nuke = Move::attack("Nuke", MoveKind::Special, Element::Fire, 250, 0);
        let mut attacker = mon("A", &[Element::Fire], 10);
        attacker.special_attack.current = 400;
        let mut defender = mon("B", &[Element::Grass], 10);
        defender.hp.current = 5;
        let mut rng = SmallRng::seed_from_u64(0);
        resolve_phase(
            Side::Player,
            &nuke,
            &mut attacker,
            &mut defender,
            Some(Weather::Sun),
            &mut rng,
        );
        assert_eq!(defender.hp.current, 0);
    }

    #[test]
    fn immune_defender_blocks_effect() {
        let mut attacker = mon("A", &[Element::Normal], 10);
        let mut defender = mon("B", &[Element::Ghost], 10);
        let mut rng = StepRng::new(0, 1);
        let outcome = resolve_phase(
            Side::Rival,
            &growl(),
            &mut attacker,
            &mut defender,
            None,
            &mut rng,
        );
        assert_eq!(outcome, PhaseOutcome::NoEffect);
        assert_eq!(defender.attack.stage, 0);
    }

    #[test]
    fn self_targeted_effect_changes_user() {
        let mut sharpen = Move::stat_effect(
            "Sharpen",
            Element::Normal,
            EffectTarget::User,
            Stat::Attack,
            2,
            0,
        );
        sharpen.kind = MoveKind::Physical;
        let mut attacker = mon("A", &[Element::Normal], 10);
        let mut defender = mon("B", &[Element::Water], 10);
        let mut rng = StepRng::new(0, 1);
        let outcome = resolve_phase(
            Side::Rival,
            &sharpen,
            &mut attacker,
            &mut defender,
            None,
            &mut rng,
        );
        assert_eq!(
            outcome,
            PhaseOutcome::StatChanged {
                target: Side::Rival,
                stat: Stat::Attack,
                from: 0,
                to: 2
            }
        );
        assert_eq!(attacker.attack.stage, 2);
        assert_eq!(defender.attack.stage, 0);
    }

    #[test]
    fn status_effects_are_inert() {
        let mut toxic = growl();
        toxic.nature = MoveNature::Effect {
            subject: EffectSubject::Status,
            target: EffectTarget::Rival,
            stat: None,
            stages: 0,
        };
        let mut attacker = mon("A", &[Element::Poison], 10);
        let mut defender = mon("B", &[Element::Water], 10);
        let before = defender.clone();
        let mut rng = StepRng::new(0, 1);
        let outcome = resolve_phase(
            Side::Player,
            &toxic,
            &mut attacker,
            &mut defender,
            None,
            &mut rng,
        );
        assert_eq!(
            outcome,
            PhaseOutcome::Unsupported {
                subject: EffectSubject::Status
            }
        );
        assert_eq!(defender, before);
    }

    #[test]
    fn construction_announces_both_sides() {
        let pika = mon("Pika", &[Element::Electric], 90).with_moves([growl()]);
        let pidgey = mon("Pidgey", &[Element::Normal, Element::Flying], 56).with_moves([growl()]);
        let player = Trainer::new("Red", vec![pika]);
        let rival = Trainer::new("Blue", vec![pidgey]);
        let combat =
            Combat::seeded(player, rival, None, EventLog::new(), 1).expect("valid rosters");
        let events = combat.sink().events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            CombatEvent::State {
                state: CombatState::Waiting
            }
        );
        assert!(matches!(events[1], CombatEvent::Snapshot { side: Side::Player, .. }));
        assert!(matches!(events[2], CombatEvent::Snapshot { side: Side::Rival, .. }));
    }

    #[test]
    fn empty_rosters_are_rejected() {
        let player = Trainer::new("Red", vec![]);
        let pidgey = mon("Pidgey", &[Element::Normal], 56).with_moves([growl()]);
        let rival = Trainer::new("Blue", vec![pidgey]);
        let err = Combat::seeded(player, rival, None, EventLog::new(), 1).err();
        assert_eq!(
            err,
            Some(CombatError::EmptyRoster {
                trainer: "Red".to_string()
            })
        );

        let player = Trainer::new("Red", vec![mon("Pika", &[Element::Electric], 90)]);
        let rival = Trainer::new("Blue", vec![mon("Pidgey", &[Element::Normal], 56)]);
        let err = Combat::seeded(player, rival, None, EventLog::new(), 1).err();
        assert_eq!(
            err,
            Some(CombatError::NoMoves {
                combatant: "Pidgey".to_string()
            })
        );
    }
}
