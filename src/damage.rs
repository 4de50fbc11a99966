use crate::model::{Combatant, Move, MoveKind, Stat, Weather};
use crate::stats::staged_stat;
use crate::types::{type_effectiveness, Element};
use rand::Rng;

pub const CRITICAL_CHANCE: f64 = 1.0 / 24.0;

/// The two random inputs of a damage roll.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DamageRolls {
    pub critical: bool,
    /// 85..=100
    pub random_percent: u8,
}

impl DamageRolls {
    /// Non-critical hit at full strength.
    pub const MAX: DamageRolls = DamageRolls {
        critical: false,
        random_percent: 100,
    };

    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let critical = rng.gen::<f64>() < CRITICAL_CHANCE;
        let u: f64 = rng.gen();
        let random_percent = ((u * 15.0).round() as u8) + 85;
        DamageRolls {
            critical,
            random_percent,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DamageModifiers {
    pub multi_target: f64,
    pub weather: f64,
    pub critical: f64,
    pub burn: f64,
    pub random: f64,
    pub stab: f64,
    pub type_effectiveness: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            multi_target: 1.0,
            weather: 1.0,
            critical: 1.0,
            burn: 1.0,
            random: 1.0,
            stab: 1.0,
            type_effectiveness: 1.0,
        }
    }
}

impl DamageModifiers {
    pub fn collect(
        move_def: &Move,
        attacker: &Combatant,
        defender: &Combatant,
        weather: Option<Weather>,
        rolls: DamageRolls,
    ) -> Self {
        Self {
            // multi-target spread never triggers in singles
            multi_target: 1.0,
            weather: weather_modifier(weather, move_def.element),
            critical: if rolls.critical { 1.5 } else { 1.0 },
            burn: burn_modifier(attacker, move_def.kind),
            random: rolls.random_percent as f64 / 100.0,
            stab: if attacker.has_type(move_def.element) {
                1.5
            } else {
                1.0
            },
            type_effectiveness: type_effectiveness(move_def.element, &defender.types),
        }
    }

    pub fn combined(&self) -> f64 {
        self.multi_target
            * self.weather
            * self.critical
            * self.burn
            * self.random
            * self.stab
            * self.type_effectiveness
    }
}

pub fn weather_modifier(weather: Option<Weather>, element: Element) -> f64 {
    match (weather, element) {
        (Some(Weather::Rain), Element::Water) | (Some(Weather::Sun), Element::Fire) => 1.5,
        (Some(Weather::Rain), Element::Fire) | (Some(Weather::Sun), Element::Water) => 0.5,
        _ => 1.0,
    }
}

pub fn burn_modifier(attacker: &Combatant, kind: MoveKind) -> f64 {
    if attacker.is_burned() && kind == MoveKind::Physical {
        0.5
    } else {
        1.0
    }
}

fn offense_stats(kind: MoveKind) -> (Stat, Stat) {
    match kind {
        MoveKind::Physical => (Stat::Attack, Stat::Defense),
        MoveKind::Special => (Stat::SpecialAttack, Stat::SpecialDefense),
    }
}

/// Damage before modifiers, still real-valued.
pub fn base_damage(level: u32, power: u32, attack: f64, defense: f64) -> f64 {
    let level_factor = (2.0 + level as f64) / 5.0 + 2.0;
    ((level_factor * power as f64 * (attack / defense.max(1.0))) / 50.0) + 2.0
}

/// Damage dealt by `move_def`; effect moves deal none.
pub fn calculate_damage(
    move_def: &Move,
    attacker: &Combatant,
    defender: &Combatant,
    weather: Option<Weather>,
    rolls: DamageRolls,
) -> u32 {
    let Some(power) = move_def.power() else {
        return 0;
    };
    let (atk_stat, def_stat) = offense_stats(move_def.kind);
    let atk = staged_stat(attacker, atk_stat);
    let def = staged_stat(defender, def_stat);
    let modifiers = DamageModifiers::collect(move_def, attacker, defender, weather, rolls);
    let damage = (base_damage(attacker.level, power, atk, def) * modifiers.combined()).round();
    damage.max(0.0) as u32
}

/// Sixteen possible non-critical results, lowest roll first.
pub fn damage_range(
    move_def: &Move,
    attacker: &Combatant,
    defender: &Combatant,
    weather: Option<Weather>,
) -> Vec<u32> {
    (85..=100)
        .map(|random_percent| {
            calculate_damage(
                move_def,
                attacker,
                defender,
                weather,
                DamageRolls {
                    critical: false,
                    random_percent,
                },
            )
        })
        .collect()
}
