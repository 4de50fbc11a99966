use crate::types::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_STAGE: i8 = 6;
pub const MIN_STAGE: i8 = -6;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Rival,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Rival,
            Side::Rival => Side::Player,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Rain,
    Sun,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Physical,
    Special,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Poisoned,
    Paralyzed,
    Burned,
    Frozen,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Speed,
    Evasion,
    Accuracy,
    Attack,
    SpecialAttack,
    Defense,
    SpecialDefense,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Speed,
        Stat::Evasion,
        Stat::Accuracy,
        Stat::Attack,
        Stat::SpecialAttack,
        Stat::Defense,
        Stat::SpecialDefense,
    ];

    /// Accuracy and evasion scale around a 3/3 baseline instead of 2/2.
    pub fn is_ratio(self) -> bool {
        matches!(self, Stat::Accuracy | Stat::Evasion)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Speed => "speed",
            Stat::Evasion => "evasion",
            Stat::Accuracy => "accuracy",
            Stat::Attack => "attack",
            Stat::SpecialAttack => "special attack",
            Stat::Defense => "defense",
            Stat::SpecialDefense => "special defense",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectSubject {
    Stat,
    Status,
    Confused,
    Recoil,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectTarget {
    Rival,
    #[serde(rename = "self")]
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nature", rename_all = "lowercase")]
pub enum MoveNature {
    Attack {
        power: u32,
    },
    Effect {
        subject: EffectSubject,
        target: EffectTarget,
        #[serde(default)]
        stat: Option<Stat>,
        #[serde(default)]
        stages: i8,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    pub kind: MoveKind,
    pub element: Element,
    /// 0 means the move never misses.
    #[serde(default)]
    pub accuracy: u32,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub multi_target: bool,
    #[serde(flatten)]
    pub nature: MoveNature,
}

impl Move {
    pub fn attack(name: &str, kind: MoveKind, element: Element, power: u32, accuracy: u32) -> Self {
        Move {
            name: name.to_string(),
            kind,
            element,
            accuracy,
            priority: 0,
            multi_target: false,
            nature: MoveNature::Attack { power },
        }
    }

    pub fn stat_effect(
        name: &str,
        element: Element,
        target: EffectTarget,
        stat: Stat,
        stages: i8,
        accuracy: u32,
    ) -> Self {
        Move {
            name: name.to_string(),
            kind: MoveKind::Special,
            element,
            accuracy,
            priority: 0,
            multi_target: false,
            nature: MoveNature::Effect {
                subject: EffectSubject::Stat,
                target,
                stat: Some(stat),
                stages,
            },
        }
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    pub fn power(&self) -> Option<u32> {
        match self.nature {
            MoveNature::Attack { power } => Some(power),
            MoveNature::Effect { .. } => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VitalStat {
    pub total: u32,
    pub current: u32,
}

impl VitalStat {
    pub fn full(total: u32) -> Self {
        Self {
            total,
            current: total,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagedStat {
    pub current: u32,
    #[serde(default)]
    pub stage: i8,
}

impl StagedStat {
    pub fn new(current: u32) -> Self {
        Self { current, stage: 0 }
    }
}

fn default_active() -> bool {
    true
}

fn default_pp() -> VitalStat {
    VitalStat::full(10)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub mv: Move,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_pp")]
    pub pp: VitalStat,
}

impl MoveSlot {
    pub fn new(mv: Move) -> Self {
        Self {
            mv,
            active: true,
            pp: default_pp(),
        }
    }
}

fn default_ratio_stat() -> StagedStat {
    StagedStat::new(100)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub level: u32,
    pub hp: VitalStat,
    pub speed: StagedStat,
    #[serde(default = "default_ratio_stat")]
    pub evasion: StagedStat,
    #[serde(default = "default_ratio_stat")]
    pub accuracy: StagedStat,
    pub attack: StagedStat,
    pub special_attack: StagedStat,
    pub defense: StagedStat,
    pub special_defense: StagedStat,
    #[serde(default)]
    pub confused: bool,
    #[serde(default)]
    pub status: Option<Status>,
    pub types: Vec<Element>,
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
}

impl Combatant {
    /// Fresh combatant: full HP, every stage at 0, accuracy and evasion at 100.
    pub fn new(name: &str, level: u32, types: &[Element], base: BaseStats) -> Self {
        Combatant {
            name: name.to_string(),
            level,
            hp: VitalStat::full(base.hp),
            speed: StagedStat::new(base.speed),
            evasion: default_ratio_stat(),
            accuracy: default_ratio_stat(),
            attack: StagedStat::new(base.attack),
            special_attack: StagedStat::new(base.special_attack),
            defense: StagedStat::new(base.defense),
            special_defense: StagedStat::new(base.special_defense),
            confused: false,
            status: None,
            types: types.to_vec(),
            moves: Vec::new(),
        }
    }

    pub fn with_moves(mut self, moves: impl IntoIterator<Item = Move>) -> Self {
        self.moves = moves.into_iter().map(MoveSlot::new).collect();
        self
    }

    pub fn stat(&self, stat: Stat) -> &StagedStat {
        match stat {
            Stat::Speed => &self.speed,
            Stat::Evasion => &self.evasion,
            Stat::Accuracy => &self.accuracy,
            Stat::Attack => &self.attack,
            Stat::SpecialAttack => &self.special_attack,
            Stat::Defense => &self.defense,
            Stat::SpecialDefense => &self.special_defense,
        }
    }

    pub fn stat_mut(&mut self, stat: Stat) -> &mut StagedStat {
        match stat {
            Stat::Speed => &mut self.speed,
            Stat::Evasion => &mut self.evasion,
            Stat::Accuracy => &mut self.accuracy,
            Stat::Attack => &mut self.attack,
            Stat::SpecialAttack => &mut self.special_attack,
            Stat::Defense => &mut self.defense,
            Stat::SpecialDefense => &mut self.special_defense,
        }
    }

    pub fn take_damage(&mut self, damage: u32) {
        self.hp.current = self.hp.current.saturating_sub(damage);
    }

    pub fn is_burned(&self) -> bool {
        matches!(self.status, Some(Status::Burned))
    }

    pub fn has_type(&self, element: Element) -> bool {
        self.types.contains(&element)
    }
}

/// Unstaged values used to build a [`Combatant`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trainer {
    pub name: String,
    pub team: Vec<Combatant>,
}

impl Trainer {
    pub fn new(name: &str, team: Vec<Combatant>) -> Self {
        Self {
            name: name.to_string(),
            team,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub player: Trainer,
    pub rival: Trainer,
    #[serde(default)]
    pub weather: Option<Weather>,
}
