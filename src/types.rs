use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Normal,
    Grass,
    Electric,
    Fire,
    Psychic,
    Ghost,
    Dark,
    Water,
    Rock,
    Ground,
    Flying,
    Poison,
    Bug,
    Steel,
    Fairy,
    Fighting,
    Dragon,
    Ice,
}

impl Element {
    pub const ALL: [Element; 18] = [
        Element::Normal,
        Element::Grass,
        Element::Electric,
        Element::Fire,
        Element::Psychic,
        Element::Ghost,
        Element::Dark,
        Element::Water,
        Element::Rock,
        Element::Ground,
        Element::Flying,
        Element::Poison,
        Element::Bug,
        Element::Steel,
        Element::Fairy,
        Element::Fighting,
        Element::Dragon,
        Element::Ice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Element::Normal => "normal",
            Element::Grass => "grass",
            Element::Electric => "electric",
            Element::Fire => "fire",
            Element::Psychic => "psychic",
            Element::Ghost => "ghost",
            Element::Dark => "dark",
            Element::Water => "water",
            Element::Rock => "rock",
            Element::Ground => "ground",
            Element::Flying => "flying",
            Element::Poison => "poison",
            Element::Bug => "bug",
            Element::Steel => "steel",
            Element::Fairy => "fairy",
            Element::Fighting => "fighting",
            Element::Dragon => "dragon",
            Element::Ice => "ice",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Multiplier of `attacking` against every element of the defender.
///
/// Each defending element is looked up on its own and the results are
/// multiplied, so two resistances give 0.25 and a single immunity gives 0.
pub fn type_effectiveness(attacking: Element, defenders: &[Element]) -> f64 {
    defenders
        .iter()
        .map(|defending| single_type_effectiveness(attacking, *defending))
        .product()
}

/// Chart keyed on the defending element: weaknesses, resistances, immunities.
pub fn single_type_effectiveness(attacking: Element, defending: Element) -> f64 {
    use Element::*;
    match defending {
        Normal => match attacking {
            Fighting => 2.0,
            Ghost => 0.0,
            _ => 1.0,
        },
        Grass => match attacking {
            Flying | Poison | Bug | Fire | Ice => 2.0,
            Ground | Water | Grass | Electric => 0.5,
            _ => 1.0,
        },
        Electric => match attacking {
            Ground => 2.0,
            Flying | Steel | Electric => 0.5,
            _ => 1.0,
        },
        Fire => match attacking {
            Ground | Rock | Water => 2.0,
            Bug | Steel | Fire | Grass | Ice | Fairy => 0.5,
            _ => 1.0,
        },
        Psychic => match attacking {
            Bug | Ghost | Dark => 2.0,
            Fighting | Psychic => 0.5,
            _ => 1.0,
        },
        Ghost => match attacking {
            Ghost | Dark => 2.0,
            Poison | Bug => 0.5,
            Normal | Fighting => 0.0,
            _ => 1.0,
        },
        Dark => match attacking {
            Fighting | Bug | Fairy => 2.0,
            Ghost | Dark => 0.5,
            Psychic => 0.0,
            _ => 1.0,
        },
        Water => match attacking {
            Grass | Electric => 2.0,
            Steel | Fire | Water | Ice => 0.5,
            _ => 1.0,
        },
        Rock => match attacking {
            Fighting | Ground | Steel | Water | Grass => 2.0,
            Normal | Flying | Poison | Fire => 0.5,
            _ => 1.0,
        },
        Ground => match attacking {
            Water | Grass | Ice => 2.0,
            Poison | Rock => 0.5,
            Electric => 0.0,
            _ => 1.0,
        },
        Flying => match attacking {
            Rock | Electric | Ice => 2.0,
            Fighting | Bug | Grass => 0.5,
            Ground => 0.0,
            _ => 1.0,
        },
        Poison => match attacking {
            Ground | Psychic => 2.0,
            Fighting | Poison | Grass | Bug | Fairy => 0.5,
            _ => 1.0,
        },
        Bug => match attacking {
            Flying | Rock | Fire => 2.0,
            Fighting | Ground | Grass => 0.5,
            _ => 1.0,
        },
        Steel => match attacking {
            Fighting | Ground | Fire => 2.0,
            Normal | Flying | Rock | Bug | Steel | Grass | Psychic | Ice | Dragon | Fairy => 0.5,
            Poison => 0.0,
            _ => 1.0,
        },
        Fairy => match attacking {
            Poison | Steel => 2.0,
            Fighting | Bug | Dark => 0.5,
            Dragon => 0.0,
            _ => 1.0,
        },
        Fighting => match attacking {
            Flying | Psychic | Fairy => 2.0,
            Rock | Bug | Dark => 0.5,
            _ => 1.0,
        },
        Dragon => match attacking {
            Ice | Dragon | Fairy => 2.0,
            Fire | Water | Grass | Electric => 0.5,
            _ => 1.0,
        },
        Ice => match attacking {
            Fighting | Rock | Steel | Fire => 2.0,
            Ice => 0.5,
            _ => 1.0,
        },
    }
}
