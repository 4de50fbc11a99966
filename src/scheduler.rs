use crate::model::{Combatant, Move, Side, Stat};
use crate::stats::staged_stat;
use rand::Rng;

/// Side that acts first this turn: priority, then staged speed, then a coin flip.
pub fn determine_order<R: Rng + ?Sized>(
    player_move: &Move,
    player: &Combatant,
    rival_move: &Move,
    rival: &Combatant,
    rng: &mut R,
) -> Side {
    if player_move.priority != rival_move.priority {
        return if player_move.priority > rival_move.priority {
            Side::Player
        } else {
            Side::Rival
        };
    }
    let player_speed = staged_stat(player, Stat::Speed);
    let rival_speed = staged_stat(rival, Stat::Speed);
    if player_speed > rival_speed {
        Side::Player
    } else if rival_speed > player_speed {
        Side::Rival
    } else if rng.gen_bool(0.5) {
        Side::Player
    } else {
        Side::Rival
    }
}
