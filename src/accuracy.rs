use crate::model::{Combatant, Move, Stat};
use crate::stats::staged_stat;
use rand::Rng;

/// Hit threshold on a 0..100 scale, or `None` for moves that never miss.
pub fn hit_threshold(move_def: &Move, attacker: &Combatant, defender: &Combatant) -> Option<f64> {
    if move_def.accuracy == 0 {
        return None;
    }
    let acc = staged_stat(attacker, Stat::Accuracy);
    let eva = staged_stat(defender, Stat::Evasion);
    Some(move_def.accuracy as f64 * (acc / eva))
}

pub fn roll_hit<R: Rng + ?Sized>(
    move_def: &Move,
    attacker: &Combatant,
    defender: &Combatant,
    rng: &mut R,
) -> bool {
    match hit_threshold(move_def, attacker, defender) {
        None => true,
        Some(threshold) => rng.gen_range(0.0..100.0) < threshold,
    }
}

/// Escape chance out of 256. The opponent's speed is floored at 1.
pub fn flee_chance(speed: u32, opponent_speed: u32, attempts: u32) -> f64 {
    (speed as f64 * 28.0) / opponent_speed.max(1) as f64 + 30.0 * attempts as f64
}

/// Integer draw in 0..=255, mapped from a unit float so pinned sources stay pinned.
fn flee_draw<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    ((rng.gen::<f64>() * 256.0) as u32).min(255)
}

/// Flee check on raw speeds.
///
/// A strictly faster runner escapes without touching `attempts`. Otherwise
/// `attempts` is bumped before the chance is computed, so the first try
/// already counts as one.
pub fn roll_flee<R: Rng + ?Sized>(
    runner: &Combatant,
    opponent: &Combatant,
    attempts: &mut u32,
    rng: &mut R,
) -> bool {
    let speed = runner.speed.current;
    let opponent_speed = opponent.speed.current;
    if speed > opponent_speed {
        return true;
    }
    *attempts = attempts.saturating_add(1);
    let chance = flee_chance(speed, opponent_speed, *attempts);
    (flee_draw(rng) as f64) < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseStats, MoveKind};
    use crate::types::Element;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn mon(speed: u32) -> Combatant {
        Combatant::new(
            "Runner",
            20,
            &[Element::Normal],
            BaseStats {
                hp: 50,
                attack: 50,
                defense: 50,
                special_attack: 50,
                special_defense: 50,
                speed,
            },
        )
    }

    #[test]
    fn zero_accuracy_never_misses() {
        let swift = Move::attack("Swift", MoveKind::Special, Element::Normal, 60, 0);
        let attacker = mon(10);
        let mut defender = mon(10);
        defender.evasion.stage = 6;
        assert_eq!(hit_threshold(&swift, &attacker, &defender), None);
        let mut rng = StepRng::new(u64::MAX, 0);
        assert!(roll_hit(&swift, &attacker, &defender, &mut rng));
    }

    #[test]
    fn stages_scale_threshold() {
        let shaky = Move::attack("Shaky", MoveKind::Physical, Element::Normal, 60, 90);
        let mut attacker = mon(10);
        let mut defender = mon(10);
        assert_eq!(hit_threshold(&shaky, &attacker, &defender), Some(90.0));
        attacker.accuracy.stage = -3;
        assert_eq!(hit_threshold(&shaky, &attacker, &defender), Some(45.0));
        attacker.accuracy.stage = 0;
        defender.evasion.stage = 3;
        assert_eq!(hit_threshold(&shaky, &attacker, &defender), Some(45.0));
    }

    #[test]
    fn hit_rate_tracks_accuracy() {
        let coin = Move::attack("Coin", MoveKind::Physical, Element::Normal, 60, 50);
        let attacker = mon(10);
        let defender = mon(10);
        let mut rng = SmallRng::seed_from_u64(42);
        let hits = (0..2000)
            .filter(|_| roll_hit(&coin, &attacker, &defender, &mut rng))
            .count();
        let rate = hits as f64 / 2000.0;
        assert!((rate - 0.5).abs() < 0.06, "hit rate {rate}");
    }

    #[test]
    fn faster_runner_always_escapes() {
        let runner = mon(51);
        let opponent = mon(50);
        let mut attempts = 0;
        // a draw of 255 would fail any roll
        let mut rng = StepRng::new(u64::MAX, 0);
        assert!(roll_flee(&runner, &opponent, &mut attempts, &mut rng));
        assert_eq!(attempts, 0);
    }

    #[test]
    fn flee_chance_grows_with_attempts() {
        assert_eq!(flee_chance(50, 100, 1), 44.0);
        assert_eq!(flee_chance(50, 100, 2), 74.0);
        assert_eq!(flee_chance(10, 0, 1), 310.0);
    }

    #[test]
    fn attempts_are_pre_incremented() {
        let runner = mon(50);
        let opponent = mon(100);
        let mut attempts = 0;
        let mut rng = SmallRng::seed_from_u64(1);
        roll_flee(&runner, &opponent, &mut attempts, &mut rng);
        assert_eq!(attempts, 1);
        roll_flee(&runner, &opponent, &mut attempts, &mut rng);
        assert_eq!(attempts, 2);
    }

    #[test]
    fn equal_speed_goes_through_roll() {
        let runner = mon(30);
        let opponent = mon(30);
        let mut attempts = 7;
        // chance = 28 + 240 > 255: succeeds even on the top draw
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(flee_draw(&mut rng), 255);
        assert!(roll_flee(&runner, &opponent, &mut attempts, &mut rng));
        assert_eq!(attempts, 8);
    }

    #[test]
    fn pinned_draws_decide_equal_speed_flee() {
        let runner = mon(30);
        let opponent = mon(30);
        // chance = 28 + 30 = 58
        let mut attempts = 0;
        let mut high = StepRng::new(u64::MAX, 0);
        assert!(!roll_flee(&runner, &opponent, &mut attempts, &mut high));
        assert_eq!(attempts, 1);

        let mut attempts = 0;
        let mut low = StepRng::new(0, 0);
        assert_eq!(flee_draw(&mut low), 0);
        assert!(roll_flee(&runner, &opponent, &mut attempts, &mut low));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn flee_draw_spans_full_byte() {
        let mut rng = SmallRng::seed_from_u64(3);
        let draws: Vec<u32> = (0..5000).map(|_| flee_draw(&mut rng)).collect();
        assert!(draws.iter().all(|&d| d <= 255));
        assert!(draws.iter().any(|&d| d < 16));
        assert!(draws.iter().any(|&d| d > 239));
    }

    #[test]
    fn stationary_opponent_does_not_divide_by_zero() {
        let runner = mon(0);
        let opponent = mon(0);
        let mut attempts = 0;
        let mut rng = SmallRng::seed_from_u64(9);
        let _ = roll_flee(&runner, &opponent, &mut attempts, &mut rng);
        assert_eq!(attempts, 1);
        assert_eq!(flee_chance(0, 0, 1), 30.0);
    }
}
