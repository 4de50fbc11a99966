use crate::model::{Combatant, Stat, StagedStat, MAX_STAGE, MIN_STAGE};

/// Numerator and denominator of the stage multiplier.
pub fn stage_ratio(stat: Stat, stage: i8) -> (u32, u32) {
    let mut num = 2u32;
    let mut den = 2u32;
    if stage > 0 {
        num += stage as u32;
    } else if stage < 0 {
        den += stage.unsigned_abs() as u32;
    }
    if stat.is_ratio() {
        num += 1;
        den += 1;
    }
    (num, den)
}

pub fn staged_value(base: u32, stat: Stat, stage: i8) -> f64 {
    let (num, den) = stage_ratio(stat, stage);
    base as f64 * (num as f64 / den as f64)
}

pub fn staged_stat(combatant: &Combatant, stat: Stat) -> f64 {
    let staged = combatant.stat(stat);
    staged_value(staged.current, stat, staged.stage)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StageChange {
    /// The stage already sat at +6 or -6; nothing was applied.
    Capped,
    Changed { from: i8, to: i8 },
}

/// Adds `delta` to the stage unless its magnitude is already at the cap.
///
/// A stage at either extreme refuses any further change, even one pointing
/// back toward 0. The result is clamped to [-6, 6].
pub fn apply_stage_delta(staged: &mut StagedStat, delta: i8) -> StageChange {
    let from = staged.stage;
    if from.unsigned_abs() >= MAX_STAGE.unsigned_abs() {
        return StageChange::Capped;
    }
    let to = from.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
    staged.stage = to;
    StageChange::Changed { from, to }
}
