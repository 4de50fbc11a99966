use thiserror::Error;

pub type Result<T> = std::result::Result<T, CombatError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("combat session has already ended")]
    SessionEnded,

    #[error("combat session is busy resolving a turn")]
    Busy,

    #[error("no move selected; struggle is not supported")]
    NoMoveSelected,

    #[error("move index {index} out of range for {len} known moves")]
    InvalidMoveIndex { index: usize, len: usize },

    #[error("move at index {index} is not available")]
    MoveUnavailable { index: usize },

    #[error("trainer {trainer} has no combatants")]
    EmptyRoster { trainer: String },

    #[error("{combatant} knows no moves")]
    NoMoves { combatant: String },
}
