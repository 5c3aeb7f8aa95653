use crate::board::Square;
use thiserror::Error;

/// Why a placement string could not be decoded into a full 8x8 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementFault {
    #[error("expected 8 ranks, found {found}")]
    WrongRankCount { found: usize },

    #[error("rank {rank} describes {files} files instead of 8")]
    WrongFileCount { rank: usize, files: usize },

    #[error("unknown symbol {symbol:?} in rank {rank}")]
    UnknownSymbol { rank: usize, symbol: char },
}

/// Why a move was refused by the game state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalReason {
    #[error("the game is already over")]
    GameOver,

    #[error("it is not this side's turn")]
    WrongSide,

    #[error("the move is not among the piece's legal moves")]
    NotGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("malformed placement: {fault}")]
    MalformedPlacement { fault: PlacementFault },

    #[error("illegal move {from}-{to}: {reason}")]
    IllegalMove {
        from: Square,
        to: Square,
        reason: IllegalReason,
    },
}

impl From<PlacementFault> for RulesError {
    fn from(fault: PlacementFault) -> Self {
        RulesError::MalformedPlacement { fault }
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square name {0:?}")]
pub struct ParseSquareError(pub String);
