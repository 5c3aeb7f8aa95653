use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::board::{Position, Side, Square};
use crate::config::EngineConfig;
use crate::error::{IllegalReason, Result, RulesError};
use crate::movegen::{GameStatus, Move, MoveGenerator};
use crate::placement;

/// Turn order, cached move sets and check/checkmate tracking for one game.
///
/// Every piece's legal moves are regenerated after each ply, so
/// [`Game::legal_moves`] is always in step with the position.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    generator: MoveGenerator,
    moves: BTreeMap<Square, Vec<Move>>,
    status: GameStatus,
    history: Vec<Move>,
}

impl Game {
    pub fn new(position: Position, config: EngineConfig) -> Self {
        let mut game = Self {
            position,
            generator: MoveGenerator::new(config),
            moves: BTreeMap::new(),
            status: GameStatus::default(),
            history: Vec::new(),
        };
        game.refresh();
        game
    }

    pub fn from_placement(placement: &str, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(placement::load(placement)?, config))
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn into_position(self) -> Position {
        self.position
    }

    pub fn side_to_move(&self) -> Side {
        self.position.side_to_move
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn legal_moves(&self, square: Square) -> &[Move] {
        self.moves.get(&square).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cached moves of every piece belonging to `side`.
    pub fn moves_for_side(&self, side: Side) -> impl Iterator<Item = &Move> + '_ {
        self.moves
            .values()
            .flatten()
            .filter(move |mv| mv.piece.side == side)
    }

    /// Applies `mv` for the side to move and advances the turn.
    ///
    /// The move must be one of the cached legal moves of its piece. On error
    /// nothing changes.
    pub fn apply_move(&mut self, mv: &Move) -> Result<GameStatus> {
        if let Some(reason) = self.rejection(mv) {
            warn!("rejected {}: {}", mv, reason);
            return Err(RulesError::IllegalMove {
                from: mv.from,
                to: mv.to,
                reason,
            });
        }

        self.position.make_move(mv);
        self.position.side_to_move = self.position.side_to_move.opposite();
        self.history.push(*mv);
        self.refresh();

        debug!("ply {}: {} ({})", self.history.len(), mv, self.status);
        if let Some(mated) = self.status.checkmate {
            info!("{} is checkmated after {} plies", mated, self.history.len());
        }
        Ok(self.status)
    }

    fn rejection(&self, mv: &Move) -> Option<IllegalReason> {
        if self.status.is_over() {
            Some(IllegalReason::GameOver)
        } else if mv.piece.side != self.position.side_to_move {
            Some(IllegalReason::WrongSide)
        } else if !self.legal_moves(mv.from).contains(mv) {
            Some(IllegalReason::NotGenerated)
        } else {
            None
        }
    }

    fn refresh(&mut self) {
        self.moves.clear();
        let origins: Vec<Square> = self.position.pieces().map(|piece| piece.square).collect();
        for origin in origins {
            let moves = self.generator.legal_moves_in(&mut self.position, origin);
            self.moves.insert(origin, moves);
        }
        self.status = self.generator.status_in(&mut self.position);
    }
}
