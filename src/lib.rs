pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod movegen;
pub mod placement;

pub use board::{Piece, PieceKind, Position, Side, Square};
pub use config::{EngineConfig, SelfCheckPolicy};
pub use error::{IllegalReason, PlacementFault, RulesError};
pub use game::Game;
pub use movegen::{Direction, GameStatus, Move, MoveGenerator, MoveKind};
pub use placement::STARTING_PLACEMENT;

/// Decodes a placement string into a White-to-move position.
pub fn load_position(placement: &str) -> error::Result<Position> {
    placement::load(placement)
}

/// Legal moves of the piece on `square`, empty if there is none.
pub fn legal_moves(position: &Position, square: Square) -> Vec<Move> {
    MoveGenerator::default().legal_moves(position, square)
}

/// Applies a legal move for the side to move and hands the turn over.
///
/// `position` is left untouched when the move is rejected.
pub fn apply_move(position: &mut Position, mv: &Move) -> error::Result<GameStatus> {
    let mut game = Game::new(position.clone(), EngineConfig::default());
    let status = game.apply_move(mv)?;
    *position = game.into_position();
    Ok(status)
}

pub fn status(position: &Position) -> GameStatus {
    MoveGenerator::default().status(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_initial_position() {
        let position = load_position(STARTING_PLACEMENT).unwrap();
        let white: usize = position
            .pieces_of(Side::White)
            .map(|piece| legal_moves(&position, piece.square).len())
            .sum();
        assert_eq!(white, 20);
        assert_eq!(status(&position), GameStatus::default());
    }

    #[test]
    fn test_apply_then_status() {
        let mut position = load_position(STARTING_PLACEMENT).unwrap();
        let mv = legal_moves(&position, sq("D7"))
            .into_iter()
            .find(|mv| mv.to == sq("D5"))
            .unwrap();

        let applied = apply_move(&mut position, &mv).unwrap();
        assert_eq!(applied, GameStatus::default());
        assert_eq!(status(&position), GameStatus::default());
        assert_eq!(position.side_to_move, Side::Black);
        assert!(position.is_empty(sq("D7")));
        assert_eq!(position.last_move(), Some(&mv));
    }

    #[test]
    fn test_apply_rejects_wrong_side() {
        let mut position = load_position(STARTING_PLACEMENT).unwrap();
        let before = position.clone();
        let mv = legal_moves(&position, sq("D2"))[0];

        let err = apply_move(&mut position, &mv).unwrap_err();
        assert!(matches!(
            err,
            RulesError::IllegalMove {
                reason: IllegalReason::WrongSide,
                ..
            }
        ));
        assert_eq!(position, before);
    }

    #[test]
    fn test_malformed_placement() {
        let err = load_position("rnbqkbnr/pppppppp/8/8").unwrap_err();
        assert_eq!(err.to_string(), "malformed placement: expected 8 ranks, found 4");
    }

    #[test]
    fn test_empty_square_has_no_moves() {
        let position = load_position(STARTING_PLACEMENT).unwrap();
        assert!(legal_moves(&position, sq("E4")).is_empty());
    }

    #[test]
    fn test_random_playouts_keep_grid_consistent() {
        for (seed, policy) in [(7, SelfCheckPolicy::KingOnly), (11, SelfCheckPolicy::Strict)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = EngineConfig::new().with_self_check(policy);
            let mut game = Game::from_placement(STARTING_PLACEMENT, config).unwrap();

            for _ in 0..120 {
                if game.is_over() {
                    break;
                }
                let side = game.side_to_move();
                let candidates: Vec<Move> = game.moves_for_side(side).copied().collect();
                let Some(mv) = candidates.choose(&mut rng) else {
                    break;
                };

                let before = game.position().clone();
                let fresh = MoveGenerator::new(config).legal_moves(&before, mv.from);
                assert!(fresh.contains(mv));
                assert_eq!(game.position(), &before);

                game.apply_move(mv).unwrap();

                let position = game.position();
                for piece in position.pieces() {
                    assert_eq!(position.piece_at(piece.square), Some(piece));
                    assert!(piece.kind != PieceKind::Pawn || piece.square.rank() != piece.side.promotion_rank());
                }
                assert!(position.piece_count() <= 32);
                assert_eq!(position.side_to_move, !side);
            }
        }
    }
}
