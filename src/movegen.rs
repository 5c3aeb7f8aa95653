use std::fmt;

use log::trace;

use crate::board::{Piece, PieceKind, Position, Probe, Side, Square};
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    DoubleStep,
    EnPassant,
}

/// The ray a move travels along, or `Knight` for a leap.
///
/// `Top` points toward rank 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Knight,
}

impl Direction {
    pub const RAYS: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomLeft,
        Direction::BottomRight,
    ];

    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomLeft,
        Direction::BottomRight,
    ];

    /// One `(rank, file)` step along the ray. Knights have no single step.
    pub fn delta(self) -> Option<(i8, i8)> {
        match self {
            Direction::Left => Some((0, -1)),
            Direction::Right => Some((0, 1)),
            Direction::Top => Some((-1, 0)),
            Direction::Bottom => Some((1, 0)),
            Direction::TopLeft => Some((-1, -1)),
            Direction::TopRight => Some((-1, 1)),
            Direction::BottomLeft => Some((1, -1)),
            Direction::BottomRight => Some((1, 1)),
            Direction::Knight => None,
        }
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub kind: MoveKind,
    pub direction: Direction,
    /// The mover as it stood on `from`.
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(piece: Piece, to: Square, direction: Direction) -> Self {
        Self {
            kind: MoveKind::Normal,
            direction,
            piece,
            from: piece.square,
            to,
        }
    }

    pub fn with_kind(mut self, kind: MoveKind) -> Self {
        self.kind = kind;
        self
    }

    /// Where a captured piece would stand. For en passant this is the square
    /// behind the destination, relative to the mover's advance.
    pub fn captured_square(&self) -> Option<Square> {
        match self.kind {
            MoveKind::EnPassant => self.to.offset(-self.piece.side.forward(), 0),
            _ => Some(self.to),
        }
    }

    pub(crate) fn touched_squares(&self) -> [Option<Square>; 3] {
        let victim = match self.kind {
            MoveKind::EnPassant => self.captured_square(),
            _ => None,
        };
        [Some(self.from), Some(self.to), victim]
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}-{}", self.piece.symbol(), self.from, self.to)?;
        if self.kind == MoveKind::EnPassant {
            write!(f, " e.p.")?;
        }
        Ok(())
    }
}

/// Check and checkmate as seen from the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameStatus {
    /// The side whose king is attacked.
    pub check: Option<Side>,
    /// The side that has been mated.
    pub checkmate: Option<Side>,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        self.checkmate.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.checkmate.map(|mated| mated.opposite())
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.check, self.checkmate) {
            (_, Some(mated)) => write!(f, "{} is checkmated", mated),
            (Some(checked), None) => write!(f, "{} is in check", checked),
            (None, None) => write!(f, "ongoing"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MoveGenerator {
    config: EngineConfig,
}

impl MoveGenerator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Legal moves of the piece on `origin`; empty if the square is empty.
    pub fn legal_moves(&self, position: &Position, origin: Square) -> Vec<Move> {
        let mut scratch = position.clone();
        self.legal_moves_in(&mut scratch, origin)
    }

    /// Same as [`MoveGenerator::legal_moves`], probing on `position` itself.
    /// The position is restored before this returns.
    pub(crate) fn legal_moves_in(&self, position: &mut Position, origin: Square) -> Vec<Move> {
        let Some(piece) = position.piece_at(origin) else {
            return Vec::new();
        };

        let mut moves = self.pseudo_legal_moves(position, origin);
        if piece.kind == PieceKind::King || self.config.is_strict() {
            moves.retain(|mv| !self.exposes_king(position, mv));
        }
        trace!("{} on {}: {} legal moves", piece.symbol(), origin, moves.len());
        moves
    }

    /// All legal moves of `side`, in board order.
    pub fn moves_for_side(&self, position: &Position, side: Side) -> Vec<Move> {
        let mut scratch = position.clone();
        let origins: Vec<Square> = scratch.pieces_of(side).map(|piece| piece.square).collect();
        origins
            .into_iter()
            .flat_map(|origin| self.legal_moves_in(&mut scratch, origin))
            .collect()
    }

    pub fn in_check(&self, position: &Position, side: Side) -> bool {
        self.king_attacked(position, side)
    }

    pub fn status(&self, position: &Position) -> GameStatus {
        let mut scratch = position.clone();
        self.status_in(&mut scratch)
    }

    pub(crate) fn status_in(&self, position: &mut Position) -> GameStatus {
        let side = position.side_to_move;
        if self.king_attacked(position, side) {
            let mated = !self.has_escape(position, side);
            GameStatus {
                check: Some(side),
                checkmate: mated.then_some(side),
            }
        } else if self.king_attacked(position, side.opposite()) {
            // A pinned piece moved away and left its own king attacked.
            GameStatus {
                check: Some(side.opposite()),
                checkmate: None,
            }
        } else {
            GameStatus::default()
        }
    }

    /// Whether some legal move of `side` leaves none of its kings attacked.
    fn has_escape(&self, position: &mut Position, side: Side) -> bool {
        let origins: Vec<Square> = position.pieces_of(side).map(|piece| piece.square).collect();
        for origin in origins {
            for mv in self.legal_moves_in(position, origin) {
                if !self.exposes_king(position, &mv) {
                    return true;
                }
            }
        }
        false
    }

    fn exposes_king(&self, position: &mut Position, mv: &Move) -> bool {
        let side = mv.piece.side;
        let mut probe = Probe::new(position);
        probe.play(mv);
        self.king_attacked(&probe, side)
    }

    /// Whether any enemy move lands on a square holding a king of `side`.
    fn king_attacked(&self, position: &Position, side: Side) -> bool {
        let kings: Vec<Square> = position
            .pieces_of(side)
            .filter(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.square)
            .collect();
        if kings.is_empty() {
            return false;
        }

        position.pieces_of(side.opposite()).any(|enemy| {
            self.pseudo_legal_moves(position, enemy.square)
                .iter()
                .any(|mv| kings.contains(&mv.to))
        })
    }

    /// Moves that follow the piece's movement shape, unfiltered for self-check.
    pub fn pseudo_legal_moves(&self, position: &Position, origin: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        let Some(piece) = position.piece_at(origin) else {
            return moves;
        };

        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(position, piece, &mut moves),
            PieceKind::Rook => self.sliding_moves(position, piece, &Direction::ORTHOGONAL, &mut moves),
            PieceKind::Bishop => self.sliding_moves(position, piece, &Direction::DIAGONAL, &mut moves),
            PieceKind::Queen => self.sliding_moves(position, piece, &Direction::RAYS, &mut moves),
            PieceKind::Knight => self.knight_moves(position, piece, &mut moves),
            PieceKind::King => self.king_steps(position, piece, &mut moves),
        }
        moves
    }

    fn sliding_moves(&self, position: &Position, piece: Piece, directions: &[Direction], moves: &mut Vec<Move>) {
        for &direction in directions {
            let Some((dr, df)) = direction.delta() else {
                continue;
            };
            let mut target = piece.square.offset(dr, df);
            while let Some(to) = target {
                match position.piece_at(to) {
                    Some(occupant) if occupant.side == piece.side => break,
                    Some(_) => {
                        moves.push(Move::new(piece, to, direction));
                        break;
                    }
                    None => moves.push(Move::new(piece, to, direction)),
                }
                target = to.offset(dr, df);
            }
        }
    }

    fn knight_moves(&self, position: &Position, piece: Piece, moves: &mut Vec<Move>) {
        for &(dr, df) in &KNIGHT_OFFSETS {
            if let Some(to) = piece.square.offset(dr, df) {
                if !self.is_friendly(position, piece, to) {
                    moves.push(Move::new(piece, to, Direction::Knight));
                }
            }
        }
    }

    fn king_steps(&self, position: &Position, piece: Piece, moves: &mut Vec<Move>) {
        for direction in Direction::RAYS {
            let Some((dr, df)) = direction.delta() else {
                continue;
            };
            if let Some(to) = piece.square.offset(dr, df) {
                if !self.is_friendly(position, piece, to) {
                    moves.push(Move::new(piece, to, direction));
                }
            }
        }
    }

    fn pawn_moves(&self, position: &Position, piece: Piece, moves: &mut Vec<Move>) {
        let forward = piece.side.forward();
        let (ahead, diagonals) = match piece.side {
            Side::White => (Direction::Top, [(-1, Direction::TopLeft), (1, Direction::TopRight)]),
            Side::Black => (Direction::Bottom, [(-1, Direction::BottomLeft), (1, Direction::BottomRight)]),
        };

        // Straight advances only onto empty squares.
        if let Some(one) = piece.square.offset(forward, 0) {
            if position.is_empty(one) {
                moves.push(Move::new(piece, one, ahead));
                if piece.square.rank() == piece.side.pawn_start_rank() {
                    if let Some(two) = one.offset(forward, 0) {
                        if position.is_empty(two) {
                            moves.push(Move::new(piece, two, ahead).with_kind(MoveKind::DoubleStep));
                        }
                    }
                }
            }
        }

        for (df, direction) in diagonals {
            let Some(to) = piece.square.offset(forward, df) else {
                continue;
            };
            match position.piece_at(to) {
                Some(occupant) if occupant.side != piece.side => {
                    moves.push(Move::new(piece, to, direction));
                }
                Some(_) => {}
                None => {
                    if self.en_passant_available(position, piece, df) {
                        moves.push(Move::new(piece, to, direction).with_kind(MoveKind::EnPassant));
                    }
                }
            }
        }
    }

    /// The last applied move was an enemy pawn's double step landing beside `pawn`.
    fn en_passant_available(&self, position: &Position, pawn: Piece, df: i8) -> bool {
        let Some(last) = position.last_move() else {
            return false;
        };
        let Some(beside) = pawn.square.offset(0, df) else {
            return false;
        };
        let landed_beside = position
            .piece_at(beside)
            .map_or(false, |other| other.kind == PieceKind::Pawn && other.side != pawn.side);

        last.kind == MoveKind::DoubleStep
            && last.piece.kind == PieceKind::Pawn
            && last.piece.side != pawn.side
            && last.to == beside
            && landed_beside
    }

    fn is_friendly(&self, position: &Position, piece: Piece, square: Square) -> bool {
        position
            .piece_at(square)
            .map_or(false, |occupant| occupant.side == piece.side)
    }
}
