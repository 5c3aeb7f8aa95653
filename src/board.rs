use std::fmt;
use std::ops::{Deref, Not};
use std::str::FromStr;

use crate::error::ParseSquareError;
use crate::movegen::{Move, MoveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase placement letter.
    pub fn symbol(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<PieceKind> {
        match symbol.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'r' => Some(PieceKind::Rook),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank step of a pawn advance. White plays toward rank 0.
    pub fn forward(self) -> i8 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Side::White => 6,
            Side::Black => 1,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Side {
        self.opposite()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// A board coordinate. Rank 0 is the first rank of a placement string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    pub const fn new(rank: u8, file: u8) -> Option<Square> {
        if rank < 8 && file < 8 {
            Some(Square { rank, file })
        } else {
            None
        }
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file(self) -> u8 {
        self.file
    }

    /// The square `(dr, df)` away, or `None` past the edge of the board.
    pub fn offset(self, dr: i8, df: i8) -> Option<Square> {
        let rank = self.rank as i8 + dr;
        let file = self.file as i8 + df;
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Square {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    /// All 64 squares, rank by rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { rank, file }))
    }

    pub fn is_light(self) -> bool {
        (self.rank + self.file) % 2 == 0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSquareError(s.to_string());
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(invalid());
        }
        let file = bytes[0].to_ascii_uppercase().wrapping_sub(b'A');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(rank, file).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side, square: Square) -> Self {
        Self { kind, side, square }
    }

    /// Placement letter: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.side {
            Side::White => self.kind.symbol().to_ascii_uppercase(),
            Side::Black => self.kind.symbol(),
        }
    }
}

/// The board grid, the side to move and the last applied move.
///
/// The grid is the only record of where pieces are; `pieces()` walks it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    squares: [[Option<Piece>; 8]; 8],
    pub side_to_move: Side,
    last_move: Option<Move>,
}

impl Position {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_side_to_move(mut self, side: Side) -> Self {
        self.side_to_move = side;
        self
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Puts a piece on `square`, replacing any occupant.
    pub fn place(&mut self, kind: PieceKind, side: Side, square: Square) {
        self.set(Piece::new(kind, side, square));
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize].take()
    }

    fn set(&mut self, piece: Piece) {
        self.squares[piece.square.rank as usize][piece.square.file as usize] = Some(piece);
    }

    fn restore(&mut self, square: Square, contents: Option<Piece>) {
        self.squares[square.rank as usize][square.file as usize] = contents;
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.squares.iter().flatten().filter_map(|cell| *cell)
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |piece| piece.side == side)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces_of(side)
            .find(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.square)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    /// Applies a move produced by the generator for this position.
    ///
    /// Handles captures, the en passant victim and promotion to Queen. The
    /// side to move is left alone; flipping it is the game's job.
    pub fn make_move(&mut self, mv: &Move) {
        let Some(mut piece) = self.remove(mv.from) else {
            debug_assert!(false, "no piece on {} for move {:?}", mv.from, mv);
            return;
        };

        self.remove(mv.to);
        if mv.kind == MoveKind::EnPassant {
            if let Some(victim) = mv.captured_square() {
                self.remove(victim);
            }
        }

        piece.square = mv.to;
        if piece.kind == PieceKind::Pawn && mv.to.rank == piece.side.promotion_rank() {
            piece.kind = PieceKind::Queen;
        }
        self.set(piece);
        self.last_move = Some(*mv);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for (rank, row) in self.squares.iter().enumerate() {
            result.push_str(&format!("{} ", rank + 1));
            for (file, cell) in row.iter().enumerate() {
                result.push(cell.map_or('.', |piece| piece.symbol()));
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  A B C D E F G H\n");
        write!(f, "{}", result)
    }
}

/// A hypothetical change to a position that is undone when the probe drops.
///
/// Every square a played move touches is snapshotted first, so the position
/// comes back exactly as it was on every exit path.
pub(crate) struct Probe<'a> {
    position: &'a mut Position,
    saved: Vec<(Square, Option<Piece>)>,
    last_move: Option<Move>,
    side_to_move: Side,
}

impl<'a> Probe<'a> {
    pub(crate) fn new(position: &'a mut Position) -> Self {
        let last_move = position.last_move;
        let side_to_move = position.side_to_move;
        Self {
            position,
            saved: Vec::with_capacity(3),
            last_move,
            side_to_move,
        }
    }

    pub(crate) fn play(&mut self, mv: &Move) {
        for square in mv.touched_squares().into_iter().flatten() {
            self.saved.push((square, self.position.piece_at(square)));
        }
        self.position.make_move(mv);
    }
}

impl Deref for Probe<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        while let Some((square, contents)) = self.saved.pop() {
            self.position.restore(square, contents);
        }
        self.position.last_move = self.last_move;
        self.position.side_to_move = self.side_to_move;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::Direction;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert_eq!(sq("A1").offset(-1, 0), None);
        assert_eq!(sq("A1").offset(1, 1), Some(sq("B2")));
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn test_square_names() {
        let square = Square::new(0, 0).unwrap();
        assert_eq!(square.to_string(), "A1");
        assert_eq!(sq("h8"), Square::new(7, 7).unwrap());
        assert_eq!(sq("E7"), Square::new(6, 4).unwrap());
        assert!("I1".parse::<Square>().is_err());
        assert!("A9".parse::<Square>().is_err());
        assert!("A".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_shade() {
        assert!(sq("A1").is_light());
        assert!(!sq("B1").is_light());
        assert!(!sq("A2").is_light());
    }

    #[test]
    fn test_make_move_updates_piece_square() {
        let mut position = Position::empty();
        position.place(PieceKind::Rook, Side::White, sq("A1"));
        position.place(PieceKind::Knight, Side::Black, sq("A5"));
        let rook = position.piece_at(sq("A1")).unwrap();

        let mv = Move::new(rook, sq("A5"), Direction::Bottom);
        position.make_move(&mv);

        assert!(position.is_empty(sq("A1")));
        let moved = position.piece_at(sq("A5")).unwrap();
        assert_eq!(moved.kind, PieceKind::Rook);
        assert_eq!(moved.square, sq("A5"));
        assert_eq!(position.piece_count(), 1);
        assert_eq!(position.last_move(), Some(&mv));
        // The applier does not flip the turn.
        assert_eq!(position.side_to_move, Side::White);
    }

    #[test]
    fn test_probe_restores_everything() {
        let mut position = Position::empty();
        position.place(PieceKind::Queen, Side::White, sq("D4"));
        position.place(PieceKind::Pawn, Side::Black, sq("D7"));
        let original = position.clone();
        let queen = position.piece_at(sq("D4")).unwrap();

        {
            let mut probe = Probe::new(&mut position);
            probe.play(&Move::new(queen, sq("D7"), Direction::Bottom));
            assert_eq!(probe.piece_count(), 1);
            assert_eq!(probe.piece_at(sq("D7")).unwrap().kind, PieceKind::Queen);
        }

        assert_eq!(position, original);
    }

    #[test]
    fn test_display_marks_empty_squares() {
        let mut position = Position::empty();
        position.place(PieceKind::King, Side::Black, sq("E1"));
        let text = position.to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "1 . . . . k . . .");
    }
}
