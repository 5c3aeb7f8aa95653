//! Rank-by-rank placement strings.
//!
//! A placement is 8 ranks separated by `/`, the first describing grid rank 0.
//! Within a rank, digits `1`-`8` skip that many empty files and letters
//! `prnbqk` place a piece. Uppercase letters are White, lowercase are Black.

use log::debug;

use crate::board::{PieceKind, Position, Side, Square};
use crate::error::{PlacementFault, Result};

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Decodes a placement into a White-to-move position.
pub fn load(placement: &str) -> Result<Position> {
    let ranks: Vec<&str> = placement.trim().split('/').collect();
    if ranks.len() != 8 {
        return Err(PlacementFault::WrongRankCount { found: ranks.len() }.into());
    }

    let mut position = Position::empty();
    for (rank, descriptor) in ranks.iter().enumerate() {
        let mut file = 0usize;
        for symbol in descriptor.chars() {
            if let Some(run) = symbol.to_digit(10).filter(|run| (1..=8).contains(run)) {
                file += run as usize;
                continue;
            }

            let kind = PieceKind::from_symbol(symbol).ok_or(PlacementFault::UnknownSymbol { rank, symbol })?;
            let side = if symbol.is_ascii_uppercase() {
                Side::White
            } else {
                Side::Black
            };
            let square = Square::new(rank as u8, file as u8)
                .ok_or(PlacementFault::WrongFileCount { rank, files: file + 1 })?;
            position.place(kind, side, square);
            file += 1;
        }
        if file != 8 {
            return Err(PlacementFault::WrongFileCount { rank, files: file }.into());
        }
    }

    debug!("loaded placement {:?}: {} pieces", placement, position.piece_count());
    Ok(position)
}

impl Position {
    pub fn from_placement(placement: &str) -> Result<Position> {
        load(placement)
    }

    /// The standard setup: Black on ranks 0-1, White on ranks 6-7.
    pub fn starting() -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut position = Position::empty();
        for side in [Side::White, Side::Black] {
            let pawn_rank = side.pawn_start_rank();
            let back_rank = side.promotion_rank() ^ 7;
            for (file, &kind) in BACK_RANK.iter().enumerate() {
                let file = file as u8;
                if let (Some(back), Some(front)) = (Square::new(back_rank, file), Square::new(pawn_rank, file)) {
                    position.place(kind, side, back);
                    position.place(PieceKind::Pawn, side, front);
                }
            }
        }
        position
    }

    /// Encodes the grid with maximal empty-square runs.
    pub fn to_placement(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in 0..8u8 {
            let mut text = String::new();
            let mut empty = 0;
            for square in (0..8u8).filter_map(|file| Square::new(rank, file)) {
                match self.piece_at(square) {
                    Some(piece) => {
                        if empty > 0 {
                            text.push_str(&empty.to_string());
                            empty = 0;
                        }
                        text.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                text.push_str(&empty.to_string());
            }
            ranks.push(text);
        }
        ranks.join("/")
    }
}
