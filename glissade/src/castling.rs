use types::{Board, Square};

/// The squares a castling move touches on one rank, as files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingTemplate {
    pub rank: u8,
    pub rook_from: u8,
    pub king_from: u8,
    pub rook_to: u8,
    pub king_to: u8,
}

impl CastlingTemplate {
    const fn new(rank: u8, rook_from: u8, king_from: u8, rook_to: u8, king_to: u8) -> Self {
        Self {
            rank,
            rook_from,
            king_from,
            rook_to,
            king_to,
        }
    }

    /// The four squares involved, rook origin first.
    pub const fn squares(&self) -> [Square; 4] {
        [
            Square::new(self.rook_from, self.rank),
            Square::new(self.king_from, self.rank),
            Square::new(self.rook_to, self.rank),
            Square::new(self.king_to, self.rank),
        ]
    }

    pub const fn rook_destination(&self) -> Square {
        Square::new(self.rook_to, self.rank)
    }
}

/// Queenside and kingside castling for White, then for Black.
pub const CASTLING_TABLE: [CastlingTemplate; 4] = [
    CastlingTemplate::new(0, 0, 4, 3, 2),
    CastlingTemplate::new(0, 7, 4, 5, 6),
    CastlingTemplate::new(7, 0, 4, 3, 2),
    CastlingTemplate::new(7, 7, 4, 5, 6),
];

/// Recognizes a castling move between `old` and `new`, returning the square the rook landed on.
///
/// A template matches when all four of its squares changed and a rook now
/// stands on its rook destination. Templates that do not fit on the board are
/// skipped. Only the first match counts.
pub fn detect(new: &Board, old: &Board) -> Option<Square> {
    if !new.same_shape(old) {
        return None;
    }

    CASTLING_TABLE.iter().find_map(|template| {
        let squares = template.squares();
        if !squares.iter().all(|&sq| new.contains(sq)) {
            return None;
        }

        let all_changed = squares.iter().all(|&sq| new[sq] != old[sq]);
        let rook_to = template.rook_destination();
        let rook_arrived = new[rook_to].is_some_and(|piece| piece.is_rook());
        (all_changed && rook_arrived).then_some(rook_to)
    })
}
