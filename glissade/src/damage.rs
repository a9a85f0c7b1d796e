use types::{Square, MAX_BOARD_DIM};

/// One flag per square, set when something other than the board redraw drew over it.
///
/// Damaged squares are repainted unconditionally by the next incremental redraw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageGrid {
    files: usize,
    ranks: usize,
    flags: [[bool; MAX_BOARD_DIM]; MAX_BOARD_DIM],
}

impl DamageGrid {
    /// Creates a clean grid for a `files` by `ranks` board.
    pub fn new(files: usize, ranks: usize) -> Self {
        Self {
            files: files.min(MAX_BOARD_DIM),
            ranks: ranks.min(MAX_BOARD_DIM),
            flags: [[false; MAX_BOARD_DIM]; MAX_BOARD_DIM],
        }
    }

    /// Marks `square` damaged. Squares off the board are ignored.
    pub fn mark(&mut self, square: Square) {
        if self.contains(square) {
            self.flags[square.rank()][square.file()] = true;
        }
    }

    /// Clears the flag on `square`, returning whether it was set.
    pub fn clear(&mut self, square: Square) -> bool {
        self.contains(square) && std::mem::take(&mut self.flags[square.rank()][square.file()])
    }

    pub fn is_damaged(&self, square: Square) -> bool {
        self.contains(square) && self.flags[square.rank()][square.file()]
    }

    pub fn clear_all(&mut self) {
        self.flags = [[false; MAX_BOARD_DIM]; MAX_BOARD_DIM];
    }

    /// Every damaged square, rank by rank.
    pub fn damaged(&self) -> impl Iterator<Item = Square> + '_ {
        (0..self.ranks)
            .flat_map(move |rank| (0..self.files).map(move |file| Square::new(file as u8, rank as u8)))
            .filter(move |&square| self.is_damaged(square))
    }

    /// Adopts new board dimensions, clearing every flag.
    pub fn reshape(&mut self, files: usize, ranks: usize) {
        *self = Self::new(files, ranks);
    }

    fn contains(&self, square: Square) -> bool {
        square.file() < self.files && square.rank() < self.ranks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let mut grid = DamageGrid::new(8, 8);
        let e4: Square = "e4".parse().unwrap();
        assert!(!grid.is_damaged(e4));

        grid.mark(e4);
        grid.mark("a1".parse().unwrap());
        assert!(grid.is_damaged(e4));
        assert_eq!(grid.damaged().map(|sq| sq.to_string()).collect::<Vec<_>>(), ["a1", "e4"]);

        assert!(grid.clear(e4));
        assert!(!grid.clear(e4));
        grid.clear_all();
        assert_eq!(grid.damaged().count(), 0);
    }

    #[test]
    fn test_off_board_squares_are_ignored() {
        let mut grid = DamageGrid::new(5, 5);
        grid.mark(Square::new(6, 1));
        assert!(!grid.is_damaged(Square::new(6, 1)));
        assert_eq!(grid.damaged().count(), 0);

        grid.mark(Square::new(4, 4));
        grid.reshape(10, 8);
        assert_eq!(grid.damaged().count(), 0);
        grid.mark(Square::new(9, 7));
        assert!(grid.is_damaged(Square::new(9, 7)));
    }
}
