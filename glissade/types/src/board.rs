use std::{
    fmt,
    ops::{Index, IndexMut},
};

use anyhow::{bail, Result};

use super::{Piece, Square, MAX_BOARD_DIM};

/// Back rank of the standard array, from the a-file to the h-file.
const BACK_RANK: &str = "rnbqkbnr";

/// A snapshot of piece placement: `files × ranks` cells, each empty or holding a [`Piece`].
///
/// The game backend owns the authoritative board; the renderer only ever reads
/// a snapshot and keeps its own copy of the last one it drew.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    files: usize,
    ranks: usize,
    cells: Vec<Option<Piece>>,
}

impl Board {
    /// Creates an empty board of the given dimensions.
    ///
    /// Both dimensions must be in `1..=16`.
    pub fn new(files: usize, ranks: usize) -> Result<Self> {
        if !(1..=MAX_BOARD_DIM).contains(&files) || !(1..=MAX_BOARD_DIM).contains(&ranks) {
            bail!("Board dimensions must be between [1,{MAX_BOARD_DIM}]. Got {files}x{ranks}");
        }

        Ok(Self {
            files,
            ranks,
            cells: vec![None; files * ranks],
        })
    }

    /// The 8x8 board with both armies on their starting squares.
    pub fn standard() -> Self {
        let mut board = Self {
            files: 8,
            ranks: 8,
            cells: vec![None; 64],
        };

        for (file, letter) in BACK_RANK.chars().enumerate() {
            let file = file as u8;
            let black = Piece::from_letter(letter).ok();
            let white = Piece::from_letter(letter.to_ascii_uppercase()).ok();
            board.set(Square::new(file, 0), white);
            board.set(Square::new(file, 1), Some(Piece::WHITE_PAWN));
            board.set(Square::new(file, 6), Some(Piece::BLACK_PAWN));
            board.set(Square::new(file, 7), black);
        }

        board
    }

    /// Builds a board from a picture of it, one string per rank starting from the top rank.
    ///
    /// Each character is a piece letter or `.` for an empty square.
    ///
    /// # Example
    /// ```
    /// # use types::{Board, Piece, Square};
    /// let board = Board::from_diagram(&["..k", "...", "K.R"]).unwrap();
    /// assert_eq!(board.files(), 3);
    /// assert_eq!(board.get(Square::new(0, 0)), Some(Piece::WHITE_KING));
    /// assert_eq!(board.get(Square::new(2, 2)), Some(Piece::BLACK_KING));
    /// ```
    pub fn from_diagram(rows: &[&str]) -> Result<Self> {
        let files = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut board = Self::new(files, rows.len())?;

        for (i, row) in rows.iter().enumerate() {
            if row.chars().count() != files {
                bail!("Every row of a diagram must have {files} squares. Row {i} is {row:?}");
            }

            let rank = (board.ranks - 1 - i) as u8;
            for (file, c) in row.chars().enumerate() {
                let piece = match c {
                    '.' => None,
                    _ => Some(Piece::from_letter(c)?),
                };
                board.set(Square::new(file as u8, rank), piece);
            }
        }

        Ok(board)
    }

    /// Number of files (columns).
    pub const fn files(&self) -> usize {
        self.files
    }

    /// Number of ranks (rows).
    pub const fn ranks(&self) -> usize {
        self.ranks
    }

    /// Returns `true` if `square` lies on this board.
    pub const fn contains(&self, square: Square) -> bool {
        square.file() < self.files && square.rank() < self.ranks
    }

    /// Returns `true` if `other` has the same dimensions as `self`.
    pub const fn same_shape(&self, other: &Self) -> bool {
        self.files == other.files && self.ranks == other.ranks
    }

    /// The piece on `square`, if any. Squares off the board are empty.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.contains(square)
            .then(|| self.cells[self.cell(square)])
            .flatten()
    }

    /// Places `piece` on `square`, returning what was there.
    ///
    /// # Panics
    /// If `square` is not on this board.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        let cell = self.cell(square);
        std::mem::replace(&mut self.cells[cell], piece)
    }

    /// Removes and returns the piece on `square`.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.set(square, None)
    }

    /// Every square of this board, rank by rank from rank `0`.
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let files = self.files;
        (0..self.ranks).flat_map(move |rank| (0..files).map(move |file| Square::new(file as u8, rank as u8)))
    }

    /// Squares whose contents differ between `self` and `other`.
    ///
    /// Both boards must have the same shape.
    pub fn differences<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = Square> + 'a {
        debug_assert!(self.same_shape(other), "comparing boards of different shapes");
        self.squares().filter(move |&sq| self[sq] != other[sq])
    }

    fn cell(&self, square: Square) -> usize {
        assert!(
            self.contains(square),
            "{square} is not on a {}x{} board",
            self.files,
            self.ranks
        );
        square.rank() * self.files + square.file()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.cells[self.cell(index)]
    }
}

impl IndexMut<Square> for Board {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        let cell = self.cell(index);
        &mut self.cells[cell]
    }
}

impl fmt::Display for Board {
    /// Draws the board as a diagram, top rank first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..self.ranks).rev() {
            for file in 0..self.files {
                match self.get(Square::new(file as u8, rank as u8)) {
                    Some(piece) => write!(f, "{piece}")?,
                    None => write!(f, ".")?,
                }
            }
            if rank > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.files, self.ranks)?;
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board() {
        let board = Board::standard();
        assert_eq!(board.get("e1".parse().unwrap()), Some(Piece::WHITE_KING));
        assert_eq!(board.get("d8".parse().unwrap()), Some(Piece::BLACK_QUEEN));
        assert_eq!(board.get("e4".parse().unwrap()), None);
        assert_eq!(board.squares().filter(|&sq| board[sq].is_some()).count(), 32);
        assert_eq!(
            board.to_string().lines().next(),
            Some("rnbqkbnr"),
            "diagram starts from the top rank"
        );
    }

    #[test]
    fn test_diagram_roundtrip_and_errors() {
        let rows = ["r...k..r", "........", "........", "........", "........", "........", "........", "R...K..R"];
        let board = Board::from_diagram(&rows).unwrap();
        assert_eq!(board.to_string(), rows.join("\n"));

        assert!(Board::from_diagram(&[]).is_err());
        assert!(Board::from_diagram(&["..", "..."]).is_err());
        assert!(Board::from_diagram(&["x."]).is_err());
        assert!(Board::new(17, 8).is_err());
    }

    #[test]
    fn test_differences() {
        let before = Board::standard();
        let mut after = before.clone();
        let pawn = after.take("e2".parse().unwrap());
        after.set("e4".parse().unwrap(), pawn);

        let diffs: Vec<_> = before.differences(&after).map(|sq| sq.to_string()).collect();
        assert_eq!(diffs, ["e2", "e4"]);
        assert!(before.same_shape(&after));
        assert!(!before.same_shape(&Board::new(10, 8).unwrap()));
    }

    #[test]
    fn test_off_board_squares_are_empty() {
        let board = Board::new(5, 5).unwrap();
        assert!(!board.contains(Square::new(5, 0)));
        assert_eq!(board.get(Square::new(7, 7)), None);
    }
}
