use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

/// Largest number of files or ranks a board may have.
pub const MAX_BOARD_DIM: usize = 16;

/// Whether a square is painted with the light or the dark background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SquareShade {
    #[default]
    Light,
    Dark,
}

/// A square on the board, addressed by zero-based file (column) and rank (row).
///
/// Rank `0` is the first rank from White's point of view, file `0` is the a-file.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Creates a new [`Square`] without bounds checks against any particular board.
    ///
    /// # Example
    /// ```
    /// # use types::Square;
    /// let e2 = Square::new(4, 1);
    /// assert_eq!(e2.to_string(), "e2");
    /// ```
    pub const fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Zero-based file of this square.
    pub const fn file(&self) -> usize {
        self.file as usize
    }

    /// Zero-based rank of this square.
    pub const fn rank(&self) -> usize {
        self.rank as usize
    }

    /// Shade of this square. The a1 corner is dark.
    ///
    /// # Example
    /// ```
    /// # use types::{Square, SquareShade};
    /// assert_eq!(Square::new(0, 0).shade(), SquareShade::Dark);
    /// assert_eq!(Square::new(7, 0).shade(), SquareShade::Light);
    /// ```
    pub const fn shade(&self) -> SquareShade {
        if (self.file + self.rank) % 2 == 1 {
            SquareShade::Light
        } else {
            SquareShade::Dark
        }
    }

    /// Number of files plus number of ranks between `self` and `other`.
    pub fn manhattan_distance(&self, other: Square) -> usize {
        self.file().abs_diff(other.file()) + self.rank().abs_diff(other.rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    /// Parses algebraic notation such as `"e2"` or `"p16"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars
            .next()
            .ok_or_else(|| anyhow!("Square must not be empty"))?;
        if !file.is_ascii_lowercase() || (file as u8 - b'a') as usize >= MAX_BOARD_DIM {
            bail!("Invalid file {file:?} in square {s:?}");
        }

        let rank: usize = chars
            .as_str()
            .parse()
            .map_err(|_| anyhow!("Invalid rank in square {s:?}"))?;
        if rank == 0 || rank > MAX_BOARD_DIM {
            bail!("Rank in square {s:?} must be between [1,{MAX_BOARD_DIM}]");
        }

        Ok(Self::new(file as u8 - b'a', rank as u8 - 1))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}, {})", self.file, self.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parsing() {
        assert_eq!("a1".parse::<Square>().unwrap(), Square::new(0, 0));
        assert_eq!("h8".parse::<Square>().unwrap(), Square::new(7, 7));
        assert_eq!("p16".parse::<Square>().unwrap(), Square::new(15, 15));
        assert_eq!(Square::new(3, 3).to_string(), "d4");

        assert!("".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a0".parse::<Square>().is_err());
        assert!("q1".parse::<Square>().is_err());
        assert!("A1".parse::<Square>().is_err());
        assert!("a17".parse::<Square>().is_err());
    }

    #[test]
    fn test_manhattan_distance() {
        let b1 = Square::new(1, 0);
        assert_eq!(b1.manhattan_distance(b1), 0);
        assert_eq!(b1.manhattan_distance(Square::new(2, 2)), 3);
    }
}
