/// A board matrix of optional pieces, as handed over by the game backend.
pub mod board;
/// Enums for piece kinds, colors, and a struct for a chess piece.
pub mod piece;
/// Squares on a board (file and rank) and their shading.
pub mod square;

pub use board::*;
pub use piece::*;
pub use square::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::board::*;
    pub use crate::piece::*;
    pub use crate::square::*;
}
