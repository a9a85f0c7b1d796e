use anyhow::Result;
use types::{Piece, SquareShade};

use crate::{Point, Rect};

/// One of the two animations that may be in flight at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    /// A move that has just been made, by the opponent or replayed from a game.
    Game,
    /// A piece the user is dragging with the pointer.
    Player,
}

impl Stream {
    /// Number of streams.
    pub const COUNT: usize = 2;

    pub const fn index(&self) -> usize {
        match self {
            Self::Game => 0,
            Self::Player => 1,
        }
    }
}

/// The two off-screen buffers each [`Stream`] owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Buffer {
    /// Clean background under the previous frame.
    Save,
    /// Scratch buffer the next frame is assembled in.
    New,
}

impl Buffer {
    pub const fn index(&self) -> usize {
        match self {
            Self::Save => 0,
            Self::New => 1,
        }
    }
}

/// A drawing surface: the visible board, or one of the animation buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Screen,
    Offscreen(Stream, Buffer),
}

/// Semantic paint for solid fills. The raster decides what pixels each one becomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Paint {
    /// Empty square background.
    Square(SquareShade),
    /// Grid lines, and erased highlight borders.
    Grid,
    /// Border around the squares of the last move.
    Highlight,
    /// Border around the squares of a queued premove.
    Premove,
    /// Disc drawn by a capture burst.
    Burst,
}

/// The primitive drawing operations the animation engine needs from a host toolkit.
///
/// Every operation is unbuffered and lands immediately on the target surface.
/// Implementations clip anything that falls outside a surface.
pub trait Raster {
    /// Allocates (or re-allocates) `surface` at `width` by `height` pixels.
    ///
    /// Failure is a resource error the caller cannot recover from.
    fn allocate(&mut self, surface: Surface, width: i32, height: i32) -> Result<()>;

    /// Prepares the piece images and masks for squares of `square_size` pixels.
    fn load_pieces(&mut self, square_size: i32) -> Result<()>;

    /// Copies `rect` of `src` so that its top-left corner lands on `to` in `dst`.
    fn copy_rect(&mut self, src: Surface, rect: Rect, dst: Surface, to: Point);

    /// Fills `rect` of `dst` with `paint`.
    fn fill_rect(&mut self, dst: Surface, rect: Rect, paint: Paint);

    /// Draws `piece` through its silhouette mask with its top-left corner at `at`.
    ///
    /// Pixels outside the mask are left untouched.
    fn composite_piece(&mut self, dst: Surface, piece: Piece, at: Point);

    /// Fills the disc inscribed in `bounds` with `paint`.
    fn fill_disc(&mut self, dst: Surface, bounds: Rect, paint: Paint);

    /// Tells the host that `rect` of the screen changed and may be presented.
    fn expose(&mut self, _rect: Rect) {}
}

impl<R: Raster + ?Sized> Raster for &mut R {
    fn allocate(&mut self, surface: Surface, width: i32, height: i32) -> Result<()> {
        (**self).allocate(surface, width, height)
    }

    fn load_pieces(&mut self, square_size: i32) -> Result<()> {
        (**self).load_pieces(square_size)
    }

    fn copy_rect(&mut self, src: Surface, rect: Rect, dst: Surface, to: Point) {
        (**self).copy_rect(src, rect, dst, to)
    }

    fn fill_rect(&mut self, dst: Surface, rect: Rect, paint: Paint) {
        (**self).fill_rect(dst, rect, paint)
    }

    fn composite_piece(&mut self, dst: Surface, piece: Piece, at: Point) {
        (**self).composite_piece(dst, piece, at)
    }

    fn fill_disc(&mut self, dst: Surface, bounds: Rect, paint: Paint) {
        (**self).fill_disc(dst, bounds, paint)
    }

    fn expose(&mut self, rect: Rect) {
        (**self).expose(rect)
    }
}
