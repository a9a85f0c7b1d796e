/// Per-stream Save/New buffers and the frame-by-frame redraw of a moving piece.
pub mod anim;
/// Rook-and-king patterns recognized when a castling move is redrawn.
pub mod castling;
pub mod config;
/// Per-square flags marking screen regions an animation left stale.
pub mod damage;
/// Square/pixel mapping.
pub mod geometry;
/// Rectangle arithmetic for redrawing only what a moving square uncovered.
pub mod overlap;
/// Realizing frame and flash delays.
pub mod pacing;
/// The drawing primitives the engine needs from a host toolkit.
pub mod raster;
/// A software [`Raster`](raster::Raster) drawing into RGBA buffers.
pub mod soft;
/// Piece images and their silhouette masks.
pub mod sprite;
/// Interpolating the screen positions of a moving piece.
pub mod tween;
/// The board view: incremental redraw, move animation, dragging and highlights.
pub mod view;

pub use anim::*;
pub use config::*;
pub use geometry::*;
pub use pacing::*;
pub use raster::*;
pub use soft::*;
pub use view::*;

pub use types;
pub use types::{Board, Color, Piece, PieceKind, Square, SquareShade};

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::geometry::*;
    pub use crate::pacing::*;
    pub use crate::raster::*;
    pub use crate::soft::*;
    pub use crate::view::*;
    pub use types::prelude::*;
}
