use anyhow::{Context, Result};
use log::{trace, warn};
use types::{Piece, SquareShade};

use crate::{
    overlap::{intersect, update_rects},
    raster::{Buffer, Paint, Raster, Stream, Surface},
    Point, Rect,
};

/// One animated piece moving over the screen without disturbing what is beneath it.
///
/// The stream owns two square-sized off-screen buffers. `Save` always holds
/// the clean background under the previous frame; `New` is scratch space for
/// assembling the next one. Each frame restores only the parts of the old
/// position the new one does not cover, so the board never flickers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimStream {
    stream: Stream,
    /// Square size the buffers were allocated at.
    buffer_size: Option<i32>,
    prev_frame: Point,
    piece: Option<Piece>,
    active: bool,
}

impl AnimStream {
    pub const fn new(stream: Stream) -> Self {
        Self {
            stream,
            buffer_size: None,
            prev_frame: Point::new(0, 0),
            piece: None,
            active: false,
        }
    }

    pub const fn stream(&self) -> Stream {
        self.stream
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Top-left corner of the most recently drawn frame.
    pub const fn prev_frame(&self) -> Point {
        self.prev_frame
    }

    pub const fn piece(&self) -> Option<Piece> {
        self.piece
    }

    /// Starts animating `piece` from `start`, a square of the given `shade`.
    ///
    /// The square under `start` is assumed to be vacated by the move, so the
    /// saved background is a blank square rather than what is on screen.
    pub fn begin<R: Raster>(
        &mut self,
        raster: &mut R,
        size: i32,
        piece: Piece,
        shade: SquareShade,
        start: Point,
    ) -> Result<()> {
        if self.active {
            warn!("{:?} animation started while one was in progress; abandoning the old one", self.stream);
            self.lift(raster);
            self.active = false;
        }

        self.allocate(raster, size)?;
        raster.fill_rect(self.save(), Rect::new(0, 0, size, size), Paint::Square(shade));

        self.prev_frame = start;
        self.piece = Some(piece);
        self.active = true;
        trace!("{:?} animation of {} begins at {start:?}", self.stream, piece.name());
        Ok(())
    }

    /// Draws `piece` with its top-left corner at `at`, repairing the previous frame.
    pub fn frame<R: Raster>(&mut self, raster: &mut R, at: Point, piece: Piece) {
        let Some(size) = self.buffer_size.filter(|_| self.active) else {
            return;
        };
        let whole = Rect::new(0, 0, size, size);
        let prev = self.prev_frame;

        // What is about to be drawn over becomes the next background.
        raster.copy_rect(Surface::Screen, Rect::square(at, size), self.scratch(), Point::default());

        if let Some((overlap, offset)) = intersect(prev, at, size) {
            // Where the frames overlap, the screen shows the old piece: use the saved background instead.
            raster.copy_rect(self.save(), overlap, self.scratch(), offset);
            self.restore_uncovered(raster, size, at);
            raster.expose(Rect::square(prev, size).union(&Rect::square(at, size)));
        } else {
            raster.copy_rect(self.save(), whole, Surface::Screen, prev);
            raster.expose(Rect::square(prev, size));
        }

        raster.copy_rect(self.scratch(), whole, self.save(), Point::default());
        self.prev_frame = at;
        self.piece = Some(piece);

        raster.composite_piece(self.scratch(), piece, Point::default());
        raster.copy_rect(self.scratch(), whole, Surface::Screen, at);
        raster.expose(Rect::square(at, size));
        trace!("{:?} frame at {at:?}", self.stream);
    }

    /// Erases the last frame except where it overlaps the square at `finish`.
    ///
    /// The caller redraws the square at `finish` itself.
    pub fn end<R: Raster>(&mut self, raster: &mut R, finish: Point) {
        let Some(size) = self.buffer_size.filter(|_| self.active) else {
            return;
        };
        let prev = self.prev_frame;

        if intersect(prev, finish, size).is_some() {
            self.restore_uncovered(raster, size, finish);
        } else {
            raster.copy_rect(self.save(), Rect::new(0, 0, size, size), Surface::Screen, prev);
        }
        raster.expose(Rect::square(prev, size));

        self.active = false;
        trace!("{:?} animation ends at {finish:?}", self.stream);
    }

    /// Puts the saved background back under the current frame, leaving the stream active.
    pub fn lift<R: Raster>(&mut self, raster: &mut R) {
        let Some(size) = self.buffer_size.filter(|_| self.active) else {
            return;
        };
        raster.copy_rect(self.save(), Rect::new(0, 0, size, size), Surface::Screen, self.prev_frame);
        raster.expose(Rect::square(self.prev_frame, size));
    }

    /// Takes a fresh snapshot of the screen under the current frame and draws the piece on top again.
    ///
    /// Call after repainting the board beneath a [`lift`](Self::lift)ed stream.
    pub fn settle<R: Raster>(&mut self, raster: &mut R) {
        let (Some(size), Some(piece)) = (self.buffer_size.filter(|_| self.active), self.piece) else {
            return;
        };
        let whole = Rect::new(0, 0, size, size);
        let at = self.prev_frame;

        raster.copy_rect(Surface::Screen, Rect::square(at, size), self.save(), Point::default());
        raster.copy_rect(self.save(), whole, self.scratch(), Point::default());
        raster.composite_piece(self.scratch(), piece, Point::default());
        raster.copy_rect(self.scratch(), whole, Surface::Screen, at);
        raster.expose(Rect::square(at, size));
    }

    /// Forgets the buffers and any frame in progress, as after the board was resized.
    pub fn invalidate(&mut self) {
        self.buffer_size = None;
        self.active = false;
    }

    fn allocate<R: Raster>(&mut self, raster: &mut R, size: i32) -> Result<()> {
        if self.buffer_size == Some(size) {
            return Ok(());
        }

        for buffer in [Buffer::Save, Buffer::New] {
            raster
                .allocate(Surface::Offscreen(self.stream, buffer), size, size)
                .with_context(|| format!("Failed to allocate {:?} animation buffers", self.stream))?;
        }
        self.buffer_size = Some(size);
        Ok(())
    }

    /// Copies the parts of the previous frame not covered by the square at `at` from `Save` to the screen.
    fn restore_uncovered<R: Raster>(&self, raster: &mut R, size: i32, at: Point) {
        let prev = self.prev_frame;
        for rect in update_rects(prev, at, size) {
            raster.copy_rect(self.save(), rect.translate(-prev.x, -prev.y), Surface::Screen, rect.origin());
        }
    }

    const fn save(&self) -> Surface {
        Surface::Offscreen(self.stream, Buffer::Save)
    }

    const fn scratch(&self) -> Surface {
        Surface::Offscreen(self.stream, Buffer::New)
    }
}
