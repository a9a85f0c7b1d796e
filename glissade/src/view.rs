use anyhow::{Context, Result};
use log::{debug, trace, warn};
use types::{Board, Piece, Square, SquareShade};

use crate::{
    castling,
    config::{ViewConfig, MAX_FLASHING_DIFFS},
    damage::DamageGrid,
    tween::MovePath,
    AnimStream, Geometry, Pacer, Paint, Point, Raster, Rect, Stream, Surface,
};

/// What a call to [`BoardView::redraw`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedrawReport {
    /// The whole board was repainted.
    pub full: bool,
    /// Every square repainted, in paint order, each listed once.
    pub painted: Vec<Square>,
    /// Squares whose piece was flashed.
    pub flashed: Vec<Square>,
    /// Destination of a rook recognized as castling, painted without a flash.
    pub castle_rook: Option<Square>,
}

impl RedrawReport {
    fn painted(&mut self, square: Square) {
        if !self.painted.contains(&square) {
            self.painted.push(square);
        }
    }
}

/// A piece the user is dragging with the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Drag {
    from: Square,
    piece: Piece,
    /// Pointer position relative to the top-left corner of the dragged image.
    delta: Point,
}

/// A move being animated on the [`Stream::Game`] stream, one frame per step.
#[derive(Clone, Debug, PartialEq, Eq)]
struct MoveAnimation {
    piece: Piece,
    to: Square,
    path: MovePath,
    next_frame: usize,
    /// A second leg to run once this one lands.
    then: Option<(Square, Square)>,
}

/// A highlighted pair of squares, drawn as borders in the grid lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Highlights {
    pub from: Option<Square>,
    pub to: Option<Square>,
}

impl Highlights {
    fn squares(&self) -> impl Iterator<Item = Square> {
        self.from.into_iter().chain(self.to)
    }
}

/// A chess board on screen.
///
/// Owns everything the redraw needs: the raster it draws through, the pacer
/// that times animation frames and flashes, the last board it drew, the
/// squares animations have damaged since, and both animation streams.
///
/// The game backend stays in charge of the position. It calls
/// [`redraw`](Self::redraw) after every change and
/// [`animate_move`](Self::animate_move) when a move is made, while the input
/// layer drives the `drag_*` methods from pointer events.
#[derive(Debug)]
pub struct BoardView<R, P> {
    raster: R,
    pacer: P,
    config: ViewConfig,
    geometry: Geometry,

    last_board: Option<Board>,
    /// Flip state of the last redraw.
    drawn_flipped: bool,
    damage: DamageGrid,

    highlights: Highlights,
    premove: Highlights,

    game: AnimStream,
    player: AnimStream,
    drag: Option<Drag>,
    move_animation: Option<MoveAnimation>,
}

impl<R: Raster, P: Pacer> BoardView<R, P> {
    /// Creates a view of a `files` by `ranks` board, allocating the screen and loading the piece images.
    pub fn new(mut raster: R, pacer: P, config: ViewConfig, files: usize, ranks: usize) -> Result<Self> {
        config.validate().context("Invalid view configuration")?;
        let geometry = Geometry::new(config.square_size, config.line_gap, files, ranks)?;

        raster.load_pieces(config.square_size)?;
        raster
            .allocate(Surface::Screen, geometry.board_width(), geometry.board_height())
            .context("Failed to allocate the board")?;
        debug!(
            "Created a {files}x{ranks} board view at {}x{}",
            geometry.board_width(),
            geometry.board_height()
        );

        Ok(Self {
            raster,
            pacer,
            config,
            geometry,
            last_board: None,
            drawn_flipped: false,
            damage: DamageGrid::new(files, ranks),
            highlights: Highlights::default(),
            premove: Highlights::default(),
            game: AnimStream::new(Stream::Game),
            player: AnimStream::new(Stream::Player),
            drag: None,
            move_animation: None,
        })
    }

    pub const fn raster(&self) -> &R {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut R {
        &mut self.raster
    }

    pub const fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }

    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The board as it was last drawn, if any.
    pub const fn last_board(&self) -> Option<&Board> {
        self.last_board.as_ref()
    }

    pub const fn damage(&self) -> &DamageGrid {
        &self.damage
    }

    pub const fn highlights(&self) -> Highlights {
        self.highlights
    }

    pub const fn premove_highlights(&self) -> Highlights {
        self.premove
    }

    /// The square a piece is being dragged from, if any.
    pub fn dragging_from(&self) -> Option<Square> {
        self.drag.map(|drag| drag.from)
    }

    /// Returns `true` while a move started with [`start_move_animation`](Self::start_move_animation) has frames left.
    pub const fn is_animating(&self) -> bool {
        self.move_animation.is_some()
    }

    /// Consumes the view, returning its raster.
    pub fn into_raster(self) -> R {
        self.raster
    }

    /// Brings the screen up to date with `board`.
    ///
    /// Unless `full` is set, only squares that differ from the last drawn
    /// board, or that were damaged since, are repainted; a newly placed piece
    /// flashes when only a move's worth of squares changed. The whole board is
    /// repainted when asked to, when there is no last board, when the view was
    /// flipped, or when the board changed shape.
    pub fn redraw(&mut self, full: bool, board: &Board) -> Result<RedrawReport> {
        if board.files() != self.geometry.files() || board.ranks() != self.geometry.ranks() {
            warn!(
                "Board changed from {}x{} to {}x{}; redrawing from scratch",
                self.geometry.files(),
                self.geometry.ranks(),
                board.files(),
                board.ranks()
            );
            self.reshape(board.files(), board.ranks())?;
        }

        let last = match self.last_board.take() {
            Some(last) if !last.same_shape(board) => {
                warn!("Last drawn board has the wrong shape; discarding it");
                None
            }
            last => last,
        };

        // Take floating pieces off the board so repainting cannot trap them in a saved background.
        self.player.lift(&mut self.raster);
        self.game.lift(&mut self.raster);

        let mut report = RedrawReport::default();
        match last {
            Some(last) if !full && self.drawn_flipped == self.geometry.is_flipped() => {
                self.redraw_changes(board, last, &mut report)
            }
            _ => self.redraw_all(board, &mut report),
        }

        self.last_board = Some(board.clone());
        self.drawn_flipped = self.geometry.is_flipped();

        self.draw_highlights();
        self.restore_floating_pieces();

        debug!(
            "Redraw: full={} painted={} flashed={:?} castle={:?}",
            report.full,
            report.painted.len(),
            report.flashed,
            report.castle_rook
        );
        Ok(report)
    }

    /// Redraws from the last drawn board, as when the window is exposed.
    ///
    /// Returns `None` if nothing was drawn yet.
    pub fn refresh(&mut self, full: bool) -> Result<Option<RedrawReport>> {
        match self.last_board.clone() {
            Some(board) => self.redraw(full, &board).map(Some),
            None => Ok(None),
        }
    }

    fn redraw_all(&mut self, board: &Board, report: &mut RedrawReport) {
        report.full = true;
        if self.geometry.line_gap() > 0 {
            self.draw_grid();
        }

        for square in board.squares() {
            self.draw_square(square, board.get(square), false);
            report.painted(square);
        }
        self.damage.clear_all();

        let bounds = Rect::new(0, 0, self.geometry.board_width(), self.geometry.board_height());
        self.raster.expose(bounds);
    }

    fn redraw_changes(&mut self, board: &Board, mut last: Board, report: &mut RedrawReport) {
        let diffs = board.differences(&last).count();
        let do_flash = diffs <= MAX_FLASHING_DIFFS;
        trace!("Incremental redraw of {diffs} changed squares, flashing={do_flash}");

        // Castling flashes only the king.
        if do_flash {
            if let Some(rook_to) = castling::detect(board, &last) {
                self.draw_square(rook_to, board.get(rook_to), false);
                last.set(rook_to, board.get(rook_to));
                self.damage.clear(rook_to);
                report.painted(rook_to);
                report.castle_rook = Some(rook_to);
            }
        }

        // Empty squares first, so a moving piece never shows twice while it flashes.
        for square in board.squares() {
            let emptied = board[square].is_none() && last[square].is_some();
            if emptied || self.damage.is_damaged(square) {
                self.draw_square(square, board.get(square), false);
                self.damage.clear(square);
                report.painted(square);
            }
        }

        for square in board.squares() {
            if board[square] != last[square] {
                if self.draw_square(square, board.get(square), do_flash) {
                    report.flashed.push(square);
                }
                report.painted(square);
            }
        }
    }

    /// Paints one square with `piece` on it, flashing the piece first if asked to.
    ///
    /// Returns `true` if the piece flashed.
    fn draw_square(&mut self, square: Square, piece: Option<Piece>, flash: bool) -> bool {
        let Some(rect) = self.geometry.square_rect(square) else {
            return false;
        };
        let shade = square.shade();
        let piece = piece.filter(|_| !self.config.blindfold);

        let flashed = flash && piece.is_some() && self.config.flash_enabled();
        if flashed {
            let delay = self.config.flash_delay();
            for _ in 0..self.config.flash_count {
                self.draw_one_square(rect, shade, piece);
                self.pacer.delay(delay);
                self.draw_one_square(rect, shade, None);
                self.pacer.delay(delay);
            }
        }

        self.draw_one_square(rect, shade, piece);
        flashed
    }

    fn draw_one_square(&mut self, rect: Rect, shade: SquareShade, piece: Option<Piece>) {
        self.raster.fill_rect(Surface::Screen, rect, Paint::Square(shade));
        if let Some(piece) = piece {
            self.raster.composite_piece(Surface::Screen, piece, rect.origin());
        }
        self.raster.expose(rect);
    }

    fn draw_grid(&mut self) {
        let gap = self.geometry.line_gap();
        let pitch = self.geometry.pitch();
        let (width, height) = (self.geometry.board_width(), self.geometry.board_height());

        for column in 0..=self.geometry.files() as i32 {
            let line = Rect::new(column * pitch, 0, gap, height);
            self.raster.fill_rect(Surface::Screen, line, Paint::Grid);
        }
        for row in 0..=self.geometry.ranks() as i32 {
            let line = Rect::new(0, row * pitch, width, gap);
            self.raster.fill_rect(Surface::Screen, line, Paint::Grid);
        }
    }

    /// Puts animated pieces back on top of a freshly repainted board.
    fn restore_floating_pieces(&mut self) {
        if let Some(drag) = self.drag {
            // Logically the piece is still on its square, but it is shown under the pointer.
            if let Some(rect) = self.geometry.square_rect(drag.from) {
                self.draw_one_square(rect, drag.from.shade(), None);
                self.damage.mark(drag.from);
            }
        }

        self.game.settle(&mut self.raster);
        self.player.settle(&mut self.raster);
    }

    /// Animates the piece on `from` moving to `to`, then marks `to` for repainting.
    ///
    /// `board` is the position *before* the move. Nothing happens when move
    /// animation is off, in blindfold mode, when `from` is empty, or for a
    /// castling move written as the king capturing its own rook.
    pub fn animate_move(&mut self, board: &Board, from: Square, to: Square) -> Result<()> {
        if self.start_move_animation(board, from, to)? {
            self.run_move_animation()?;
        }
        Ok(())
    }

    /// Like [`animate_move`](Self::animate_move), but travels through `via` first, as a piece
    /// that captures on one square and comes to rest on another.
    pub fn animate_move_via(&mut self, board: &Board, from: Square, via: Square, to: Square) -> Result<()> {
        if self.start_move_animation_via(board, from, via, to)? {
            self.run_move_animation()?;
        }
        Ok(())
    }

    /// Begins animating a move without drawing any frames.
    ///
    /// Hosts that run their own event loop call [`step_move_animation`](Self::step_move_animation)
    /// once per tick afterwards. Returns `false` if the move is not animated.
    pub fn start_move_animation(&mut self, board: &Board, from: Square, to: Square) -> Result<bool> {
        self.start_legs(board, from, to, None)
    }

    /// Two-leg version of [`start_move_animation`](Self::start_move_animation).
    pub fn start_move_animation_via(&mut self, board: &Board, from: Square, via: Square, to: Square) -> Result<bool> {
        if via == from || via == to {
            return self.start_move_animation(board, from, to);
        }
        self.start_legs(board, from, via, Some((via, to)))
    }

    /// Draws the next frame of the move in progress.
    ///
    /// Returns `true` while there are frames left to draw. Once the piece has
    /// landed the destination is marked damaged and `false` is returned.
    pub fn step_move_animation(&mut self) -> Result<bool> {
        let Some(anim) = self.move_animation.as_mut() else {
            return Ok(false);
        };

        if anim.next_frame >= anim.path.frames.len() {
            self.player.lift(&mut self.raster);
            self.game.end(&mut self.raster, anim.path.finish);
            self.player.settle(&mut self.raster);
            self.damage.mark(anim.to);

            let Some((from, to)) = anim.then.take() else {
                self.move_animation = None;
                return Ok(false);
            };
            // Both legs were checked against the board when the animation started.
            let Some(path) = MovePath::plan(&self.geometry, from, to, self.config.anim_factor) else {
                self.move_animation = None;
                return Ok(false);
            };

            self.game
                .begin(&mut self.raster, self.geometry.square_size(), anim.piece, from.shade(), path.start)?;
            anim.to = to;
            anim.path = path;
            anim.next_frame = 0;
        }

        let frame = anim.path.frames[anim.next_frame];
        anim.next_frame += 1;

        // A dragged piece stays on top, and the game stream never saves its pixels.
        self.player.lift(&mut self.raster);
        self.game.frame(&mut self.raster, frame, anim.piece);
        self.player.settle(&mut self.raster);
        Ok(true)
    }

    fn start_legs(&mut self, board: &Board, from: Square, to: Square, then: Option<(Square, Square)>) -> Result<bool> {
        if !self.config.animate || self.config.blindfold {
            return Ok(false);
        }
        let on_board = |sq: Square| self.geometry.contains(sq) && board.contains(sq);
        if !on_board(from) || !on_board(to) || then.is_some_and(|(_, to)| !on_board(to)) {
            return Ok(false);
        }
        let Some(piece) = board.get(from) else {
            return Ok(false);
        };
        let last_to = then.map_or(to, |(_, to)| to);
        if is_castling_onto_rook(piece, board.get(last_to)) {
            trace!("Not animating {from}{last_to}: king and rook swap places");
            return Ok(false);
        }

        if self.move_animation.is_some() {
            warn!("Move animation started while another was in progress; landing the old one");
            self.finish_move_animation();
        }

        let Some(path) = MovePath::plan(&self.geometry, from, to, self.config.anim_factor) else {
            return Ok(false);
        };
        self.game
            .begin(&mut self.raster, self.geometry.square_size(), piece, from.shade(), path.start)?;
        debug!("Animating {} {from}{to} in {} frames", piece.name(), path.frames.len());

        self.move_animation = Some(MoveAnimation {
            piece,
            to,
            path,
            next_frame: 0,
            then,
        });
        Ok(true)
    }

    fn run_move_animation(&mut self) -> Result<()> {
        let delay = self.config.frame_delay();
        while self.step_move_animation()? {
            self.pacer.delay(delay);
        }
        Ok(())
    }

    /// Lands a move animation immediately, skipping its remaining frames.
    fn finish_move_animation(&mut self) {
        if let Some(anim) = self.move_animation.take() {
            self.player.lift(&mut self.raster);
            self.game.end(&mut self.raster, anim.path.finish);
            self.player.settle(&mut self.raster);
            self.damage.mark(anim.to);
            if let Some((_, to)) = anim.then {
                self.damage.mark(to);
            }
        }
    }

    /// Picks up the piece under the pointer at `(x, y)`.
    ///
    /// Returns `false` if dragging is not animated, or there is no piece there.
    pub fn drag_begin(&mut self, x: i32, y: i32) -> Result<bool> {
        if !self.config.animate_dragging || self.config.blindfold {
            return Ok(false);
        }
        let Some(from) = self.geometry.square_at(x, y) else {
            return Ok(false);
        };
        let Some(piece) = self.last_board.as_ref().and_then(|board| board.get(from)) else {
            return Ok(false);
        };

        if let Some(old) = self.drag.take() {
            warn!("Drag from {from} started while dragging from {}", old.from);
            self.player.lift(&mut self.raster);
        }

        let size = self.geometry.square_size();
        let Some(corner) = self.geometry.square_origin(from) else {
            return Ok(false);
        };
        self.player
            .begin(&mut self.raster, size, piece, from.shade(), corner)?;

        // The piece stays on its square until the move is made; repaint it later.
        self.damage.mark(from);
        self.drag = Some(Drag {
            from,
            piece,
            delta: Point::new(size / 2, size / 2),
        });
        debug!("Dragging {} from {from}", piece.name());
        Ok(true)
    }

    /// Moves the dragged piece so it stays centered on the pointer.
    pub fn drag_move(&mut self, x: i32, y: i32) {
        if !self.config.animate_dragging || self.config.blindfold {
            return;
        }
        let Some(drag) = self.drag else {
            return;
        };

        let corner = Point::new(x - drag.delta.x, y - drag.delta.y);
        self.player.frame(&mut self.raster, corner, drag.piece);
    }

    /// Drops the dragged piece on the square under the pointer, or back on its own square if there is none.
    ///
    /// Returns the square the piece was dropped on. It is marked damaged so the
    /// next redraw shows whatever the backend decides is there.
    pub fn drag_end(&mut self, x: i32, y: i32) -> Option<Square> {
        if !self.config.animate_dragging || self.config.blindfold {
            return None;
        }
        let drag = self.drag.take()?;

        let target = self.geometry.square_at(x, y).unwrap_or(drag.from);
        let finish = self
            .geometry
            .square_origin(target)
            .unwrap_or(self.player.prev_frame());
        self.player.end(&mut self.raster, finish);
        self.damage.mark(target);
        debug!("Dropped {} on {target}", drag.piece.name());
        Some(target)
    }

    /// Swaps the piece being dragged, as when a promotion piece is chosen mid-drag.
    pub fn change_drag_piece(&mut self, piece: Piece) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.piece = piece;
        let at = self.player.prev_frame();
        self.player.frame(&mut self.raster, at, piece);
    }

    /// Flashes an expanding burst over `square`, as for an exploding capture.
    ///
    /// The burst spills over neighbouring squares, which are marked damaged.
    pub fn animate_burst(&mut self, square: Square) {
        if self.config.blindfold {
            return;
        }
        let Some(corner) = self.geometry.square_origin(square) else {
            return;
        };

        let size = self.geometry.square_size();
        let center = corner.offset(size / 2, size / 2);
        let factor = self.config.anim_factor as i32;
        let delay = self.config.frame_delay();

        for i in 1..4 * factor {
            let r = size * 9 * i / (20 * factor - 5);
            let disc = Rect::new(center.x - r, center.y - r, 2 * r, 2 * r);
            self.raster.fill_disc(Surface::Screen, disc, Paint::Burst);
            self.raster.expose(disc);
            self.pacer.delay(delay);
        }

        if self.geometry.line_gap() > 0 {
            self.draw_grid();
        }

        for rank in 0..self.geometry.ranks() {
            for file in 0..self.geometry.files() {
                let df = file as i32 - square.file() as i32;
                let dr = rank as i32 - square.rank() as i32;
                if df * df + dr * dr < 6 {
                    self.damage.mark(Square::new(file as u8, rank as u8));
                }
            }
        }
        debug!("Burst over {square}");
    }

    /// Highlights the squares of the last move.
    pub fn set_highlights(&mut self, from: Option<Square>, to: Option<Square>) {
        let new = Highlights { from, to };
        if new != self.highlights {
            let old = std::mem::replace(&mut self.highlights, new);
            self.erase_highlights(old);
            self.draw_highlights();
        }
    }

    pub fn clear_highlights(&mut self) {
        self.set_highlights(None, None);
    }

    /// Highlights the squares of a queued premove.
    pub fn set_premove_highlights(&mut self, from: Option<Square>, to: Option<Square>) {
        let new = Highlights { from, to };
        if new != self.premove {
            let old = std::mem::replace(&mut self.premove, new);
            self.erase_highlights(old);
            self.draw_highlights();
        }
    }

    pub fn clear_premove_highlights(&mut self) {
        self.set_premove_highlights(None, None);
    }

    fn erase_highlights(&mut self, old: Highlights) {
        for square in old.squares() {
            self.draw_border(square, Paint::Grid);
        }
    }

    fn draw_highlights(&mut self) {
        for square in self.premove.squares() {
            self.draw_border(square, Paint::Premove);
        }
        for square in self.highlights.squares() {
            self.draw_border(square, Paint::Highlight);
        }
    }

    /// Outlines `square` inside the surrounding grid lines. Without grid lines there is nowhere to draw.
    fn draw_border(&mut self, square: Square, paint: Paint) {
        let gap = self.geometry.line_gap();
        let Some(rect) = self.geometry.square_rect(square).filter(|_| gap > 0) else {
            return;
        };

        let outer = rect.translate(-gap, -gap);
        let outer = Rect::new(outer.x, outer.y, outer.width + 2 * gap, outer.height + 2 * gap);
        let strips: [Rect; 4] = [
            Rect::new(outer.x, outer.y, outer.width, gap),
            Rect::new(outer.x, outer.bottom() - gap, outer.width, gap),
            Rect::new(outer.x, outer.y + gap, gap, outer.height - 2 * gap),
            Rect::new(outer.right() - gap, outer.y + gap, gap, outer.height - 2 * gap),
        ];
        for strip in strips {
            self.raster.fill_rect(Surface::Screen, strip, paint);
        }
        self.raster.expose(outer);
    }

    /// Flips the board so the top rank is drawn at the bottom. The next redraw repaints everything.
    pub fn set_flipped(&mut self, flipped: bool) {
        if flipped != self.geometry.is_flipped() {
            self.abandon_animations();
            self.geometry.set_flipped(flipped);
            self.last_board = None;
        }
    }

    /// Changes the square size and grid thickness, re-allocating the screen and piece images.
    ///
    /// The next redraw repaints everything.
    pub fn resize(&mut self, square_size: i32, line_gap: i32) -> Result<()> {
        let config = ViewConfig {
            square_size,
            line_gap,
            ..self.config
        };
        config.validate()?;

        let mut geometry = Geometry::new(square_size, line_gap, self.geometry.files(), self.geometry.ranks())?;
        geometry.set_flipped(self.geometry.is_flipped());

        self.raster
            .allocate(Surface::Screen, geometry.board_width(), geometry.board_height())
            .context("Failed to allocate the resized board")?;
        self.raster.load_pieces(square_size)?;

        self.abandon_animations();
        self.game.invalidate();
        self.player.invalidate();
        self.config = config;
        self.geometry = geometry;
        self.last_board = None;
        self.damage.clear_all();
        debug!("Resized to {square_size}px squares with {line_gap}px lines");
        Ok(())
    }

    /// Turns flashing on or off, keeping the flash count.
    pub fn toggle_flash(&mut self) {
        self.config.toggle_flash();
        debug!("Flash count is now {}", self.config.flash_count);
    }

    /// Adopts new board dimensions, re-allocating the screen.
    fn reshape(&mut self, files: usize, ranks: usize) -> Result<()> {
        let mut geometry = Geometry::new(self.geometry.square_size(), self.geometry.line_gap(), files, ranks)?;
        geometry.set_flipped(self.geometry.is_flipped());
        self.raster
            .allocate(Surface::Screen, geometry.board_width(), geometry.board_height())
            .context("Failed to allocate the reshaped board")?;

        self.abandon_animations();
        self.geometry = geometry;
        self.last_board = None;
        self.damage.reshape(files, ranks);
        self.highlights = Highlights::default();
        self.premove = Highlights::default();
        Ok(())
    }

    /// Stops both streams without touching the screen, which is about to be repainted anyway.
    fn abandon_animations(&mut self) {
        self.move_animation = None;
        self.drag = None;
        self.game.invalidate();
        self.player.invalidate();
    }
}

/// The move is a king landing on its own rook (or the reverse), as castling is written in some variants.
fn is_castling_onto_rook(piece: Piece, target: Option<Piece>) -> bool {
    let Some(target) = target else {
        return false;
    };
    piece.color() == target.color()
        && ((piece.is_king() && target.is_rook()) || (piece.is_rook() && target.is_king()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoDelay, RenderMode, SoftRaster};

    fn view(config: ViewConfig) -> BoardView<SoftRaster, NoDelay> {
        let raster = SoftRaster::new(config.square_size, RenderMode::Color).unwrap();
        BoardView::new(raster, NoDelay, config, 8, 8).unwrap()
    }

    fn small() -> ViewConfig {
        ViewConfig {
            square_size: 16,
            line_gap: 2,
            ..Default::default()
        }
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_redraw_is_full() {
        let mut view = view(small());
        let report = view.redraw(false, &Board::standard()).unwrap();
        assert!(report.full);
        assert_eq!(report.painted.len(), 64);
        assert!(report.flashed.is_empty());
    }

    #[test]
    fn test_flip_forces_full_redraw() {
        let mut view = view(small());
        let board = Board::standard();
        view.redraw(true, &board).unwrap();
        assert!(!view.redraw(false, &board).unwrap().full);

        view.set_flipped(true);
        assert!(view.redraw(false, &board).unwrap().full);
        assert!(!view.redraw(false, &board).unwrap().full);
    }

    #[test]
    fn test_too_many_changes_do_not_flash() {
        let mut view = view(small());
        let before = Board::standard();
        view.redraw(true, &before).unwrap();

        let mut after = before.clone();
        for file in 0..5 {
            after.take(Square::new(file, 1));
            after.set(Square::new(file, 3), Some(Piece::WHITE_PAWN));
        }
        let report = view.redraw(false, &after).unwrap();
        assert!(!report.full);
        assert!(report.flashed.is_empty());
        assert_eq!(report.painted.len(), 10);
    }

    #[test]
    fn test_blindfold_hides_pieces() {
        let mut view = view(ViewConfig {
            blindfold: true,
            ..small()
        });
        let board = Board::standard();
        view.redraw(true, &board).unwrap();

        let empty = Board::new(8, 8).unwrap();
        let mut plain = self::view(small());
        plain.redraw(true, &empty).unwrap();
        assert_eq!(view.raster().screen(), plain.raster().screen());

        assert!(!view.drag_begin(20, 20).unwrap());
        view.animate_move(&board, sq("e2"), sq("e4")).unwrap();
        assert_eq!(view.damage().damaged().count(), 0);
    }

    #[test]
    fn test_castling_onto_rook_is_not_animated() {
        let mut view = view(small());
        let board = Board::from_diagram(&["....k...", "........", "........", "........", "........", "........", "........", "....K..R"]).unwrap();
        view.redraw(true, &board).unwrap();
        assert!(!view.start_move_animation(&board, sq("e1"), sq("h1")).unwrap());
        assert!(!view.start_move_animation(&board, sq("d4"), sq("d5")).unwrap());
        assert!(view.start_move_animation(&board, sq("e1"), sq("f1")).unwrap());
    }

    #[test]
    fn test_cooperative_steps() {
        let mut view = view(small());
        let board = Board::standard();
        view.redraw(true, &board).unwrap();

        // e2-e4 is a short move: one fewer frame on each side.
        assert!(view.start_move_animation(&board, sq("e2"), sq("e4")).unwrap());
        assert!(view.is_animating());
        let mut steps = 0;
        while view.step_move_animation().unwrap() {
            steps += 1;
        }
        assert_eq!(steps, 7);
        assert!(!view.is_animating());
        assert!(view.damage().is_damaged(sq("e4")));
        assert!(!view.step_move_animation().unwrap());
    }

    #[test]
    fn test_two_leg_animation_damages_both_landings() {
        let mut view = view(small());
        let board = Board::standard();
        view.redraw(true, &board).unwrap();
        view.animate_move_via(&board, sq("g1"), sq("f3"), sq("f5")).unwrap();
        assert!(view.damage().is_damaged(sq("f3")));
        assert!(view.damage().is_damaged(sq("f5")));
        assert!(!view.is_animating());
    }

    #[test]
    fn test_highlight_borders() {
        let mut view = view(small());
        view.redraw(true, &Board::standard()).unwrap();
        let palette = *view.raster().palette();
        let e2 = view.geometry().square_rect(sq("e2")).unwrap();

        view.set_highlights(Some(sq("e2")), Some(sq("e4")));
        assert_eq!(view.raster().screen().get(e2.x - 1, e2.y - 1), Some(palette.highlight));
        assert_eq!(view.raster().screen().get(e2.x, e2.y + 8), Some(palette.light_square));

        view.set_premove_highlights(Some(sq("d7")), None);
        let d7 = view.geometry().square_rect(sq("d7")).unwrap();
        assert_eq!(view.raster().screen().get(d7.right(), d7.y), Some(palette.premove));

        view.clear_highlights();
        assert_eq!(view.raster().screen().get(e2.x - 1, e2.y - 1), Some(palette.grid));
        assert_eq!(view.highlights(), Highlights::default());
    }

    #[test]
    fn test_highlights_need_grid_lines() {
        let mut view = view(ViewConfig {
            line_gap: 0,
            ..small()
        });
        view.redraw(true, &Board::standard()).unwrap();
        let before = view.raster().screen().clone();
        view.set_highlights(Some(sq("e2")), Some(sq("e4")));
        assert_eq!(view.raster().screen(), &before);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut view = view(small());
        view.redraw(true, &Board::standard()).unwrap();
        view.resize(24, 1).unwrap();
        assert_eq!(view.raster().screen().width(), 1 + 8 * 25);
        assert!(view.last_board().is_none());
        assert!(view.resize(3, 1).is_err());
        assert_eq!(view.geometry().square_size(), 24);
        assert!(view.refresh(false).unwrap().is_none());
    }

    #[test]
    fn test_failed_resize_keeps_piece_images() {
        let mut board = Board::new(16, 16).unwrap();
        board.set(sq("a1"), Some(Piece::WHITE_KING));
        board.set(sq("p16"), Some(Piece::BLACK_QUEEN));

        let raster = SoftRaster::new(16, RenderMode::Color).unwrap();
        let mut view = BoardView::new(raster, NoDelay, small(), 16, 16).unwrap();
        view.redraw(true, &board).unwrap();
        let before = view.raster().screen().clone();

        // Too many pixels for a 16x16 board of 512px squares.
        assert!(view.resize(512, 1).is_err());
        assert_eq!(view.geometry().square_size(), 16);
        view.redraw(true, &board).unwrap();
        assert_eq!(view.raster().screen(), &before);
    }

    #[test]
    fn test_board_shape_change() {
        let mut view = view(small());
        view.redraw(true, &Board::standard()).unwrap();
        let wide = Board::new(10, 8).unwrap();
        let report = view.redraw(false, &wide).unwrap();
        assert!(report.full);
        assert_eq!(report.painted.len(), 80);
        assert_eq!(view.raster().screen().width(), 2 + 10 * 18);
    }
}
