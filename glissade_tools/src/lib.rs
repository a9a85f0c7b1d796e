use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use glissade::{
    config::*, Board, Canvas, Pacer, Paint, Piece, Point, Raster, Rect, RenderMode, SoftRaster, Square,
    Surface, ViewConfig,
};

/// Display options shared by every tool.
#[derive(Args, Clone, Debug)]
pub struct ViewArgs {
    /// Side length of a square, in pixels
    #[arg(long, default_value_t = DEFAULT_SQUARE_SIZE)]
    pub square_size: i32,

    /// Thickness of the grid lines, in pixels
    #[arg(long, default_value_t = DEFAULT_LINE_GAP)]
    pub line_gap: i32,

    /// Number of flashes on a moved piece (0 disables, negative keeps the count but disables)
    #[arg(long, default_value_t = DEFAULT_FLASH_COUNT, allow_negative_numbers = true)]
    pub flash_count: i32,

    /// Flashes per second
    #[arg(long, default_value_t = DEFAULT_FLASH_RATE)]
    pub flash_rate: u32,

    /// Milliseconds between animation frames
    #[arg(long, default_value_t = DEFAULT_ANIM_SPEED)]
    pub anim_speed: u64,

    /// Ease-in and ease-out frames of a move
    #[arg(long, default_value_t = DEFAULT_ANIM_FACTOR)]
    pub anim_factor: usize,

    /// Do not animate moves
    #[arg(long)]
    pub no_animate: bool,

    /// Do not animate dragged pieces
    #[arg(long)]
    pub no_animate_dragging: bool,

    /// Hide the pieces
    #[arg(long)]
    pub blindfold: bool,

    /// Draw in black and white
    #[arg(long)]
    pub mono: bool,

    /// View the board from Black's side
    #[arg(long)]
    pub flip: bool,
}

impl ViewArgs {
    pub fn config(&self) -> ViewConfig {
        ViewConfig {
            square_size: self.square_size,
            line_gap: self.line_gap,
            flash_count: self.flash_count,
            flash_rate: self.flash_rate,
            animate: !self.no_animate,
            animate_dragging: !self.no_animate_dragging,
            anim_speed: self.anim_speed,
            anim_factor: self.anim_factor,
            blindfold: self.blindfold,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.mono {
            RenderMode::Mono
        } else {
            RenderMode::Color
        }
    }
}

/// The opening moves the tools play through.
pub const SCRIPTED_GAME: &[&str] = &[
    "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1", "f8c5", "d2d3", "e8g8", "c1g5", "h7h6", "g5f6", "d8f6",
    "b1c3", "c6d4", "f3d4", "c5d4", "c3d5", "f6g6",
];

/// Parses a move written as two squares, such as `e2e4` or `a10a12`.
pub fn parse_move(s: &str) -> Result<(Square, Square)> {
    let split = s
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .ok_or_else(|| anyhow!("Move {s:?} must name two squares"))?;

    let from = s[..split].parse().with_context(|| format!("Invalid move {s:?}"))?;
    let to = s[split..].parse().with_context(|| format!("Invalid move {s:?}"))?;
    Ok((from, to))
}

/// Moves whatever is on `from` to `to`. A king stepping two files also brings its rook across.
///
/// No legality checks: these tools only need something to draw. Fails if
/// either square is off the board.
pub fn play_move(board: &Board, from: Square, to: Square) -> Result<Board> {
    for square in [from, to] {
        if !board.contains(square) {
            bail!("{square} is not on a {}x{} board", board.files(), board.ranks());
        }
    }

    let mut after = board.clone();
    let piece = after.take(from);

    let castles = piece.is_some_and(|p| p.is_king()) && from.rank() == to.rank() && from.file().abs_diff(to.file()) == 2;
    if castles {
        let (rook_from, rook_to) = if to.file() > from.file() {
            (board.files() - 1, to.file() - 1)
        } else {
            (0, to.file() + 1)
        };
        let rank = from.rank() as u8;
        let rook = after.take(Square::new(rook_from as u8, rank));
        after.set(Square::new(rook_to as u8, rank), rook);
    }

    after.set(to, piece);
    Ok(after)
}

/// A [`SoftRaster`] shared between a view and a [`FrameRecorder`].
#[derive(Clone, Debug)]
pub struct SharedRaster(Rc<RefCell<SoftRaster>>);

impl SharedRaster {
    pub fn new(raster: SoftRaster) -> Self {
        Self(Rc::new(RefCell::new(raster)))
    }

    /// A recorder capturing this raster's screen.
    pub fn recorder(&self) -> FrameRecorder {
        FrameRecorder {
            raster: Rc::clone(&self.0),
            frames: VecDeque::new(),
        }
    }

    pub fn screen(&self) -> Canvas {
        self.0.borrow().screen().clone()
    }

    pub fn take_exposed(&self) -> Option<Rect> {
        self.0.borrow_mut().take_exposed()
    }
}

impl Raster for SharedRaster {
    fn allocate(&mut self, surface: Surface, width: i32, height: i32) -> Result<()> {
        self.0.borrow_mut().allocate(surface, width, height)
    }

    fn load_pieces(&mut self, square_size: i32) -> Result<()> {
        self.0.borrow_mut().load_pieces(square_size)
    }

    fn copy_rect(&mut self, src: Surface, rect: Rect, dst: Surface, to: Point) {
        self.0.borrow_mut().copy_rect(src, rect, dst, to)
    }

    fn fill_rect(&mut self, dst: Surface, rect: Rect, paint: Paint) {
        self.0.borrow_mut().fill_rect(dst, rect, paint)
    }

    fn composite_piece(&mut self, dst: Surface, piece: Piece, at: Point) {
        self.0.borrow_mut().composite_piece(dst, piece, at)
    }

    fn fill_disc(&mut self, dst: Surface, bounds: Rect, paint: Paint) {
        self.0.borrow_mut().fill_disc(dst, bounds, paint)
    }

    fn expose(&mut self, rect: Rect) {
        self.0.borrow_mut().expose(rect)
    }
}

/// A [`Pacer`] that keeps a copy of the screen at every pause instead of sleeping.
///
/// A host with its own frame loop plays the copies back, each for its delay, so
/// flashes and bursts drawn inside a single call still show up on screen.
#[derive(Debug)]
pub struct FrameRecorder {
    raster: Rc<RefCell<SoftRaster>>,
    frames: VecDeque<(Canvas, Duration)>,
}

impl FrameRecorder {
    /// The oldest recorded frame and how long to show it.
    pub fn next_frame(&mut self) -> Option<(Canvas, Duration)> {
        self.frames.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.frames.len()
    }
}

impl Pacer for FrameRecorder {
    fn delay(&mut self, duration: Duration) {
        let screen = self.raster.borrow().screen().clone();
        self.frames.push_back((screen, duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glissade::BoardView;

    #[test]
    fn test_parse_move() {
        let (from, to) = parse_move("e2e4").unwrap();
        assert_eq!((from.to_string(), to.to_string()), ("e2".into(), "e4".into()));
        let (from, to) = parse_move("a10p16").unwrap();
        assert_eq!((from, to), (Square::new(0, 9), Square::new(15, 15)));
        assert!(parse_move("e2").is_err());
        assert!(parse_move("e2z9").is_err());
    }

    #[test]
    fn test_play_castling() {
        let board = Board::from_diagram(&["r...k..r", "........", "........", "........", "........", "........", "........", "R...K..R"]).unwrap();
        let after = play_move(&board, "e1".parse().unwrap(), "g1".parse().unwrap()).unwrap();
        assert_eq!(after.to_string().lines().last(), Some("R....RK."));
        let after = play_move(&after, "e8".parse().unwrap(), "c8".parse().unwrap()).unwrap();
        assert_eq!(after.to_string().lines().next(), Some("..kr...r"));
        assert_eq!(after.get("c8".parse().unwrap()), Some(Piece::BLACK_KING));
    }

    #[test]
    fn test_scripted_game_parses() {
        let mut board = Board::standard();
        for mv in SCRIPTED_GAME {
            let (from, to) = parse_move(mv).unwrap();
            assert!(board.get(from).is_some(), "{mv}");
            board = play_move(&board, from, to).unwrap();
        }
    }

    #[test]
    fn test_play_off_the_board() {
        let board = Board::standard();
        for mv in ["a10a12", "i9i10", "h8i8", "a1a9"] {
            let (from, to) = parse_move(mv).unwrap();
            assert!(play_move(&board, from, to).is_err(), "{mv}");
        }
    }

    fn recorded_view() -> BoardView<SharedRaster, FrameRecorder> {
        let config = ViewConfig {
            square_size: 16,
            ..Default::default()
        };
        let raster = SharedRaster::new(SoftRaster::new(16, RenderMode::Color).unwrap());
        let recorder = raster.recorder();
        let mut view = BoardView::new(raster, recorder, config, 8, 8).unwrap();
        view.redraw(true, &Board::standard()).unwrap();
        view
    }

    #[test]
    fn test_flashes_are_recorded() {
        let mut view = recorded_view();
        assert_eq!(view.pacer().pending(), 0);

        let board = Board::standard();
        let after = play_move(&board, "e2".parse().unwrap(), "e4".parse().unwrap()).unwrap();
        view.redraw(false, &after).unwrap();

        // Shown and hidden three times, each for 100ms.
        assert_eq!(view.pacer().pending(), 6);
        let (shown, delay) = view.pacer_mut().next_frame().unwrap();
        let (hidden, _) = view.pacer_mut().next_frame().unwrap();
        assert_eq!(delay, Duration::from_millis(100));
        assert_ne!(shown, hidden);
        assert_eq!(view.pacer().pending(), 4);
    }

    #[test]
    fn test_burst_is_recorded_frame_by_frame() {
        let mut view = recorded_view();
        view.animate_burst("e4".parse().unwrap());

        let factor = DEFAULT_ANIM_FACTOR;
        assert_eq!(view.pacer().pending(), 4 * factor - 1);
        let first = view.pacer_mut().next_frame().unwrap().0;
        let second = view.pacer_mut().next_frame().unwrap().0;
        assert_ne!(first, second);
        assert!(view.raster().take_exposed().is_some());
    }
}
