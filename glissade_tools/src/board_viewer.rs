use anyhow::Result;
use clap::Parser;
use log::info;
use macroquad::prelude::*;

use glissade::{Board, BoardView, Canvas, SoftRaster, Square};
use glissade_tools::{parse_move, play_move, FrameRecorder, SharedRaster, ViewArgs, SCRIPTED_GAME};

/// Plays through a short game on an animated board.
///
/// Space plays the next move, F flips the board, T toggles flashing,
/// X explodes the last destination square and R starts over.
/// Pieces can be dragged with the mouse.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    view: ViewArgs,
}

fn upload(canvas: &Canvas) -> Texture2D {
    let texture = Texture2D::from_rgba8(canvas.width() as u16, canvas.height() as u16, &canvas.to_rgba8());
    texture.set_filter(FilterMode::Nearest);
    texture
}

/// A scripted move being animated, and the position once it lands.
struct Pending {
    after: Board,
}

struct Viewer {
    view: BoardView<SharedRaster, FrameRecorder>,
    board: Board,
    next_move: usize,
    flipped: bool,
    last_to: Option<Square>,
    pending: Option<Pending>,
}

impl Viewer {
    fn new(args: &ViewArgs) -> Result<Self> {
        let config = args.config();
        let raster = SharedRaster::new(SoftRaster::new(config.square_size, args.render_mode())?);
        let recorder = raster.recorder();
        let board = Board::standard();
        let mut view = BoardView::new(raster, recorder, config, board.files(), board.ranks())?;
        view.set_flipped(args.flip);
        view.redraw(true, &board)?;

        Ok(Self {
            view,
            board,
            next_move: 0,
            flipped: args.flip,
            last_to: None,
            pending: None,
        })
    }

    fn play_next(&mut self) -> Result<()> {
        let Some(mv) = SCRIPTED_GAME.get(self.next_move) else {
            info!("End of the game; press R to start over");
            return Ok(());
        };
        self.next_move += 1;

        let (from, to) = parse_move(mv)?;
        let after = play_move(&self.board, from, to)?;
        self.view.set_highlights(Some(from), Some(to));
        self.last_to = Some(to);
        info!("Playing {mv}");

        if self.view.start_move_animation(&self.board, from, to)? {
            self.pending = Some(Pending { after });
        } else {
            self.land(after)?;
        }
        Ok(())
    }

    fn land(&mut self, after: Board) -> Result<()> {
        self.board = after;
        self.view.redraw(false, &self.board)?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.board = Board::standard();
        self.next_move = 0;
        self.last_to = None;
        self.view.clear_highlights();
        self.view.redraw(true, &self.board)?;
        Ok(())
    }

    fn handle_mouse(&mut self) -> Result<()> {
        let (x, y) = mouse_position();
        let (x, y) = (x as i32, y as i32);

        if is_mouse_button_pressed(MouseButton::Left) {
            self.view.drag_begin(x, y)?;
        } else if is_mouse_button_down(MouseButton::Left) {
            self.view.drag_move(x, y);
        } else if is_mouse_button_released(MouseButton::Left) {
            let from = self.view.dragging_from();
            let target = self.view.drag_end(x, y);
            if let (Some(from), Some(to)) = (from, target) {
                if from != to {
                    self.view.set_highlights(Some(from), Some(to));
                    self.last_to = Some(to);
                    let after = play_move(&self.board, from, to)?;
                    self.land(after)?;
                } else {
                    self.view.redraw(false, &self.board)?;
                }
            }
        }
        Ok(())
    }

    /// Advances the viewer by one display frame.
    fn tick(&mut self) -> Result<()> {
        if self.pending.is_some() {
            if !self.view.step_move_animation()? {
                if let Some(Pending { after }) = self.pending.take() {
                    self.land(after)?;
                }
            }
            return Ok(());
        }

        if is_key_pressed(KeyCode::Space) {
            self.play_next()?;
        }
        if is_key_pressed(KeyCode::F) {
            self.flipped = !self.flipped;
            self.view.set_flipped(self.flipped);
            self.view.redraw(true, &self.board)?;
        }
        if is_key_pressed(KeyCode::T) {
            self.view.toggle_flash();
            info!("Flash count is now {}", self.view.config().flash_count);
        }
        if is_key_pressed(KeyCode::X) {
            if let Some(square) = self.last_to {
                self.view.animate_burst(square);
                self.view.redraw(false, &self.board)?;
            }
        }
        if is_key_pressed(KeyCode::R) {
            self.reset()?;
        }

        self.handle_mouse()
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut viewer = Viewer::new(&cli.view)?;

    let geometry = viewer.view.geometry();
    request_new_screen_size(geometry.board_width() as f32, geometry.board_height() as f32);
    let mut texture = upload(&viewer.view.raster().screen());

    // Flashes and bursts are drawn in one go; their frames are replayed before taking more input.
    let mut showing_until = 0.0;
    loop {
        if get_time() >= showing_until {
            if let Some((frame, delay)) = viewer.view.pacer_mut().next_frame() {
                texture = upload(&frame);
                showing_until = get_time() + delay.as_secs_f64();
            } else {
                viewer.tick()?;
                if viewer.view.pacer().pending() == 0 && viewer.view.raster().take_exposed().is_some() {
                    texture = upload(&viewer.view.raster().screen());
                }
            }
        }

        clear_background(DARKGRAY);
        draw_texture(&texture, 0.0, 0.0, WHITE);

        next_frame().await;
    }
}

#[macroquad::main("Board Viewer")]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
