use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;

use glissade::{
    overlap::{intersect, update_rects},
    tween::MovePath,
    Board, BoardView, Geometry, NoDelay, RedrawReport, SoftRaster, Square,
};
use glissade_tools::{parse_move, play_move, ViewArgs};

/// Prints the frames of a move animation and replays moves without a window.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    view: ViewArgs,

    /// Move to trace, as two squares
    #[arg(default_value = "g1f3")]
    mv: String,

    /// Comma-separated moves to replay from the starting position, printing each redraw
    #[arg(short, long, value_delimiter = ',')]
    replay: Vec<String>,
}

fn trace_move(args: &Args) -> Result<()> {
    let config = args.view.config();
    config.validate()?;
    let (from, to) = parse_move(&args.mv)?;

    let mut geometry = Geometry::new(config.square_size, config.line_gap, 8, 8)?;
    geometry.set_flipped(args.view.flip);
    for square in [from, to] {
        if !geometry.contains(square) {
            bail!("Cannot trace {}: {square} is not on an 8x8 board", args.mv);
        }
    }

    let size = geometry.square_size();
    let path = MovePath::plan(&geometry, from, to, config.anim_factor)
        .with_context(|| format!("No path for {}", args.mv))?;

    println!("{} {from} -> {to}", "Move".bold());
    println!("  start  {:?}", path.start);
    println!("  mid    {:?}{}", path.mid, if path.hop { " (hop)".yellow() } else { "".normal() });
    println!("  finish {:?}", path.finish);
    println!("  {} frames", path.frames.len());

    let mut prev = path.start;
    for (i, &at) in path.frames.iter().enumerate() {
        print!("{:>4} {:>12}", i.to_string().cyan(), format!("{at:?}"));
        match intersect(prev, at, size) {
            Some((overlap, offset)) => {
                print!("  overlap {}x{} at {:?}", overlap.width, overlap.height, offset);
                for rect in update_rects(prev, at, size) {
                    print!("  {}", format!("restore {rect:?}").green());
                }
                println!();
            }
            None => println!("  {}", "disjoint".red()),
        }
        prev = at;
    }

    Ok(())
}

fn list(squares: &[Square]) -> String {
    squares
        .iter()
        .map(|sq| sq.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_report(mv: &str, report: &RedrawReport) {
    let kind = if report.full { "full".yellow() } else { "incremental".normal() };
    print!("{:>6} {kind}: painted [{}]", mv.bold(), list(&report.painted));
    if !report.flashed.is_empty() {
        print!(" flashed [{}]", list(&report.flashed).green());
    }
    if let Some(rook) = report.castle_rook {
        print!(" {}", format!("castling rook on {rook}").magenta());
    }
    println!();
}

fn replay(args: &Args) -> Result<()> {
    let config = args.view.config();
    let raster = SoftRaster::new(config.square_size, args.view.render_mode())?;
    let mut board = Board::standard();
    let mut view = BoardView::new(raster, NoDelay, config, board.files(), board.ranks())?;
    view.set_flipped(args.view.flip);

    let report = view.redraw(true, &board)?;
    print_report("start", &report);

    for mv in &args.replay {
        let (from, to) = parse_move(mv)?;
        let after = play_move(&board, from, to).with_context(|| format!("Cannot replay {mv}"))?;
        view.animate_move(&board, from, to)
            .with_context(|| format!("Failed to animate {mv}"))?;
        view.set_highlights(Some(from), Some(to));

        board = after;
        let report = view.redraw(false, &board)?;
        print_report(mv, &report);
    }

    println!("\n{board}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    trace_move(&args)?;
    if !args.replay.is_empty() {
        println!();
        replay(&args)?;
    }
    Ok(())
}
