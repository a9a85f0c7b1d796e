use arrayvec::ArrayVec;
use log::trace;
use types::Square;

use crate::{Geometry, Point};

/// Largest usable animation factor.
pub const MAX_ANIM_FACTOR: usize = 6;

/// Most frames a single tween can produce.
pub const MAX_FRAMES: usize = 2 * MAX_ANIM_FACTOR + 1;

/// Screen positions of a moving piece's top-left corner, in display order.
pub type Frames = ArrayVec<Point, MAX_FRAMES>;

/// Interpolates `2 * factor + 1` frames from `start` through `mid` to `finish`.
///
/// The first half eases in, closing half of the remaining distance to `mid`
/// on each frame; `mid` itself is hit exactly; the second half eases out by
/// the same halving towards `finish`. The last frame stops short of
/// `finish`; callers land the piece on the destination square themselves.
///
/// # Example
/// ```
/// # use glissade::{tween::tween, Point};
/// let frames = tween(Point::new(0, 0), Point::new(32, 0), Point::new(64, 0), 2);
/// let xs: Vec<_> = frames.iter().map(|p| p.x).collect();
/// assert_eq!(xs, [8, 16, 32, 48, 56]);
/// ```
pub fn tween(start: Point, mid: Point, finish: Point, factor: usize) -> Frames {
    let factor = factor.min(MAX_ANIM_FACTOR);
    let mut frames = Frames::new();

    let mut fraction = 1i32 << factor;
    for _ in 0..factor {
        frames.push(Point::new(
            start.x + (mid.x - start.x) / fraction,
            start.y + (mid.y - start.y) / fraction,
        ));
        fraction /= 2;
    }

    frames.push(mid);

    let mut fraction = 2;
    for _ in 0..factor {
        frames.push(Point::new(
            finish.x - (finish.x - mid.x) / fraction,
            finish.y - (finish.y - mid.y) / fraction,
        ));
        fraction *= 2;
    }

    frames
}

/// Returns `true` if moving `from` to `to` is a knight's jump, which animates as a hop rather than a slide.
pub fn is_hop(from: Square, to: Square) -> bool {
    let df = from.file().abs_diff(to.file());
    let dr = from.rank().abs_diff(to.rank());
    (df == 1 && dr == 2) || (df == 2 && dr == 1)
}

/// The point a piece passes through halfway between `start` and `finish`.
///
/// A slide passes through the average of the endpoints, rounded down. A hop
/// travels diagonally first over the shorter side and then straight, so its
/// midpoint shares a coordinate with `finish`.
pub fn midpoint(start: Point, finish: Point, hop: bool) -> Point {
    if !hop {
        return Point::new((start.x + finish.x).div_euclid(2), (start.y + finish.y).div_euclid(2));
    }

    let dx = finish.x - start.x;
    let dy = finish.y - start.y;
    let diagonal = dx.abs().min(dy.abs());
    Point::new(start.x + diagonal * dx.signum(), start.y + diagonal * dy.signum())
}

/// Animation factor for a move: short moves get one fewer frame on each side.
pub fn frame_factor(from: Square, to: Square, factor: usize) -> usize {
    if from.manhattan_distance(to) <= 2 {
        factor.saturating_sub(1)
    } else {
        factor
    }
}

/// Everything needed to animate one leg of a move on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePath {
    pub start: Point,
    pub mid: Point,
    pub finish: Point,
    pub hop: bool,
    pub frames: Frames,
}

impl MovePath {
    /// Plans the screen path of a piece moving `from` to `to`.
    ///
    /// Returns `None` if either square is not on the board `geometry` describes.
    pub fn plan(geometry: &Geometry, from: Square, to: Square, factor: usize) -> Option<Self> {
        let start = geometry.square_origin(from)?;
        let finish = geometry.square_origin(to)?;
        let hop = is_hop(from, to);
        let mid = midpoint(start, finish, hop);
        let frames = tween(start, mid, finish, frame_factor(from, to, factor));

        trace!("Planned {from}{to}: {start:?} -> {mid:?} -> {finish:?} in {} frames", frames.len());
        Some(Self {
            start,
            mid,
            finish,
            hop,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_tween_length_and_midpoint() {
        for factor in 0..=MAX_ANIM_FACTOR {
            let mid = Point::new(100, -40);
            let frames = tween(Point::new(0, 0), mid, Point::new(200, -80), factor);
            assert_eq!(frames.len(), 2 * factor + 1);
            assert_eq!(frames[factor], mid);
            assert_eq!(frames[0], if factor == 0 { mid } else { Point::new(100 >> factor, -40 / (1 << factor)) });
        }
        assert_eq!(tween(Point::default(), Point::default(), Point::default(), 50).len(), MAX_FRAMES);
    }

    #[test]
    fn test_tween_values() {
        let frames = tween(Point::new(0, 0), Point::new(32, 0), Point::new(64, 0), 4);
        let xs: Vec<_> = frames.iter().map(|p| p.x).collect();
        assert_eq!(xs, [2, 4, 8, 16, 32, 48, 56, 60, 62]);
        assert!(frames.iter().all(|p| p.y == 0));
    }

    #[test]
    fn test_is_hop() {
        assert!(is_hop(sq("g1"), sq("f3")));
        assert!(is_hop(sq("b8"), sq("d7")));
        assert!(!is_hop(sq("e2"), sq("e4")));
        assert!(!is_hop(sq("a1"), sq("c3")));
    }

    #[test]
    fn test_hop_midpoint() {
        // Two columns across, one row up: diagonal first, then along the row.
        let mid = midpoint(Point::new(0, 64), Point::new(128, 0), true);
        assert_eq!(mid, Point::new(64, 0));

        // One column across, two rows: ends with a straight vertical leg.
        let mid = midpoint(Point::new(0, 0), Point::new(64, 128), true);
        assert_eq!(mid, Point::new(64, 64));
        assert_eq!(mid.x, 64);
    }

    #[test]
    fn test_slide_midpoint_rounds_down() {
        assert_eq!(midpoint(Point::new(0, 0), Point::new(5, -5), false), Point::new(2, -3));
    }

    #[test]
    fn test_frame_factor() {
        assert_eq!(frame_factor(sq("e2"), sq("e4"), 4), 3);
        assert_eq!(frame_factor(sq("e2"), sq("e5"), 4), 4);
        assert_eq!(frame_factor(sq("e2"), sq("e3"), 0), 0);
    }

    #[test]
    fn test_plan_knight_move() {
        let geometry = Geometry::new(64, 0, 8, 8).unwrap();
        let path = MovePath::plan(&geometry, sq("b1"), sq("c3"), 4).unwrap();
        assert!(path.hop);
        assert_eq!(path.start, Point::new(64, 448));
        assert_eq!(path.finish, Point::new(128, 320));
        assert_eq!(path.mid, Point::new(128, 384));
        assert_eq!(path.frames.len(), 9);
    }

    #[test]
    fn test_plan_off_the_board() {
        let geometry = Geometry::new(64, 1, 8, 8).unwrap();
        assert!(MovePath::plan(&geometry, sq("a10"), sq("a12"), 4).is_none());
        assert!(MovePath::plan(&geometry, sq("h8"), sq("i9"), 4).is_none());
        assert!(MovePath::plan(&geometry, sq("h8"), sq("h1"), 4).is_some());
    }
}
