use std::fmt;

use anyhow::{bail, Result};
use types::{Square, MAX_BOARD_DIM};

/// A pixel position on a drawing surface. `y` grows downward.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point moved by `(dx, dy)`.
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle of pixels, `width` by `height` from its top-left corner.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `size` by `size` square whose top-left corner is `origin`.
    pub const fn square(origin: Point, size: i32) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    /// Top-left corner.
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns `true` if this rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// This rectangle moved by `(dx, dy)`.
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle covering both `self` and `other`. Empty rectangles are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Overlapping part of `self` and `other`, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let rect = Self::new(x, y, self.right().min(other.right()) - x, self.bottom().min(other.bottom()) - y);
        (!rect.is_empty()).then_some(rect)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Where a pixel coordinate falls along one axis of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    /// Inside the square with this zero-based index along the axis.
    Index(usize),
    /// On a grid line between squares.
    Gap,
    /// Outside the board.
    OffBoard,
}

impl Location {
    /// The square index, if this location is on a square.
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            _ => None,
        }
    }
}

/// Maps board squares to screen pixels and back.
///
/// Squares are `square_size` pixels wide and separated (and surrounded) by
/// grid lines `line_gap` pixels thick. Unflipped, rank `0` is drawn at the
/// bottom and file `0` at the left; flipping the view mirrors both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Geometry {
    square_size: i32,
    line_gap: i32,
    files: usize,
    ranks: usize,
    flipped: bool,
}

impl Geometry {
    /// Creates a new, unflipped [`Geometry`].
    pub fn new(square_size: i32, line_gap: i32, files: usize, ranks: usize) -> Result<Self> {
        if square_size <= 0 {
            bail!("Square size must be positive. Got {square_size}");
        }
        if line_gap < 0 {
            bail!("Line gap must not be negative. Got {line_gap}");
        }
        if !(1..=MAX_BOARD_DIM).contains(&files) || !(1..=MAX_BOARD_DIM).contains(&ranks) {
            bail!("Board dimensions must be between [1,{MAX_BOARD_DIM}]. Got {files}x{ranks}");
        }

        Ok(Self {
            square_size,
            line_gap,
            files,
            ranks,
            flipped: false,
        })
    }

    pub const fn square_size(&self) -> i32 {
        self.square_size
    }

    pub const fn line_gap(&self) -> i32 {
        self.line_gap
    }

    pub const fn files(&self) -> usize {
        self.files
    }

    pub const fn ranks(&self) -> usize {
        self.ranks
    }

    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Distance in pixels from one square's origin to the next.
    pub const fn pitch(&self) -> i32 {
        self.square_size + self.line_gap
    }

    /// Width of the whole board including the outer grid lines.
    pub const fn board_width(&self) -> i32 {
        self.line_gap + self.files as i32 * self.pitch()
    }

    /// Height of the whole board including the outer grid lines.
    pub const fn board_height(&self) -> i32 {
        self.line_gap + self.ranks as i32 * self.pitch()
    }

    /// Returns `true` if `square` lies within this board's dimensions.
    pub const fn contains(&self, square: Square) -> bool {
        square.file() < self.files && square.rank() < self.ranks
    }

    /// Screen position of the top-left corner of `square`, or `None` if it is not on this board.
    ///
    /// # Example
    /// ```
    /// # use glissade::{Geometry, Point, Square};
    /// let geometry = Geometry::new(40, 2, 8, 8).unwrap();
    /// assert_eq!(geometry.square_origin(Square::new(0, 7)), Some(Point::new(2, 2)));
    /// assert_eq!(geometry.square_origin(Square::new(1, 0)), Some(Point::new(44, 296)));
    /// assert_eq!(geometry.square_origin(Square::new(8, 0)), None);
    /// ```
    pub fn square_origin(&self, square: Square) -> Option<Point> {
        if !self.contains(square) {
            return None;
        }

        let (column, row) = if self.flipped {
            (self.files - 1 - square.file(), square.rank())
        } else {
            (square.file(), self.ranks - 1 - square.rank())
        };

        Some(Point::new(
            self.line_gap + column as i32 * self.pitch(),
            self.line_gap + row as i32 * self.pitch(),
        ))
    }

    /// The pixels covered by `square`, excluding grid lines.
    pub fn square_rect(&self, square: Square) -> Option<Rect> {
        self.square_origin(square)
            .map(|origin| Rect::square(origin, self.square_size))
    }

    /// Classifies one screen coordinate against an axis holding `limit` squares.
    ///
    /// Coordinates at or before the board's edge are [`Location::OffBoard`];
    /// coordinates on a grid line are [`Location::Gap`]. No flipping is applied.
    pub fn event_to_index(&self, coord: i32, limit: usize) -> Location {
        if coord <= 0 {
            return Location::OffBoard;
        }
        if coord < self.line_gap {
            return Location::Gap;
        }

        let coord = coord - self.line_gap;
        if coord % self.pitch() >= self.square_size {
            return Location::Gap;
        }

        let index = (coord / self.pitch()) as usize;
        if index >= limit {
            Location::OffBoard
        } else {
            Location::Index(index)
        }
    }

    /// Classifies a screen position as `(file, rank)` locations, accounting for flipping.
    pub fn locate(&self, x: i32, y: i32) -> (Location, Location) {
        let file = match self.event_to_index(x, self.files) {
            Location::Index(column) if self.flipped => Location::Index(self.files - 1 - column),
            other => other,
        };
        let rank = match self.event_to_index(y, self.ranks) {
            Location::Index(row) if !self.flipped => Location::Index(self.ranks - 1 - row),
            other => other,
        };
        (file, rank)
    }

    /// The square under a screen position, if it is on a square rather than a grid line or off the board.
    pub fn square_at(&self, x: i32, y: i32) -> Option<Square> {
        match self.locate(x, y) {
            (Location::Index(file), Location::Index(rank)) => Some(Square::new(file as u8, rank as u8)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_squares(geometry: &Geometry) -> impl Iterator<Item = Square> {
        let files = geometry.files();
        (0..geometry.ranks()).flat_map(move |r| (0..files).map(move |f| Square::new(f as u8, r as u8)))
    }

    #[test]
    fn test_square_origins() {
        let mut geometry = Geometry::new(64, 1, 8, 8).unwrap();
        assert_eq!(geometry.square_origin("a1".parse().unwrap()), Some(Point::new(1, 456)));
        assert_eq!(geometry.square_origin("h8".parse().unwrap()), Some(Point::new(456, 1)));
        assert_eq!(geometry.board_width(), 521);

        geometry.set_flipped(true);
        assert_eq!(geometry.square_origin("a1".parse().unwrap()), Some(Point::new(456, 1)));
        assert_eq!(geometry.square_origin("h8".parse().unwrap()), Some(Point::new(1, 456)));
    }

    #[test]
    fn test_squares_off_the_board() {
        for flipped in [false, true] {
            let mut geometry = Geometry::new(64, 1, 8, 8).unwrap();
            geometry.set_flipped(flipped);
            for square in ["a10", "i1", "p16"] {
                let square: Square = square.parse().unwrap();
                assert_eq!(geometry.square_origin(square), None);
                assert_eq!(geometry.square_rect(square), None);
            }
        }
    }

    #[test]
    fn test_event_to_index() {
        let geometry = Geometry::new(10, 2, 8, 8).unwrap();
        assert_eq!(geometry.event_to_index(0, 8), Location::OffBoard);
        assert_eq!(geometry.event_to_index(-5, 8), Location::OffBoard);
        assert_eq!(geometry.event_to_index(1, 8), Location::Gap);
        assert_eq!(geometry.event_to_index(2, 8), Location::Index(0));
        assert_eq!(geometry.event_to_index(11, 8), Location::Index(0));
        assert_eq!(geometry.event_to_index(12, 8), Location::Gap);
        assert_eq!(geometry.event_to_index(14, 8), Location::Index(1));
        assert_eq!(geometry.event_to_index(geometry.board_width() - 3, 8), Location::Index(7));
        assert_eq!(geometry.event_to_index(geometry.board_width() + 5, 8), Location::OffBoard);
    }

    #[test]
    fn test_pixel_square_roundtrip() {
        for flipped in [false, true] {
            let mut geometry = Geometry::new(33, 3, 10, 7).unwrap();
            geometry.set_flipped(flipped);

            for square in all_squares(&geometry) {
                let rect = geometry.square_rect(square).unwrap();
                let corners = [
                    rect.origin(),
                    Point::new(rect.right() - 1, rect.bottom() - 1),
                    Point::new(rect.x + 16, rect.y + 5),
                ];
                for p in corners {
                    assert_eq!(geometry.square_at(p.x, p.y), Some(square), "{p:?} flipped={flipped}");
                }
            }
        }
    }

    #[test]
    fn test_locate_gaps_and_edges() {
        let geometry = Geometry::new(20, 4, 8, 8).unwrap();
        assert_eq!(geometry.locate(2, 30).0, Location::Gap);
        assert_eq!(geometry.locate(30, 2).1, Location::Gap);
        assert_eq!(geometry.square_at(2, 30), None);
        assert_eq!(geometry.locate(10_000, 30).0, Location::OffBoard);
        assert_eq!(geometry.locate(30, 10_000).1, Location::OffBoard);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(Geometry::new(0, 1, 8, 8).is_err());
        assert!(Geometry::new(10, -1, 8, 8).is_err());
        assert!(Geometry::new(10, 1, 0, 8).is_err());
        assert!(Geometry::new(10, 1, 8, 17).is_err());
    }

    #[test]
    fn test_rect_helpers() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.union(&b), Rect::new(0, 0, 15, 15));
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection(&Rect::new(10, 0, 4, 4)), None);
        assert_eq!(Rect::default().union(&b), b);
        assert!(a.contains(Point::new(9, 9)));
        assert!(!a.contains(Point::new(10, 9)));
    }
}
