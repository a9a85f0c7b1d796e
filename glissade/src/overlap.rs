use arrayvec::ArrayVec;

use crate::{Point, Rect};

/// Overlap between two `size`-square frames with top-left corners `old` and `new`.
///
/// Returns the overlapping rectangle relative to `old`, together with the
/// position the same pixels occupy relative to `new`. Frames that are a full
/// square or more apart on either axis do not overlap.
///
/// # Example
/// ```
/// # use glissade::{overlap::intersect, Point, Rect};
/// let (rect, at) = intersect(Point::new(0, 0), Point::new(10, -4), 64).unwrap();
/// assert_eq!(rect, Rect::new(10, 0, 54, 60));
/// assert_eq!(at, Point::new(0, 4));
/// ```
pub fn intersect(old: Point, new: Point, size: i32) -> Option<(Rect, Point)> {
    let dx = new.x - old.x;
    let dy = new.y - old.y;
    if dx.abs() >= size || dy.abs() >= size {
        return None;
    }

    let rect = Rect::new(dx.max(0), dy.max(0), size - dx.abs(), size - dy.abs());
    let at = Point::new((-dx).max(0), (-dy).max(0));
    Some((rect, at))
}

/// The parts of the `size`-square frame at `old` that the frame at `new` does not cover, in screen coordinates.
///
/// At most one horizontal strip (above or below) and one vertical strip (left
/// or right), the latter clipped to the rows the first one leaves. Identical
/// frames need no repair.
pub fn update_rects(old: Point, new: Point, size: i32) -> ArrayVec<Rect, 2> {
    let mut rects = ArrayVec::new();
    if old == new {
        return rects;
    }

    if new.y > old.y {
        rects.push(Rect::new(old.x, old.y, size, new.y - old.y));
    } else if old.y > new.y {
        rects.push(Rect::new(old.x, old.y + size - (old.y - new.y), size, old.y - new.y));
    }

    let rows = size - (new.y - old.y).abs();
    let top = new.y.max(old.y);
    if new.x > old.x {
        rects.push(Rect::new(old.x, top, new.x - old.x, rows));
    } else if old.x > new.x {
        rects.push(Rect::new(new.x + size, top, old.x - new.x, rows));
    }

    rects
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    /// Counts how many times each pixel of the old square is covered by the overlap and the update rectangles.
    fn coverage(old: Point, new: Point, size: i32) -> Vec<u32> {
        let mut counts = vec![0; (size * size) as usize];
        let mut cover = |rect: Rect| {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    let (lx, ly) = (x - old.x, y - old.y);
                    assert!((0..size).contains(&lx) && (0..size).contains(&ly), "{rect:?} leaves the old square");
                    counts[(ly * size + lx) as usize] += 1;
                }
            }
        };

        if let Some((overlap, _)) = intersect(old, new, size) {
            cover(overlap.translate(old.x, old.y));
            for rect in update_rects(old, new, size) {
                cover(rect);
            }
        } else {
            cover(Rect::square(old, size));
        }
        counts
    }

    #[test]
    fn test_disjoint_frames() {
        let old = Point::new(100, 100);
        assert_eq!(intersect(old, Point::new(164, 100), 64), None);
        assert_eq!(intersect(old, Point::new(100, 36), 64), None);
        assert_eq!(intersect(old, Point::new(400, 400), 64), None);
        assert!(intersect(old, Point::new(163, 37), 64).is_some());
    }

    #[test]
    fn test_update_rects_cases() {
        let old = Point::new(10, 10);
        assert!(update_rects(old, old, 8).is_empty());

        // Moving down and right leaves a strip above and one to the left.
        let rects = update_rects(old, Point::new(13, 12), 8);
        assert_eq!(rects.as_slice(), [Rect::new(10, 10, 8, 2), Rect::new(10, 12, 3, 6)]);

        // Moving up and left leaves a strip below and one to the right.
        let rects = update_rects(old, Point::new(7, 9), 8);
        assert_eq!(rects.as_slice(), [Rect::new(10, 17, 8, 1), Rect::new(15, 10, 3, 7)]);

        // Purely horizontal.
        let rects = update_rects(old, Point::new(14, 10), 8);
        assert_eq!(rects.as_slice(), [Rect::new(10, 10, 4, 8)]);
    }

    #[test]
    fn test_overlap_offsets() {
        let (rect, at) = intersect(Point::new(50, 50), Point::new(40, 55), 20).unwrap();
        assert_eq!(rect, Rect::new(0, 5, 10, 15));
        assert_eq!(at, Point::new(10, 0));
        // The same pixels, seen from either frame.
        assert_eq!(Point::new(50 + rect.x, 50 + rect.y), Point::new(40 + at.x, 55 + at.y));
    }

    #[test]
    fn test_rects_tile_old_square() {
        let mut rng = StdRng::seed_from_u64(0x6c15_5ade);
        for _ in 0..500 {
            let size = rng.gen_range(1..40);
            let old = Point::new(rng.gen_range(-50..50), rng.gen_range(-50..50));
            let new = Point::new(old.x + rng.gen_range(-size..=size), old.y + rng.gen_range(-size..=size));

            let counts = coverage(old, new, size);
            assert!(counts.iter().all(|&c| c == 1), "old={old:?} new={new:?} size={size}");
        }
    }
}
