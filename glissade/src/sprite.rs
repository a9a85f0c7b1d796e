use anyhow::{bail, Context, Result};
use types::{Piece, PieceKind};

/// Side length of the compiled-in glyphs.
const GLYPH_SIZE: usize = 12;

/// Smallest square size piece images can be rendered at.
pub const MIN_SPRITE_SIZE: i32 = GLYPH_SIZE as i32;

/// Largest square size piece images can be rendered at.
pub const MAX_SPRITE_SIZE: i32 = 512;

type Glyph = [&'static str; GLYPH_SIZE];

const PAWN: Glyph = [
    "............",
    "............",
    "............",
    ".....##.....",
    "....####....",
    "....####....",
    ".....##.....",
    "....####....",
    "...######...",
    "...######...",
    "..########..",
    "............",
];

const KNIGHT: Glyph = [
    "............",
    "....##......",
    "...#####....",
    "..#######...",
    "..###.###...",
    ".....####...",
    "....####....",
    "...#####....",
    "...######...",
    "..########..",
    "..########..",
    "............",
];

const BISHOP: Glyph = [
    "............",
    ".....##.....",
    "....####....",
    "...###.##...",
    "...##.###...",
    "...######...",
    "....####....",
    ".....##.....",
    "....####....",
    "..########..",
    "..########..",
    "............",
];

const ROOK: Glyph = [
    "............",
    "..##.##.##..",
    "..########..",
    "...######...",
    "....####....",
    "....####....",
    "....####....",
    "....####....",
    "...######...",
    "..########..",
    "..########..",
    "............",
];

const QUEEN: Glyph = [
    "............",
    ".#...##...#.",
    ".##..##..##.",
    ".###.##.###.",
    "..########..",
    "..########..",
    "...######...",
    "....####....",
    "...######...",
    "..########..",
    "..########..",
    "............",
];

const KING: Glyph = [
    ".....##.....",
    "....####....",
    ".....##.....",
    "..##.##.##..",
    ".##########.",
    ".##########.",
    "..########..",
    "...######...",
    "....####....",
    "...######...",
    "..########..",
    "............",
];

const fn glyph(kind: PieceKind) -> &'static Glyph {
    match kind {
        PieceKind::Pawn => &PAWN,
        PieceKind::Knight => &KNIGHT,
        PieceKind::Bishop => &BISHOP,
        PieceKind::Rook => &ROOK,
        PieceKind::Queen => &QUEEN,
        PieceKind::King => &KING,
    }
}

/// One pixel of a piece image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Texel {
    /// Outside the silhouette; the background shows through.
    #[default]
    Clear,
    /// Inside the silhouette.
    Body,
    /// Inside the silhouette, on its border.
    Edge,
}

impl Texel {
    pub const fn is_opaque(&self) -> bool {
        !matches!(self, Self::Clear)
    }
}

/// A square piece image together with its silhouette mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    size: i32,
    texels: Vec<Texel>,
}

impl Sprite {
    /// Scales the glyph for `kind` up to `size` pixels and traces its outline.
    fn render(kind: PieceKind, size: i32) -> Result<Self> {
        let side = size as usize;
        let mut texels = Vec::new();
        texels
            .try_reserve_exact(side * side)
            .with_context(|| format!("Failed to allocate a {size}x{size} {} image", kind.name()))?;

        let rows = glyph(kind);
        let inside = |x: usize, y: usize| rows[y * GLYPH_SIZE / side].as_bytes()[x * GLYPH_SIZE / side] == b'#';

        for y in 0..side {
            for x in 0..side {
                let texel = if !inside(x, y) {
                    Texel::Clear
                } else {
                    let on_edge = x == 0
                        || y == 0
                        || x + 1 == side
                        || y + 1 == side
                        || !inside(x - 1, y)
                        || !inside(x + 1, y)
                        || !inside(x, y - 1)
                        || !inside(x, y + 1);
                    if on_edge {
                        Texel::Edge
                    } else {
                        Texel::Body
                    }
                };
                texels.push(texel);
            }
        }

        Ok(Self { size, texels })
    }

    pub const fn size(&self) -> i32 {
        self.size
    }

    /// The texel at `(x, y)`, or [`Texel::Clear`] outside the image.
    pub fn texel(&self, x: i32, y: i32) -> Texel {
        if x < 0 || y < 0 || x >= self.size || y >= self.size {
            return Texel::Clear;
        }
        self.texels[(y * self.size + x) as usize]
    }

    /// Number of opaque texels.
    pub fn coverage(&self) -> usize {
        self.texels.iter().filter(|t| t.is_opaque()).count()
    }
}

/// Images for every [`PieceKind`], rendered once for a fixed square size.
///
/// Both colors share an image; the color is applied when compositing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteSet {
    size: i32,
    sprites: [Sprite; PieceKind::COUNT],
}

impl SpriteSet {
    /// Renders all piece images at `size` pixels square.
    pub fn render(size: i32) -> Result<Self> {
        if !(MIN_SPRITE_SIZE..=MAX_SPRITE_SIZE).contains(&size) {
            bail!("Cannot render piece images at {size} pixels: size must be between [{MIN_SPRITE_SIZE},{MAX_SPRITE_SIZE}]");
        }

        let [p, n, b, r, q, k] = PieceKind::all();
        Ok(Self {
            size,
            sprites: [
                Sprite::render(p, size)?,
                Sprite::render(n, size)?,
                Sprite::render(b, size)?,
                Sprite::render(r, size)?,
                Sprite::render(q, size)?,
                Sprite::render(k, size)?,
            ],
        })
    }

    pub const fn size(&self) -> i32 {
        self.size
    }

    /// The image for `piece`.
    pub fn get(&self, piece: Piece) -> &Sprite {
        &self.sprites[piece]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_are_square() {
        for kind in PieceKind::iter() {
            let rows = glyph(kind);
            assert!(rows.iter().all(|row| row.len() == GLYPH_SIZE), "{}", kind.name());
            assert!(rows.iter().any(|row| row.contains('#')));
        }
    }

    #[test]
    fn test_sprites_scale_with_size() {
        let small = SpriteSet::render(12).unwrap();
        let large = SpriteSet::render(48).unwrap();
        let pawn = Piece::WHITE_PAWN;

        // Nearest-neighbour scaling by 4 multiplies the covered area by 16.
        assert_eq!(large.get(pawn).coverage(), small.get(pawn).coverage() * 16);
        assert_eq!(large.get(pawn).texel(0, 0), Texel::Clear);
        assert_eq!(large.get(pawn).texel(-1, 5), Texel::Clear);
    }

    #[test]
    fn test_outline_surrounds_body() {
        let sprites = SpriteSet::render(64).unwrap();
        let rook = sprites.get(Piece::BLACK_ROOK);
        for y in 0..64 {
            for x in 0..64 {
                if rook.texel(x, y) == Texel::Body {
                    for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                        assert!(rook.texel(x + dx, y + dy).is_opaque());
                    }
                }
            }
        }
    }

    #[test]
    fn test_bad_sizes() {
        assert!(SpriteSet::render(4).is_err());
        assert!(SpriteSet::render(10_000).is_err());
    }
}
