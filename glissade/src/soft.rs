use anyhow::{bail, Context, Result};
use log::debug;
use types::{Color, Piece, SquareShade};

use crate::{
    raster::{Buffer, Paint, Raster, Stream, Surface},
    sprite::{SpriteSet, Texel},
    Point, Rect,
};

/// Largest surface, in pixels, [`SoftRaster`] agrees to allocate.
pub const MAX_SURFACE_PIXELS: i64 = 1 << 26;

/// A packed `0xRRGGBBAA` pixel.
pub type Rgba = u32;

/// How pieces and squares are colored. Chosen once, when the raster is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Color,
    /// Black and white only, for displays without color.
    Mono,
}

/// Pixel values for every [`Paint`] and piece color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub light_square: Rgba,
    pub dark_square: Rgba,
    pub grid: Rgba,
    pub highlight: Rgba,
    pub premove: Rgba,
    pub burst: Rgba,
    /// Body and outline of White pieces.
    pub white_piece: (Rgba, Rgba),
    /// Body and outline of Black pieces.
    pub black_piece: (Rgba, Rgba),
}

impl Palette {
    pub const fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Color => Self {
                light_square: 0xC8_C3_64_FF,
                dark_square: 0x77_A2_6D_FF,
                grid: 0x00_00_00_FF,
                highlight: 0xFF_FF_00_FF,
                premove: 0xFF_00_00_FF,
                burst: 0xFF_FF_00_FF,
                white_piece: (0xFF_FF_CC_FF, 0x00_00_00_FF),
                black_piece: (0x20_20_20_FF, 0xFF_FF_FF_FF),
            },
            RenderMode::Mono => Self {
                light_square: 0xFF_FF_FF_FF,
                dark_square: 0xA0_A0_A0_FF,
                grid: 0x00_00_00_FF,
                highlight: 0xFF_FF_FF_FF,
                premove: 0x00_00_00_FF,
                burst: 0x00_00_00_FF,
                white_piece: (0xFF_FF_FF_FF, 0x00_00_00_FF),
                black_piece: (0x00_00_00_FF, 0x00_00_00_FF),
            },
        }
    }

    pub const fn paint(&self, paint: Paint) -> Rgba {
        match paint {
            Paint::Square(SquareShade::Light) => self.light_square,
            Paint::Square(SquareShade::Dark) => self.dark_square,
            Paint::Grid => self.grid,
            Paint::Highlight => self.highlight,
            Paint::Premove => self.premove,
            Paint::Burst => self.burst,
        }
    }

    const fn piece(&self, color: Color) -> (Rgba, Rgba) {
        match color {
            Color::White => self.white_piece,
            Color::Black => self.black_piece,
        }
    }
}

/// A block of RGBA pixels.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Allocates a `width` by `height` canvas, reporting allocation failure instead of aborting.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            bail!("Cannot allocate a {width}x{height} surface");
        }
        let len = width as i64 * height as i64;
        if len > MAX_SURFACE_PIXELS {
            bail!("Cannot allocate a {width}x{height} surface: larger than {MAX_SURFACE_PIXELS} pixels");
        }

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len as usize)
            .with_context(|| format!("Out of memory allocating a {width}x{height} surface"))?;
        pixels.resize(len as usize, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Raw pixels, row by row.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixels as `RGBA8` bytes, row by row.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }

    /// The pixel at `(x, y)`, if it is on this canvas.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Sets the pixel at `(x, y)`; does nothing off the canvas.
    pub fn set(&mut self, x: i32, y: i32, pixel: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = pixel;
        }
    }

    /// The pixels of `rect`, row by row. Off-canvas pixels read as `None`.
    pub fn region(&self, rect: Rect) -> Vec<Option<Rgba>> {
        (rect.y..rect.bottom())
            .flat_map(|y| (rect.x..rect.right()).map(move |x| (x, y)))
            .map(|(x, y)| self.get(x, y))
            .collect()
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.bounds()
            .contains(Point::new(x, y))
            .then(|| (y * self.width + x) as usize)
    }

    fn fill(&mut self, rect: Rect, pixel: Rgba) {
        let Some(rect) = rect.intersection(&self.bounds()) else {
            return;
        };
        for y in rect.y..rect.bottom() {
            let row = (y * self.width) as usize;
            self.pixels[row + rect.x as usize..row + rect.right() as usize].fill(pixel);
        }
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Canvas {}x{}", self.width, self.height)
    }
}

/// A software implementation of [`Raster`] drawing into in-memory [`Canvas`]es.
///
/// Hosts without a native drawing API, and the tests, use this. The screen
/// canvas can be uploaded to any toolkit as an RGBA texture.
#[derive(Debug)]
pub struct SoftRaster {
    screen: Canvas,
    buffers: [[Option<Canvas>; 2]; Stream::COUNT],
    sprites: SpriteSet,
    palette: Palette,
    exposed: Rect,
}

impl SoftRaster {
    /// Creates a raster with no screen yet and piece images for `square_size`.
    ///
    /// Fails if the piece images cannot be rendered.
    pub fn new(square_size: i32, mode: RenderMode) -> Result<Self> {
        let sprites = SpriteSet::render(square_size).context("Failed to load piece images")?;

        Ok(Self {
            screen: Canvas::default(),
            buffers: Default::default(),
            sprites,
            palette: Palette::for_mode(mode),
            exposed: Rect::default(),
        })
    }

    /// The visible canvas.
    pub fn screen(&self) -> &Canvas {
        &self.screen
    }

    /// An animation buffer, if it has been allocated.
    pub fn buffer(&self, stream: Stream, buffer: Buffer) -> Option<&Canvas> {
        self.buffers[stream.index()][buffer.index()].as_ref()
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Returns and resets the region of the screen exposed since the last call.
    pub fn take_exposed(&mut self) -> Option<Rect> {
        let exposed = std::mem::take(&mut self.exposed);
        (!exposed.is_empty()).then_some(exposed)
    }

    fn canvas(&self, surface: Surface) -> Option<&Canvas> {
        match surface {
            Surface::Screen => Some(&self.screen),
            Surface::Offscreen(stream, buffer) => self.buffer(stream, buffer),
        }
    }

    fn canvas_mut(&mut self, surface: Surface) -> Option<&mut Canvas> {
        match surface {
            Surface::Screen => Some(&mut self.screen),
            Surface::Offscreen(stream, buffer) => self.buffers[stream.index()][buffer.index()].as_mut(),
        }
    }
}

impl Raster for SoftRaster {
    fn allocate(&mut self, surface: Surface, width: i32, height: i32) -> Result<()> {
        let canvas = Canvas::new(width, height).with_context(|| format!("Failed to allocate {surface:?}"))?;
        debug!("Allocated {surface:?} at {width}x{height}");

        match surface {
            Surface::Screen => self.screen = canvas,
            Surface::Offscreen(stream, buffer) => self.buffers[stream.index()][buffer.index()] = Some(canvas),
        }
        Ok(())
    }

    fn load_pieces(&mut self, square_size: i32) -> Result<()> {
        if self.sprites.size() != square_size {
            self.sprites = SpriteSet::render(square_size).context("Failed to load piece images")?;
            debug!("Rendered piece images at {square_size}px");
        }
        Ok(())
    }

    fn copy_rect(&mut self, src: Surface, rect: Rect, dst: Surface, to: Point) {
        if rect.is_empty() {
            return;
        }
        // Snapshot first: source and destination may be the same canvas.
        let Some(pixels) = self.canvas(src).map(|canvas| canvas.region(rect)) else {
            return;
        };
        let Some(target) = self.canvas_mut(dst) else {
            return;
        };

        let mut pixels = pixels.into_iter();
        for dy in 0..rect.height {
            for dx in 0..rect.width {
                if let Some(Some(pixel)) = pixels.next() {
                    target.set(to.x + dx, to.y + dy, pixel);
                }
            }
        }
    }

    fn fill_rect(&mut self, dst: Surface, rect: Rect, paint: Paint) {
        let pixel = self.palette.paint(paint);
        if let Some(canvas) = self.canvas_mut(dst) {
            canvas.fill(rect, pixel);
        }
    }

    fn composite_piece(&mut self, dst: Surface, piece: Piece, at: Point) {
        let (body, edge) = self.palette.piece(piece.color());
        let sprite = self.sprites.get(piece);
        let size = sprite.size();
        let target = match dst {
            Surface::Screen => Some(&mut self.screen),
            Surface::Offscreen(stream, buffer) => self.buffers[stream.index()][buffer.index()].as_mut(),
        };
        let Some(canvas) = target else {
            return;
        };

        for y in 0..size {
            for x in 0..size {
                match sprite.texel(x, y) {
                    Texel::Clear => {}
                    Texel::Body => canvas.set(at.x + x, at.y + y, body),
                    Texel::Edge => canvas.set(at.x + x, at.y + y, edge),
                }
            }
        }
    }

    fn fill_disc(&mut self, dst: Surface, bounds: Rect, paint: Paint) {
        if bounds.is_empty() {
            return;
        }
        let pixel = self.palette.paint(paint);
        let Some(canvas) = self.canvas_mut(dst) else {
            return;
        };

        // Compare in doubled coordinates so pixel centers stay integral.
        let (cx, cy) = (2 * bounds.x + bounds.width, 2 * bounds.y + bounds.height);
        let (rx, ry) = (bounds.width as i64, bounds.height as i64);
        for y in bounds.y..bounds.bottom() {
            for x in bounds.x..bounds.right() {
                let dx = (2 * x + 1 - cx) as i64;
                let dy = (2 * y + 1 - cy) as i64;
                if dx * dx * ry * ry + dy * dy * rx * rx <= rx * rx * ry * ry {
                    canvas.set(x, y, pixel);
                }
            }
        }
    }

    fn expose(&mut self, rect: Rect) {
        self.exposed = self.exposed.union(&rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> SoftRaster {
        let mut raster = SoftRaster::new(16, RenderMode::Color).unwrap();
        raster.allocate(Surface::Screen, 64, 64).unwrap();
        raster
    }

    #[test]
    fn test_fill_and_copy_clip() {
        let mut raster = raster();
        let light = raster.palette().light_square;
        raster.fill_rect(Surface::Screen, Rect::new(-10, -10, 20, 20), Paint::Square(SquareShade::Light));
        assert_eq!(raster.screen().get(0, 0), Some(light));
        assert_eq!(raster.screen().get(9, 9), Some(light));
        assert_eq!(raster.screen().get(10, 10), Some(0));

        // Copy partly off the screen: only the visible part lands.
        raster.copy_rect(Surface::Screen, Rect::new(0, 0, 10, 10), Surface::Screen, Point::new(60, 60));
        assert_eq!(raster.screen().get(63, 63), Some(light));
        assert_eq!(raster.screen().get(59, 59), Some(0));
    }

    #[test]
    fn test_overlapping_self_copy() {
        let mut raster = raster();
        for x in 0..8 {
            raster.screen.set(x, 0, x as Rgba);
        }
        raster.copy_rect(Surface::Screen, Rect::new(0, 0, 6, 1), Surface::Screen, Point::new(2, 0));
        let row: Vec<_> = (0..8).map(|x| raster.screen().get(x, 0).unwrap()).collect();
        assert_eq!(row, [0, 1, 0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unallocated_buffers_are_ignored() {
        let mut raster = raster();
        let save = Surface::Offscreen(Stream::Game, Buffer::Save);
        raster.fill_rect(save, Rect::new(0, 0, 4, 4), Paint::Grid);
        assert!(raster.buffer(Stream::Game, Buffer::Save).is_none());

        raster.allocate(save, 16, 16).unwrap();
        raster.fill_rect(save, Rect::new(0, 0, 4, 4), Paint::Grid);
        assert_eq!(raster.buffer(Stream::Game, Buffer::Save).unwrap().get(3, 3), Some(raster.palette().grid));
    }

    #[test]
    fn test_composite_leaves_background() {
        let mut raster = raster();
        let dark = raster.palette().dark_square;
        raster.fill_rect(Surface::Screen, Rect::new(0, 0, 16, 16), Paint::Square(SquareShade::Dark));
        raster.composite_piece(Surface::Screen, Piece::WHITE_KING, Point::new(0, 0));

        // Corners of a glyph are outside the silhouette.
        assert_eq!(raster.screen().get(0, 15), Some(dark));
        let painted = raster.screen().region(Rect::new(0, 0, 16, 16)).into_iter().filter(|p| *p != Some(dark)).count();
        assert!(painted > 0);
    }

    #[test]
    fn test_disc_stays_in_bounds() {
        let mut raster = raster();
        raster.fill_disc(Surface::Screen, Rect::new(10, 10, 20, 20), Paint::Burst);
        let burst = raster.palette().burst;
        assert_eq!(raster.screen().get(20, 20), Some(burst));
        assert_eq!(raster.screen().get(10, 10), Some(0));
        assert_eq!(raster.screen().get(30, 20), Some(0));
    }

    #[test]
    fn test_expose_accumulates() {
        let mut raster = raster();
        assert_eq!(raster.take_exposed(), None);
        raster.expose(Rect::new(0, 0, 4, 4));
        raster.expose(Rect::new(10, 10, 2, 2));
        assert_eq!(raster.take_exposed(), Some(Rect::new(0, 0, 12, 12)));
        assert_eq!(raster.take_exposed(), None);
    }

    #[test]
    fn test_allocation_failures() {
        let mut raster = raster();
        assert!(raster.allocate(Surface::Screen, 0, 10).is_err());
        assert!(raster.allocate(Surface::Screen, 1 << 14, 1 << 14).is_err());
        assert!(SoftRaster::new(2, RenderMode::Mono).is_err());
        assert!(raster.load_pieces(4).is_err());
        assert!(raster.load_pieces(24).is_ok());
    }
}
