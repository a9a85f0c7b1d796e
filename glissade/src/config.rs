use std::time::Duration;

use anyhow::{bail, Result};

use crate::{sprite::MAX_SPRITE_SIZE, sprite::MIN_SPRITE_SIZE, tween::MAX_ANIM_FACTOR};

/// Side length of a square, in pixels.
pub const DEFAULT_SQUARE_SIZE: i32 = 64;

/// Thickness of the grid lines, in pixels. `0` draws no grid and no highlights.
pub const DEFAULT_LINE_GAP: i32 = 1;

/// Number of times a moved piece blinks on its destination square.
pub const DEFAULT_FLASH_COUNT: i32 = 3;

/// Flashes per second.
pub const DEFAULT_FLASH_RATE: u32 = 5;

/// Delay between animation frames, in milliseconds.
pub const DEFAULT_ANIM_SPEED: u64 = 10;

/// Number of ease-in (and ease-out) frames of a move animation.
pub const DEFAULT_ANIM_FACTOR: usize = 4;

/// Most diffs an incremental redraw may contain and still flash.
pub const MAX_FLASHING_DIFFS: usize = 4;

/// Display options for a [`BoardView`](crate::BoardView).
///
/// Read once when the view is built; only the flash and flip settings change at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    pub square_size: i32,
    pub line_gap: i32,

    /// Number of flashes; `0` disables flashing, and a negative value remembers
    /// the count while flashing is toggled off.
    pub flash_count: i32,
    pub flash_rate: u32,

    /// Animate moves made on the board.
    pub animate: bool,
    /// Animate a piece dragged with the pointer.
    pub animate_dragging: bool,

    /// Delay between frames, in milliseconds.
    pub anim_speed: u64,
    pub anim_factor: usize,

    /// Hide the pieces: nothing is animated or flashed.
    pub blindfold: bool,
}

impl ViewConfig {
    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SPRITE_SIZE..=MAX_SPRITE_SIZE).contains(&self.square_size) {
            bail!(
                "Square size must be between [{MIN_SPRITE_SIZE},{MAX_SPRITE_SIZE}]. Got {}",
                self.square_size
            );
        }
        if self.line_gap < 0 {
            bail!("Line gap must not be negative. Got {}", self.line_gap);
        }
        if self.flash_count > 0 && self.flash_rate == 0 {
            bail!("Flash rate must be positive when flashing is enabled");
        }
        if self.anim_factor > MAX_ANIM_FACTOR {
            bail!(
                "Animation factor must be at most {MAX_ANIM_FACTOR}. Got {}",
                self.anim_factor
            );
        }
        Ok(())
    }

    /// Returns `true` if moved pieces should flash.
    pub const fn flash_enabled(&self) -> bool {
        self.flash_count > 0 && self.flash_rate > 0
    }

    /// How long each half of a flash lasts.
    pub fn flash_delay(&self) -> Duration {
        Duration::from_millis(500 / self.flash_rate.max(1) as u64)
    }

    /// How long each animation frame stays on screen.
    pub const fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.anim_speed)
    }

    /// Turns flashing on with the default count, or flips the sign of the current count.
    ///
    /// # Example
    /// ```
    /// # use glissade::ViewConfig;
    /// let mut config = ViewConfig { flash_count: 0, ..Default::default() };
    /// config.toggle_flash();
    /// assert_eq!(config.flash_count, 3);
    /// config.toggle_flash();
    /// assert_eq!(config.flash_count, -3);
    /// ```
    pub fn toggle_flash(&mut self) {
        self.flash_count = if self.flash_count == 0 {
            DEFAULT_FLASH_COUNT
        } else {
            -self.flash_count
        };
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            line_gap: DEFAULT_LINE_GAP,
            flash_count: DEFAULT_FLASH_COUNT,
            flash_rate: DEFAULT_FLASH_RATE,
            animate: true,
            animate_dragging: true,
            anim_speed: DEFAULT_ANIM_SPEED,
            anim_factor: DEFAULT_ANIM_FACTOR,
            blindfold: false,
        }
    }
}
