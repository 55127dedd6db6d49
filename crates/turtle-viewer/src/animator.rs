//! Sprite sheet layout and frame animation.
//!
//! Sprite sheets are described by their file name: `turtle@X4N4.png` is a
//! grid four columns wide holding four frames. Pixel slicing is left to
//! the canvas; this module only tracks which grid cell to draw.

use std::str::FromStr;

use crate::error::ViewerError;

/// Frame rate of the walk cycle when none is configured.
pub const DEFAULT_ANIMATION_FPS: u32 = 8;

/// Frame grid of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteLayout {
    columns: u32,
    frames: u32,
}

/// Grid position of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteCell {
    /// Zero-based column.
    pub column: u32,
    /// Zero-based row.
    pub row: u32,
}

impl SpriteLayout {
    /// Build a layout from explicit counts. Both must be non-zero.
    pub fn new(columns: u32, frames: u32) -> Result<Self, ViewerError> {
        if columns == 0 || frames == 0 {
            return Err(ViewerError::Sprite(format!(
                "grid needs at least one column and one frame, got X{columns}N{frames}"
            )));
        }
        Ok(Self { columns, frames })
    }

    /// Parse the `@X<cols>N<frames>` marker out of a sprite file name.
    pub fn from_file_name(name: &str) -> Result<Self, ViewerError> {
        let invalid =
            || ViewerError::Sprite(format!("expected 'name@X<cols>N<frames>.ext', got '{name}'"));

        let (_, marker) = name.rsplit_once('@').ok_or_else(invalid)?;
        let rest = marker.strip_prefix('X').ok_or_else(invalid)?;
        let (columns, rest) = leading_number(rest).ok_or_else(invalid)?;
        let rest = rest.strip_prefix('N').ok_or_else(invalid)?;
        let (frames, _) = leading_number(rest).ok_or_else(invalid)?;

        Self::new(columns, frames)
    }

    /// Number of grid columns.
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of frames in the cycle.
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Number of grid rows (`ceil(frames / columns)`).
    pub const fn rows(&self) -> u32 {
        self.frames.div_ceil(self.columns)
    }

    /// Grid cell of `frame`.
    pub fn cell(&self, frame: u32) -> SpriteCell {
        SpriteCell {
            column: frame.checked_rem(self.columns).unwrap_or(0),
            row: frame.checked_div(self.columns).unwrap_or(0),
        }
    }
}

impl FromStr for SpriteLayout {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_file_name(s)
    }
}

/// Split a run of leading ASCII digits off `s` and parse it.
fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, rest) = s.split_at_checked(end)?;
    digits.parse().ok().map(|n| (n, rest))
}

/// Render ticks each frame stays on screen: `max(1, round(tick_rate / fps))`.
pub fn ticks_per_frame(tick_rate: u32, fps: u32) -> u32 {
    tick_rate
        .checked_add(fps / 2)
        .and_then(|n| n.checked_div(fps))
        .unwrap_or(1)
        .max(1)
}

/// Walk-cycle playback for one actor.
///
/// Starts paused on frame 0. Pausing holds the current frame.
#[derive(Debug, Clone)]
pub struct Animator {
    layout: SpriteLayout,
    ticks_per_frame: u32,
    frame: u32,
    elapsed: u32,
    paused: bool,
    ended: bool,
    looping: bool,
}

impl Animator {
    /// A paused, looping animator on frame 0.
    pub fn new(layout: SpriteLayout, ticks_per_frame: u32) -> Self {
        Self {
            layout,
            ticks_per_frame: ticks_per_frame.max(1),
            frame: 0,
            elapsed: 0,
            paused: true,
            ended: false,
            looping: true,
        }
    }

    /// Play a single cycle and stop on the last frame instead of looping.
    #[must_use]
    pub const fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Resume playback.
    pub const fn play(&mut self) {
        self.paused = false;
    }

    /// Hold the current frame.
    pub const fn pause(&mut self) {
        self.paused = true;
    }

    /// Go back to frame 0 and clear the ended flag.
    pub const fn rewind(&mut self) {
        self.frame = 0;
        self.elapsed = 0;
        self.ended = false;
    }

    /// Advance one render tick.
    pub fn tick(&mut self) {
        if self.paused || self.ended {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed < self.ticks_per_frame {
            return;
        }
        self.elapsed = 0;
        self.frame = self
            .frame
            .saturating_add(1)
            .checked_rem(self.layout.frames())
            .unwrap_or(0);
        if !self.looping && self.frame == self.layout.frames().saturating_sub(1) {
            self.ended = true;
        }
    }

    /// Current frame index.
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Grid cell of the current frame.
    pub fn cell(&self) -> SpriteCell {
        self.layout.cell(self.frame)
    }

    /// Whether playback is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a non-looping cycle has completed.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Sheet layout this animator walks.
    pub const fn layout(&self) -> SpriteLayout {
        self.layout
    }
}
