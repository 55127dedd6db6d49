//! Draw pass over an abstract canvas.
//!
//! The viewer does not own a window. Anything that implements [`Canvas`]
//! (a GUI surface, a terminal, a test recorder) can display the mirror.

use crate::animator::SpriteCell;
use crate::geometry::Vec2;
use crate::mirror::ClientMirror;
use crate::trail::Stroke;

/// Heaviest stroke the renderer will draw.
pub const MAX_RENDER_WEIGHT: u16 = 20;

/// Vertical offset of the status icon, in the sprite's rotated frame.
pub const STATUS_OFFSET: f64 = -30.0;

/// Vertical offset of the name label, unrotated.
pub const NAME_OFFSET: f64 = 45.0;

/// Drawing surface the render pass talks to.
pub trait Canvas {
    /// Wipe the previous frame.
    fn clear(&mut self);

    /// Draw a straight line with the given style.
    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);

    /// Draw one sprite frame centered on `at`, rotated by `heading` radians.
    fn sprite(&mut self, at: Vec2, heading: f64, cell: SpriteCell);

    /// Draw a centered text label `offset` units below `anchor`.
    ///
    /// When `heading` is set the offset is applied in the rotated frame.
    fn label(&mut self, anchor: Vec2, offset: f64, heading: Option<f64>, text: &str);
}

/// Clamp a stroke's weight to what the renderer draws.
pub fn clamp_stroke(stroke: Stroke) -> Stroke {
    Stroke {
        weight: stroke.weight.min(MAX_RENDER_WEIGHT),
        ..stroke
    }
}

/// Draw the whole mirror.
///
/// Per actor, in order: committed trail, the live segment of a leg in
/// progress, the sprite, the status icon and the name.
pub fn render(mirror: &ClientMirror, canvas: &mut impl Canvas) {
    canvas.clear();

    for (_, entry) in mirror.iter() {
        for segment in entry.trail().segments() {
            canvas.line(segment.from, segment.to, clamp_stroke(segment.stroke));
        }

        let motion = entry.motion();
        let position = motion.position();
        if motion.is_moving() {
            canvas.line(motion.leg_start(), position, clamp_stroke(motion.stroke()));
        }

        canvas.sprite(position, motion.heading(), entry.animator().cell());

        let icon = entry.status_icon();
        if !icon.is_empty() {
            canvas.label(position, STATUS_OFFSET, Some(motion.heading()), icon);
        }
        canvas.label(position, NAME_OFFSET, None, entry.name());
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// [`Canvas::clear`].
    Clear,
    /// [`Canvas::line`].
    Line {
        /// Line start.
        from: Vec2,
        /// Line end.
        to: Vec2,
        /// Clamped style.
        stroke: Stroke,
    },
    /// [`Canvas::sprite`].
    Sprite {
        /// Sprite center.
        at: Vec2,
        /// Rotation in radians.
        heading: f64,
        /// Frame drawn.
        cell: SpriteCell,
    },
    /// [`Canvas::label`].
    Label {
        /// Anchor point.
        anchor: Vec2,
        /// Offset from the anchor.
        offset: f64,
        /// Label text.
        text: String,
    },
}

/// Canvas that records the calls of the latest frame.
///
/// Used by the headless binary to report frame statistics.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// Calls made since the last [`Canvas::clear`].
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of line calls in the latest frame.
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    /// Number of sprite calls in the latest frame.
    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn sprite(&mut self, at: Vec2, heading: f64, cell: SpriteCell) {
        self.commands.push(DrawCommand::Sprite { at, heading, cell });
    }

    fn label(&mut self, anchor: Vec2, offset: f64, _heading: Option<f64>, text: &str) {
        self.commands.push(DrawCommand::Label {
            anchor,
            offset,
            text: text.to_owned(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use turtle_types::{ActorId, ActorRecord, UpdateMethod};

    use super::*;
    use crate::animator::SpriteLayout;
    use crate::mirror::MirrorSettings;

    fn mirror() -> ClientMirror {
        ClientMirror::new(MirrorSettings {
            motion_step: 0.25,
            layout: SpriteLayout::new(4, 4).unwrap(),
            ticks_per_frame: 1,
        })
    }

    fn record(x: i32, y: i32, w: u16, method: UpdateMethod) -> ActorRecord {
        let mut r = ActorRecord::new(ActorId::new("10.0.0.1"), Utc::now());
        r.x = x;
        r.y = y;
        r.w = w;
        r.method = method;
        r
    }

    fn kinds(canvas: &RecordingCanvas) -> Vec<&'static str> {
        canvas
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::Clear => "clear",
                DrawCommand::Line { .. } => "line",
                DrawCommand::Sprite { .. } => "sprite",
                DrawCommand::Label { .. } => "label",
            })
            .collect()
    }

    #[test]
    fn idle_actor_draws_sprite_and_name_only() {
        let mut m = mirror();
        m.on_push_event(&record(10, 10, 3, UpdateMethod::Get));
        let mut canvas = RecordingCanvas::default();

        render(&m, &mut canvas);

        assert_eq!(kinds(&canvas), vec!["clear", "sprite", "label"]);
        assert_eq!(
            canvas.commands().last().unwrap(),
            &DrawCommand::Label {
                anchor: Vec2::new(10.0, 10.0),
                offset: NAME_OFFSET,
                text: "10.0.0.1".to_owned(),
            }
        );
    }

    #[test]
    fn moving_actor_draws_trail_then_live_segment_then_icons() {
        let mut m = mirror();
        m.on_push_event(&record(0, 0, 3, UpdateMethod::Post));
        m.on_push_event(&record(40, 0, 3, UpdateMethod::Post));
        for _ in 0..5 {
            m.tick();
        }
        m.on_push_event(&record(40, 40, 3, UpdateMethod::Post));
        m.tick();
        let mut canvas = RecordingCanvas::default();

        render(&m, &mut canvas);

        assert_eq!(
            kinds(&canvas),
            vec!["clear", "line", "line", "sprite", "label", "label"]
        );
        assert_eq!(canvas.line_count(), 2);
        assert_eq!(canvas.sprite_count(), 1);
    }

    #[test]
    fn weights_are_clamped() {
        let mut m = mirror();
        m.on_push_event(&record(0, 0, 150, UpdateMethod::Get));
        m.on_push_event(&record(0, 100, 150, UpdateMethod::Get));
        m.tick();
        let mut canvas = RecordingCanvas::default();

        render(&m, &mut canvas);

        let weight = canvas.commands().iter().find_map(|c| match c {
            DrawCommand::Line { stroke, .. } => Some(stroke.weight),
            _ => None,
        });
        assert_eq!(weight, Some(MAX_RENDER_WEIGHT));
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let m = mirror();
        let mut canvas = RecordingCanvas::default();
        render(&m, &mut canvas);
        render(&m, &mut canvas);
        assert_eq!(canvas.commands(), &[DrawCommand::Clear]);
    }
}
