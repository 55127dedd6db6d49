//! Committed trail segments.
//!
//! A [`Trail`] is append-only: segments are added when a leg finishes or is
//! abandoned, and only a local "clear all trails" action removes them.

use turtle_types::{DEFAULT_COLOR, DEFAULT_WEIGHT, Rgb};

use crate::geometry::Vec2;

/// Line style used for a leg and the segment it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    /// Line color.
    pub color: Rgb,
    /// Line weight as received from the server (not yet clamped).
    pub weight: u16,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// One committed line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    /// Where the leg started.
    pub from: Vec2,
    /// Where the leg ended (or was abandoned).
    pub to: Vec2,
    /// Style of the leg.
    pub stroke: Stroke,
}

impl TrailSegment {
    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }

    /// Whether the segment has no visible length.
    pub fn is_degenerate(&self) -> bool {
        self.from.approx_eq(self.to)
    }
}

/// Ordered committed segments of one actor.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    segments: Vec<TrailSegment>,
}

impl Trail {
    /// Append `segment` unless it is zero-length. Returns whether it was kept.
    pub fn commit(&mut self, segment: TrailSegment) -> bool {
        if segment.is_degenerate() {
            return false;
        }
        self.segments.push(segment);
        true
    }

    /// Drop every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Segments in commit order.
    pub fn segments(&self) -> &[TrailSegment] {
        &self.segments
    }

    /// Number of committed segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
