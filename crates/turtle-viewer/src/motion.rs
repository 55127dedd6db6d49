//! Per-actor motion interpolation.
//!
//! Server records only carry destinations. The interpolator turns each new
//! destination into a *leg* that is walked at a fixed progress step per
//! render tick, and reports the trail segment a leg leaves behind when it
//! finishes or is abandoned by a retarget.
//!
//! ```text
//!          set_target(p != position)
//!   Idle ---------------------------> Moving
//!    ^                                 |  |
//!    |     progress > 1 (commit leg)   |  | set_target(q != end)
//!    +---------------------------------+  | (commit start..position,
//!                                         |  new leg from position)
//!                                         v
//! ```

use crate::geometry::Vec2;
use crate::trail::{Stroke, TrailSegment};

/// Progress added per tick when no step is configured.
pub const DEFAULT_MOTION_STEP: f64 = 0.02;

/// Interpolator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// At rest on the last target.
    Idle,
    /// Walking a leg.
    Moving,
}

/// Leg bookkeeping for one actor.
#[derive(Debug, Clone)]
pub struct MotionInterpolator {
    start: Vec2,
    end: Vec2,
    position: Vec2,
    progress: f64,
    step: f64,
    state: MotionState,
    heading: f64,
    stroke: Stroke,
}

impl MotionInterpolator {
    /// An idle interpolator posed at `position`.
    ///
    /// Non-positive or non-finite steps fall back to
    /// [`DEFAULT_MOTION_STEP`].
    pub fn at_rest(position: Vec2, step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_MOTION_STEP
        };
        Self {
            start: position,
            end: position,
            position,
            progress: 0.0,
            step,
            state: MotionState::Idle,
            heading: 0.0,
            stroke: Stroke::default(),
        }
    }

    /// Feed a new destination.
    ///
    /// Returns the segment abandoned by a retarget, if any. Targets equal
    /// to the current rest position or to the in-flight leg's end are
    /// ignored.
    pub fn set_target(&mut self, target: Vec2, stroke: Stroke) -> Option<TrailSegment> {
        match self.state {
            MotionState::Idle => {
                if target.approx_eq(self.position) {
                    return None;
                }
                self.begin_leg(target, stroke);
                None
            }
            MotionState::Moving => {
                if target.approx_eq(self.end) {
                    return None;
                }
                let abandoned = TrailSegment {
                    from: self.start,
                    to: self.position,
                    stroke: self.stroke,
                };
                if target.approx_eq(self.position) {
                    self.settle(self.position);
                } else {
                    self.begin_leg(target, stroke);
                }
                Some(abandoned)
            }
        }
    }

    /// Advance one render tick.
    ///
    /// Returns the finished leg when progress passes 1.0.
    pub fn tick(&mut self) -> Option<TrailSegment> {
        if self.state == MotionState::Idle {
            return None;
        }
        self.progress += self.step;
        if self.progress > 1.0 {
            let finished = TrailSegment {
                from: self.start,
                to: self.end,
                stroke: self.stroke,
            };
            self.settle(self.end);
            return Some(finished);
        }
        self.position = self.start.lerp(self.end, self.progress);
        None
    }

    fn begin_leg(&mut self, target: Vec2, stroke: Stroke) {
        self.start = self.position;
        self.end = target;
        self.progress = 0.0;
        self.heading = self.start.heading_to(target);
        self.stroke = stroke;
        self.state = MotionState::Moving;
    }

    fn settle(&mut self, at: Vec2) {
        self.start = at;
        self.end = at;
        self.position = at;
        self.progress = 0.0;
        self.state = MotionState::Idle;
    }

    /// Current state.
    pub const fn state(&self) -> MotionState {
        self.state
    }

    /// Whether a leg is in progress.
    pub fn is_moving(&self) -> bool {
        self.state == MotionState::Moving
    }

    /// Rendered position.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Start of the current leg (equals the position while idle).
    pub const fn leg_start(&self) -> Vec2 {
        self.start
    }

    /// End of the current leg (equals the position while idle).
    pub const fn leg_end(&self) -> Vec2 {
        self.end
    }

    /// Progress along the current leg in `[0, 1]`.
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Sprite rotation in radians. Kept from the last leg while idle.
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Style of the current (or last) leg.
    pub const fn stroke(&self) -> Stroke {
        self.stroke
    }
}
