//! Merge scheduler between ingestion and the render loop.
//!
//! Network tasks never touch the mirror. They enqueue [`MirrorOp`]s on an
//! unbounded channel, and each render tick drains the queue before it
//! advances motion and draws, so a frame never shows a half-applied
//! update.

use tokio::sync::mpsc;
use tracing::debug;
use turtle_types::ActorRecord;

use crate::mirror::ClientMirror;
use crate::render::{Canvas, render};

/// A pending change to the mirror.
#[derive(Debug, Clone)]
pub enum MirrorOp {
    /// Snapshot fetched at startup.
    Bootstrap(Vec<ActorRecord>),
    /// One record from the push stream.
    Push(ActorRecord),
    /// Local "clear all trails" action.
    ClearTrails,
}

/// Producer half handed to ingestion tasks.
pub type OpSender = mpsc::UnboundedSender<MirrorOp>;

/// Create the operation queue.
pub fn op_channel() -> (OpSender, mpsc::UnboundedReceiver<MirrorOp>) {
    mpsc::unbounded_channel()
}

/// What one render tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the tick, starting at 1.
    pub tick: u64,
    /// Operations applied before advancing.
    pub applied: usize,
    /// Actors walking a leg after the advance.
    pub moving: usize,
}

/// Owner of the mirror on the render side.
#[derive(Debug)]
pub struct Scene {
    mirror: ClientMirror,
    ops: mpsc::UnboundedReceiver<MirrorOp>,
    ticks: u64,
}

impl Scene {
    /// Wrap a mirror and the receiving end of its queue.
    pub const fn new(mirror: ClientMirror, ops: mpsc::UnboundedReceiver<MirrorOp>) -> Self {
        Self {
            mirror,
            ops,
            ticks: 0,
        }
    }

    /// Apply every operation queued so far. Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied: usize = 0;
        while let Ok(op) = self.ops.try_recv() {
            match op {
                MirrorOp::Bootstrap(records) => {
                    debug!(count = records.len(), "Applying snapshot");
                    self.mirror.bootstrap(&records);
                }
                MirrorOp::Push(record) => self.mirror.on_push_event(&record),
                MirrorOp::ClearTrails => self.mirror.clear_trails(),
            }
            applied = applied.saturating_add(1);
        }
        applied
    }

    /// Run one render tick: drain, advance, draw.
    pub fn step(&mut self, canvas: &mut impl Canvas) -> TickReport {
        let applied = self.drain();
        self.mirror.tick();
        render(&self.mirror, canvas);
        self.ticks = self.ticks.saturating_add(1);
        TickReport {
            tick: self.ticks,
            applied,
            moving: self.mirror.moving_count(),
        }
    }

    /// The mirror as of the last tick.
    pub const fn mirror(&self) -> &ClientMirror {
        &self.mirror
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use turtle_types::ActorId;

    use super::*;
    use crate::animator::SpriteLayout;
    use crate::mirror::MirrorSettings;
    use crate::render::RecordingCanvas;

    fn scene() -> (OpSender, Scene) {
        let (tx, rx) = op_channel();
        let mirror = ClientMirror::new(MirrorSettings {
            motion_step: 0.5,
            layout: SpriteLayout::new(4, 4).unwrap(),
            ticks_per_frame: 1,
        });
        (tx, Scene::new(mirror, rx))
    }

    fn record(ip: &str, x: i32, y: i32) -> ActorRecord {
        let mut r = ActorRecord::new(ActorId::new(ip), Utc::now());
        r.x = x;
        r.y = y;
        r
    }

    #[test]
    fn ops_are_applied_at_the_next_tick_in_order() {
        let (tx, mut scene) = scene();
        tx.send(MirrorOp::Bootstrap(vec![record("10.0.0.1", 0, 0)]))
            .unwrap();
        tx.send(MirrorOp::Push(record("10.0.0.1", 10, 0))).unwrap();
        tx.send(MirrorOp::Push(record("10.0.0.2", 3, 3))).unwrap();

        assert!(scene.mirror().is_empty());

        let mut canvas = RecordingCanvas::default();
        let report = scene.step(&mut canvas);

        assert_eq!(report.tick, 1);
        assert_eq!(report.applied, 3);
        assert_eq!(report.moving, 1);
        assert_eq!(scene.mirror().len(), 2);
        assert_eq!(canvas.sprite_count(), 2);
    }

    #[test]
    fn empty_queue_still_advances() {
        let (tx, mut scene) = scene();
        tx.send(MirrorOp::Push(record("10.0.0.1", 0, 0))).unwrap();
        tx.send(MirrorOp::Push(record("10.0.0.1", 0, 10))).unwrap();
        let mut canvas = RecordingCanvas::default();

        scene.step(&mut canvas);
        let second = scene.step(&mut canvas);
        let third = scene.step(&mut canvas);

        assert_eq!(second.applied, 0);
        assert_eq!(third.moving, 0);
        let entry = scene.mirror().get(&ActorId::new("10.0.0.1")).unwrap();
        assert_eq!(entry.trail().len(), 1);
    }

    #[test]
    fn clear_trails_is_queued_like_any_other_op() {
        let (tx, mut scene) = scene();
        tx.send(MirrorOp::Push(record("10.0.0.1", 0, 0))).unwrap();
        tx.send(MirrorOp::Push(record("10.0.0.1", 0, 10))).unwrap();
        let mut canvas = RecordingCanvas::default();
        for _ in 0..4 {
            scene.step(&mut canvas);
        }

        tx.send(MirrorOp::ClearTrails).unwrap();
        scene.step(&mut canvas);

        let entry = scene.mirror().get(&ActorId::new("10.0.0.1")).unwrap();
        assert!(entry.trail().is_empty());
        assert_eq!(canvas.line_count(), 0);
    }
}
