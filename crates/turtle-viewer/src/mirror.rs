//! Local mirror of every actor the viewer has heard about.
//!
//! The mirror merges server records into per-actor entries and owns each
//! entry's motion, trail and animation state. Entries are created the first
//! time an identity shows up and live for the whole session; clearing
//! trails keeps them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use turtle_types::{ActorId, ActorRecord, UpdateMethod};

use crate::animator::{Animator, SpriteLayout};
use crate::geometry::Vec2;
use crate::motion::MotionInterpolator;
use crate::trail::{Stroke, Trail};

/// Icon drawn above an actor, keyed by how its last update arrived.
pub const fn status_icon(method: UpdateMethod) -> &'static str {
    match method {
        UpdateMethod::Get => "",
        UpdateMethod::Post => "\u{1F451}",
    }
}

/// Settings shared by every entry.
#[derive(Debug, Clone, Copy)]
pub struct MirrorSettings {
    /// Leg progress added per tick.
    pub motion_step: f64,
    /// Sprite sheet grid.
    pub layout: SpriteLayout,
    /// Render ticks per animation frame.
    pub ticks_per_frame: u32,
}

/// Mirrored state of one actor.
#[derive(Debug, Clone)]
pub struct MirrorEntry {
    name: String,
    target: Vec2,
    stroke: Stroke,
    method: UpdateMethod,
    updated_at: DateTime<Utc>,
    motion: MotionInterpolator,
    trail: Trail,
    animator: Animator,
}

impl MirrorEntry {
    /// New entry posed at the record's position, with no tween and no trail.
    fn at_rest(record: &ActorRecord, settings: &MirrorSettings) -> Self {
        let target = Vec2::from_grid(record.position());
        Self {
            name: record.name.clone(),
            target,
            stroke: stroke_of(record),
            method: record.method,
            updated_at: record.updated_at,
            motion: MotionInterpolator::at_rest(target, settings.motion_step),
            trail: Trail::default(),
            animator: Animator::new(settings.layout, settings.ticks_per_frame),
        }
    }

    /// Take the record's fields. Returns `false` and changes nothing when
    /// the record is older than what the entry already holds.
    fn merge(&mut self, record: &ActorRecord) -> bool {
        if record.updated_at < self.updated_at {
            return false;
        }
        self.name.clone_from(&record.name);
        self.target = Vec2::from_grid(record.position());
        self.stroke = stroke_of(record);
        self.method = record.method;
        self.updated_at = record.updated_at;
        true
    }

    fn steer(&mut self) {
        if let Some(abandoned) = self.motion.set_target(self.target, self.stroke) {
            self.trail.commit(abandoned);
        }
        if self.motion.is_moving() {
            self.animator.play();
        }
    }

    fn tick(&mut self) {
        if let Some(finished) = self.motion.tick() {
            self.trail.commit(finished);
        }
        if !self.motion.is_moving() {
            self.animator.pause();
        }
        self.animator.tick();
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last known target position.
    pub const fn target(&self) -> Vec2 {
        self.target
    }

    /// Current line style.
    pub const fn stroke(&self) -> Stroke {
        self.stroke
    }

    /// Origin method of the last update.
    pub const fn method(&self) -> UpdateMethod {
        self.method
    }

    /// Server timestamp of the newest record merged so far.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Icon drawn above the sprite.
    pub const fn status_icon(&self) -> &'static str {
        status_icon(self.method)
    }

    /// Motion state.
    pub const fn motion(&self) -> &MotionInterpolator {
        &self.motion
    }

    /// Committed segments.
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Walk-cycle state.
    pub const fn animator(&self) -> &Animator {
        &self.animator
    }
}

fn stroke_of(record: &ActorRecord) -> Stroke {
    Stroke {
        color: record.color(),
        weight: record.w,
    }
}

/// All mirrored actors, keyed by identity.
#[derive(Debug, Clone)]
pub struct ClientMirror {
    entries: BTreeMap<ActorId, MirrorEntry>,
    settings: MirrorSettings,
}

impl ClientMirror {
    /// An empty mirror.
    pub const fn new(settings: MirrorSettings) -> Self {
        Self {
            entries: BTreeMap::new(),
            settings,
        }
    }

    /// Merge a snapshot.
    ///
    /// Unseen identities start at rest on their received position. Known
    /// identities keep their motion, trail and animation; their new
    /// position is fed to the interpolator like a push event. Records
    /// older than the entry's last merge are ignored, so a snapshot taken
    /// before a push already applied cannot move the actor back.
    pub fn bootstrap<'a>(&mut self, records: impl IntoIterator<Item = &'a ActorRecord>) {
        for record in records {
            self.on_push_event(record);
        }
    }

    /// Merge one pushed record and steer its actor towards the new position.
    ///
    /// A record older than the entry's last merge is ignored.
    pub fn on_push_event(&mut self, record: &ActorRecord) {
        if let Some(entry) = self.entries.get_mut(&record.client_ip) {
            if entry.merge(record) {
                entry.steer();
            }
        } else {
            self.entries.insert(
                record.client_ip.clone(),
                MirrorEntry::at_rest(record, &self.settings),
            );
        }
    }

    /// Drop every entry's trail. Identities, poses and motion are kept.
    pub fn clear_trails(&mut self) {
        for entry in self.entries.values_mut() {
            entry.trail.clear();
        }
    }

    /// Advance every entry's motion and animation by one render tick.
    pub fn tick(&mut self) {
        for entry in self.entries.values_mut() {
            entry.tick();
        }
    }

    /// Look up one actor.
    pub fn get(&self, id: &ActorId) -> Option<&MirrorEntry> {
        self.entries.get(id)
    }

    /// Entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &MirrorEntry)> {
        self.entries.iter()
    }

    /// Number of mirrored actors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no actor has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently walking a leg.
    pub fn moving_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.motion.is_moving())
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turtle_types::Rgb;

    use super::*;
    use crate::motion::MotionState;

    fn settings() -> MirrorSettings {
        MirrorSettings {
            motion_step: 0.02,
            layout: SpriteLayout::new(4, 4).unwrap(),
            ticks_per_frame: 1,
        }
    }

    fn record(ip: &str, x: i32, y: i32) -> ActorRecord {
        let mut r = ActorRecord::new(ActorId::new(ip), Utc::now());
        r.x = x;
        r.y = y;
        r
    }

    fn run_ticks(mirror: &mut ClientMirror, n: usize) {
        for _ in 0..n {
            mirror.tick();
        }
    }

    #[test]
    fn first_sighting_is_a_pose_not_a_tween() {
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 300, 200));

        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert_eq!(entry.motion().state(), MotionState::Idle);
        assert!(entry.motion().position().approx_eq(Vec2::new(300.0, 200.0)));
        assert!(entry.trail().is_empty());

        run_ticks(&mut mirror, 100);
        assert!(mirror.get(&ActorId::new("10.0.0.1")).unwrap().trail().is_empty());
    }

    #[test]
    fn push_moves_and_commits_one_segment() {
        let mut mirror = ClientMirror::new(settings());
        mirror.bootstrap(&[record("10.0.0.1", 0, 0)]);
        mirror.on_push_event(&record("10.0.0.1", 100, 0));

        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert!(entry.motion().is_moving());
        assert!(!entry.animator().is_paused());

        run_ticks(&mut mirror, 200);

        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert!(entry.motion().position().approx_eq(Vec2::new(100.0, 0.0)));
        assert_eq!(entry.trail().len(), 1);
        assert!(entry.animator().is_paused());
    }

    #[test]
    fn repeated_position_is_a_no_op() {
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 5, 5));
        mirror.on_push_event(&record("10.0.0.1", 5, 5));

        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert_eq!(entry.motion().state(), MotionState::Idle);
        assert!(entry.animator().is_paused());
        assert!(entry.trail().is_empty());
    }

    #[test]
    fn static_fields_follow_latest_record() {
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 0, 0));

        let mut update = record("10.0.0.1", 0, 0);
        update.name = "Speedy".to_owned();
        update.r = 10;
        update.g = 20;
        update.b = 30;
        update.w = 7;
        update.method = UpdateMethod::Post;
        mirror.on_push_event(&update);

        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert_eq!(entry.name(), "Speedy");
        assert_eq!(entry.stroke().color, Rgb::new(10, 20, 30));
        assert_eq!(entry.stroke().weight, 7);
        assert_eq!(entry.status_icon(), "\u{1F451}");
    }

    #[test]
    fn bootstrap_keeps_existing_trails() {
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 0, 0));
        mirror.on_push_event(&record("10.0.0.1", 0, 50));
        run_ticks(&mut mirror, 200);

        mirror.bootstrap(&[record("10.0.0.1", 0, 50), record("10.0.0.2", 9, 9)]);

        assert_eq!(mirror.len(), 2);
        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert_eq!(entry.trail().len(), 1);
        assert_eq!(entry.motion().state(), MotionState::Idle);
    }

    #[test]
    fn clear_trails_keeps_identities() {
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 0, 0));
        mirror.on_push_event(&record("10.0.0.1", 80, 0));
        run_ticks(&mut mirror, 200);

        mirror.clear_trails();

        assert_eq!(mirror.len(), 1);
        let entry = mirror.get(&ActorId::new("10.0.0.1")).unwrap();
        assert!(entry.trail().is_empty());
        assert!(entry.motion().position().approx_eq(Vec2::new(80.0, 0.0)));
    }

    #[test]
    fn retarget_commits_rendered_position_and_keeps_walking() {
        let id = ActorId::new("10.0.0.1");
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&record("10.0.0.1", 0, 0));
        mirror.on_push_event(&record("10.0.0.1", 100, 0));
        run_ticks(&mut mirror, 25);
        assert!(
            mirror
                .get(&id)
                .unwrap()
                .motion()
                .position()
                .approx_eq(Vec2::new(50.0, 0.0))
        );

        mirror.on_push_event(&record("10.0.0.1", 50, 100));

        let entry = mirror.get(&id).unwrap();
        let segments = entry.trail().segments();
        assert_eq!(segments.len(), 1);
        let first = segments.first().unwrap();
        assert!(first.from.approx_eq(Vec2::ZERO));
        assert!(first.to.approx_eq(Vec2::new(50.0, 0.0)));
        assert!(entry.motion().leg_start().approx_eq(Vec2::new(50.0, 0.0)));
        assert!(entry.motion().is_moving());
        assert!(!entry.animator().is_paused());

        run_ticks(&mut mirror, 60);

        let entry = mirror.get(&id).unwrap();
        assert_eq!(entry.motion().state(), MotionState::Idle);
        assert_eq!(entry.trail().len(), 2);
        assert!(entry.animator().is_paused());
        let held = entry.animator().frame();

        run_ticks(&mut mirror, 10);

        assert_eq!(mirror.get(&id).unwrap().animator().frame(), held);
    }

    #[test]
    fn stale_records_are_ignored() {
        let id = ActorId::new("10.0.0.1");
        let at = |secs: i64, x: i32| {
            let mut r = record("10.0.0.1", x, 0);
            r.updated_at = DateTime::from_timestamp(secs, 0).unwrap();
            r
        };
        let mut mirror = ClientMirror::new(settings());
        mirror.on_push_event(&at(100, 0));
        mirror.on_push_event(&at(200, 40));

        mirror.bootstrap(&[at(150, 10)]);

        let entry = mirror.get(&id).unwrap();
        assert!(entry.target().approx_eq(Vec2::new(40.0, 0.0)));
        assert!(entry.motion().leg_end().approx_eq(Vec2::new(40.0, 0.0)));
        assert!(entry.trail().is_empty());

        mirror.bootstrap(&[at(300, 70)]);

        let entry = mirror.get(&id).unwrap();
        assert!(entry.target().approx_eq(Vec2::new(70.0, 0.0)));
        assert_eq!(entry.updated_at(), DateTime::from_timestamp(300, 0).unwrap());
    }

    #[test]
    fn get_requests_have_no_icon() {
        assert_eq!(status_icon(UpdateMethod::Get), "");
        assert!(!status_icon(UpdateMethod::Post).is_empty());
    }
}
