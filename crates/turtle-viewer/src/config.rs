//! Configuration for the viewer.
//!
//! All configuration is loaded from environment variables, each optional.

use std::str::FromStr;
use std::time::Duration;

use crate::animator::{DEFAULT_ANIMATION_FPS, SpriteLayout, ticks_per_frame};
use crate::error::ViewerError;
use crate::mirror::MirrorSettings;
use crate::motion::DEFAULT_MOTION_STEP;

/// Complete viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Base URL of the turtle server (e.g. `http://localhost:8008`).
    pub server_url: String,
    /// Render ticks per second.
    pub tick_rate: u32,
    /// Leg progress added per render tick, in `(0, 1]`.
    pub motion_step: f64,
    /// Walk-cycle frames per second.
    pub animation_fps: u32,
    /// Sprite sheet file name carrying the `@X<cols>N<frames>` marker.
    pub sprite: String,
    /// Pause before reopening a dropped event stream.
    pub reconnect_delay: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8008".to_owned(),
            tick_rate: 60,
            motion_step: DEFAULT_MOTION_STEP,
            animation_fps: DEFAULT_ANIMATION_FPS,
            sprite: "turtle@X4N4.png".to_owned(),
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `TURTLE_SERVER_URL` -- server base URL (default `http://localhost:8008`)
    /// - `VIEWER_TICK_RATE` -- render ticks per second (default 60)
    /// - `VIEWER_MOTION_STEP` -- leg progress per tick (default 0.02)
    /// - `VIEWER_ANIMATION_FPS` -- walk-cycle frame rate (default 8)
    /// - `VIEWER_SPRITE` -- sprite sheet file name (default `turtle@X4N4.png`)
    /// - `VIEWER_RECONNECT_SECS` -- delay before reopening the event stream (default 3)
    pub fn from_env() -> Result<Self, ViewerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ViewerError> {
        let defaults = Self::default();

        let server_url = lookup("TURTLE_SERVER_URL")
            .map_or(defaults.server_url, |url| url.trim_end_matches('/').to_owned());
        let tick_rate = parse_or(&lookup, "VIEWER_TICK_RATE", defaults.tick_rate)?;
        let motion_step = parse_or(&lookup, "VIEWER_MOTION_STEP", defaults.motion_step)?;
        let animation_fps = parse_or(&lookup, "VIEWER_ANIMATION_FPS", defaults.animation_fps)?;
        let sprite = lookup("VIEWER_SPRITE").unwrap_or(defaults.sprite);
        let reconnect_secs = parse_or(
            &lookup,
            "VIEWER_RECONNECT_SECS",
            defaults.reconnect_delay.as_secs(),
        )?;

        if tick_rate == 0 {
            return Err(ViewerError::Config(
                "VIEWER_TICK_RATE must be at least 1".to_owned(),
            ));
        }
        if !(motion_step.is_finite() && motion_step > 0.0 && motion_step <= 1.0) {
            return Err(ViewerError::Config(format!(
                "VIEWER_MOTION_STEP must be in (0, 1], got {motion_step}"
            )));
        }
        if animation_fps == 0 {
            return Err(ViewerError::Config(
                "VIEWER_ANIMATION_FPS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            server_url,
            tick_rate,
            motion_step,
            animation_fps,
            sprite,
            reconnect_delay: Duration::from_secs(reconnect_secs),
        })
    }

    /// Wall-clock length of one render tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1)
            .checked_div(self.tick_rate)
            .unwrap_or(Duration::from_secs(1))
    }

    /// Mirror settings derived from this configuration.
    pub fn mirror_settings(&self) -> Result<MirrorSettings, ViewerError> {
        Ok(MirrorSettings {
            motion_step: self.motion_step,
            layout: SpriteLayout::from_file_name(&self.sprite)?,
            ticks_per_frame: ticks_per_frame(self.tick_rate, self.animation_fps),
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ViewerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| ViewerError::Config(format!("invalid {name}: {e}")))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ViewerConfig, ViewerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ViewerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_url, "http://localhost:8008");
        assert_eq!(config.tick_rate, 60);
        assert!((config.motion_step - 0.02).abs() < 1e-12);
        assert_eq!(config.animation_fps, 8);
        assert_eq!(config.sprite, "turtle@X4N4.png");
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));

        let settings = config.mirror_settings().unwrap();
        assert_eq!(settings.ticks_per_frame, 8);
        assert_eq!(settings.layout.frames(), 4);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("TURTLE_SERVER_URL", "http://turtles.local:9000/"),
            ("VIEWER_TICK_RATE", "30"),
            ("VIEWER_MOTION_STEP", "0.05"),
            ("VIEWER_ANIMATION_FPS", "10"),
            ("VIEWER_SPRITE", "crab@X2N6.png"),
        ])
        .unwrap();

        assert_eq!(config.server_url, "http://turtles.local:9000");
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.mirror_settings().unwrap().ticks_per_frame, 3);
        assert_eq!(config.mirror_settings().unwrap().layout.rows(), 3);
        assert_eq!(config.tick_interval(), Duration::from_secs(1).checked_div(30).unwrap());
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            [("VIEWER_TICK_RATE", "fast")],
            [("VIEWER_TICK_RATE", "0")],
            [("VIEWER_MOTION_STEP", "0")],
            [("VIEWER_MOTION_STEP", "1.5")],
            [("VIEWER_ANIMATION_FPS", "0")],
        ] {
            assert!(
                matches!(load(&vars), Err(ViewerError::Config(_))),
                "{vars:?} should be rejected"
            );
        }
    }

    #[test]
    fn bad_sprite_name_surfaces_when_building_settings() {
        let config = load(&[("VIEWER_SPRITE", "turtle.png")]).unwrap();
        assert!(matches!(config.mirror_settings(), Err(ViewerError::Sprite(_))));
    }
}
