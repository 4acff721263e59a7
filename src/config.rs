//! Tunable constants. Defaults are compiled in; a JSON object stored under
//! [`CONFIG_KEY`] overrides any subset of them.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::state::storage::{KeyValueStore, read_json};

pub const CONFIG_KEY: &str = "cd_config";

/// Upper bounds for overrides; each toggle is a scheduled timer.
pub const MAX_TOGGLES: u32 = 1000;
pub const MAX_DURATION_MS: u32 = 60_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipConfig {
    pub min_toggles: u32,
    pub max_toggles: u32,
    pub min_duration_ms: u32,
    pub max_duration_ms: u32,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            min_toggles: 15,
            max_toggles: 30,
            min_duration_ms: 1500,
            max_duration_ms: 1500,
        }
    }
}

impl FlipConfig {
    /// Swaps inverted bounds and clamps toggles to `1..=MAX_TOGGLES` and
    /// durations to `1..=MAX_DURATION_MS`.
    pub fn normalized(&self) -> Self {
        let toggles = |n: u32| n.clamp(1, MAX_TOGGLES);
        let duration = |ms: u32| ms.clamp(1, MAX_DURATION_MS);
        let (min_t, max_t) = ordered(toggles(self.min_toggles), toggles(self.max_toggles));
        let (min_d, max_d) = ordered(duration(self.min_duration_ms), duration(self.max_duration_ms));
        Self {
            min_toggles: min_t,
            max_toggles: max_t,
            min_duration_ms: min_d,
            max_duration_ms: max_d,
        }
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub max_scale: f64,
    /// Committed angles smaller than this snap back to 0.
    pub rotation_snap_rad: f64,
    /// Rotation needed before the tutorial counts it.
    pub rotate_signal_rad: f64,
    pub double_tap_window_ms: f64,
    pub tap_max_ms: f64,
    pub tap_slop_px: f64,
    pub swipe_threshold_px: f64,
    /// Scale factor per wheel notch (100 px of delta).
    pub wheel_zoom_step: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_scale: 8.0,
            rotation_snap_rad: 0.01,
            rotate_signal_rad: 0.2,
            double_tap_window_ms: 250.0,
            tap_max_ms: 400.0,
            tap_slop_px: 10.0,
            swipe_threshold_px: 80.0,
            wheel_zoom_step: 1.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub flip: FlipConfig,
    pub gesture: GestureConfig,
    pub toast_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            flip: FlipConfig::default(),
            gesture: GestureConfig::default(),
            toast_ms: 2500,
        }
    }
}

impl AppConfig {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match read_json::<AppConfig>(store, CONFIG_KEY) {
            Some(mut cfg) => {
                info!("using config override from {CONFIG_KEY}");
                cfg.flip = cfg.flip.normalized();
                if cfg.gesture.max_scale < 1.0 {
                    warn!("max_scale {} below 1, using default", cfg.gesture.max_scale);
                    cfg.gesture.max_scale = GestureConfig::default().max_scale;
                }
                cfg
            }
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemoryStore;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let store = MemoryStore::new().with_item(
            CONFIG_KEY,
            r#"{"flip":{"min_duration_ms":1000},"toast_ms":900}"#,
        );
        let cfg = AppConfig::load(&store);
        assert_eq!(cfg.flip.min_duration_ms, 1000);
        assert_eq!(cfg.flip.max_duration_ms, 1500);
        assert_eq!(cfg.flip.max_toggles, 30);
        assert_eq!(cfg.toast_ms, 900);
        assert_eq!(cfg.gesture, GestureConfig::default());
    }

    #[test]
    fn inverted_ranges_are_repaired() {
        let store = MemoryStore::new().with_item(
            CONFIG_KEY,
            r#"{"flip":{"min_toggles":40,"max_toggles":10,"min_duration_ms":0}}"#,
        );
        let cfg = AppConfig::load(&store);
        assert_eq!((cfg.flip.min_toggles, cfg.flip.max_toggles), (10, 40));
        assert_eq!(cfg.flip.min_duration_ms, 1);
    }

    #[test]
    fn huge_overrides_are_capped() {
        let store = MemoryStore::new().with_item(
            CONFIG_KEY,
            r#"{"flip":{"min_toggles":0,"max_toggles":4294967295,"max_duration_ms":4294967295}}"#,
        );
        let cfg = AppConfig::load(&store);
        assert_eq!((cfg.flip.min_toggles, cfg.flip.max_toggles), (1, MAX_TOGGLES));
        assert_eq!(cfg.flip.max_duration_ms, MAX_DURATION_MS);
    }

    #[test]
    fn garbage_override_falls_back_to_defaults() {
        let store = MemoryStore::new().with_item(CONFIG_KEY, "nope");
        assert_eq!(AppConfig::load(&store), AppConfig::default());
    }
}
