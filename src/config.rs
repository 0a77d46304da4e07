// Compile-time tuning for the camera, scene layout and particles.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub k_min: f64,
    pub k_max: f64,
    /// Multiplicative wheel steps.
    pub zoom_in_step: f64,
    pub zoom_out_step: f64,
    pub smooth_near: f64,
    pub smooth_far: f64,
    /// Positional distance (px) above which `smooth_far` is used.
    pub far_threshold: f64,
    pub position_epsilon: f64,
    pub scale_epsilon: f64,
    /// How far (ms) the release velocity is projected.
    pub inertia_ms: f64,
    /// A velocity sample older than this at release counts as zero.
    pub velocity_stale_ms: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            k_min: 0.5,
            k_max: 3.0,
            zoom_in_step: 1.2,
            zoom_out_step: 0.8,
            smooth_near: 0.15,
            smooth_far: 0.08,
            far_threshold: 240.0,
            position_epsilon: 0.1,
            scale_epsilon: 0.001,
            inertia_ms: 120.0,
            velocity_stale_ms: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub per_connector: usize,
    pub travel_ms: f64,
    pub fade_out_ms: f64,
    pub pause_ms: f64,
    pub max_opacity: f64,
    pub radius: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            per_connector: 3,
            travel_ms: 1800.0,
            fade_out_ms: 300.0,
            pause_ms: 600.0,
            max_opacity: 0.9,
            radius: 2.5,
        }
    }
}

impl ParticleConfig {
    pub fn period_ms(&self) -> f64 {
        self.travel_ms + self.fade_out_ms + self.pause_ms
    }

    /// Start offset between consecutive particles on one connector.
    pub fn stagger_ms(&self) -> f64 {
        if self.per_connector == 0 {
            0.0
        } else {
            self.travel_ms / self.per_connector as f64
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub fallback_width: f64,
    pub fallback_height: f64,
    pub child_radius: f64,
    pub parent_radius: f64,
    pub particles: ParticleConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fallback_width: 800.0,
            fallback_height: 600.0,
            child_radius: 20.0,
            parent_radius: 10.0,
            particles: ParticleConfig::default(),
        }
    }
}
