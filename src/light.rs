//! Point light with optional disc-sampled area-light approximation.

use rand::Rng;

use crate::color::Color;
use crate::vec3::{Vec3, Vec3Ext};

#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

/// One sample drawn from a light's emitting surface: a position plus the
/// fraction of the light's total intensity it carries.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Color, intensity: f32) -> Self {
        Light { position, color, intensity }
    }

    /// A single sample at the light's exact position, intensity unsplit.
    /// Used when soft shadows are disabled (hard-shadow or no-shadow
    /// visibility test).
    pub fn point_sample(&self) -> LightSample {
        LightSample { position: self.position, color: self.color, intensity: self.intensity }
    }

    /// Emits `n` samples uniformly over a disc of `radius`, oriented
    /// perpendicular to `normal`, each carrying `intensity / n`.
    pub fn disc_samples(&self, normal: Vec3, radius: f32, n: usize, rng: &mut impl Rng) -> Vec<LightSample> {
        if n == 0 {
            return Vec::new();
        }
        let (x_axis, y_axis) = normal.two_orthogonals();
        let x_axis = x_axis.normalize_or_zero();
        let y_axis = y_axis.normalize_or_zero();
        let per_sample_intensity = self.intensity / n as f32;

        (0..n)
            .map(|_| {
                let r = radius * rng.gen::<f32>().sqrt();
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let offset = x_axis * (r * theta.cos()) + y_axis * (r * theta.sin());
                LightSample {
                    position: self.position + offset,
                    color: self.color,
                    intensity: per_sample_intensity,
                }
            })
            .collect()
    }
}
