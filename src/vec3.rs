//! Vector math. Thin wrapper over `glam::Vec3` carrying the extra
//! vocabulary the renderer needs (polar conversion, orthogonal axes,
//! projection) that glam doesn't provide directly.

/// A point or direction in 3-D space, single precision.
pub type Vec3 = glam::Vec3;

/// Extension methods used throughout the renderer but not provided by glam.
pub trait Vec3Ext {
    /// Projects `self` onto `onto`. Returns the zero vector if `onto` is
    /// degenerate (zero length).
    fn project_onto_vec(self, onto: Vec3) -> Vec3;

    /// Builds two vectors orthogonal to `self` and to each other, following
    /// the axis-of-least-component construction used for the ambient
    /// occlusion frame and light-disc sampling.
    fn two_orthogonals(self) -> (Vec3, Vec3);

    /// Converts to polar coordinates `(radius, theta, phi)`, with `theta`
    /// the azimuth in `[0, 2*PI)` and `phi` the polar angle from +Z.
    fn to_polar(self) -> (f32, f32, f32);

    /// Builds a Cartesian vector from polar coordinates `(radius, theta, phi)`.
    fn from_polar(r: f32, theta: f32, phi: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn project_onto_vec(self, onto: Vec3) -> Vec3 {
        let len_sq = onto.length_squared();
        if len_sq <= f32::EPSILON {
            return Vec3::ZERO;
        }
        onto * (self.dot(onto) / len_sq)
    }

    fn two_orthogonals(self) -> (Vec3, Vec3) {
        // Pick the coordinate axis along which `self` has the smallest
        // component, so the cross product below can't degenerate.
        let axis = if self.x < self.y && self.x < self.z {
            Vec3::X
        } else if self.y < self.z {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let x = self.cross(axis);
        let y = self.cross(x);
        (x, y)
    }

    fn to_polar(self) -> (f32, f32, f32) {
        let r = self.length();
        if r <= f32::EPSILON {
            return (0.0, 0.0, 0.0);
        }
        let theta = self.y.atan2(self.x);
        let theta = if theta < 0.0 {
            theta + 2.0 * std::f32::consts::PI
        } else {
            theta
        };
        let phi = (self.z / r).clamp(-1.0, 1.0).acos();
        (r, theta, phi)
    }

    fn from_polar(r: f32, theta: f32, phi: f32) -> Vec3 {
        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    }
}

/// Clamps each component of `v` into `[lo, hi]`.
pub fn clamp_components(v: Vec3, lo: f32, hi: f32) -> Vec3 {
    v.clamp(Vec3::splat(lo), Vec3::splat(hi))
}

/// Blend helper used by colour accumulation; kept here rather than on
/// `Color` since it operates on raw `Vec3` triples during shading math.
pub fn mul_elementwise(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x * b.x, a.y * b.y, a.z * b.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_onto_axis() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let p = v.project_onto_vec(Vec3::X);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn project_onto_zero_is_zero() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.project_onto_vec(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn two_orthogonals_are_perpendicular() {
        let n = Vec3::new(0.2, 0.9, 0.1).normalize();
        let (x, y) = n.two_orthogonals();
        assert!(x.dot(n).abs() < 1e-4);
        assert!(y.dot(n).abs() < 1e-4);
        assert!(x.dot(y).abs() < 1e-3);
    }

    #[test]
    fn polar_roundtrip() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let (r, theta, phi) = v.to_polar();
        let back = Vec3::from_polar(r, theta, phi);
        assert!((v - back).length() < 1e-4);
    }
}
