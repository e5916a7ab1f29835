//! Pinhole camera: position plus a forward/up/right basis, field of view
//! and aspect ratio. Primary ray generation follows §4.F's formula
//! exactly (this crate's core never models a lens or depth of field at
//! the camera itself — that's the separate post-filter in §4.H).

use crate::geometry::Ray;
use crate::vec3::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub field_of_view: f32,
    pub aspect_ratio: f32,
}

impl Camera {
    pub fn new(position: Vec3, look_at: Vec3, world_up: Vec3, field_of_view: f32, aspect_ratio: f32) -> Self {
        let forward = (look_at - position).normalize_or_zero();
        let right = forward.cross(world_up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        Camera { position, forward, up, right, field_of_view, aspect_ratio }
    }

    /// Builds the primary ray for pixel `(i, j)` of a `width x height`
    /// frame, jittered by sub-pixel offset `(ox, oy)` in `[0, 1)`. Follows
    /// §4.F's formula verbatim: `tan(fov)`, not `tan(fov / 2)`.
    pub fn primary_ray(&self, i: u32, j: u32, ox: f32, oy: f32, width: u32, height: u32) -> Ray {
        let w = width as f32;
        let h = height as f32;
        let fov_tan = self.field_of_view.tan();

        let x_term = ((i as f32 + ox - w / 2.0) / w) * fov_tan * self.aspect_ratio;
        let y_term = ((j as f32 + oy - h / 2.0) / h) * fov_tan;

        let direction = (self.forward + self.right * x_term + self.up * y_term).normalize_or_zero();
        Ray::new(self.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_straight_ahead() {
        let cam = Camera::new(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::ZERO,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            1.0,
        );
        let ray = cam.primary_ray(32, 32, 0.5, 0.5, 64, 64);
        assert!((ray.direction - cam.forward).length() < 1e-3);
    }

    #[test]
    fn basis_is_orthonormal() {
        let cam = Camera::new(Vec3::new(1.0, 2.0, -5.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 1.2, 16.0 / 9.0);
        assert!((cam.forward.length() - 1.0).abs() < 1e-4);
        assert!(cam.forward.dot(cam.right).abs() < 1e-4);
        assert!(cam.forward.dot(cam.up).abs() < 1e-4);
        assert!(cam.right.dot(cam.up).abs() < 1e-4);
    }
}
