//! Surfel: an inscribed-circle disc approximation of a triangle, used by
//! the k-d tree's point-based `IntersectSurfel` query.

use crate::color::Color;
use crate::geometry::{Ray, Triangle, Vertex};
use crate::material::Material;
use crate::vec3::Vec3;

/// Disc approximation of a triangle. A point `q` lies in the surfel iff
/// `|q - p| <= r` — a radial test only; the normal's plane is used for
/// ray intersection.
#[derive(Debug, Clone, Copy)]
pub struct Surfel {
    pub radius: f32,
    pub position: Vec3,
    pub normal: Vec3,
    pub material: Material,
    pub accumulated_color: Color,
}

impl Surfel {
    /// Builds the surfel for `triangle`, whose vertex positions are
    /// already in world space (translation pre-applied by the caller).
    pub fn build_from_triangle(
        triangle: &Triangle,
        world_vertices: &[Vertex],
        material: Material,
    ) -> Self {
        let a = world_vertices[triangle.indices[0]];
        let b = world_vertices[triangle.indices[1]];
        let c = world_vertices[triangle.indices[2]];

        let len_a = (c.position - b.position).length();
        let len_b = (c.position - a.position).length();
        let len_c = (b.position - a.position).length();
        let perimeter = len_a + len_b + len_c;

        let area = 0.5 * (b.position - a.position).cross(c.position - a.position).length();
        let semi_perimeter = perimeter * 0.5;
        let radius = if semi_perimeter > f32::EPSILON {
            area / semi_perimeter
        } else {
            0.0
        };

        let position = if perimeter > f32::EPSILON {
            (a.position * len_a + b.position * len_b + c.position * len_c) / perimeter
        } else {
            (a.position + b.position + c.position) / 3.0
        };
        let normal = if perimeter > f32::EPSILON {
            (a.normal * len_a + b.normal * len_b + c.normal * len_c) / perimeter
        } else {
            (a.normal + b.normal + c.normal) / 3.0
        }
        .normalize_or_zero();

        Surfel {
            radius,
            position,
            normal,
            material,
            accumulated_color: Color::BLACK,
        }
    }

    /// Solves for the ray-plane intersection through `position` with
    /// `normal`, then checks the resulting point against the inscribed
    /// disc radius.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.position - ray.origin).dot(self.normal) / denom;
        if t < 0.0 {
            return None;
        }
        let p = ray.at(t);
        if (p - self.position).length() <= self.radius {
            Some(t)
        } else {
            None
        }
    }

    pub fn contains(&self, q: Vec3) -> bool {
        (q - self.position).length() <= self.radius
    }
}
