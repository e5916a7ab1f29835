//! Object: a mesh placed in world space via translation, carrying a
//! material and an optional precomputed bump field.

use crate::geometry::Aabb;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::vec3::Vec3;

/// Side length of the square bump-sample grid an `Object` may carry.
/// The noise generator that fills such a grid is out of scope for this
/// crate (§1); objects simply carry whatever field the caller supplies.
pub const BUMP_MAP_SIZE: usize = 64;

/// A precomputed `BUMP_MAP_SIZE x BUMP_MAP_SIZE` grid of perturbation
/// vectors, row-major, plus an amplitude in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct BumpMap {
    pub samples: Vec<Vec3>,
    pub amplitude: f32,
}

impl BumpMap {
    pub fn new(samples: Vec<Vec3>, amplitude: f32) -> Self {
        assert_eq!(samples.len(), BUMP_MAP_SIZE * BUMP_MAP_SIZE);
        BumpMap { samples, amplitude: amplitude.clamp(0.0, 1.0) }
    }

    fn sample(&self, u: f32, v: f32) -> Vec3 {
        let x = (u.clamp(0.0, 1.0) * (BUMP_MAP_SIZE - 1) as f32).round() as usize;
        let y = (v.clamp(0.0, 1.0) * (BUMP_MAP_SIZE - 1) as f32).round() as usize;
        self.samples[y * BUMP_MAP_SIZE + x]
    }
}

/// Owned mesh, material, translation, and lazily-maintained world-space
/// AABB. Invariant: `aabb` equals the tight bound of the mesh vertices
/// plus `translation`; `Object::new` establishes it and there is no
/// mutator that would invalidate it afterwards.
#[derive(Debug, Clone)]
pub struct Object {
    pub mesh: Mesh,
    pub material: Material,
    pub translation: Vec3,
    pub aabb: Aabb,
    pub bump: Option<BumpMap>,
}

impl Object {
    pub fn new(mesh: Mesh, material: Material, translation: Vec3, bump: Option<BumpMap>) -> Self {
        let mut aabb = Aabb::empty();
        for v in &mesh.vertices {
            aabb.extend_to_point(v.position + translation);
        }
        Object { mesh, material, translation, aabb, bump }
    }

    pub fn world_vertex_position(&self, index: usize) -> Vec3 {
        self.mesh.vertices[index].position + self.translation
    }

    /// Perturbs `normal` by the bump field at barycentric-ish coordinate
    /// `(u, v)`, or returns it unchanged if the object carries no bump
    /// field.
    pub fn perturb_normal(&self, normal: Vec3, u: f32, v: f32) -> Vec3 {
        match &self.bump {
            None => normal,
            Some(bump) => {
                let offset = bump.sample(u, v) * bump.amplitude;
                (normal + offset).normalize_or_zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Triangle, Vertex};

    #[test]
    fn aabb_matches_translated_vertices() {
        let verts = vec![
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z),
        ];
        let mesh = Mesh::new(verts, vec![Triangle::new(0, 1, 2)]);
        let translation = Vec3::new(5.0, 0.0, 0.0);
        let obj = Object::new(mesh, Material::default(), translation, None);
        assert_eq!(obj.aabb.min, Vec3::new(4.0, -1.0, 0.0));
        assert_eq!(obj.aabb.max, Vec3::new(6.0, 1.0, 0.0));
    }

    #[test]
    fn no_bump_leaves_normal_unchanged() {
        let verts = vec![
            Vertex::new(Vec3::ZERO, Vec3::Z),
            Vertex::new(Vec3::X, Vec3::Z),
            Vertex::new(Vec3::Y, Vec3::Z),
        ];
        let mesh = Mesh::new(verts, vec![Triangle::new(0, 1, 2)]);
        let obj = Object::new(mesh, Material::default(), Vec3::ZERO, None);
        assert_eq!(obj.perturb_normal(Vec3::Z, 0.5, 0.5), Vec3::Z);
    }
}
