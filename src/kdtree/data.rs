//! K-d data entry: one triangle's world-space copy plus its surfel,
//! owned by the tree, referencing its parent object by index (arena +
//! index, not a raw pointer — see DESIGN.md's Open Question decisions).

use crate::geometry::Aabb;
use crate::surfel::Surfel;
use crate::vec3::Vec3;

#[derive(Debug, Clone)]
pub struct KdDataEntry {
    pub object_index: usize,
    pub triangle_index: usize,
    pub world_vertices: [Vec3; 3],
    pub world_normals: [Vec3; 3],
    pub surfel: Surfel,
}

impl KdDataEntry {
    pub fn new(
        object_index: usize,
        triangle_index: usize,
        world_vertices: [Vec3; 3],
        world_normals: [Vec3; 3],
        surfel: Surfel,
    ) -> Self {
        KdDataEntry { object_index, triangle_index, world_vertices, world_normals, surfel }
    }

    fn axis(v: Vec3, axis: usize) -> f32 {
        match axis {
            0 => v.x,
            1 => v.y,
            _ => v.z,
        }
    }

    /// Conservative separating-axis-on-AABB-faces test. Returns
    /// `(intersects, contained)`: `contained` iff all three vertices lie
    /// within `aabb`; `intersects` iff contained, or it is not the case
    /// that all three vertices lie strictly outside the box on the same
    /// side of the same axis.
    pub fn intersects(&self, aabb: &Aabb) -> (bool, bool) {
        let contained = self.world_vertices.iter().all(|v| aabb.contains(*v));
        if contained {
            return (true, true);
        }
        for axis in 0..3 {
            let min = Self::axis(aabb.min, axis);
            let max = Self::axis(aabb.max, axis);
            let all_below = self.world_vertices.iter().all(|v| Self::axis(*v, axis) < min);
            let all_above = self.world_vertices.iter().all(|v| Self::axis(*v, axis) > max);
            if all_below || all_above {
                return (false, false);
            }
        }
        (true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Triangle, Vertex};
    use crate::material::Material;

    fn entry(verts: [Vec3; 3]) -> KdDataEntry {
        let vertices: Vec<Vertex> = verts.iter().map(|&p| Vertex::new(p, Vec3::Z)).collect();
        let tri = Triangle::new(0, 1, 2);
        let surfel = Surfel::build_from_triangle(&tri, &vertices, Material::default());
        KdDataEntry::new(0, 0, verts, [Vec3::Z; 3], surfel)
    }

    #[test]
    fn entry_fully_inside_box_is_contained() {
        let e = entry([Vec3::new(0.1, 0.1, 0.0), Vec3::new(0.2, 0.1, 0.0), Vec3::new(0.1, 0.2, 0.0)]);
        let aabb = Aabb { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let (intersects, contained) = e.intersects(&aabb);
        assert!(intersects && contained);
    }

    #[test]
    fn entry_fully_beyond_box_on_one_axis_misses() {
        let e = entry([Vec3::new(5.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 0.0)]);
        let aabb = Aabb { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let (intersects, contained) = e.intersects(&aabb);
        assert!(!intersects && !contained);
    }
}
