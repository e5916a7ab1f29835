//! Mesh: an ordered vertex/triangle soup, with tessellation to cap
//! per-triangle area (§4.B).

use std::collections::VecDeque;

use crate::geometry::{Triangle, Vertex};
use crate::vec3::Vec3;

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<Triangle>) -> Self {
        Mesh { vertices, triangles }
    }

    /// Recomputes per-vertex normals as the (unnormalized) mean of
    /// adjacent face normals, then normalizes. Used after loading
    /// geometry that carries only face winding, not vertex normals.
    pub fn recompute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in &self.triangles {
            let a = self.vertices[tri.indices[0]].position;
            let b = self.vertices[tri.indices[1]].position;
            let c = self.vertices[tri.indices[2]].position;
            let face_normal = (b - a).cross(c - a);
            for &i in &tri.indices {
                accum[i] += face_normal;
            }
        }
        for (v, n) in self.vertices.iter_mut().zip(accum) {
            v.normal = n.normalize_or_zero();
        }
    }

    /// Produces a new mesh in which every triangle has area strictly
    /// less than `max_area`. Splits each oversized triangle along its
    /// longest edge, inserting a midpoint vertex whose normal is the
    /// average of the edge's two endpoint normals; repeats until the
    /// remainder is below the bound. Terminates because each split
    /// strictly halves the longest edge while area bounds recursion
    /// depth.
    pub fn tessellate(&self, max_area: f32) -> Mesh {
        let mut out_vertices = self.vertices.clone();
        let mut out_triangles = Vec::new();
        let mut queue: VecDeque<Triangle> = VecDeque::new();

        for &tri in &self.triangles {
            if tri.area(&out_vertices) > max_area {
                queue.push_back(tri);
            } else {
                out_triangles.push(tri);
            }
        }

        while let Some(tri) = queue.pop_front() {
            if tri.area(&out_vertices) <= max_area {
                out_triangles.push(tri);
                continue;
            }

            let edge_lengths = tri.edge_lengths(&out_vertices);
            let longest = (0..3)
                .max_by(|&a, &b| edge_lengths[a].partial_cmp(&edge_lengths[b]).unwrap())
                .unwrap();
            let opposite = tri.indices[longest];
            let ea = tri.indices[(longest + 1) % 3];
            let eb = tri.indices[(longest + 2) % 3];

            let va = out_vertices[ea];
            let vb = out_vertices[eb];
            let mid_position = (va.position + vb.position) * 0.5;
            let mid_normal = (va.normal + vb.normal) * 0.5;
            let mid_index = out_vertices.len();
            out_vertices.push(Vertex::new(mid_position, mid_normal));

            queue.push_back(Triangle::new(opposite, ea, mid_index));
            queue.push_back(Triangle::new(opposite, mid_index, eb));
        }

        Mesh::new(out_vertices, out_triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big_triangle() -> Mesh {
        let vertices = vec![
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(4.0, 0.0, 0.0), Vec3::Z),
            Vertex::new(Vec3::new(0.0, 4.0, 0.0), Vec3::Z),
        ];
        Mesh::new(vertices, vec![Triangle::new(0, 1, 2)])
    }

    #[test]
    fn tessellate_caps_area() {
        let mesh = big_triangle();
        let out = mesh.tessellate(1.0);
        for tri in &out.triangles {
            assert!(tri.area(&out.vertices) < 1.0 + 1e-4);
        }
        assert!(out.triangles.len() > 1);
    }

    #[test]
    fn tessellate_noop_when_already_small() {
        let mesh = big_triangle();
        let out = mesh.tessellate(100.0);
        assert_eq!(out.triangles.len(), 1);
    }
}
