//! Geometry primitives: vertex, triangle, axis-aligned bounding box, ray,
//! and the two intersection routines (ray-AABB, ray-triangle) everything
//! else in the crate is built on top of.

use crate::vec3::Vec3;

/// Small positive constant used for parallel-ray rejection in
/// ray-triangle intersection and reused by the k-d tree's self-
/// intersection avoidance. The reference implementation uses a
/// near-denormal value here; this crate follows the spec's own guidance
/// to prefer an ordinary small constant.
pub const EPSILON: f32 = 1e-5;

/// Position + normal. Mutable so tessellation (§4.B) can average normals
/// when inserting a midpoint vertex.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Vertex { position, normal }
    }
}

/// Three indices into a vertex list.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Triangle { indices: [a, b, c] }
    }

    fn verts<'a>(&self, vertices: &'a [Vertex]) -> (&'a Vertex, &'a Vertex, &'a Vertex) {
        (
            &vertices[self.indices[0]],
            &vertices[self.indices[1]],
            &vertices[self.indices[2]],
        )
    }

    pub fn area(&self, vertices: &[Vertex]) -> f32 {
        let (a, b, c) = self.verts(vertices);
        0.5 * (b.position - a.position).cross(c.position - a.position).length()
    }

    pub fn barycenter(&self, vertices: &[Vertex]) -> Vec3 {
        let (a, b, c) = self.verts(vertices);
        (a.position + b.position + c.position) / 3.0
    }

    /// Edge lengths opposite each vertex, in index order: `[|bc|, |ac|, |ab|]`.
    pub fn edge_lengths(&self, vertices: &[Vertex]) -> [f32; 3] {
        let (a, b, c) = self.verts(vertices);
        [
            (c.position - b.position).length(),
            (c.position - a.position).length(),
            (b.position - a.position).length(),
        ]
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that becomes a real bound after the first `extend_to_point`.
    pub fn empty() -> Self {
        Aabb {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn extend_to_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn extend_to_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }
}

/// A half-line `origin + t * direction`, `t >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab method with quadrant classification (Woo et al.). Returns the
    /// intersection point, or `None` on a miss. If the origin is inside
    /// the box on all three axes, the hit point is the origin exactly.
    pub fn intersect_aabb(&self, b: &Aabb) -> Option<Vec3> {
        const LEFT: u8 = 0;
        const RIGHT: u8 = 1;
        const MIDDLE: u8 = 2;

        let origin = [self.origin.x, self.origin.y, self.origin.z];
        let dir = [self.direction.x, self.direction.y, self.direction.z];
        let min = [b.min.x, b.min.y, b.min.z];
        let max = [b.max.x, b.max.y, b.max.z];

        let mut quadrant = [MIDDLE; 3];
        let mut candidate_plane = [0f32; 3];
        let mut inside = true;

        for i in 0..3 {
            if origin[i] < min[i] {
                quadrant[i] = LEFT;
                candidate_plane[i] = min[i];
                inside = false;
            } else if origin[i] > max[i] {
                quadrant[i] = RIGHT;
                candidate_plane[i] = max[i];
                inside = false;
            }
        }

        if inside {
            return Some(self.origin);
        }

        let mut max_t = [-1f32; 3];
        for i in 0..3 {
            if quadrant[i] != MIDDLE && dir[i] != 0.0 {
                max_t[i] = (candidate_plane[i] - origin[i]) / dir[i];
            }
        }

        let mut which_plane = 0;
        for i in 1..3 {
            if max_t[which_plane] < max_t[i] {
                which_plane = i;
            }
        }
        if max_t[which_plane] < 0.0 {
            return None;
        }

        let mut coord = [0f32; 3];
        for i in 0..3 {
            if which_plane == i {
                coord[i] = candidate_plane[i];
            } else {
                coord[i] = origin[i] + max_t[which_plane] * dir[i];
                if coord[i] < min[i] || coord[i] > max[i] {
                    return None;
                }
            }
        }
        Some(Vec3::new(coord[0], coord[1], coord[2]))
    }
}

/// Result of a ray-triangle hit: parameter along the ray plus barycentric
/// `(u, v)`; the third weight is `1 - u - v`.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Möller-Trumbore intersection. No back-face cull here by design: the
/// sign test happens one layer up, at the k-d leaf, against the
/// interpolated normal.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = ray.direction.cross(e2);
    let det = e1.dot(p);
    if det < EPSILON && det > -EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let t_vec = ray.origin - v0;
    let u = t_vec.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = t_vec.cross(e1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    Some(TriangleHit { t, u, v })
}
