//! K-d tree build and query (component C). Build parameters: MaxElems=1,
//! MaxDepth=20. Plane rotation is cyclic X->Y->Z->X, never adaptive —
//! see DESIGN.md's Open Question decisions for why this is preserved
//! even though a SAH or median split would likely reduce query cost.

use std::time::Instant;

use crate::geometry::{intersect_triangle, Aabb, Ray};
use crate::kdtree::data::KdDataEntry;
use crate::kdtree::node::KdNode;
use crate::kdtree::plane::KdPlane;
use crate::object::Object;
use crate::vec3::{Vec3, Vec3Ext};

pub const MAX_ELEMS: usize = 1;
pub const MAX_DEPTH: usize = 20;

/// Hit record: which entry was struck, the world-space point, the
/// interpolated (and possibly bump-perturbed) normal, the ray parameter,
/// and the triangle's barycentric `(u, v)`.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionRecord {
    pub entry_index: usize,
    pub point: Vec3,
    pub normal: Vec3,
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

#[derive(Debug)]
pub struct KdTree {
    pub entries: Vec<KdDataEntry>,
    pub root: KdNode,
    pub max_depth_achieved: usize,
}

impl KdTree {
    pub fn build(entries: Vec<KdDataEntry>) -> Self {
        let start = Instant::now();

        let mut region = Aabb::empty();
        for e in &entries {
            for v in &e.world_vertices {
                region.extend_to_point(*v);
            }
        }

        let indices: Vec<usize> = (0..entries.len()).collect();
        let (root, achieved_depth) = Self::split(&entries, region, 0, KdPlane::X, indices);

        log::info!(
            "kd tree build: {} entries, depth {}, elapsed {:?}",
            entries.len(),
            achieved_depth,
            start.elapsed()
        );

        KdTree { entries, root, max_depth_achieved: achieved_depth }
    }

    /// `Split` from §4.C: `node` here is already designated Middle; this
    /// produces its two children and the achieved depth.
    fn split(
        entries: &[KdDataEntry],
        region: Aabb,
        depth: usize,
        plane: KdPlane,
        indices: Vec<usize>,
    ) -> (KdNode, usize) {
        let center = region.center();
        let normal = plane.normal();

        let left_max = region.max - (region.max - center).project_onto_vec(normal);
        let left_aabb = Aabb { min: region.min, max: left_max };

        let right_min = region.min + (center - region.min).project_onto_vec(normal);
        let right_aabb = Aabb { min: right_min, max: region.max };

        let mut left_indices = Vec::new();
        let mut right_indices = Vec::new();
        for &i in &indices {
            if entries[i].intersects(&left_aabb).0 {
                left_indices.push(i);
            }
            if entries[i].intersects(&right_aabb).0 {
                right_indices.push(i);
            }
        }

        let (left, left_depth) = Self::build_child(entries, left_aabb, depth + 1, plane.next(), left_indices);
        let (right, right_depth) =
            Self::build_child(entries, right_aabb, depth + 1, plane.next(), right_indices);

        let achieved = 1 + left_depth.max(right_depth);
        let node = KdNode::Middle { region, plane, left: left.map(Box::new), right: right.map(Box::new) };
        (node, achieved)
    }

    fn build_child(
        entries: &[KdDataEntry],
        region: Aabb,
        depth: usize,
        plane: KdPlane,
        indices: Vec<usize>,
    ) -> (Option<KdNode>, usize) {
        if indices.is_empty() {
            return (None, depth);
        }
        if indices.len() <= MAX_ELEMS || depth >= MAX_DEPTH {
            return (Some(KdNode::Leaf { region, entries: indices }), depth);
        }
        let (node, achieved) = Self::split(entries, region, depth, plane, indices);
        (Some(node), achieved)
    }

    /// `Intersect(ray, near, far)`. Recurses with the same ray (not
    /// translated to the box entry point) — preserved verbatim even
    /// though it's inefficient; see DESIGN.md.
    pub fn intersect(&self, ray: &Ray, near: f32, far: f32, objects: &[Object]) -> Option<IntersectionRecord> {
        Self::intersect_node(&self.root, &self.entries, objects, ray, near, far)
    }

    fn intersect_node(
        node: &KdNode,
        entries: &[KdDataEntry],
        objects: &[Object],
        ray: &Ray,
        near: f32,
        far: f32,
    ) -> Option<IntersectionRecord> {
        match node {
            KdNode::Leaf { entries: idxs, .. } => Self::intersect_leaf(idxs, entries, objects, ray, near, far),
            KdNode::Middle { left, right, .. } => {
                let left_hit = left.as_ref().and_then(|n| {
                    ray.intersect_aabb(n.region())
                        .and_then(|_| Self::intersect_node(n, entries, objects, ray, near, far))
                });
                let right_hit = right.as_ref().and_then(|n| {
                    ray.intersect_aabb(n.region())
                        .and_then(|_| Self::intersect_node(n, entries, objects, ray, near, far))
                });
                Self::pick_closer(ray, left_hit, right_hit)
            }
        }
    }

    fn pick_closer(
        ray: &Ray,
        left: Option<IntersectionRecord>,
        right: Option<IntersectionRecord>,
    ) -> Option<IntersectionRecord> {
        match (left, right) {
            (None, None) => None,
            (Some(h), None) | (None, Some(h)) => Some(h),
            (Some(l), Some(r)) => {
                if l.entry_index == r.entry_index {
                    // Same (object, triangle) pair duplicated across children.
                    Some(r)
                } else {
                    let dl = (l.point - ray.origin).length_squared();
                    let dr = (r.point - ray.origin).length_squared();
                    if dl < dr {
                        Some(l)
                    } else {
                        Some(r)
                    }
                }
            }
        }
    }

    fn intersect_leaf(
        idxs: &[usize],
        entries: &[KdDataEntry],
        objects: &[Object],
        ray: &Ray,
        near: f32,
        far: f32,
    ) -> Option<IntersectionRecord> {
        let mut best: Option<IntersectionRecord> = None;

        for &idx in idxs {
            let e = &entries[idx];
            let Some(hit) = intersect_triangle(ray, e.world_vertices[0], e.world_vertices[1], e.world_vertices[2])
            else {
                continue;
            };
            if hit.t < near || hit.t > far {
                continue;
            }
            if let Some(b) = &best {
                if hit.t >= b.t {
                    continue;
                }
            }

            let w0 = 1.0 - hit.u - hit.v;
            let interpolated_normal =
                (e.world_normals[0] * w0 + e.world_normals[1] * hit.u + e.world_normals[2] * hit.v)
                    .normalize_or_zero();
            if interpolated_normal.dot(ray.direction) >= 0.0 {
                continue;
            }

            let point = ray.at(hit.t);
            let normal = objects[e.object_index].perturb_normal(interpolated_normal, hit.u, hit.v);

            best = Some(IntersectionRecord { entry_index: idx, point, normal, t: hit.t, u: hit.u, v: hit.v });
        }

        best
    }

    /// Same traversal as `intersect`, but using ray-surfel as the
    /// primitive test instead of ray-triangle.
    pub fn intersect_surfel(&self, ray: &Ray, near: f32, far: f32) -> Option<IntersectionRecord> {
        Self::intersect_surfel_node(&self.root, &self.entries, ray, near, far)
    }

    fn intersect_surfel_node(
        node: &KdNode,
        entries: &[KdDataEntry],
        ray: &Ray,
        near: f32,
        far: f32,
    ) -> Option<IntersectionRecord> {
        match node {
            KdNode::Leaf { entries: idxs, .. } => {
                let mut best: Option<IntersectionRecord> = None;
                for &idx in idxs {
                    let e = &entries[idx];
                    let Some(t) = e.surfel.intersect(ray) else { continue };
                    if t < near || t > far {
                        continue;
                    }
                    if let Some(b) = &best {
                        if t >= b.t {
                            continue;
                        }
                    }
                    if e.surfel.normal.dot(ray.direction) >= 0.0 {
                        continue;
                    }
                    best = Some(IntersectionRecord {
                        entry_index: idx,
                        point: ray.at(t),
                        normal: e.surfel.normal,
                        t,
                        u: 0.0,
                        v: 0.0,
                    });
                }
                best
            }
            KdNode::Middle { left, right, .. } => {
                let left_hit = left.as_ref().and_then(|n| {
                    ray.intersect_aabb(n.region())
                        .and_then(|_| Self::intersect_surfel_node(n, entries, ray, near, far))
                });
                let right_hit = right.as_ref().and_then(|n| {
                    ray.intersect_aabb(n.region())
                        .and_then(|_| Self::intersect_surfel_node(n, entries, ray, near, far))
                });
                Self::pick_closer(ray, left_hit, right_hit)
            }
        }
    }
}
