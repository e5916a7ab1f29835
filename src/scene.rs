//! Scene: the object arena and light list, plus the on-demand k-d tree
//! build. Objects are never heap-shared; k-d entries reference them by
//! index (§9's "cyclic ownership risk" note, resolved as arena + index).

use crate::color::Color;
use crate::geometry::{Aabb, Vertex};
use crate::kdtree::{KdDataEntry, KdTree};
use crate::light::Light;
use crate::object::Object;
use crate::surfel::Surfel;

pub struct Scene {
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    pub background: Color,
    kd_tree: Option<KdTree>,
}

impl Scene {
    pub fn new(objects: Vec<Object>, lights: Vec<Light>, background: Color) -> Self {
        Scene { objects, lights, background, kd_tree: None }
    }

    pub fn kd_tree(&self) -> Option<&KdTree> {
        self.kd_tree.as_ref()
    }

    /// Builds the k-d tree over every triangle of every object, unless
    /// one has already been built. The tree is immutable once built and
    /// may be shared freely by all readers (§5).
    pub fn build_kd_tree(&mut self) {
        if self.kd_tree.is_some() {
            return;
        }

        let mut entries = Vec::new();
        for (object_index, object) in self.objects.iter().enumerate() {
            let world_vertices: Vec<Vertex> = object
                .mesh
                .vertices
                .iter()
                .map(|v| Vertex::new(v.position + object.translation, v.normal))
                .collect();

            for (triangle_index, tri) in object.mesh.triangles.iter().enumerate() {
                let positions = [
                    world_vertices[tri.indices[0]].position,
                    world_vertices[tri.indices[1]].position,
                    world_vertices[tri.indices[2]].position,
                ];
                let normals = [
                    world_vertices[tri.indices[0]].normal,
                    world_vertices[tri.indices[1]].normal,
                    world_vertices[tri.indices[2]].normal,
                ];
                let surfel = Surfel::build_from_triangle(tri, &world_vertices, object.material);
                entries.push(KdDataEntry::new(object_index, triangle_index, positions, normals, surfel));
            }
        }

        self.kd_tree = Some(KdTree::build(entries));
    }

    /// Bounding box over every object in the scene, used by the ray
    /// tracer's default AO radius (`0.05 * diagonal`).
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for object in &self.objects {
            bounds.extend_to_aabb(&object.aabb);
        }
        bounds
    }
}
