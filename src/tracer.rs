//! Ray tracer / path tracer (component E): per-hit recursive radiance
//! evaluation. `trace_ray` is the Whitted-style recursive mirror tracer;
//! `path_tracing` adds a single-bounce Monte-Carlo diffuse term.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::color::Color;
use crate::geometry::Ray;
use crate::params::RenderParams;
use crate::radiance::{direct_lighting, SHADOW_EPSILON};
use crate::scene::Scene;
use crate::vec3::{Vec3, Vec3Ext};

const FAR_PLANE: f32 = f32::MAX;

/// `TraceRay(scene, ray, depth, background)`. Miss returns the scene
/// background; a hit adds direct lighting plus, while `depth` is below
/// `params.max_ray_depth`, a recursive specular mirror term.
pub fn trace_ray(scene: &Scene, ray: &Ray, depth: u32, params: &RenderParams, rng: &mut impl Rng) -> Color {
    let Some(tree) = scene.kd_tree() else {
        return scene.background;
    };
    let Some(hit) = tree.intersect(ray, SHADOW_EPSILON, FAR_PLANE, &scene.objects) else {
        return scene.background;
    };

    let entry = &tree.entries[hit.entry_index];
    let object = &scene.objects[entry.object_index];
    let material = &object.material;

    let mut color = direct_lighting(scene, hit.point, hit.normal, ray.origin, material, params, rng);

    if depth < params.max_ray_depth {
        let reflected_dir = reflect(ray.direction, hit.normal);
        let reflected_ray = Ray::new(hit.point, reflected_dir);
        let reflected_radiance = trace_ray(scene, &reflected_ray, depth + 1, params, rng);
        color += material.color.mul_color(reflected_radiance) * material.specular;
    }

    color
}

/// `PathTracing(ray, depth)`. Direct lighting is always added; the
/// diffuse bounce is restricted to `depth == 0` (§4.E, §9 — "almost
/// certainly deliberate", documented rather than silently generalized,
/// per DESIGN.md's Open Question decisions).
pub fn path_tracing(scene: &Scene, ray: &Ray, depth: u32, params: &RenderParams, rng: &mut impl Rng) -> Color {
    let Some(tree) = scene.kd_tree() else {
        return Color::BLACK;
    };
    let Some(hit) = tree.intersect(ray, SHADOW_EPSILON, FAR_PLANE, &scene.objects) else {
        return Color::BLACK;
    };

    let entry = &tree.entries[hit.entry_index];
    let object = &scene.objects[entry.object_index];
    let material = &object.material;

    let mut total = direct_lighting(scene, hit.point, hit.normal, ray.origin, material, params, rng);

    if material.diffuse > 0.0 && depth == 0 && params.path_tracing_diffuse_ray_count > 0 {
        let n = params.path_tracing_diffuse_ray_count;
        let (x_axis, y_axis) = hit.normal.two_orthogonals();
        let x_axis = x_axis.normalize_or_zero();
        let y_axis = y_axis.normalize_or_zero();

        let mut accum = Color::BLACK;
        for _ in 0..n {
            let theta = rng.gen::<f32>() * TAU;
            let phi = rng.gen::<f32>() * PI;
            let local = Vec3::from_polar(1.0, theta, phi);
            let mut world_dir = x_axis * local.x + y_axis * local.y + hit.normal * local.z;
            if world_dir.dot(hit.normal) < 0.0 {
                world_dir = -world_dir;
            }
            world_dir = world_dir.normalize_or_zero();

            let bounce = Ray::new(hit.point, world_dir);
            let recursed = path_tracing(scene, &bounce, depth + 1, params, rng);
            accum += recursed * hit.normal.dot(world_dir);
        }
        total += material.color.mul_color(accum) * (material.diffuse * TAU / n as f32);
    }

    if material.specular > 0.0 && depth < params.max_ray_depth {
        let reflected_dir = reflect(ray.direction, hit.normal);
        let approaching = (-ray.direction).dot(hit.normal) > 0.0;
        if approaching {
            let bounce = Ray::new(hit.point, reflected_dir);
            let recursed = path_tracing(scene, &bounce, depth + 1, params, rng);
            total += material.color.mul_color(recursed) * material.specular;
        }
    }

    total
}

fn reflect(incoming: Vec3, normal: Vec3) -> Vec3 {
    (incoming - normal * (2.0 * normal.dot(incoming))).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_returns_background() {
        let scene = Scene::new(Vec::new(), Vec::new(), Color::new(17.0, 34.0, 51.0));
        let params = RenderParams::default();
        let mut rng = rand::thread_rng();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(trace_ray(&scene, &ray, 0, &params, &mut rng), Color::new(17.0, 34.0, 51.0));
    }

    #[test]
    fn path_tracing_miss_is_zero() {
        let scene = Scene::new(Vec::new(), Vec::new(), Color::BLACK);
        let params = RenderParams::default();
        let mut rng = rand::thread_rng();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(path_tracing(&scene, &ray, 0, &params, &mut rng), Color::BLACK);
    }
}
