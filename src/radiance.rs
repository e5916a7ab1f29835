//! Radiance evaluator (component D): Phong shading, visibility, ambient
//! occlusion, and direct lighting over every scene light.

use rand::Rng;

use crate::color::Color;
use crate::geometry::Ray;
use crate::light::Light;
use crate::material::Material;
use crate::params::RenderParams;
use crate::scene::Scene;
use crate::vec3::{Vec3, Vec3Ext};

/// Near-plane offset for visibility/shadow rays, distinct from
/// `geometry::EPSILON` (Möller-Trumbore's parallel-ray threshold) per
/// DESIGN.md's Open Question decision on EPSILON.
pub const SHADOW_EPSILON: f32 = 1e-4;

/// Phong contribution from a point light at `light_pos` with colour
/// `light_color` (already scaled by intensity) to `point` with `normal`,
/// viewed from `view_pos`.
pub fn phong(light_pos: Vec3, light_color: Color, point: Vec3, normal: Vec3, view_pos: Vec3, material: &Material) -> Color {
    let l = (light_pos - point).normalize_or_zero();
    let cos_i = l.dot(normal);
    if cos_i <= 0.0 {
        return Color::BLACK;
    }

    let reflected = (l - normal * (2.0 * normal.dot(l))).normalize_or_zero();
    let diffuse = material.color.mul_color(light_color) * (material.diffuse * cos_i);

    let v = (view_pos - point).normalize_or_zero();
    let cos_v = reflected.dot(v);
    let specular = if cos_v > 0.0 {
        material.color.mul_color(light_color) * (material.specular * cos_v.powf(material.shininess))
    } else {
        Color::BLACK
    };

    diffuse + specular
}

/// Visibility of `to` from `from`: casts a ray with `far = |to - from|`
/// and a small near-plane offset to avoid self-shadowing. A hit means
/// occluded.
pub fn visible(scene: &Scene, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return true;
    }
    let ray = Ray::new(from, delta / dist);
    match scene.kd_tree() {
        Some(tree) => tree.intersect(&ray, SHADOW_EPSILON, dist - SHADOW_EPSILON, &scene.objects).is_none(),
        None => true,
    }
}

/// Fraction of `light` visible from `point`, per §4.D's shadow modes.
pub fn light_visibility(scene: &Scene, light: &Light, point: Vec3, params: &RenderParams, rng: &mut impl Rng) -> f32 {
    if !params.shadows {
        return 1.0;
    }
    if !params.soft_shadows {
        return if visible(scene, point, light.position) { 1.0 } else { 0.0 };
    }

    let samples = light.disc_samples(Vec3::Y, params.light_radius, params.light_samples as usize, rng);
    if samples.is_empty() {
        return if visible(scene, point, light.position) { 1.0 } else { 0.0 };
    }
    let visible_count = samples.iter().filter(|s| visible(scene, point, s.position)).count();
    visible_count as f32 / samples.len() as f32
}

/// Sum over scene lights of `light_visibility(L) * Phong(L)`.
pub fn direct_lighting(
    scene: &Scene,
    point: Vec3,
    normal: Vec3,
    view_pos: Vec3,
    material: &Material,
    params: &RenderParams,
    rng: &mut impl Rng,
) -> Color {
    let mut total = Color::BLACK;
    for light in &scene.lights {
        let fraction = light_visibility(scene, light, point, params, rng);
        if fraction <= 0.0 {
            continue;
        }
        let effective_color = light.color * light.intensity;
        total += phong(light.position, effective_color, point, normal, view_pos, material) * fraction;
    }
    total
}

/// Ambient occlusion at `point` with `normal`: casts `k` cosine-weighted
/// hemisphere rays out to `radius` and returns `hits / k`, always in
/// `[0, 1]`. The caller scales colour by `1 - AO`.
pub fn ambient_occlusion(scene: &Scene, point: Vec3, normal: Vec3, k: u32, radius: f32, rng: &mut impl Rng) -> f32 {
    if k == 0 {
        return 0.0;
    }
    let (x_axis, y_axis) = normal.two_orthogonals();
    let x_axis = x_axis.normalize_or_zero();
    let y_axis = y_axis.normalize_or_zero();

    let mut hits = 0u32;
    for _ in 0..k {
        let r: f32 = rng.gen();
        let theta: f32 = rng.gen::<f32>() * std::f32::consts::TAU;
        let d_local = Vec3::new(r * theta.cos(), r * theta.sin(), (1.0 - r * r).max(0.0).sqrt());
        let direction = (x_axis * d_local.x + y_axis * d_local.y + normal * d_local.z).normalize_or_zero();
        let ray = Ray::new(point, direction);
        if let Some(tree) = scene.kd_tree() {
            if tree.intersect(&ray, SHADOW_EPSILON, radius, &scene.objects).is_some() {
                hits += 1;
            }
        }
    }
    hits as f32 / k as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_is_non_negative_and_zero_behind_surface() {
        let material = Material::default();
        let point = Vec3::ZERO;
        let normal = Vec3::Z;
        let view_pos = Vec3::new(0.0, 0.0, 5.0);

        let lit = phong(Vec3::new(0.0, 0.0, 5.0), Color::WHITE, point, normal, view_pos, &material);
        assert!(lit.r >= 0.0 && lit.g >= 0.0 && lit.b >= 0.0);
        assert!(lit.r > 0.0);

        let behind = phong(Vec3::new(0.0, 0.0, -5.0), Color::WHITE, point, normal, view_pos, &material);
        assert_eq!(behind, Color::BLACK);
    }

    #[test]
    fn visibility_with_no_scene_geometry_is_true() {
        let scene = Scene::new(Vec::new(), Vec::new(), Color::BLACK);
        assert!(visible(&scene, Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn ao_bounds_hold_for_k_one() {
        use rand::SeedableRng;
        let scene = Scene::new(Vec::new(), Vec::new(), Color::BLACK);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let ao = ambient_occlusion(&scene, Vec3::ZERO, Vec3::Z, 1, 1.0, &mut rng);
        assert!((0.0..=1.0).contains(&ao));
    }
}
