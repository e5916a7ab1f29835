//! Batch render driver: builds a small procedural demo scene (geometry
//! loading is out of scope, per SPEC_FULL.md §1) and writes a PNG,
//! following the teacher's hardcoded-scene `main.rs` pattern.

use clap::Parser;

use raymini::color::Color;
use raymini::geometry::{Triangle, Vertex};
use raymini::light::Light;
use raymini::material::Material;
use raymini::mesh::Mesh;
use raymini::object::Object;
use raymini::render::{self, DEFAULT_DOF_FACTOR};
use raymini::vec3::Vec3;
use raymini::{Camera, RenderParams, Scene};

/// Offline ray/path tracer with ambient occlusion, soft shadows, and a
/// depth-of-field post-filter.
#[derive(Parser, Debug)]
#[command(name = "raymini-cli", version, about)]
struct Args {
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
    #[arg(long, default_value = "out.png")]
    output: String,

    #[arg(long)]
    path_tracing: bool,
    #[arg(long, default_value_t = 3)]
    max_ray_depth: u32,
    #[arg(long, default_value_t = 5)]
    diffuse_ray_count: u32,

    #[arg(long)]
    no_anti_aliasing: bool,
    #[arg(long, default_value_t = 2)]
    anti_aliasing_factor: u32,

    #[arg(long)]
    no_shadows: bool,
    #[arg(long)]
    hard_shadows: bool,
    #[arg(long, default_value_t = 0.5)]
    light_radius: f32,
    #[arg(long, default_value_t = 20)]
    light_samples: u32,

    #[arg(long)]
    ambient_occlusion: bool,

    #[arg(long)]
    filter: bool,
    #[arg(long, default_value_t = DEFAULT_DOF_FACTOR)]
    dof_sigma: f32,

    #[arg(long, default_value_t = 2)]
    threads: usize,
}

fn cube_mesh(half_extent: f32) -> Mesh {
    let e = half_extent;
    let positions = [
        Vec3::new(-e, -e, -e),
        Vec3::new(e, -e, -e),
        Vec3::new(e, e, -e),
        Vec3::new(-e, e, -e),
        Vec3::new(-e, -e, e),
        Vec3::new(e, -e, e),
        Vec3::new(e, e, e),
        Vec3::new(-e, e, e),
    ];
    let vertices: Vec<Vertex> = positions.iter().map(|&p| Vertex::new(p, Vec3::ZERO)).collect();

    let faces: [[usize; 4]; 6] = [
        [0, 1, 2, 3], // back
        [5, 4, 7, 6], // front
        [4, 0, 3, 7], // left
        [1, 5, 6, 2], // right
        [3, 2, 6, 7], // top
        [4, 5, 1, 0], // bottom
    ];
    let mut triangles = Vec::with_capacity(12);
    for face in faces {
        triangles.push(Triangle::new(face[0], face[2], face[1]));
        triangles.push(Triangle::new(face[0], face[3], face[2]));
    }

    let mut mesh = Mesh::new(vertices, triangles);
    mesh.recompute_vertex_normals();
    mesh
}

fn ground_mesh(half_extent: f32) -> Mesh {
    let vertices = vec![
        Vertex::new(Vec3::new(-half_extent, 0.0, -half_extent), Vec3::Y),
        Vertex::new(Vec3::new(half_extent, 0.0, -half_extent), Vec3::Y),
        Vertex::new(Vec3::new(half_extent, 0.0, half_extent), Vec3::Y),
        Vertex::new(Vec3::new(-half_extent, 0.0, half_extent), Vec3::Y),
    ];
    let triangles = vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)];
    Mesh::new(vertices, triangles)
}

fn demo_scene() -> Scene {
    let cube_material = Material::new(0.1, 0.6, 0.6, 64.0, Color::new(180.0, 60.0, 60.0));
    let ground_material = Material::new(0.15, 0.8, 0.05, 8.0, Color::new(200.0, 200.0, 200.0));

    let cube = Object::new(cube_mesh(1.0), cube_material, Vec3::new(0.0, 1.0, 0.0), None);
    let ground = Object::new(ground_mesh(8.0), ground_material, Vec3::ZERO, None);

    let lights = vec![Light::new(Vec3::new(4.0, 6.0, -4.0), Color::WHITE, 1.5)];
    let background = Color::new(20.0, 24.0, 32.0);

    Scene::new(vec![cube, ground], lights, background)
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut params = RenderParams::default();
    params.path_tracing = args.path_tracing;
    params.ray_tracing = !args.path_tracing;
    params.max_ray_depth = args.max_ray_depth;
    params.path_tracing_diffuse_ray_count = args.diffuse_ray_count;
    params.anti_aliasing = !args.no_anti_aliasing;
    params.shadows = !args.no_shadows;
    params.hard_shadows = args.hard_shadows;
    params.soft_shadows = !args.hard_shadows;
    params.light_radius = args.light_radius;
    params.light_samples = args.light_samples;
    params.ambient_occlusion = args.ambient_occlusion;
    params.filter = args.filter;

    if let Err(e) = params.set_anti_aliasing_factor(args.anti_aliasing_factor) {
        log::error!("{e}");
        std::process::exit(1);
    }
    if let Err(e) = params.set_thread_count(args.threads) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let mut scene = demo_scene();
    let aspect_ratio = args.width as f32 / args.height as f32;
    let camera = Camera::new(
        Vec3::new(4.0, 3.0, -6.0),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::Y,
        60f32.to_radians(),
        aspect_ratio,
    );

    let result = match render::render(&mut scene, &camera, args.width, args.height, &params, args.dof_sigma) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut buffer = image::RgbImage::new(result.width, result.height);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        let color = result.pixels[(y * result.width + x) as usize];
        *pixel = image::Rgb(color.to_rgb8());
    }

    if let Err(e) = buffer.save(&args.output) {
        log::error!("failed to write {}: {e}", args.output);
        std::process::exit(1);
    }
    log::info!("wrote {}", args.output);
}
