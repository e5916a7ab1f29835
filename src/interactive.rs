//! Interactive renderer (component G): a background worker refining a
//! full-resolution image progressively, coarse-to-fine, with cooperative
//! cancellation. Generalizes the teacher's mpsc-channel-driven
//! background render thread (`main.rs`/`gui.rs`) into the spec's single-
//! mutex progressive loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::color::Color;
use crate::params::RenderParams;
use crate::radiance::SHADOW_EPSILON;
use crate::scene::Scene;
use crate::tracer::{path_tracing, trace_ray};

/// Downsample divisor for the progressive image-build/AA schedule.
pub const SUB: u32 = 8;

struct SharedState {
    stock: Vec<Color>,
    result: Vec<Color>,
    pass: u64,
    width: u32,
    height: u32,
    camera: Camera,
    last_pass_ms: f32,
    camera_dirty: bool,
}

/// A background task refining the image progressively (§4.G). `lock`/
/// `unlock` is modeled as a `Mutex` guarding `stock`/`result`/`pass`/the
/// camera snapshot, exactly as §5's concurrency model requires.
pub struct InteractiveRenderer {
    state: Arc<Mutex<SharedState>>,
    cancel_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

fn bit_reversal_order() -> [u32; SUB as usize] {
    let bits = (SUB as f32).log2().round() as u32;
    let mut order = [0u32; SUB as usize];
    for i in 0..SUB {
        let mut v = i;
        let mut r = 0u32;
        for _ in 0..bits {
            r = (r << 1) | (v & 1);
            v >>= 1;
        }
        order[i as usize] = r;
    }
    order
}

fn closest_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    let mut p = 1u32;
    while p * 2 <= n {
        p *= 2;
    }
    p
}

/// Jittered sub-pixel offset for `pass`, drawn from a precomputed
/// SUB x SUB Bayer-like permutation (`fSmpX`/`fSmpY`); every further
/// block of `SUB^2` passes adds a halved refinement jitter on top, so
/// sub-sample positions get finer hierarchically rather than repeating.
fn sample_offset(pass: u64) -> (f32, f32) {
    let order = bit_reversal_order();
    let block = (SUB * SUB) as u64;
    let cycle = pass / block;
    let index = (pass % block) as u32;
    let bx = order[(index % SUB) as usize];
    let by = order[(index / SUB) as usize];
    let refine = 1.0 / (2.0 * (cycle as f32 + 1.0));
    ((bx as f32 + refine) / SUB as f32, (by as f32 + refine) / SUB as f32)
}

impl InteractiveRenderer {
    pub fn start(
        scene: Arc<Scene>,
        camera: Camera,
        width: u32,
        height: u32,
        params: RenderParams,
        background: Color,
    ) -> Self {
        let pixel_count = (width * height) as usize;
        let state = Arc::new(Mutex::new(SharedState {
            stock: vec![background; pixel_count],
            result: vec![background; pixel_count],
            pass: 0,
            width,
            height,
            camera,
            last_pass_ms: 0.0,
            camera_dirty: false,
        }));
        let cancel_flag = Arc::new(AtomicBool::new(false));

        let worker_state = state.clone();
        let worker_cancel = cancel_flag.clone();
        let worker = thread::spawn(move || {
            Self::run(scene, worker_state, worker_cancel, params, background, pixel_count);
        });

        InteractiveRenderer { state, cancel_flag, worker: Some(worker) }
    }

    fn run(
        scene: Arc<Scene>,
        state: Arc<Mutex<SharedState>>,
        cancel_flag: Arc<AtomicBool>,
        params: RenderParams,
        background: Color,
        pixel_count: usize,
    ) {
        loop {
            if cancel_flag.load(Ordering::SeqCst) {
                let mut s = state.lock().unwrap();
                s.stock = vec![background; pixel_count];
                s.result = vec![background; pixel_count];
                s.pass = 0;
                log::info!("interactive render cancelled");
                return;
            }

            let (pass, width, height, camera) = {
                let mut s = state.lock().unwrap();
                if s.camera_dirty {
                    s.stock = vec![background; pixel_count];
                    s.result = vec![background; pixel_count];
                    s.pass = 0;
                    s.camera_dirty = false;
                }
                (s.pass, s.width, s.height, s.camera)
            };

            let down_w = (width + SUB - 1) / SUB;
            let down_h = (height + SUB - 1) / SUB;
            let (ox, oy) = sample_offset(pass);

            let pass_start = Instant::now();
            let mut downsampled = vec![background; (down_w * down_h) as usize];
            let mut rng = SmallRng::from_entropy();
            for j in 0..down_h {
                for i in 0..down_w {
                    let px = (i * SUB).min(width.saturating_sub(1));
                    let py = (j * SUB).min(height.saturating_sub(1));
                    let ray = camera.primary_ray(px, py, ox, oy, width, height);

                    let mut color = scene.background;
                    if let Some(tree) = scene.kd_tree() {
                        if tree.intersect(&ray, SHADOW_EPSILON, f32::MAX, &scene.objects).is_some() {
                            color = if params.path_tracing {
                                path_tracing(&scene, &ray, 0, &params, &mut rng) * 255.0
                            } else {
                                trace_ray(&scene, &ray, 0, &params, &mut rng) * 255.0
                            };
                        }
                    }
                    downsampled[(j * down_w + i) as usize] = color.clamp_to_byte_range();
                }
            }

            if cancel_flag.load(Ordering::SeqCst) {
                continue;
            }

            let mut s = state.lock().unwrap();
            let block = (SUB * SUB) as u64;

            if pass < block {
                let cell = ((SUB / 2) / closest_power_of_two((pass as f64).sqrt() as u32)).max(1);
                for j in 0..down_h {
                    for i in 0..down_w {
                        let color = downsampled[(j * down_w + i) as usize];
                        Self::splat(&mut s.stock, width, height, i * SUB, j * SUB, cell, color);
                    }
                }
            } else {
                let whole_pass = (pass + 1) / block;
                let weight = 1.0 / (whole_pass as f32 + 1.0);
                for j in 0..down_h {
                    for i in 0..down_w {
                        let color = downsampled[(j * down_w + i) as usize];
                        let x = (i * SUB + (ox * SUB as f32) as u32).min(width.saturating_sub(1));
                        let y = (j * SUB + (oy * SUB as f32) as u32).min(height.saturating_sub(1));
                        Self::blend_pixel(&mut s.stock, width, x, y, color, weight);
                    }
                }
            }

            let meaning_cell = (SUB / closest_power_of_two(((pass + 1) as f64).sqrt() as u32)).max(1);
            Self::downsample_into_result(&mut s, width, height, meaning_cell);

            s.pass += 1;
            s.last_pass_ms = pass_start.elapsed().as_secs_f32() * 1000.0;
            log::debug!("interactive pass {} fps {:.1}", s.pass, 1000.0 / s.last_pass_ms.max(0.001));
        }
    }

    fn splat(stock: &mut [Color], width: u32, height: u32, base_x: u32, base_y: u32, cell: u32, color: Color) {
        for dy in 0..cell {
            for dx in 0..cell {
                let x = base_x + dx;
                let y = base_y + dy;
                if x < width && y < height {
                    stock[(y * width + x) as usize] = color;
                }
            }
        }
    }

    /// Running-averages a single sampled pixel into its matching stock
    /// pixel (the AA-phase refinement step, as opposed to `splat`'s
    /// whole-block fill during the coarse image-build phase).
    fn blend_pixel(stock: &mut [Color], width: u32, x: u32, y: u32, color: Color, weight: f32) {
        let idx = (y * width + x) as usize;
        stock[idx] = stock[idx] * (1.0 - weight) + color * weight;
    }

    fn downsample_into_result(s: &mut SharedState, width: u32, height: u32, meaning_cell: u32) {
        let mut by = 0;
        while by < height {
            let mut bx = 0;
            while bx < width {
                let mut accum = Color::BLACK;
                let mut count = 0u32;
                for y in by..(by + meaning_cell).min(height) {
                    for x in bx..(bx + meaning_cell).min(width) {
                        accum += s.stock[(y * width + x) as usize];
                        count += 1;
                    }
                }
                let avg = if count > 0 { accum / count as f32 } else { Color::BLACK };
                for y in by..(by + meaning_cell).min(height) {
                    for x in bx..(bx + meaning_cell).min(width) {
                        s.result[(y * width + x) as usize] = avg;
                    }
                }
                bx += meaning_cell;
            }
            by += meaning_cell;
        }
    }

    /// Atomically reads the currently displayed image and pass counter.
    pub fn lock_result(&self) -> (Vec<Color>, u64) {
        let s = self.state.lock().unwrap();
        (s.result.clone(), s.pass)
    }

    pub fn fps(&self) -> f32 {
        let s = self.state.lock().unwrap();
        if s.last_pass_ms <= 0.0 {
            0.0
        } else {
            1000.0 / s.last_pass_ms
        }
    }

    /// Atomically mutates the camera and marks the running render dirty
    /// so the worker discards `stock`/`result` and restarts at pass 0.
    pub fn update_camera(&self, camera: Camera) {
        let mut s = self.state.lock().unwrap();
        s.camera = camera;
        s.camera_dirty = true;
    }

    /// Sets the cancel flag, then joins the worker.
    pub fn cancel(mut self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InteractiveRenderer {
    fn drop(&mut self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
