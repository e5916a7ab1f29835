//! Render parameter store (§4.I). Per §9's own design note, this is an
//! ordinary value type passed by reference, not a process-wide
//! singleton — the caller owns one and threads it through `Scene`,
//! `RenderDriver`, and `InteractiveRenderer` calls explicitly.

use crate::error::RenderError;

/// Recognised anti-aliasing factors (§4.I).
pub const VALID_AA_FACTORS: [u32; 4] = [2, 4, 8, 16];

#[derive(Debug, Clone)]
pub struct RenderParams {
    pub scene_id: u32,
    pub thread_count: usize,
    pub filter: bool,
    pub interactive: bool,
    pub ambient_occlusion: bool,
    pub path_tracing: bool,
    pub ray_tracing: bool,
    pub max_ray_depth: u32,
    pub path_tracing_diffuse_ray_count: u32,
    pub anti_aliasing: bool,
    pub anti_aliasing_factor: u32,
    pub shadows: bool,
    pub hard_shadows: bool,
    pub soft_shadows: bool,
    pub light_radius: f32,
    pub light_samples: u32,
    pub kd_tree_built: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            scene_id: 0,
            thread_count: 2,
            filter: false,
            interactive: false,
            ambient_occlusion: false,
            path_tracing: false,
            ray_tracing: true,
            max_ray_depth: 3,
            path_tracing_diffuse_ray_count: 5,
            anti_aliasing: true,
            anti_aliasing_factor: 2,
            shadows: true,
            hard_shadows: false,
            soft_shadows: true,
            light_radius: 0.5,
            light_samples: 20,
            kd_tree_built: false,
        }
    }
}

impl RenderParams {
    /// Effective sample-grid side: `antiAliasingFactor` if AA is on, 1
    /// otherwise (or always 1 in interactive mode, per §4.F step 2).
    pub fn aa_side(&self) -> u32 {
        if self.interactive || !self.anti_aliasing {
            1
        } else {
            self.anti_aliasing_factor
        }
    }

    pub fn total_samples(&self) -> u32 {
        let side = self.aa_side();
        side * side
    }

    pub fn set_anti_aliasing_factor(&mut self, factor: u32) -> Result<(), RenderError> {
        if !VALID_AA_FACTORS.contains(&factor) {
            return Err(RenderError::InvalidAntiAliasingFactor(factor));
        }
        self.anti_aliasing_factor = factor;
        Ok(())
    }

    pub fn set_thread_count(&mut self, count: usize) -> Result<(), RenderError> {
        if count == 0 {
            return Err(RenderError::InvalidThreadCount);
        }
        self.thread_count = count;
        Ok(())
    }

    /// True if mutating a field with this name invalidates a running
    /// interactive render (every field except `interactive`, `filter`,
    /// and the `antiAliasing*` pair).
    pub fn invalidates_interactive(field: &str) -> bool {
        !matches!(
            field,
            "interactive" | "filter" | "anti_aliasing" | "anti_aliasing_factor"
        )
    }
}
