//! Depth-of-field filter (component H): a guided-image-filter adaptation
//! (He et al.) where guidance comes from per-pixel depth relative to an
//! auto-detected focal plane, and the effective window radius shrinks
//! for in-focus pixels.

use crate::color::Color;

pub const HALF_WINDOW: i32 = 4;
pub const EPS_REG: f32 = 0.001;
pub const DISTANCE_LIMIT: f32 = 100.0;

/// Per-pixel camera-to-first-hit distance, initialized to
/// `DISTANCE_LIMIT` before any pixel is recorded.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl DistanceMap {
    pub fn new(width: usize, height: usize) -> Self {
        DistanceMap { width, height, values: vec![DISTANCE_LIMIT; width * height] }
    }

    pub fn set(&mut self, x: usize, y: usize, distance: f32) {
        self.values[y * self.width + x] = distance;
    }
}

/// Summed-area table over an `f32` channel, supporting O(1) box-mean
/// queries of arbitrary (clamped) radius.
struct IntegralImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl IntegralImage {
    fn build(values: &[f32], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut data = vec![0f32; stride * (height + 1)];
        for y in 0..height {
            for x in 0..width {
                let v = values[y * width + x];
                data[(y + 1) * stride + (x + 1)] =
                    v + data[y * stride + (x + 1)] + data[(y + 1) * stride + x] - data[y * stride + x];
            }
        }
        IntegralImage { data, width, height }
    }

    fn box_sum(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> f32 {
        let stride = self.width + 1;
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let y0 = y0.clamp(0, self.height as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        let y1 = y1.clamp(0, self.height as i32) as usize;
        self.data[y1 * stride + x1] - self.data[y0 * stride + x1] - self.data[y1 * stride + x0]
            + self.data[y0 * stride + x0]
    }

    fn box_mean(&self, x: usize, y: usize, half_window: i32) -> f32 {
        let x0 = x as i32 - half_window;
        let y0 = y as i32 - half_window;
        let x1 = x as i32 + half_window + 1;
        let y1 = y as i32 + half_window + 1;
        let cx0 = x0.max(0);
        let cy0 = y0.max(0);
        let cx1 = x1.min(self.width as i32);
        let cy1 = y1.min(self.height as i32);
        let area = ((cx1 - cx0).max(1) * (cy1 - cy0).max(1)) as f32;
        self.box_sum(cx0, cy0, cx1, cy1) / area
    }
}

/// `adjustFocalPlane()`: mean depth over the central 10% box, ignoring
/// pixels at `DISTANCE_LIMIT`. Falls back to `1.0` if no pixel in that
/// box qualifies.
pub fn adjust_focal_plane(distance_map: &DistanceMap) -> f32 {
    let width = distance_map.width;
    let height = distance_map.height;
    let x0 = (0.45 * width as f32) as usize;
    let x1 = ((0.55 * width as f32) as usize).max(x0 + 1).min(width);
    let y0 = (0.45 * height as f32) as usize;
    let y1 = ((0.55 * height as f32) as usize).max(y0 + 1).min(height);

    let mut sum = 0f32;
    let mut count = 0u32;
    for y in y0..y1 {
        for x in x0..x1 {
            let d = distance_map.values[y * width + x];
            if d < DISTANCE_LIMIT {
                sum += d;
                count += 1;
            }
        }
    }
    if count == 0 {
        1.0
    } else {
        sum / count as f32
    }
}

/// Three-pass guided filter: builds `a`/`b` linear-regression
/// coefficients per channel, then a second integral-image pass to
/// produce the variable-window local means used in the final blend.
/// `image` and the returned buffer are row-major, `width * height`
/// long; colour channels are expected (and returned) in `[0, 255]`.
pub fn apply(image: &[Color], distance_map: &DistanceMap, focal: f32, sigma: f32) -> Vec<Color> {
    let width = distance_map.width;
    let height = distance_map.height;
    let n = width * height;
    debug_assert_eq!(image.len(), n);

    let sigma = sigma.max(1e-6);
    let guidance: Vec<f32> = distance_map
        .values
        .iter()
        .map(|&d| (-(d - focal).powi(2) / sigma).exp())
        .collect();
    let half_windows: Vec<i32> = guidance
        .iter()
        .map(|&g| (((1.0 - g) * HALF_WINDOW as f32).round() as i32).max(0))
        .collect();

    let guidance_integral = IntegralImage::build(&guidance, width, height);
    let gg: Vec<f32> = guidance.iter().map(|g| g * g).collect();
    let gg_integral = IntegralImage::build(&gg, width, height);

    let mut out_channels: [Vec<f32>; 3] = [vec![0f32; n], vec![0f32; n], vec![0f32; n]];

    for c in 0..3 {
        let intensity: Vec<f32> = image
            .iter()
            .map(|p| match c {
                0 => p.r,
                1 => p.g,
                _ => p.b,
            } / 255.0)
            .collect();
        let gi: Vec<f32> = guidance.iter().zip(intensity.iter()).map(|(g, i)| g * i).collect();

        let intensity_integral = IntegralImage::build(&intensity, width, height);
        let gi_integral = IntegralImage::build(&gi, width, height);

        let mut a = vec![0f32; n];
        let mut b = vec![0f32; n];
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let hw = half_windows[idx];
                let mu = guidance_integral.box_mean(x, y, hw);
                let nu = intensity_integral.box_mean(x, y, hw);
                let mean_gi = gi_integral.box_mean(x, y, hw);
                let mean_gg = gg_integral.box_mean(x, y, hw);
                let var_g = (mean_gg - mu * mu).max(0.0);
                let ai = (mean_gi - mu * nu) / (var_g + EPS_REG);
                let bi = nu - ai * mu;
                a[idx] = ai;
                b[idx] = bi;
            }
        }

        let a_integral = IntegralImage::build(&a, width, height);
        let b_integral = IntegralImage::build(&b, width, height);

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let hw = half_windows[idx];
                let a_bar = a_integral.box_mean(x, y, hw);
                let b_bar = b_integral.box_mean(x, y, hw);
                let out = a_bar * guidance[idx] + b_bar;
                out_channels[c][idx] = (out * 255.0).clamp(0.0, 255.0);
            }
        }
    }

    (0..n)
        .map(|i| Color::new(out_channels[0][i], out_channels[1][i], out_channels[2][i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focal_plane_defaults_to_one_when_no_pixel_qualifies() {
        let dm = DistanceMap::new(10, 10);
        assert_eq!(adjust_focal_plane(&dm), 1.0);
    }

    #[test]
    fn focal_plane_averages_central_box() {
        let mut dm = DistanceMap::new(10, 10);
        for y in 4..6 {
            for x in 4..6 {
                dm.set(x, y, 2.0);
            }
        }
        assert!((adjust_focal_plane(&dm) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn uniform_depth_is_near_noop() {
        let width = 16;
        let height = 16;
        let mut dm = DistanceMap::new(width, height);
        for v in dm.values.iter_mut() {
            *v = 1.0;
        }
        let image: Vec<Color> = (0..width * height).map(|_| Color::new(120.0, 80.0, 40.0)).collect();
        let out = apply(&image, &dm, 1.0, 0.1);
        for (a, b) in image.iter().zip(out.iter()) {
            assert!((a.r - b.r).abs() < 1.0);
            assert!((a.g - b.g).abs() < 1.0);
            assert!((a.b - b.b).abs() < 1.0);
        }
    }

    #[test]
    fn output_is_clamped() {
        let dm = DistanceMap::new(4, 4);
        let image = vec![Color::new(1e6, -1e6, 300.0); 16];
        let out = apply(&image, &dm, 1.0, 0.1);
        for c in out {
            assert!(c.r >= 0.0 && c.r <= 255.0);
            assert!(c.g >= 0.0 && c.g <= 255.0);
            assert!(c.b >= 0.0 && c.b <= 255.0);
        }
    }
}
