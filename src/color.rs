//! RGB colour accumulator used throughout shading and the final raster.

use std::ops;

/// Linear RGB colour. Channels are typically driven into `[0, 255]` once
/// scaled for output, but range freely during shading accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 255.0, g: 255.0, b: 255.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    pub fn from_vec3(v: glam::Vec3) -> Self {
        Color { r: v.x, g: v.y, b: v.z }
    }

    pub fn to_vec3(self) -> glam::Vec3 {
        glam::Vec3::new(self.r, self.g, self.b)
    }

    /// Elementwise product, used by Phong's `material.colour * light.colour`.
    pub fn mul_color(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }

    /// Clamps each channel to `[0, 255]` and rounds to the nearest `u8`.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            self.r.clamp(0.0, 255.0).round() as u8,
            self.g.clamp(0.0, 255.0).round() as u8,
            self.b.clamp(0.0, 255.0).round() as u8,
        ]
    }

    pub fn clamp_to_byte_range(self) -> Color {
        Color::new(
            self.r.clamp(0.0, 255.0),
            self.g.clamp(0.0, 255.0),
            self.b.clamp(0.0, 255.0),
        )
    }
}

impl ops::Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl ops::AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Color {
    type Output = Color;
    fn sub(self, rhs: Color) -> Color {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl ops::Mul<f32> for Color {
    type Output = Color;
    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl ops::Mul<Color> for f32 {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl ops::Div<f32> for Color {
    type Output = Color;
    fn div(self, rhs: f32) -> Color {
        Color::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_above_and_below() {
        let c = Color::new(-10.0, 300.0, 128.0);
        assert_eq!(c.to_rgb8(), [0, 255, 128]);
    }

    #[test]
    fn mul_color_is_elementwise() {
        let a = Color::new(1.0, 2.0, 3.0);
        let b = Color::new(2.0, 2.0, 2.0);
        assert_eq!(a.mul_color(b), Color::new(2.0, 4.0, 6.0));
    }
}
