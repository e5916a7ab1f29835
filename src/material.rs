//! Surface reflectance properties used by the Phong model and path tracer.

use crate::color::Color;

/// Ambient/diffuse/specular/shininess scalars plus a base colour. The
/// specular highlight colour is implicitly white, so it is not stored
/// separately.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub color: Color,
}

impl Material {
    pub fn new(ambient: f32, diffuse: f32, specular: f32, shininess: f32, color: Color) -> Self {
        Material { ambient, diffuse, specular, shininess, color }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            ambient: 0.1,
            diffuse: 0.7,
            specular: 0.2,
            shininess: 16.0,
            color: Color::new(200.0, 200.0, 200.0),
        }
    }
}
