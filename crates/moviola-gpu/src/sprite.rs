//! Minimal sprite description handed to a `RenderContext`.

use crate::backend::Texture;
use moviola_core::Size;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shading applied when a sprite is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Material {
    /// Plain textured quad.
    #[default]
    Sprite,
    /// Decoded video frame (NV12 or RGBA source).
    Video,
    /// Untextured quad in the sprite colour.
    SolidColour,
}

/// A drawable quad.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub image: Option<Arc<dyn Texture>>,
    pub material: Material,
    pub size: Size,
    /// Normalised texture rect: x, y, width, height.
    pub tex_rect: [f32; 4],
    /// RGBA colour, 0..1.
    pub colour: [f32; 4],
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            image: None,
            material: Material::Sprite,
            size: Size::default(),
            tex_rect: [0.0, 0.0, 1.0, 1.0],
            colour: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Sprite {
    /// Sprite showing the whole of `image`.
    pub fn with_image(image: Arc<dyn Texture>, material: Material, size: Size) -> Self {
        Self {
            image: Some(image),
            material,
            size,
            ..Self::default()
        }
    }

    /// Untextured sprite of one colour.
    pub fn solid_colour(colour: [f32; 4], size: Size) -> Self {
        Self {
            material: Material::SolidColour,
            size,
            colour,
            ..Self::default()
        }
    }

    /// Colour as 8-bit RGBA.
    pub fn colour_rgba8(&self) -> [u8; 4] {
        self.colour.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}
