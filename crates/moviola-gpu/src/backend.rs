//! The video backend seam consumed by the movie player.

use crate::sprite::Sprite;
use moviola_core::{FrameBuffer, PixelFormat, Rect, Result, Size};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Everything needed to (re)load a texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub size: Size,
    pub format: PixelFormat,
    pub use_filtering: bool,
    pub is_render_target: bool,
    /// Pixels to upload. `None` allocates uninitialised storage.
    pub pixel_data: Option<FrameBuffer>,
}

impl TextureDescriptor {
    /// Empty descriptor of the given size and format.
    pub fn new(size: Size, format: PixelFormat) -> Self {
        Self {
            size,
            format,
            use_filtering: false,
            is_render_target: false,
            pixel_data: None,
        }
    }

    /// Filtered RGBA texture usable as a render target.
    pub fn render_target(size: Size) -> Self {
        Self {
            use_filtering: true,
            is_render_target: true,
            ..Self::new(size, PixelFormat::Rgba8)
        }
    }

    /// Descriptor carrying a decoded frame.
    pub fn from_frame(frame: FrameBuffer) -> Self {
        Self {
            size: frame.size(),
            format: frame.format,
            use_filtering: false,
            is_render_target: false,
            pixel_data: Some(frame),
        }
    }
}

/// A texture owned by a video backend.
///
/// Loading is split in two: `start_loading` marks the texture as pending
/// (so it can be queued before the upload happens) and `load` performs the
/// upload. A texture is drawable once `is_loaded` returns true.
pub trait Texture: Send + Sync + fmt::Debug {
    fn size(&self) -> Size;

    fn start_loading(&self);

    fn load(&self, descriptor: TextureDescriptor) -> Result<()>;

    fn is_loaded(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// An offscreen target that draws land in.
pub trait RenderTarget: Send + Sync {
    /// Texture bound to colour attachment 0.
    fn texture(&self) -> &Arc<dyn Texture>;

    fn viewport(&self) -> Rect;
}

/// Factory for textures and render targets.
pub trait VideoBackend: Send + Sync {
    fn create_texture(&self, size: Size) -> Result<Arc<dyn Texture>>;

    fn create_render_target(
        &self,
        texture: Arc<dyn Texture>,
        viewport: Rect,
    ) -> Result<Box<dyn RenderTarget>>;
}

/// Per-frame drawing context handed to `render`.
pub trait RenderContext {
    fn draw_sprite(&mut self, target: &dyn RenderTarget, sprite: &Sprite) -> Result<()>;
}
