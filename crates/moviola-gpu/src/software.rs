//! CPU video backend.
//!
//! Textures are RGBA8 `FrameBuffer`s. Drawing is a nearest-neighbour blit
//! clipped to the target viewport. Good enough for headless playback and
//! for tests; no GPU required.

use crate::backend::{RenderContext, RenderTarget, Texture, TextureDescriptor, VideoBackend};
use crate::convert::into_rgba8;
use crate::sprite::{Material, Sprite};
use moviola_core::{FrameBuffer, MoviolaError, PixelFormat, Rect, Result, Size};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Texture stored as RGBA8 pixels in CPU memory.
#[derive(Debug)]
pub struct SoftwareTexture {
    size: Size,
    pixels: Mutex<Option<FrameBuffer>>,
    loading: AtomicBool,
    loaded: AtomicBool,
}

impl SoftwareTexture {
    /// Create an empty (not loaded) texture.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: Mutex::new(None),
            loading: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        }
    }

    /// True between `start_loading` and the end of `load`.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Copy of the current pixels, if loaded.
    pub fn pixels(&self) -> Option<FrameBuffer> {
        self.pixels.lock().clone()
    }

    /// RGBA value of one pixel, if loaded and in bounds.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.lock().as_ref().and_then(|p| p.rgba_at(x, y))
    }
}

impl Texture for SoftwareTexture {
    fn size(&self) -> Size {
        self.size
    }

    fn start_loading(&self) {
        self.loaded.store(false, Ordering::Release);
        self.loading.store(true, Ordering::Release);
    }

    fn load(&self, descriptor: TextureDescriptor) -> Result<()> {
        if descriptor.size != self.size {
            self.loading.store(false, Ordering::Release);
            return Err(MoviolaError::InvalidParameter(format!(
                "descriptor size {} doesn't match texture size {}",
                descriptor.size, self.size
            )));
        }

        let rgba = match descriptor.pixel_data {
            Some(frame) => into_rgba8(frame),
            None => FrameBuffer::new(self.size.width, self.size.height, PixelFormat::Rgba8),
        };

        *self.pixels.lock() = Some(rgba);
        self.loading.store(false, Ordering::Release);
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Render target backed by a `SoftwareTexture`.
pub struct SoftwareRenderTarget {
    texture: Arc<dyn Texture>,
    viewport: Rect,
}

impl RenderTarget for SoftwareRenderTarget {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }
}

/// Backend creating `SoftwareTexture`s.
#[derive(Debug, Default)]
pub struct SoftwareVideoBackend {
    textures_created: AtomicUsize,
}

impl SoftwareVideoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures created so far.
    pub fn textures_created(&self) -> usize {
        self.textures_created.load(Ordering::Relaxed)
    }
}

impl VideoBackend for SoftwareVideoBackend {
    fn create_texture(&self, size: Size) -> Result<Arc<dyn Texture>> {
        if size.is_empty() {
            return Err(MoviolaError::InvalidParameter(format!(
                "cannot create a {} texture",
                size
            )));
        }
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        trace!("Software texture {} created", size);
        Ok(Arc::new(SoftwareTexture::new(size)))
    }

    fn create_render_target(
        &self,
        texture: Arc<dyn Texture>,
        viewport: Rect,
    ) -> Result<Box<dyn RenderTarget>> {
        if texture.as_any().downcast_ref::<SoftwareTexture>().is_none() {
            return Err(MoviolaError::InvalidParameter(
                "render target needs a software texture".to_string(),
            ));
        }
        Ok(Box::new(SoftwareRenderTarget { texture, viewport }))
    }
}

/// Draws sprites into software render targets.
#[derive(Debug, Default)]
pub struct SoftwareRenderContext {
    draw_calls: usize,
}

impl SoftwareRenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sprites drawn through this context.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }
}

impl RenderContext for SoftwareRenderContext {
    fn draw_sprite(&mut self, target: &dyn RenderTarget, sprite: &Sprite) -> Result<()> {
        let dst_tex = target
            .texture()
            .as_any()
            .downcast_ref::<SoftwareTexture>()
            .ok_or_else(|| MoviolaError::Gpu("target is not a software texture".to_string()))?;

        let source = match (&sprite.image, sprite.material) {
            (_, Material::SolidColour) | (None, _) => None,
            (Some(image), _) => {
                let tex = image
                    .as_any()
                    .downcast_ref::<SoftwareTexture>()
                    .ok_or_else(|| {
                        MoviolaError::Gpu("sprite image is not a software texture".to_string())
                    })?;
                Some(tex.pixels().ok_or_else(|| {
                    MoviolaError::Gpu("sprite image is not loaded".to_string())
                })?)
            }
        };

        let mut guard = dst_tex.pixels.lock();
        let dst = guard
            .as_mut()
            .ok_or_else(|| MoviolaError::Gpu("render target is not loaded".to_string()))?;

        let viewport = target.viewport();
        let area = sprite.size.min(viewport.size());
        let colour = sprite.colour_rgba8();

        for y in 0..area.height {
            let dy = viewport.y + y as i32;
            if dy < 0 || dy as u32 >= dst.height {
                continue;
            }
            for x in 0..area.width {
                let dx = viewport.x + x as i32;
                if dx < 0 || dx as u32 >= dst.width {
                    continue;
                }
                let px = match &source {
                    Some(src) => {
                        let sx = (x as u64 * src.width as u64 / sprite.size.width as u64) as u32;
                        let sy = (y as u64 * src.height as u64 / sprite.size.height as u64) as u32;
                        src.rgba_at(sx, sy).unwrap_or(colour)
                    }
                    None => colour,
                };
                let row = dst.primary_plane_mut().row_mut(dy as u32);
                let i = dx as usize * 4;
                row[i..i + 4].copy_from_slice(&px);
            }
        }

        self.draw_calls += 1;
        Ok(())
    }
}
