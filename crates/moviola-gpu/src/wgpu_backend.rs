//! wgpu implementation of the video backend.
//!
//! Frame textures and render targets share `GpuTexture::FORMAT`, so drawing
//! a frame sprite is a texture-to-texture copy. Solid colour sprites clear
//! the target.

use crate::backend::{RenderContext, RenderTarget, Texture, TextureDescriptor, VideoBackend};
use crate::context::GpuContext;
use crate::convert::into_rgba8;
use crate::sprite::{Material, Sprite};
use crate::texture::GpuTexture;
use moviola_core::{MoviolaError, Rect, Result, Size};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Texture whose GPU storage is created on `load`.
pub struct WgpuTexture {
    size: Size,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    gpu: Mutex<Option<GpuTexture>>,
    loading: AtomicBool,
    loaded: AtomicBool,
}

impl fmt::Debug for WgpuTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuTexture")
            .field("size", &self.size)
            .field("loaded", &self.is_loaded())
            .field("loading", &self.loading.load(Ordering::Relaxed))
            .finish()
    }
}

impl WgpuTexture {
    /// Run `f` against the GPU storage, if loaded.
    pub fn with_gpu<R>(&self, f: impl FnOnce(&GpuTexture) -> R) -> Option<R> {
        self.gpu.lock().as_ref().map(f)
    }
}

impl Texture for WgpuTexture {
    fn size(&self) -> Size {
        self.size
    }

    fn start_loading(&self) {
        self.loaded.store(false, Ordering::Release);
        self.loading.store(true, Ordering::Release);
    }

    fn load(&self, descriptor: TextureDescriptor) -> Result<()> {
        // A failed upload leaves storage holding stale or no pixels
        let result = self.load_inner(descriptor);
        self.loaded.store(result.is_ok(), Ordering::Release);
        self.loading.store(false, Ordering::Release);
        result
    }

    fn is_loaded(&self) -> bool {
        !self.loading.load(Ordering::Acquire) && self.loaded.load(Ordering::Acquire)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl WgpuTexture {
    fn load_inner(&self, descriptor: TextureDescriptor) -> Result<()> {
        if descriptor.size != self.size {
            return Err(MoviolaError::InvalidParameter(format!(
                "descriptor size {} doesn't match texture size {}",
                descriptor.size, self.size
            )));
        }

        let mut gpu = self.gpu.lock();
        // Recycled textures keep their storage; only render targets need a
        // fresh allocation with attachment usage.
        if gpu.is_none() || descriptor.is_render_target {
            *gpu = Some(if descriptor.is_render_target {
                GpuTexture::render_target(&self.device, self.size)
            } else {
                GpuTexture::for_video_frame(&self.device, self.size)
            });
        }

        if let (Some(tex), Some(frame)) = (gpu.as_ref(), descriptor.pixel_data) {
            tex.upload_frame(&self.queue, &into_rgba8(frame))?;
        }
        Ok(())
    }
}

/// Render target wrapping a `WgpuTexture`.
pub struct WgpuRenderTarget {
    texture: Arc<dyn Texture>,
    viewport: Rect,
}

impl RenderTarget for WgpuRenderTarget {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }
}

/// Video backend creating wgpu textures.
pub struct WgpuVideoBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl WgpuVideoBackend {
    pub fn new(context: &GpuContext) -> Self {
        Self {
            device: Arc::clone(&context.device),
            queue: Arc::clone(&context.queue),
        }
    }

    /// Render context drawing with this backend's device.
    pub fn render_context(&self) -> WgpuRenderContext {
        WgpuRenderContext {
            device: Arc::clone(&self.device),
            queue: Arc::clone(&self.queue),
        }
    }
}

impl VideoBackend for WgpuVideoBackend {
    fn create_texture(&self, size: Size) -> Result<Arc<dyn Texture>> {
        let max = self.device.limits().max_texture_dimension_2d;
        if size.is_empty() || size.width > max || size.height > max {
            return Err(MoviolaError::Gpu(format!(
                "texture size {} outside device limits (max {})",
                size, max
            )));
        }
        Ok(Arc::new(WgpuTexture {
            size,
            device: Arc::clone(&self.device),
            queue: Arc::clone(&self.queue),
            gpu: Mutex::new(None),
            loading: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        }))
    }

    fn create_render_target(
        &self,
        texture: Arc<dyn Texture>,
        viewport: Rect,
    ) -> Result<Box<dyn RenderTarget>> {
        if texture.as_any().downcast_ref::<WgpuTexture>().is_none() {
            return Err(MoviolaError::InvalidParameter(
                "render target needs a wgpu texture".to_string(),
            ));
        }
        Ok(Box::new(WgpuRenderTarget { texture, viewport }))
    }
}

/// Records one command buffer per sprite.
pub struct WgpuRenderContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

fn as_wgpu(texture: &Arc<dyn Texture>) -> Result<&WgpuTexture> {
    texture
        .as_any()
        .downcast_ref::<WgpuTexture>()
        .ok_or_else(|| MoviolaError::Gpu("not a wgpu texture".to_string()))
}

impl RenderContext for WgpuRenderContext {
    fn draw_sprite(&mut self, target: &dyn RenderTarget, sprite: &Sprite) -> Result<()> {
        let dst = as_wgpu(target.texture())?;
        let dst_guard = dst.gpu.lock();
        let dst_gpu = dst_guard
            .as_ref()
            .ok_or_else(|| MoviolaError::Gpu("render target is not loaded".to_string()))?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Moviola Sprite"),
            });

        match (&sprite.image, sprite.material) {
            (Some(image), Material::Sprite | Material::Video) => {
                if Arc::ptr_eq(image, target.texture()) {
                    return Ok(());
                }
                let src = as_wgpu(image)?;
                let src_guard = src.gpu.lock();
                let src_gpu = src_guard
                    .as_ref()
                    .ok_or_else(|| MoviolaError::Gpu("sprite image is not loaded".to_string()))?;

                let viewport = target.viewport();
                let extent = src_gpu.size.min(sprite.size).min(viewport.size());
                encoder.copy_texture_to_texture(
                    wgpu::ImageCopyTexture {
                        texture: &src_gpu.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::ImageCopyTexture {
                        texture: &dst_gpu.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d {
                            x: viewport.x.max(0) as u32,
                            y: viewport.y.max(0) as u32,
                            z: 0,
                        },
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::Extent3d {
                        width: extent.width.min(dst_gpu.size.width.saturating_sub(viewport.x.max(0) as u32)),
                        height: extent.height.min(dst_gpu.size.height.saturating_sub(viewport.y.max(0) as u32)),
                        depth_or_array_layers: 1,
                    },
                );
            }
            _ => {
                let [r, g, b, a] = sprite.colour;
                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Solid Colour"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &dst_gpu.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: r as f64,
                                g: g as f64,
                                b: b as f64,
                                a: a as f64,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
        }

        self.queue.submit(Some(encoder.finish()));
        debug!("Sprite drawn into {} target", dst_gpu.size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviola_core::{FrameBuffer, PixelFormat};

    // Skips quietly on machines without an adapter
    fn backend() -> Option<WgpuVideoBackend> {
        GpuContext::new_blocking()
            .ok()
            .map(|context| WgpuVideoBackend::new(&context))
    }

    #[test]
    fn test_nv12_frame_loads() {
        let Some(backend) = backend() else { return };
        let tex = backend.create_texture(Size::new(4, 4)).unwrap();
        let mut frame = FrameBuffer::new(4, 4, PixelFormat::Nv12);
        frame.planes[0].data.fill(126);
        frame.planes[1].data.fill(128);

        tex.start_loading();
        assert!(!tex.is_loaded());
        tex.load(TextureDescriptor::from_frame(frame)).unwrap();
        assert!(tex.is_loaded());
    }

    #[test]
    fn test_failed_upload_is_not_loaded() {
        let Some(backend) = backend() else { return };
        let tex = backend.create_texture(Size::new(4, 4)).unwrap();
        tex.start_loading();
        tex.load(TextureDescriptor::from_frame(FrameBuffer::test_pattern(4, 4, 0)))
            .unwrap();
        assert!(tex.is_loaded());

        // Recycled storage with a frame that doesn't fit it
        let descriptor = TextureDescriptor {
            pixel_data: Some(FrameBuffer::test_pattern(8, 8, 0)),
            ..TextureDescriptor::new(Size::new(4, 4), PixelFormat::Rgba8)
        };
        tex.start_loading();
        assert!(tex.load(descriptor).is_err());
        assert!(!tex.is_loaded());
    }
}
