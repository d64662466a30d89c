//! wgpu texture wrapper.

use moviola_core::{FrameBuffer, MoviolaError, PixelFormat, Result, Size};

/// A GPU texture that can hold a movie frame or act as a render target.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: Size,
    pub format: wgpu::TextureFormat,
}

impl GpuTexture {
    /// Format used for both frame textures and render targets, so frames
    /// can be copied straight into a target.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a new GPU texture with the given dimensions.
    pub fn new(
        device: &wgpu::Device,
        size: Size,
        usage: wgpu::TextureUsages,
        label: Option<&str>,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
            format: Self::FORMAT,
        }
    }

    /// Create a texture suitable for movie frame upload.
    pub fn for_video_frame(device: &wgpu::Device, size: Size) -> Self {
        Self::new(
            device,
            size,
            wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            Some("Movie Frame Texture"),
        )
    }

    /// Create a render target texture.
    pub fn render_target(device: &wgpu::Device, size: Size) -> Self {
        Self::new(
            device,
            size,
            wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            Some("Movie Render Target"),
        )
    }

    /// Upload an RGBA8 frame to this texture.
    pub fn upload_frame(&self, queue: &wgpu::Queue, frame: &FrameBuffer) -> Result<()> {
        if frame.format != PixelFormat::Rgba8 {
            return Err(MoviolaError::UnsupportedFormat(format!(
                "{:?} frames can't be uploaded, convert to RGBA8 first",
                frame.format
            )));
        }

        if frame.size() != self.size {
            return Err(MoviolaError::Gpu(format!(
                "Frame size {} doesn't match texture size {}",
                frame.size(),
                self.size
            )));
        }

        let plane = frame.primary_plane();

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &plane.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(plane.stride as u32),
                rows_per_image: Some(self.size.height),
            },
            wgpu::Extent3d {
                width: self.size.width,
                height: self.size.height,
                depth_or_array_layers: 1,
            },
        );

        Ok(())
    }

    /// Memory usage estimate in bytes.
    pub fn memory_size(&self) -> usize {
        self.size.area() * 4
    }
}
