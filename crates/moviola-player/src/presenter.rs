//! Presentation: copies the current frame into a persistent render target.
//!
//! The player hands out a sprite of the render target, not of the frame
//! texture, so the picture stays valid after the frame texture goes back
//! to the recycle pool.

use moviola_core::{Rect, Result, Size};
use moviola_gpu::{
    Material, RenderContext, RenderTarget, Sprite, Texture, TextureDescriptor, VideoBackend,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct Presenter {
    render_texture: Option<Arc<dyn Texture>>,
    render_target: Option<Box<dyn RenderTarget>>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a render target of `size` exists.
    ///
    /// An existing target of the same size is kept along with its picture.
    pub fn prepare(&mut self, backend: &dyn VideoBackend, size: Size) -> Result<()> {
        if let Some(texture) = &self.render_texture {
            if texture.size() == size {
                return Ok(());
            }
        }

        let texture = backend.create_texture(size)?;
        texture.start_loading();
        texture.load(TextureDescriptor::render_target(size))?;
        let target = backend.create_render_target(Arc::clone(&texture), Rect::from_size(size))?;

        debug!("Render target {} ready", size);
        self.render_texture = Some(texture);
        self.render_target = Some(target);
        Ok(())
    }

    /// Draw `frame` into the render target.
    ///
    /// Returns false without drawing if there is no target yet.
    pub fn present(
        &self,
        rc: &mut dyn RenderContext,
        frame: &Arc<dyn Texture>,
        size: Size,
    ) -> Result<bool> {
        let Some(target) = &self.render_target else {
            return Ok(false);
        };
        let sprite = Sprite::with_image(Arc::clone(frame), Material::Video, size);
        rc.draw_sprite(target.as_ref(), &sprite)?;
        Ok(true)
    }

    /// Sprite showing the render target, or black before one exists.
    pub fn sprite(&self, size: Size) -> Sprite {
        match &self.render_texture {
            Some(texture) => Sprite::with_image(Arc::clone(texture), Material::Sprite, size),
            None => Sprite::solid_colour([0.0, 0.0, 0.0, 1.0], size),
        }
    }
}
