//! Texture pool for frame texture reuse.
//!
//! Avoids asking the backend for a new texture per decoded frame by keeping
//! a bounded free-list of textures keyed by size.

use crate::backend::{Texture, VideoBackend};
use moviola_core::{Result, Size};
use std::collections::HashMap;
use std::sync::Arc;

/// Pool of reusable textures.
pub struct TexturePool {
    /// Available (free) textures, keyed by size.
    free: HashMap<Size, Vec<Arc<dyn Texture>>>,
    /// Total number of pooled textures.
    count: usize,
    /// Maximum number of pooled textures.
    max_textures: usize,
}

impl TexturePool {
    /// Create a new texture pool holding at most `max_textures`.
    pub fn new(max_textures: usize) -> Self {
        Self {
            free: HashMap::new(),
            count: 0,
            max_textures,
        }
    }

    /// Take a pooled texture of the given size, if any.
    pub fn acquire(&mut self, size: Size) -> Option<Arc<dyn Texture>> {
        let textures = self.free.get_mut(&size)?;
        let tex = textures.pop()?;
        if textures.is_empty() {
            self.free.remove(&size);
        }
        self.count -= 1;
        Some(tex)
    }

    /// Take a pooled texture or create a new one through `backend`.
    pub fn acquire_or_create(
        &mut self,
        backend: &dyn VideoBackend,
        size: Size,
    ) -> Result<Arc<dyn Texture>> {
        match self.acquire(size) {
            Some(tex) => Ok(tex),
            None => backend.create_texture(size),
        }
    }

    /// Return a texture to the pool. Returns false if the pool is full and
    /// the texture was dropped.
    pub fn release(&mut self, texture: Arc<dyn Texture>) -> bool {
        if self.count >= self.max_textures {
            return false;
        }
        self.count += 1;
        self.free.entry(texture.size()).or_default().push(texture);
        true
    }

    /// Number of textures in the pool.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if the pool holds no textures.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
