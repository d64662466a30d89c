//! Moviola GPU - video backends
//!
//! The player only talks to the traits in [`backend`]. Two implementations
//! are provided:
//! - `WgpuVideoBackend`: textures on the GPU via wgpu
//! - `SoftwareVideoBackend`: CPU pixel buffers, used headless and in tests

pub mod backend;
pub mod context;
pub mod convert;
pub mod software;
pub mod sprite;
pub mod texture;
pub mod texture_pool;
pub mod wgpu_backend;

pub use backend::{RenderContext, RenderTarget, Texture, TextureDescriptor, VideoBackend};
pub use context::GpuContext;
pub use software::{SoftwareRenderContext, SoftwareTexture, SoftwareVideoBackend};
pub use sprite::{Material, Sprite};
pub use texture::GpuTexture;
pub use texture_pool::TexturePool;
pub use wgpu_backend::{WgpuRenderContext, WgpuTexture, WgpuVideoBackend};
