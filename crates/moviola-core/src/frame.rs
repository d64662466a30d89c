//! Decoded video frames in CPU memory.
//!
//! A `FrameBuffer` is what a decoder hands to the player. The player never
//! touches the pixels itself; it passes the buffer to a texture upload.

use crate::error::{MoviolaError, Result};
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Pixel layout of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (32 bits per pixel)
    #[default]
    Rgba8,
    /// NV12: full resolution Y plane + half resolution interleaved UV plane
    Nv12,
}

impl PixelFormat {
    /// Number of planes for this format.
    pub fn plane_count(self) -> usize {
        match self {
            Self::Rgba8 => 1,
            Self::Nv12 => 2,
        }
    }

    /// Tightly packed byte size of a frame of this format.
    pub fn frame_size(self, size: Size) -> usize {
        match self {
            Self::Rgba8 => size.area() * 4,
            Self::Nv12 => size.area() + (size.width as usize / 2) * (size.height as usize / 2) * 2,
        }
    }
}

/// A plane of pixel data with stride information.
#[derive(Debug, Clone)]
pub struct FramePlane {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Bytes per row (may include padding)
    pub stride: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per pixel in this plane
    pub bytes_per_pixel: usize,
}

impl FramePlane {
    /// Create a zeroed plane with 64-byte aligned rows.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        let min_stride = width as usize * bytes_per_pixel;
        let stride = (min_stride + 63) & !63;
        Self {
            data: vec![0u8; stride * height as usize],
            stride,
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// Get a row of pixel data, without padding.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.bytes_per_pixel]
    }

    /// Get a mutable row of pixel data, without padding.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * self.bytes_per_pixel;
        &mut self.data[start..start + len]
    }
}

/// A decoded video frame in CPU memory.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Pixel format
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data planes (1-2 depending on format)
    pub planes: SmallVec<[FramePlane; 2]>,
}

impl FrameBuffer {
    /// Create a zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let planes = match format {
            PixelFormat::Rgba8 => smallvec::smallvec![FramePlane::new(width, height, 4)],
            PixelFormat::Nv12 => smallvec::smallvec![
                FramePlane::new(width, height, 1),         // Y
                FramePlane::new(width / 2, height / 2, 2), // UV interleaved
            ],
        };

        Self {
            format,
            width,
            height,
            planes,
        }
    }

    /// Wrap tightly packed RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = PixelFormat::Rgba8.frame_size(Size::new(width, height));
        if pixels.len() != expected {
            return Err(MoviolaError::InvalidParameter(format!(
                "RGBA frame {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        let row_len = width as usize * 4;
        let plane = frame.primary_plane_mut();
        for (y, src) in pixels.chunks_exact(row_len).enumerate() {
            plane.row_mut(y as u32).copy_from_slice(src);
        }
        Ok(frame)
    }

    /// Frame dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Total memory usage of this frame in bytes.
    pub fn memory_size(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }

    /// Get the primary plane (plane 0).
    #[inline]
    pub fn primary_plane(&self) -> &FramePlane {
        &self.planes[0]
    }

    /// Get the primary plane mutably.
    #[inline]
    pub fn primary_plane_mut(&mut self) -> &mut FramePlane {
        &mut self.planes[0]
    }

    /// RGBA value of a pixel. `None` for non-RGBA frames or out of bounds.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.format != PixelFormat::Rgba8 || x >= self.width || y >= self.height {
            return None;
        }
        let row = self.primary_plane().row(y);
        let i = x as usize * 4;
        Some([row[i], row[i + 1], row[i + 2], row[i + 3]])
    }

    /// Fill an RGBA8 frame with a single colour.
    pub fn fill_rgba(&mut self, colour: [u8; 4]) {
        if self.format != PixelFormat::Rgba8 {
            return;
        }
        let height = self.height;
        let plane = self.primary_plane_mut();
        for y in 0..height {
            for px in plane.row_mut(y).chunks_exact_mut(4) {
                px.copy_from_slice(&colour);
            }
        }
    }

    /// Colour bars, shifted right by `offset` pixels.
    ///
    /// Used by the synthetic decoder so consecutive frames differ.
    pub fn test_pattern(width: u32, height: u32, offset: u32) -> Self {
        const BARS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];

        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        if width == 0 {
            return frame;
        }
        let plane = frame.primary_plane_mut();
        for y in 0..height {
            let row = plane.row_mut(y);
            for x in 0..width {
                let bar = ((x + offset) % width) * 8 / width;
                let i = x as usize * 4;
                row[i..i + 4].copy_from_slice(&BARS[bar as usize]);
            }
        }
        frame
    }
}

/// Arc-wrapped frame buffer for shared ownership.
pub type SharedFrameBuffer = Arc<FrameBuffer>;
