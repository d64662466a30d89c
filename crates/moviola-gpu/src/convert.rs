//! Pixel format conversion for backends that only store RGBA8.

use moviola_core::{FrameBuffer, PixelFormat};

/// Convert `frame` to RGBA8, passing RGBA8 frames through untouched.
pub fn into_rgba8(frame: FrameBuffer) -> FrameBuffer {
    match frame.format {
        PixelFormat::Rgba8 => frame,
        PixelFormat::Nv12 => nv12_to_rgba(&frame),
    }
}

/// BT.601 limited range NV12 to RGBA8.
pub fn nv12_to_rgba(frame: &FrameBuffer) -> FrameBuffer {
    let mut out = FrameBuffer::new(frame.width, frame.height, PixelFormat::Rgba8);
    let y_plane = &frame.planes[0];
    let uv_plane = &frame.planes[1];

    for y in 0..frame.height {
        let luma = y_plane.row(y);
        let chroma = uv_plane.row((y / 2).min(uv_plane.height.saturating_sub(1)));
        let dst = out.primary_plane_mut().row_mut(y);
        for x in 0..frame.width as usize {
            let c = 1.164 * (luma[x] as f32 - 16.0);
            let uv = (x / 2) * 2;
            let (u, v) = match chroma.get(uv..uv + 2) {
                Some(pair) => (pair[0] as f32 - 128.0, pair[1] as f32 - 128.0),
                None => (0.0, 0.0),
            };
            let r = c + 1.596 * v;
            let g = c - 0.392 * u - 0.813 * v;
            let b = c + 2.017 * u;
            dst[x * 4..x * 4 + 4].copy_from_slice(&[
                r.clamp(0.0, 255.0) as u8,
                g.clamp(0.0, 255.0) as u8,
                b.clamp(0.0, 255.0) as u8,
                255,
            ]);
        }
    }
    out
}
