//! Integration tests for frame upload, presentation and texture reuse.
//!
//! Uses the software backend only; no GPU required.

use crate::support::{manual_rig, wait_for, Rig};
use moviola_core::{FrameBuffer, PixelFormat, Size};
use moviola_gpu::{Material, SoftwareRenderContext, SoftwareTexture};
use moviola_media::FrameSink;
use moviola_player::PlayerState;
use std::thread;
use std::time::{Duration, Instant};

/// Render until the current frame has been drawn.
fn render_current(rig: &mut Rig, rc: &mut SoftwareRenderContext) {
    let before = rc.draw_calls();
    let deadline = Instant::now() + Duration::from_secs(5);
    while rc.draw_calls() == before && Instant::now() < deadline {
        rig.player.render(rc).unwrap();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(rc.draw_calls(), before + 1);
}

fn sprite_pixel(rig: &Rig, x: u32, y: u32) -> Option<[u8; 4]> {
    let sprite = rig.player.sprite();
    let image = sprite.image?;
    let texture = image.as_any().downcast_ref::<SoftwareTexture>()?;
    texture.rgba_at(x, y)
}

#[test]
fn rendered_sprite_shows_the_current_frame() {
    let mut rig = manual_rig(true, false);
    let mut rc = SoftwareRenderContext::new();

    // Before playback the sprite is plain black
    assert_eq!(rig.player.sprite().material, Material::SolidColour);

    rig.player.play().unwrap();
    let mut red = FrameBuffer::new(16, 8, PixelFormat::Rgba8);
    red.fill_rgba([255, 0, 0, 255]);
    let mut blue = FrameBuffer::new(16, 8, PixelFormat::Rgba8);
    blue.fill_rgba([0, 0, 255, 255]);

    let sink = rig.player.sink();
    sink.on_video_frame_available(0.0, red);
    sink.on_video_frame_available(1.0, blue);
    assert!(wait_for(|| rig.player.queued_frames() == 2));

    rig.player.update(0.0);
    render_current(&mut rig, &mut rc);
    let sprite = rig.player.sprite();
    assert_eq!(sprite.material, Material::Sprite);
    assert_eq!(sprite.size, Size::new(16, 8));
    assert_eq!(sprite_pixel(&rig, 3, 3), Some([255, 0, 0, 255]));

    // Still buffering, so the clock stays put and 1.0 isn't due
    rig.player.update(1.0);
    assert!(!rig.player.has_current_frame());
    assert_eq!(sprite_pixel(&rig, 3, 3), Some([255, 0, 0, 255]));
}

#[test]
fn nv12_frames_are_converted_for_display() {
    let mut rig = manual_rig(true, false);
    let mut rc = SoftwareRenderContext::new();
    rig.player.play().unwrap();

    let mut frame = FrameBuffer::new(16, 8, PixelFormat::Nv12);
    frame.planes[0].data.fill(235);
    frame.planes[1].data.fill(128);
    rig.player.sink().on_video_frame_available(0.0, frame);
    assert!(wait_for(|| rig.player.queued_frames() == 1));

    rig.player.update(0.0);
    render_current(&mut rig, &mut rc);
    let [r, g, b, a] = sprite_pixel(&rig, 5, 5).unwrap();
    assert!(r > 250 && g > 250 && b > 250);
    assert_eq!(a, 255);
}

#[test]
fn drawn_frames_are_recycled() {
    let mut rig = manual_rig(true, false);
    let mut rc = SoftwareRenderContext::new();
    rig.player.play().unwrap();
    let sink = rig.player.sink();

    // One render target plus one texture per frame so far
    sink.on_video_frame_available(0.0, FrameBuffer::test_pattern(16, 8, 0));
    assert!(wait_for(|| rig.player.queued_frames() == 1));
    rig.player.update(0.0);
    render_current(&mut rig, &mut rc);
    assert_eq!(rig.video.textures_created(), 2);

    // The drawn frame's texture is reused for the next one
    sink.on_video_frame_available(0.0, FrameBuffer::test_pattern(16, 8, 4));
    assert!(wait_for(|| rig.player.queued_frames() == 1));
    assert_eq!(rig.video.textures_created(), 2);
}

#[test]
fn render_target_survives_pause() {
    let mut rig = manual_rig(true, false);
    rig.player.play().unwrap();
    let sink = rig.player.sink();
    for t in 0..7 {
        sink.on_video_frame_available(t as f64, FrameBuffer::test_pattern(16, 8, 0));
    }
    assert!(wait_for(|| rig.player.queued_frames() == 7));
    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    let created = rig.video.textures_created();

    rig.player.pause();
    rig.player.play().unwrap();
    assert_eq!(rig.video.textures_created(), created);
}

#[test]
fn resized_video_gets_a_new_target_on_play() {
    let mut rig = manual_rig(true, false);
    rig.player.play().unwrap();
    rig.player.reset();

    rig.player.set_video_size(Size::new(8, 8));
    assert_eq!(rig.player.size(), Size::new(8, 8));
    rig.player.play().unwrap();
    assert_eq!(rig.player.sprite().size, Size::new(8, 8));
    let image = rig.player.sprite().image.unwrap();
    assert_eq!(image.size(), Size::new(8, 8));
}
