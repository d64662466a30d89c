//! Integration tests for movie audio through the mixing engine.

use crate::support::{manual_rig, wait_for, Rig};
use moviola_core::FrameBuffer;
use moviola_media::FrameSink;
use moviola_player::PlayerState;

fn fill_and_play(rig: &mut Rig, sample: f32) {
    rig.player.play().unwrap();
    let sink = rig.player.sink();
    for t in 0..7 {
        sink.on_video_frame_available(t as f64, FrameBuffer::test_pattern(16, 8, 0));
    }
    sink.on_audio_frame_available(0.0, &vec![sample; 20_000 * 2]);
    assert!(wait_for(|| rig.player.queued_frames() == 7));
    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
}

#[test]
fn voice_starts_with_playback_at_half_volume() {
    let mut rig = manual_rig(true, true);
    rig.player.play().unwrap();
    assert_eq!(rig.audio.active_voices(), 0);
    rig.player.reset();

    fill_and_play(&mut rig, 0.4);
    assert_eq!(rig.audio.active_voices(), 1);

    assert_eq!(rig.audio.pump(256), 256);
    let mut out = vec![0.0f32; 256 * 2];
    assert_eq!(rig.audio.output_buffer().read(&mut out), 512);
    for s in out {
        assert!((s - 0.2).abs() < 1e-4, "expected 0.2, got {}", s);
    }
}

#[test]
fn engine_drains_the_movie_clip() {
    let mut rig = manual_rig(true, true);
    fill_and_play(&mut rig, 0.1);
    let clip = rig.player.audio_clip().unwrap();
    assert_eq!(clip.samples_left(), 20_000);

    rig.audio.pump(1_000);
    assert_eq!(clip.samples_left(), 19_000);
    assert!(rig.player.needs_more_audio_frames());
}

#[test]
fn pause_and_reset_stop_the_voice() {
    let mut rig = manual_rig(true, true);
    fill_and_play(&mut rig, 0.1);

    rig.player.pause();
    assert_eq!(rig.audio.active_voices(), 0);
    // The clip survives a pause
    assert!(rig.player.audio_clip().is_some());

    rig.player.play().unwrap();
    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::StartingToPlay);
    rig.player.reset();
    assert!(rig.player.audio_clip().is_none());
    assert_eq!(rig.audio.active_voices(), 0);
}

#[test]
fn silent_movie_never_opens_a_voice() {
    let mut rig = manual_rig(true, false);
    rig.player.play().unwrap();
    let sink = rig.player.sink();
    for t in 0..7 {
        sink.on_video_frame_available(t as f64, FrameBuffer::test_pattern(16, 8, 0));
    }
    assert!(wait_for(|| rig.player.queued_frames() == 7));

    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    assert!(rig.player.audio_clip().is_none());
    assert_eq!(rig.audio.active_voices(), 0);
}
