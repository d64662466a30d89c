//! Integration tests for playback state and frame promotion.

use crate::support::{manual_rig, pattern_decoder, rig, wait_for, Rig};
use moviola_core::FrameBuffer;
use moviola_gpu::SoftwareRenderContext;
use moviola_media::{FrameSink, StreamType};
use moviola_player::{MoviePlayer, PlayerState};

fn deliver_frames(player: &MoviePlayer, times: impl IntoIterator<Item = f64>) {
    let sink = player.sink();
    let mut expected = player.queued_frames();
    for time in times {
        sink.on_video_frame_available(time, FrameBuffer::test_pattern(16, 8, time as u32));
        expected += 1;
    }
    assert!(wait_for(|| player.queued_frames() == expected));
}

fn deliver_audio(player: &MoviePlayer, frames: usize) {
    player
        .sink()
        .on_audio_frame_available(0.0, &vec![0.1f32; frames * 2]);
}

/// Play with both buffers filled to their high-water marks and step once.
fn start_playing(rig: &mut Rig) {
    rig.player.play().unwrap();
    deliver_frames(&rig.player, (0..7).map(f64::from));
    deliver_audio(&rig.player, 20_000);
    rig.player.update(0.0);
}

#[test]
fn full_buffers_start_playback_and_clock_promotes() {
    let mut rig = manual_rig(true, true);
    rig.player.play().unwrap();
    assert_eq!(rig.player.state(), PlayerState::StartingToPlay);

    deliver_frames(&rig.player, (0..7).map(f64::from));
    deliver_audio(&rig.player, 20_000);
    assert!(!rig.player.needs_more_video_frames());
    assert!(!rig.player.needs_more_audio_frames());

    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    assert!(rig.player.is_audio_playing());
    assert_eq!(rig.player.current_frame_time(), Some(0.0));

    rig.player.update(3.0);
    assert_eq!(rig.player.time(), 3.0);
    assert_eq!(rig.player.current_frame_time(), Some(3.0));
    assert_eq!(rig.player.queued_frames(), 3);
}

#[test]
fn buffering_waits_for_both_streams() {
    let mut rig = manual_rig(true, true);
    rig.player.play().unwrap();
    deliver_frames(&rig.player, (0..7).map(f64::from));

    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::StartingToPlay);
    assert!(rig.player.needs_more_audio_frames());
    assert!(!rig.player.is_audio_playing());
}

#[test]
fn eof_and_drained_queue_finish_exactly_once() {
    let mut rig = manual_rig(true, true);
    start_playing(&mut rig);
    rig.player.sink().set_eof(StreamType::Video);

    rig.player.update(4.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    assert_eq!(rig.player.current_frame_time(), Some(4.0));

    rig.player.update(10.0);
    assert_eq!(rig.player.state(), PlayerState::Finished);
    assert_eq!(rig.player.current_frame_time(), Some(6.0));
    assert!(!rig.player.is_audio_playing());
    assert_eq!(rig.audio.active_voices(), 0);
    let finished_at = rig.player.time();

    for _ in 0..3 {
        rig.player.update(1.0);
        assert_eq!(rig.player.state(), PlayerState::Finished);
    }
    assert_eq!(rig.player.time(), finished_at);

    // Finished only leaves through reset
    rig.player.play().unwrap();
    assert_eq!(rig.player.state(), PlayerState::Finished);
}

#[test]
fn short_movie_plays_before_finishing() {
    let mut rig = manual_rig(true, true);
    rig.player.play().unwrap();
    deliver_frames(&rig.player, [0.0]);
    deliver_audio(&rig.player, 20_000);
    rig.player.sink().set_eof(StreamType::Video);

    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    assert!(rig.player.is_audio_playing());
    assert_eq!(rig.audio.active_voices(), 1);
    assert_eq!(rig.player.current_frame_time(), Some(0.0));

    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Finished);
    assert!(!rig.player.is_audio_playing());
    assert_eq!(rig.audio.active_voices(), 0);
}

#[test]
fn pause_keeps_buffers_and_clock() {
    let mut rig = manual_rig(true, true);
    start_playing(&mut rig);
    rig.player.update(1.5);
    assert_eq!(rig.player.current_frame_time(), Some(1.0));

    rig.player.pause();
    assert_eq!(rig.player.state(), PlayerState::Paused);
    assert!(!rig.player.is_audio_playing());
    assert_eq!(rig.player.queued_frames(), 5);

    rig.player.play().unwrap();
    assert_eq!(rig.player.state(), PlayerState::StartingToPlay);
    deliver_frames(&rig.player, [7.0, 8.0]);
    rig.player.update(0.0);
    assert_eq!(rig.player.state(), PlayerState::Playing);
    assert!(rig.player.is_audio_playing());

    rig.player.update(1.0);
    assert_eq!(rig.player.time(), 2.5);
    assert_eq!(rig.player.current_frame_time(), Some(2.0));
}

#[test]
fn reset_clears_all_transient_state() {
    let mut rig = manual_rig(true, true);
    start_playing(&mut rig);
    rig.player.update(2.0);

    rig.player.reset();
    assert_eq!(rig.player.state(), PlayerState::Paused);
    assert_eq!(rig.player.queued_frames(), 0);
    assert!(!rig.player.has_current_frame());
    assert_eq!(rig.player.time(), 0.0);
    assert!(rig.player.audio_clip().is_none());
    assert!(!rig.player.is_audio_playing());
    assert_eq!(rig.audio.active_voices(), 0);
    assert!(rig.player.streams().iter().all(|s| !s.eof && !s.playing));
}

#[test]
fn test_pattern_movie_plays_to_the_end() {
    let mut rig = rig(Box::new(pattern_decoder()));
    let mut rc = SoftwareRenderContext::new();
    let mut output = vec![0.0f32; 960 * 2];
    rig.player.play().unwrap();

    for _ in 0..5000 {
        if rig.player.state() == PlayerState::Finished {
            break;
        }
        rig.player.update(0.02);
        rig.player.render(&mut rc).unwrap();
        rig.audio.pump(960);
        rig.audio.output_buffer().read(&mut output);
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    assert_eq!(rig.player.state(), PlayerState::Finished);
    assert!(rig.player.time() >= 0.9);
    assert!(rc.draw_calls() > 0);
    let video = rig
        .player
        .streams()
        .into_iter()
        .find(|s| s.stream_type == StreamType::Video)
        .unwrap();
    assert!(video.eof);
}

#[test]
fn reset_rewinds_decoder_for_replay() {
    let mut rig = rig(Box::new(pattern_decoder()));

    // Playing can start with frames still on their way to the queue; wait
    // for them so the first frame is promoted at clock zero.
    let reach_playing = |player: &mut MoviePlayer| {
        player.play().unwrap();
        for _ in 0..5000 {
            player.update(0.0);
            if player.state() == PlayerState::Playing {
                let settled = wait_for(|| player.queued_frames() >= 6);
                player.update(0.0);
                return settled;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        false
    };

    assert!(reach_playing(&mut rig.player));
    rig.player.update(0.35);
    assert_eq!(rig.player.current_frame_time(), Some(0.3));

    rig.player.reset();
    assert!(reach_playing(&mut rig.player));
    assert_eq!(rig.player.time(), 0.0);
    assert_eq!(rig.player.current_frame_time(), Some(0.0));
}
