//! Mixing audio backend.

use crate::backend::{AudioBackend, AudioPosition, PlaybackHandle};
use crate::mixer::{MixSource, Mixer, MixerChannel};
use crate::streaming::StreamingAudioClip;
use moviola_core::{MoviolaError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Handle to one voice playing in an `AudioEngine`.
#[derive(Debug)]
pub struct VoiceHandle {
    playing: AtomicBool,
    volume: AtomicU32,
}

impl VoiceHandle {
    fn new(volume: f32) -> Self {
        Self {
            playing: AtomicBool::new(true),
            volume: AtomicU32::new(volume.to_bits()),
        }
    }

    /// Current volume.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }
}

impl PlaybackHandle for VoiceHandle {
    fn stop(&self) {
        self.playing.store(false, Ordering::Release);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn set_volume(&self, volume: f32) {
        self.volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

struct Voice {
    clip: Arc<StreamingAudioClip>,
    handle: Arc<VoiceHandle>,
    pan: f32,
    /// Per-voice stereo scratch
    buffer: Vec<f32>,
}

impl Voice {
    /// Pull up to `frames` frames from the clip as interleaved stereo.
    fn pull(&mut self, frames: usize) {
        let channels = self.clip.channels() as usize;
        self.buffer.clear();
        self.buffer.resize(frames * channels, 0.0);
        let read = self.clip.read(&mut self.buffer);
        self.buffer.truncate(read);

        if channels == 1 {
            let mono = std::mem::take(&mut self.buffer);
            self.buffer = mono.iter().flat_map(|s| [*s, *s]).collect();
        }
    }
}

/// Audio engine: plays streaming clips by mixing them into a stereo
/// output clip that an `AudioOutput` (or a test) drains.
pub struct AudioEngine {
    sample_rate: u32,
    voices: Mutex<Vec<Voice>>,
    mixer: Mutex<Mixer>,
    output: Arc<StreamingAudioClip>,
}

impl AudioEngine {
    /// Output channel count.
    pub const CHANNELS: u16 = 2;

    /// Create a new audio engine.
    pub fn new(sample_rate: u32) -> Self {
        info!("Initializing audio engine at {} Hz", sample_rate);
        // ~100ms of output buffering
        let buffer_frames = (sample_rate / 10).max(1) as usize;
        Self {
            sample_rate,
            voices: Mutex::new(Vec::new()),
            mixer: Mutex::new(Mixer::new()),
            output: Arc::new(StreamingAudioClip::with_capacity(
                Self::CHANNELS,
                buffer_frames,
            )),
        }
    }

    /// Get sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get number of output channels.
    pub fn channels(&self) -> u16 {
        Self::CHANNELS
    }

    /// Number of voices still playing.
    pub fn active_voices(&self) -> usize {
        self.voices
            .lock()
            .iter()
            .filter(|v| v.handle.is_playing())
            .count()
    }

    /// Get the output buffer for the device callback.
    pub fn output_buffer(&self) -> Arc<StreamingAudioClip> {
        Arc::clone(&self.output)
    }

    /// Set the master volume.
    pub fn set_master_volume(&self, volume: f32) {
        self.mixer.lock().master_volume = volume.clamp(0.0, 1.0);
    }

    /// Mix up to `frame_count` frames of every playing voice into the
    /// output buffer. Stopped voices are dropped. Returns frames written.
    pub fn pump(&self, frame_count: usize) -> usize {
        let frames = frame_count.min(self.output.free_frames());

        let mut voices = self.voices.lock();
        voices.retain(|v| {
            let keep = v.handle.is_playing();
            if !keep {
                debug!("Voice stopped, {} samples left unplayed", v.clip.samples_left());
            }
            keep
        });
        if frames == 0 {
            return 0;
        }

        for voice in voices.iter_mut() {
            voice.pull(frames);
        }

        let sources: Vec<MixSource<'_>> = voices
            .iter()
            .map(|v| MixSource {
                samples: &v.buffer,
                channel: MixerChannel {
                    volume: v.handle.volume(),
                    pan: v.pan,
                },
            })
            .collect();

        let mut mixer = self.mixer.lock();
        let mixed = mixer.mix(&sources, frames);
        self.output.add_interleaved_samples(mixed) / Self::CHANNELS as usize
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new(48_000)
    }
}

impl AudioBackend for AudioEngine {
    fn play(
        &self,
        clip: Arc<StreamingAudioClip>,
        position: AudioPosition,
        volume: f32,
    ) -> Result<Arc<dyn PlaybackHandle>> {
        if !(1..=2).contains(&clip.channels()) {
            return Err(MoviolaError::Audio(format!(
                "{}-channel clips are not supported",
                clip.channels()
            )));
        }

        let handle = Arc::new(VoiceHandle::new(volume.clamp(0.0, 1.0)));
        self.voices.lock().push(Voice {
            clip,
            handle: Arc::clone(&handle),
            pan: position.pan(),
            buffer: Vec::new(),
        });
        info!("Voice started at volume {:.2}", volume);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_then_pump_drains_clip() {
        let engine = AudioEngine::new(48_000);
        let clip = Arc::new(StreamingAudioClip::with_capacity(2, 1024));
        clip.add_interleaved_samples(&[0.5f32; 200]);

        let handle = engine.play(Arc::clone(&clip), AudioPosition::ui(), 1.0).unwrap();
        assert!(handle.is_playing());
        assert_eq!(engine.active_voices(), 1);

        assert_eq!(engine.pump(100), 100);
        assert_eq!(clip.samples_left(), 0);

        let mut out = vec![0.0f32; 200];
        assert_eq!(engine.output_buffer().read(&mut out), 200);
        assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-5));
    }

    #[test]
    fn test_stopped_voice_is_removed() {
        let engine = AudioEngine::default();
        let clip = Arc::new(StreamingAudioClip::new(2));
        clip.add_interleaved_samples(&[0.1f32; 64]);

        let handle = engine.play(Arc::clone(&clip), AudioPosition::ui(), 0.5).unwrap();
        handle.stop();
        assert_eq!(engine.active_voices(), 0);

        engine.pump(16);
        // Nothing consumed after stop
        assert_eq!(clip.samples_left(), 32);
    }

    #[test]
    fn test_mono_clip_is_upmixed() {
        let engine = AudioEngine::default();
        let clip = Arc::new(StreamingAudioClip::with_capacity(1, 64));
        clip.add_interleaved_samples(&[0.25f32; 8]);

        engine.play(clip, AudioPosition::ui(), 1.0).unwrap();
        assert_eq!(engine.pump(8), 8);

        let mut out = vec![0.0f32; 16];
        assert_eq!(engine.output_buffer().read(&mut out), 16);
        assert!(out.iter().all(|s| (s - 0.25).abs() < 1e-5));
    }

    #[test]
    fn test_rejects_surround_clip() {
        let engine = AudioEngine::default();
        let clip = Arc::new(StreamingAudioClip::new(6));
        assert!(engine.play(clip, AudioPosition::ui(), 1.0).is_err());
    }

    #[test]
    fn test_volume_applies() {
        let engine = AudioEngine::default();
        let clip = Arc::new(StreamingAudioClip::with_capacity(2, 64));
        clip.add_interleaved_samples(&[0.8f32; 8]);

        let handle = engine.play(clip, AudioPosition::ui(), 1.0).unwrap();
        handle.set_volume(0.5);
        engine.pump(4);

        let mut out = vec![0.0f32; 8];
        engine.output_buffer().read(&mut out);
        assert!(out.iter().all(|s| (s - 0.4).abs() < 1e-5));
    }
}
