//! Streaming audio clip: an SPSC ring of interleaved f32 samples.
//!
//! One thread appends decoded samples while the audio backend drains them.
//! Slots hold `f32` bits in `AtomicU32`s, so no unsafe code is needed; the
//! reader and writer never touch the same slot at the same time because
//! positions are published with release/acquire ordering.

use moviola_core::buffering::AUDIO_BUFFER_FRAMES;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Append-only, drain-as-you-go audio buffer.
pub struct StreamingAudioClip {
    slots: Box<[AtomicU32]>,
    channels: u16,
    read_pos: AtomicUsize,
    write_pos: AtomicUsize,
}

impl StreamingAudioClip {
    /// Clip with the default capacity.
    pub fn new(channels: u16) -> Self {
        Self::with_capacity(channels, AUDIO_BUFFER_FRAMES)
    }

    /// Clip holding up to `frames` sample frames of `channels` samples each.
    pub fn with_capacity(channels: u16, frames: usize) -> Self {
        let channels = channels.max(1);
        // One spare slot distinguishes full from empty
        let slots = frames * channels as usize + 1;
        Self {
            slots: (0..slots).map(|_| AtomicU32::new(0)).collect(),
            channels,
            read_pos: AtomicUsize::new(0),
            write_pos: AtomicUsize::new(0),
        }
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Capacity in sample frames.
    pub fn capacity_frames(&self) -> usize {
        (self.slots.len() - 1) / self.channels as usize
    }

    /// Interleaved samples ready to be read.
    pub fn buffered_samples(&self) -> usize {
        let w = self.write_pos.load(Ordering::Acquire);
        let r = self.read_pos.load(Ordering::Acquire);
        if w >= r {
            w - r
        } else {
            self.slots.len() - r + w
        }
    }

    /// Samples per channel still waiting to be played.
    pub fn samples_left(&self) -> usize {
        self.buffered_samples() / self.channels as usize
    }

    /// Sample frames that can still be appended.
    pub fn free_frames(&self) -> usize {
        (self.slots.len() - 1 - self.buffered_samples()) / self.channels as usize
    }

    /// Append interleaved samples. Only whole frames are accepted; returns
    /// the number of samples actually stored.
    pub fn add_interleaved_samples(&self, samples: &[f32]) -> usize {
        let ch = self.channels as usize;
        let count = (samples.len() / ch).min(self.free_frames()) * ch;
        if count == 0 {
            return 0;
        }

        let len = self.slots.len();
        let w = self.write_pos.load(Ordering::Relaxed);
        for (i, s) in samples[..count].iter().enumerate() {
            self.slots[(w + i) % len].store(s.to_bits(), Ordering::Relaxed);
        }
        self.write_pos.store((w + count) % len, Ordering::Release);
        count
    }

    /// Drain interleaved samples into `output`. Only whole frames are read;
    /// returns the number of samples written to `output`.
    pub fn read(&self, output: &mut [f32]) -> usize {
        let ch = self.channels as usize;
        let count = (output.len() / ch).min(self.samples_left()) * ch;
        if count == 0 {
            return 0;
        }

        let len = self.slots.len();
        let r = self.read_pos.load(Ordering::Relaxed);
        for (i, out) in output[..count].iter_mut().enumerate() {
            *out = f32::from_bits(self.slots[(r + i) % len].load(Ordering::Relaxed));
        }
        self.read_pos.store((r + count) % len, Ordering::Release);
        count
    }
}

impl std::fmt::Debug for StreamingAudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingAudioClip")
            .field("channels", &self.channels)
            .field("samples_left", &self.samples_left())
            .field("capacity_frames", &self.capacity_frames())
            .finish()
    }
}
