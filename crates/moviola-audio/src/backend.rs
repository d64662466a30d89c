//! The audio backend seam consumed by the movie player.

use crate::streaming::StreamingAudioClip;
use moviola_core::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a sound plays from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AudioPosition {
    /// Non-positional, centered (menus, movies).
    #[default]
    Ui,
    /// Fixed stereo pan, -1.0 (left) to 1.0 (right).
    Panned(f32),
}

impl AudioPosition {
    /// Non-positional playback.
    pub fn ui() -> Self {
        Self::Ui
    }

    /// Stereo pan for this position.
    pub fn pan(self) -> f32 {
        match self {
            Self::Ui => 0.0,
            Self::Panned(pan) => pan.clamp(-1.0, 1.0),
        }
    }
}

/// A playing sound that can be stopped.
pub trait PlaybackHandle: Send + Sync {
    fn stop(&self);

    fn is_playing(&self) -> bool;

    fn set_volume(&self, volume: f32);
}

/// Something that can play streaming clips.
pub trait AudioBackend: Send + Sync {
    fn play(
        &self,
        clip: Arc<StreamingAudioClip>,
        position: AudioPosition,
        volume: f32,
    ) -> Result<Arc<dyn PlaybackHandle>>;
}
