//! Playback state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a `MoviePlayer` is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Paused,
    /// Buffers are filling; the clock hasn't started.
    StartingToPlay,
    Playing,
    /// Video ran out. Only `reset` leaves this state.
    Finished,
}

impl PlayerState {
    /// True while the decode driver should be feeding the player.
    pub fn is_active(self) -> bool {
        matches!(self, Self::StartingToPlay | Self::Playing)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Paused => "paused",
            Self::StartingToPlay => "starting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}
