//! Common types for the MissionView environment abstraction.

use serde::{Deserialize, Serialize};

/// A user or harness command addressed to the active playback session.
///
/// These are the only inputs besides the clock. They are applied before the
/// frame for the same instant is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlaybackCommand {
    /// Start from zero, or resume when paused.
    Play,

    /// Freeze elapsed time without clearing state.
    Pause,

    /// Pause when playing, play otherwise.
    Toggle,

    /// Return to the initial state.
    Reset,

    /// Viewport changed. Affects only the cosmetic projection.
    Resize { width: u32, height: u32 },
}

impl PlaybackCommand {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackCommand::Play => "play",
            PlaybackCommand::Pause => "pause",
            PlaybackCommand::Toggle => "toggle",
            PlaybackCommand::Reset => "reset",
            PlaybackCommand::Resize { .. } => "resize",
        }
    }
}

impl std::fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackCommand::Resize { width, height } => write!(f, "resize {}x{}", width, height),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_string(&PlaybackCommand::Resize { width: 800, height: 600 }).unwrap();
        assert_eq!(json, r#"{"command":"resize","width":800,"height":600}"#);

        let parsed: PlaybackCommand = serde_json::from_str(r#"{"command":"pause"}"#).unwrap();
        assert_eq!(parsed, PlaybackCommand::Pause);
    }

    #[test]
    fn test_display() {
        assert_eq!(PlaybackCommand::Toggle.to_string(), "toggle");
        assert_eq!(PlaybackCommand::Resize { width: 1280, height: 720 }.to_string(), "resize 1280x720");
    }
}
