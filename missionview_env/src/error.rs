//! Error types for the MissionView environment abstraction.

use thiserror::Error;

/// Errors raised at the playback input boundary.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The command or frame channel was closed by its other end
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl EnvError {
    /// Creates a channel-closed error.
    pub fn closed(what: impl Into<String>) -> Self {
        Self::ChannelClosed(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(EnvError::closed("dashboard").to_string(), "Channel closed: dashboard");
    }
}
