//! Command source abstraction for MissionView playback.

use crate::error::EnvError;
use crate::types::PlaybackCommand;
use std::time::Duration;

/// Abstraction for where playback commands come from.
///
/// # Implementations
///
/// - **Interactive**: keyboard events forwarded by the terminal dashboard
/// - **Simulation**: a script of commands keyed to virtual timestamps
///
/// # Polling
///
/// The tick loop drains the source once per frame, before computing the
/// frame for `now`:
///
/// ```text
/// loop {
///     while let Some(cmd) = source.try_next(now)? { session.handle(cmd, now) }
///     session.tick(now)
/// }
/// ```
pub trait CommandSource: Send {
    /// Returns the next command due at or before `now`, if any.
    ///
    /// # Returns
    /// * `Ok(Some(cmd))` - A command is ready
    /// * `Ok(None)` - Nothing pending for this frame
    /// * `Err(EnvError::ChannelClosed)` - The producer went away; the loop should stop
    fn try_next(&mut self, now: Duration) -> Result<Option<PlaybackCommand>, EnvError>;
}

/// A source that never produces commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn try_next(&mut self, _now: Duration) -> Result<Option<PlaybackCommand>, EnvError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_commands_is_empty() {
        let mut source = NoCommands;
        assert!(matches!(source.try_next(Duration::from_secs(100)), Ok(None)));
    }
}
