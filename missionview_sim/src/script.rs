//! Scripted command source for deterministic playback.

use missionview_env::{CommandSource, EnvError, PlaybackCommand};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// A command due at a virtual timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    /// Virtual time in seconds
    pub at_secs: f64,
    #[serde(flatten)]
    pub command: PlaybackCommand,
}

impl ScriptedCommand {
    pub fn new(at_secs: f64, command: PlaybackCommand) -> Self {
        Self { at_secs, command }
    }

    fn due(&self) -> Duration {
        Duration::from_secs_f64(self.at_secs.max(0.0))
    }
}

/// Commands keyed to virtual timestamps, released in time order.
///
/// Entries with the same timestamp keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct CommandScript {
    pending: VecDeque<ScriptedCommand>,
    released: usize,
}

impl CommandScript {
    pub fn new(mut entries: Vec<ScriptedCommand>) -> Self {
        entries.retain(|e| e.at_secs.is_finite());
        entries.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Self {
            pending: entries.into(),
            released: 0,
        }
    }

    /// A script that presses play at time zero.
    pub fn play_at_start() -> Self {
        Self::new(vec![ScriptedCommand::new(0.0, PlaybackCommand::Play)])
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ScriptedCommand> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Adds a command, keeping the script ordered.
    pub fn push(&mut self, at_secs: f64, command: PlaybackCommand) {
        if !at_secs.is_finite() {
            return;
        }
        let entry = ScriptedCommand::new(at_secs, command);
        let index = self.pending.partition_point(|e| e.at_secs <= at_secs);
        self.pending.insert(index, entry);
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn released(&self) -> usize {
        self.released
    }

    /// Virtual time of the last pending command.
    pub fn last_due(&self) -> Option<Duration> {
        self.pending.back().map(ScriptedCommand::due)
    }
}

impl CommandSource for CommandScript {
    fn try_next(&mut self, now: Duration) -> Result<Option<PlaybackCommand>, EnvError> {
        match self.pending.front() {
            Some(entry) if entry.due() <= now => {
                self.released += 1;
                Ok(self.pending.pop_front().map(|e| e.command))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_in_time_order() {
        let mut script = CommandScript::new(vec![
            ScriptedCommand::new(17.0, PlaybackCommand::Play),
            ScriptedCommand::new(0.0, PlaybackCommand::Play),
            ScriptedCommand::new(12.0, PlaybackCommand::Pause),
        ]);

        assert_eq!(script.try_next(Duration::ZERO).ok().flatten(), Some(PlaybackCommand::Play));
        assert_eq!(script.try_next(Duration::ZERO).ok().flatten(), None);
        assert_eq!(script.try_next(Duration::from_secs(11)).ok().flatten(), None);
        assert_eq!(
            script.try_next(Duration::from_secs(12)).ok().flatten(),
            Some(PlaybackCommand::Pause)
        );
        assert_eq!(
            script.try_next(Duration::from_secs(30)).ok().flatten(),
            Some(PlaybackCommand::Play)
        );
        assert!(script.is_exhausted());
        assert_eq!(script.released(), 3);
    }

    #[test]
    fn test_push_keeps_order_and_ties() {
        let mut script = CommandScript::play_at_start();
        script.push(5.0, PlaybackCommand::Reset);
        script.push(5.0, PlaybackCommand::Play);
        script.push(2.0, PlaybackCommand::Pause);
        script.push(f64::NAN, PlaybackCommand::Toggle);

        assert_eq!(script.remaining(), 4);
        assert_eq!(script.last_due(), Some(Duration::from_secs(5)));

        let now = Duration::from_secs(10);
        let drained: Vec<PlaybackCommand> =
            std::iter::from_fn(|| script.try_next(now).ok().flatten()).collect();
        assert_eq!(
            drained,
            vec![
                PlaybackCommand::Play,
                PlaybackCommand::Pause,
                PlaybackCommand::Reset,
                PlaybackCommand::Play,
            ]
        );
    }

    #[test]
    fn test_parses_json_script() {
        let json = r#"[
            {"at_secs": 3.5, "command": "resize", "width": 800, "height": 600},
            {"at_secs": 0.0, "command": "play"}
        ]"#;
        let mut script = CommandScript::from_json(json).expect("valid script");
        assert_eq!(script.try_next(Duration::ZERO).ok().flatten(), Some(PlaybackCommand::Play));
        assert_eq!(
            script.try_next(Duration::from_secs(4)).ok().flatten(),
            Some(PlaybackCommand::Resize { width: 800, height: 600 })
        );
    }
}
