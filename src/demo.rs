//! Replay recording
//!
//! The tracker only needs the session-level header of a recording (who
//! played what, with which starting score, and how it ended). Per-frame
//! input capture belongs to the simulation and is not handled here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::USER_REPLAY_FILE;
use crate::error::DemoError;
use crate::mode::{Mode, Status};

/// Everything known about a level attempt when it starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoStart {
    pub player: String,
    pub level_name: String,
    pub level_file: String,
    pub mode: Mode,
    /// Level time limit (centiseconds)
    pub time: i32,
    /// Level goal (coins)
    pub goal: i32,
    pub goal_enabled: bool,
    pub score: i32,
    pub balls: i32,
    pub times: i32,
}

/// Session state restored from a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayInfo {
    pub goal: i32,
    pub mode: Mode,
    pub balls: i32,
    pub score: i32,
    pub times: i32,
}

/// Records and loads replays
pub trait DemoRecorder {
    /// Begin recording a level attempt
    fn play_init(&mut self, start: &DemoStart) -> Result<(), DemoError>;
    /// Store the outcome of the attempt being recorded
    fn play_stat(&mut self, status: Status, coins: i32, timer: i32);
    /// Finish and keep the recording
    fn play_stop(&mut self);
    /// Drop the recording without keeping it
    fn play_abort(&mut self);
    /// Load a recording for playback
    fn replay_init(&mut self, path: &Path) -> Result<ReplayInfo, DemoError>;
    /// Re-attribute the last kept recording
    fn rename_player(&mut self, player: &str) -> Result<(), DemoError>;
}

/// On-disk recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(flatten)]
    pub start: DemoStart,
    pub status: Status,
    pub coins: i32,
    pub timer: i32,
}

/// Writes recordings as JSON into a directory
#[derive(Debug)]
pub struct FileRecorder {
    dir: PathBuf,
    active: Option<Recording>,
}

impl FileRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            active: None,
        }
    }

    /// Path of the recording kept for the last level attempt
    pub fn last_path(&self) -> PathBuf {
        self.dir.join(format!("{USER_REPLAY_FILE}.json"))
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    fn read(path: &Path) -> Result<Recording, DemoError> {
        let json = fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(path: &Path, recording: &Recording) -> Result<(), DemoError> {
        let json = serde_json::to_string_pretty(recording)?;
        fs::write(path, json).map_err(|e| DemoError::io(path, e))
    }
}

impl DemoRecorder for FileRecorder {
    fn play_init(&mut self, start: &DemoStart) -> Result<(), DemoError> {
        fs::create_dir_all(&self.dir).map_err(|e| DemoError::io(&self.dir, e))?;
        if self.is_recording() {
            log::debug!("Unfinished recording replaced");
        }
        self.active = Some(Recording {
            start: start.clone(),
            status: Status::None,
            coins: 0,
            timer: 0,
        });
        log::debug!("Recording {}", start.level_file);
        Ok(())
    }

    fn play_stat(&mut self, status: Status, coins: i32, timer: i32) {
        if let Some(recording) = &mut self.active {
            recording.status = status;
            recording.coins = coins;
            recording.timer = timer;
        }
    }

    fn play_stop(&mut self) {
        let Some(recording) = self.active.take() else {
            return;
        };
        let path = self.last_path();
        match Self::write(&path, &recording) {
            Ok(()) => log::debug!("Recording saved to {}", path.display()),
            Err(e) => log::warn!("Failed to save recording: {}", e),
        }
    }

    fn play_abort(&mut self) {
        if self.active.take().is_some() {
            log::debug!("Recording discarded");
        }
    }

    fn replay_init(&mut self, path: &Path) -> Result<ReplayInfo, DemoError> {
        let recording = Self::read(path)?;
        log::info!(
            "Replaying {} by {}",
            recording.start.level_name,
            recording.start.player
        );
        Ok(ReplayInfo {
            goal: recording.start.goal,
            mode: recording.start.mode,
            balls: recording.start.balls,
            score: recording.start.score,
            times: recording.start.times,
        })
    }

    fn rename_player(&mut self, player: &str) -> Result<(), DemoError> {
        let path = self.last_path();
        let mut recording = Self::read(&path)?;
        recording.start.player = player.to_string();
        Self::write(&path, &recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DemoStart {
        DemoStart {
            player: "Player".to_string(),
            level_name: "Bumper".to_string(),
            level_file: "map-easy/bumper.sol".to_string(),
            mode: Mode::Challenge,
            time: 12000,
            goal: 20,
            goal_enabled: false,
            score: 140,
            balls: 3,
            times: 4321,
        }
    }

    #[test]
    fn test_stop_keeps_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = FileRecorder::new(dir.path());

        demo.play_init(&start()).unwrap();
        assert!(demo.is_recording());
        demo.play_stat(Status::Goal, 22, 3100);
        demo.play_stop();
        assert!(!demo.is_recording());

        let info = demo.replay_init(&demo.last_path()).unwrap();
        assert_eq!(
            info,
            ReplayInfo {
                goal: 20,
                mode: Mode::Challenge,
                balls: 3,
                score: 140,
                times: 4321,
            }
        );

        let saved = FileRecorder::read(&demo.last_path()).unwrap();
        assert_eq!(saved.status, Status::Goal);
        assert_eq!(saved.coins, 22);
    }

    #[test]
    fn test_init_replaces_unfinished_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = FileRecorder::new(dir.path());

        demo.play_init(&start()).unwrap();
        let mut retry = start();
        retry.balls = 2;
        demo.play_init(&retry).unwrap();
        assert!(demo.is_recording());
        demo.play_stop();

        let info = demo.replay_init(&demo.last_path()).unwrap();
        assert_eq!(info.balls, 2);
    }

    #[test]
    fn test_abort_discards() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = FileRecorder::new(dir.path());

        demo.play_init(&start()).unwrap();
        demo.play_abort();
        demo.play_stop();

        let err = demo.replay_init(&demo.last_path()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rename_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut demo = FileRecorder::new(dir.path());

        assert!(demo.rename_player("Nobody").is_err());

        demo.play_init(&start()).unwrap();
        demo.play_stop();
        demo.rename_player("Alice").unwrap();

        let saved = FileRecorder::read(&demo.last_path()).unwrap();
        assert_eq!(saved.start.player, "Alice");
    }
}
