//! Ball Progress - session progress tracking for a level-based ball game
//!
//! Core modules:
//! - `progress`: The session state machine (levels, balls, score, goals, ranks)
//! - `level`: Level sets, unlock state and per-level/per-set leaderboards
//! - `highscores`: Three-slot leaderboards
//! - `demo`: Replay recording and loading
//! - `sim`: Simulation engine interface and a scripted stand-in
//! - `settings`: Player preferences (name, cheats, goal locking)
//! - `audio`: Music transitions
//! - `lang`: Display string translation

pub mod audio;
pub mod demo;
pub mod error;
pub mod highscores;
pub mod lang;
pub mod level;
pub mod mode;
pub mod progress;
pub mod settings;
pub mod sim;

pub use error::{DemoError, ProgressError, StoreError};
pub use highscores::Leaderboard;
pub use level::{Level, LevelId, LevelSet, LevelStore};
pub use mode::{Mode, Status, mode_to_str};
pub use progress::{Progress, Services, SessionProgress, reward_ball};
pub use settings::{Config, Settings};

/// Game configuration constants
pub mod consts {
    /// Balls the player starts a session with
    pub const START_BALLS: i32 = 2;
    /// Every multiple of this score grants an extra ball
    pub const REWARD_INTERVAL: i32 = 100;

    /// Leaderboard slots per category; also the "unranked" sentinel
    pub const RANK_LAST: usize = 3;

    /// Music crossfade when a level starts (seconds)
    pub const MUSIC_FADE_SECS: f32 = 2.0;

    /// Name of the recording written for the level in progress
    pub const USER_REPLAY_FILE: &str = "Last";
}
