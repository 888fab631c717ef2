//! Level sets and their persisted records
//!
//! Levels are held in an arena and addressed by [`LevelId`]. A level's
//! successor is simply the next index in the set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::RANK_LAST;
use crate::error::StoreError;
use crate::highscores::{Leaderboard, Ordering};

/// Handle to a level inside a [`LevelStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub usize);

/// Per-level rank slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRanks {
    pub time: usize,
    pub goal: usize,
    pub coin: usize,
}

impl Default for LevelRanks {
    fn default() -> Self {
        Self {
            time: RANK_LAST,
            goal: RANK_LAST,
            coin: RANK_LAST,
        }
    }
}

/// Per-set rank slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetRanks {
    pub score: usize,
    pub times: usize,
}

impl Default for SetRanks {
    fn default() -> Self {
        Self {
            score: RANK_LAST,
            times: RANK_LAST,
        }
    }
}

/// Leaderboards kept for each level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelScores {
    pub best_time: Leaderboard,
    /// Fastest runs that also met the goal
    pub fast_unlock: Leaderboard,
    pub most_coins: Leaderboard,
}

impl Default for LevelScores {
    fn default() -> Self {
        Self {
            best_time: Leaderboard::new(Ordering::Time),
            fast_unlock: Leaderboard::new(Ordering::Time),
            most_coins: Leaderboard::new(Ordering::Coins),
        }
    }
}

/// Leaderboards kept for a whole set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScores {
    pub best_times: Leaderboard,
    pub most_coins: Leaderboard,
}

impl Default for SetScores {
    fn default() -> Self {
        Self {
            best_times: Leaderboard::new(Ordering::Time),
            most_coins: Leaderboard::new(Ordering::Coins),
        }
    }
}

/// A playable level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Path of the level geometry file handed to the simulation
    pub file: String,
    /// Music track
    #[serde(default)]
    pub song: String,
    /// Time limit in centiseconds (0 = untimed)
    #[serde(default)]
    pub time: i32,
    /// Coins needed to open the exit (0 = always open)
    #[serde(default)]
    pub goal: i32,
    /// Optional level reached only through the successor chain
    #[serde(default)]
    pub bonus: bool,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub scores: LevelScores,
}

impl Level {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            song: String::new(),
            time: 0,
            goal: 0,
            bonus: false,
            opened: false,
            completed: false,
            scores: LevelScores::default(),
        }
    }

    pub fn with_goal(mut self, goal: i32) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_time(mut self, time: i32) -> Self {
        self.time = time;
        self
    }

    pub fn with_song(mut self, song: impl Into<String>) -> Self {
        self.song = song.into();
        self
    }

    pub fn bonus(mut self) -> Self {
        self.bonus = true;
        self
    }
}

/// Level metadata, unlock state and leaderboards consumed by the tracker
pub trait LevelStore {
    fn level(&self, id: LevelId) -> Option<&Level>;
    fn successor(&self, id: LevelId) -> Option<LevelId>;
    fn open(&mut self, id: LevelId);
    fn complete(&mut self, id: LevelId);

    /// Record a level result; returns the ranks placed and whether anything changed
    fn level_score_update(
        &mut self,
        id: LevelId,
        player: &str,
        timer: i32,
        coins: i32,
        goal_met: bool,
    ) -> (LevelRanks, bool);

    /// Record a finished session; returns the ranks placed and whether anything changed
    fn set_score_update(&mut self, player: &str, times: i32, score: i32) -> (SetRanks, bool);

    fn level_rename_player(&mut self, id: LevelId, ranks: LevelRanks, player: &str);
    fn set_rename_player(&mut self, ranks: SetRanks, player: &str);

    /// Flush unlock state and leaderboards to storage
    fn store_hs(&mut self) -> Result<(), StoreError>;

    fn is_opened(&self, id: LevelId) -> bool {
        self.level(id).is_some_and(|l| l.opened)
    }

    fn is_completed(&self, id: LevelId) -> bool {
        self.level(id).is_some_and(|l| l.completed)
    }

    fn is_bonus(&self, id: LevelId) -> bool {
        self.level(id).is_some_and(|l| l.bonus)
    }
}

/// Persisted part of a level
#[derive(Debug, Serialize, Deserialize)]
struct LevelRecord {
    file: String,
    opened: bool,
    completed: bool,
    scores: LevelScores,
}

/// Persisted part of a set
#[derive(Debug, Serialize, Deserialize)]
struct ScoreFile {
    set: String,
    scores: SetScores,
    levels: Vec<LevelRecord>,
}

/// An ordered set of levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSet {
    pub name: String,
    pub levels: Vec<Level>,
    #[serde(default)]
    pub scores: SetScores,
    /// Where `store_hs` writes; None keeps records in memory only
    #[serde(skip)]
    score_file: Option<PathBuf>,
}

impl LevelSet {
    /// Create a set; the first level starts opened
    pub fn new(name: impl Into<String>, mut levels: Vec<Level>) -> Self {
        if let Some(first) = levels.first_mut() {
            first.opened = true;
        }
        Self {
            name: name.into(),
            levels,
            scores: SetScores::default(),
            score_file: None,
        }
    }

    /// Parse a set description
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let set: LevelSet = serde_json::from_str(json)?;
        if set.levels.is_empty() {
            return Err(StoreError::Empty);
        }
        Ok(Self::new(set.name, set.levels))
    }

    /// Load a set description from disk
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let set = Self::from_json(&json)?;
        log::info!("Loaded set '{}' ({} levels)", set.name, set.levels.len());
        Ok(set)
    }

    /// Persist records to `path` from now on
    pub fn with_score_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.score_file = Some(path.into());
        self
    }

    /// Merge records from the score file, if one exists
    ///
    /// Levels are matched by file name so a reordered set keeps its records.
    pub fn load_scores(&mut self) -> Result<(), StoreError> {
        let Some(path) = self.score_file.clone() else {
            return Ok(());
        };

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score file for '{}', starting fresh", self.name);
                return Ok(());
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let file: ScoreFile = serde_json::from_str(&json)?;
        self.scores = file.scores;
        for record in file.levels {
            if let Some(level) = self.levels.iter_mut().find(|l| l.file == record.file) {
                level.opened |= record.opened;
                level.completed = record.completed;
                level.scores = record.scores;
            }
        }
        log::info!("Loaded scores for '{}'", self.name);
        Ok(())
    }

    pub fn first(&self) -> Option<LevelId> {
        (!self.levels.is_empty()).then_some(LevelId(0))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn level_mut(&mut self, id: LevelId) -> Option<&mut Level> {
        self.levels.get_mut(id.0)
    }
}

impl LevelStore for LevelSet {
    fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.get(id.0)
    }

    fn successor(&self, id: LevelId) -> Option<LevelId> {
        let next = id.0 + 1;
        (next < self.levels.len()).then_some(LevelId(next))
    }

    fn open(&mut self, id: LevelId) {
        if let Some(level) = self.level_mut(id) {
            level.opened = true;
        }
    }

    fn complete(&mut self, id: LevelId) {
        if let Some(level) = self.level_mut(id) {
            level.completed = true;
        }
    }

    fn level_score_update(
        &mut self,
        id: LevelId,
        player: &str,
        timer: i32,
        coins: i32,
        goal_met: bool,
    ) -> (LevelRanks, bool) {
        let mut ranks = LevelRanks::default();
        let Some(level) = self.level_mut(id) else {
            return (ranks, false);
        };

        ranks.time = level.scores.best_time.insert(player, timer, coins);
        if goal_met {
            ranks.goal = level.scores.fast_unlock.insert(player, timer, coins);
        }
        ranks.coin = level.scores.most_coins.insert(player, timer, coins);

        let changed = ranks.time < RANK_LAST || ranks.goal < RANK_LAST || ranks.coin < RANK_LAST;
        (ranks, changed)
    }

    fn set_score_update(&mut self, player: &str, times: i32, score: i32) -> (SetRanks, bool) {
        let ranks = SetRanks {
            score: self.scores.most_coins.insert(player, times, score),
            times: self.scores.best_times.insert(player, times, score),
        };
        let changed = ranks.score < RANK_LAST || ranks.times < RANK_LAST;
        (ranks, changed)
    }

    fn level_rename_player(&mut self, id: LevelId, ranks: LevelRanks, player: &str) {
        if let Some(level) = self.level_mut(id) {
            level.scores.best_time.rename(ranks.time, player);
            level.scores.fast_unlock.rename(ranks.goal, player);
            level.scores.most_coins.rename(ranks.coin, player);
        }
    }

    fn set_rename_player(&mut self, ranks: SetRanks, player: &str) {
        self.scores.most_coins.rename(ranks.score, player);
        self.scores.best_times.rename(ranks.times, player);
    }

    fn store_hs(&mut self) -> Result<(), StoreError> {
        let Some(path) = &self.score_file else {
            return Ok(());
        };

        let file = ScoreFile {
            set: self.name.clone(),
            scores: self.scores.clone(),
            levels: self
                .levels
                .iter()
                .map(|l| LevelRecord {
                    file: l.file.clone(),
                    opened: l.opened,
                    completed: l.completed,
                    scores: l.scores.clone(),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json).map_err(|e| StoreError::io(path, e))?;
        log::debug!("High scores saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> LevelSet {
        LevelSet::new(
            "Easy",
            vec![
                Level::new("One", "map-easy/one.sol").with_goal(10),
                Level::new("Two", "map-easy/two.sol").with_time(6000),
                Level::new("Secret", "map-easy/secret.sol").bonus(),
            ],
        )
    }

    #[test]
    fn test_first_level_opened() {
        let set = sample_set();
        assert!(set.levels[0].opened);
        assert!(!set.levels[1].opened);
        assert_eq!(set.first(), Some(LevelId(0)));
    }

    #[test]
    fn test_successor_bounds() {
        let set = sample_set();
        assert_eq!(set.successor(LevelId(0)), Some(LevelId(1)));
        assert_eq!(set.successor(LevelId(2)), None);
        assert!(set.level(LevelId(3)).is_none());
    }

    #[test]
    fn test_level_score_update() {
        let mut set = sample_set();

        let (ranks, changed) = set.level_score_update(LevelId(0), "Ann", 2500, 12, false);
        assert!(changed);
        assert_eq!(ranks.time, 0);
        assert_eq!(ranks.goal, RANK_LAST);
        assert_eq!(ranks.coin, 0);
        assert!(set.levels[0].scores.fast_unlock.is_empty());

        let (ranks, _) = set.level_score_update(LevelId(0), "Bob", 2000, 12, true);
        assert_eq!(ranks.goal, 0);
        assert_eq!(ranks.time, 0);
        assert_eq!(ranks.coin, 0);

        set.level_rename_player(LevelId(0), ranks, "Cat");
        assert_eq!(set.levels[0].scores.best_time.entries[0].player, "Cat");
        assert_eq!(set.levels[0].scores.best_time.entries[1].player, "Ann");
    }

    #[test]
    fn test_unplaced_result_is_clean() {
        let mut set = sample_set();
        for coins in [30, 20, 10] {
            set.level_score_update(LevelId(1), "Ann", 1000, coins, true);
        }
        let (ranks, changed) = set.level_score_update(LevelId(1), "Ann", 5000, 1, true);
        assert_eq!(ranks, LevelRanks::default());
        assert!(!changed);
    }

    #[test]
    fn test_set_score_update() {
        let mut set = sample_set();
        let (ranks, changed) = set.set_score_update("Ann", 9000, 250);
        assert!(changed);
        assert_eq!(ranks, SetRanks { score: 0, times: 0 });

        set.set_rename_player(ranks, "Bob");
        assert_eq!(set.scores.most_coins.entries[0].player, "Bob");
        assert_eq!(set.scores.best_times.entries[0].player, "Bob");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "Medium",
            "levels": [
                { "name": "A", "file": "a.sol", "goal": 15, "song": "bgm/track1.ogg" },
                { "name": "B", "file": "b.sol", "time": 9000, "bonus": true }
            ]
        }"#;
        let set = LevelSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.levels[0].opened);
        assert_eq!(set.levels[0].goal, 15);
        assert!(set.levels[1].bonus);
        assert_eq!(set.levels[1].time, 9000);

        let empty = LevelSet::from_json(r#"{ "name": "None", "levels": [] }"#);
        assert!(matches!(empty, Err(StoreError::Empty)));
    }

    #[test]
    fn test_store_without_file_is_noop() {
        let mut set = sample_set();
        assert!(set.store_hs().is_ok());
    }

    #[test]
    fn test_scores_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores-easy.json");

        let mut set = sample_set().with_score_file(&path);
        set.open(LevelId(1));
        set.complete(LevelId(0));
        set.level_score_update(LevelId(0), "Ann", 1234, 7, true);
        set.set_score_update("Ann", 5000, 100);
        set.store_hs().unwrap();

        let mut reloaded = sample_set().with_score_file(&path);
        reloaded.load_scores().unwrap();
        assert!(reloaded.levels[1].opened);
        assert!(reloaded.levels[0].completed);
        assert!(!reloaded.levels[2].opened);
        assert_eq!(reloaded.levels[0].scores, set.levels[0].scores);
        assert_eq!(reloaded.scores, set.scores);
    }

    #[test]
    fn test_missing_score_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = sample_set().with_score_file(dir.path().join("absent.json"));
        assert!(set.load_scores().is_ok());
        assert!(set.scores.best_times.is_empty());
    }
}
