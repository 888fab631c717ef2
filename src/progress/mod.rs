//! Session progress state machine
//!
//! Tracks balls, score and time across the levels of one play session,
//! decides which level comes next, and keeps leaderboard ranks for the
//! level just played and for the finished session.
//!
//! Call order is the driver's job: `init` → `play` → `step` per tick →
//! `stat` on level end → `next`/`same` or `stop` → `exit` once `done`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::Music;
use crate::consts::{MUSIC_FADE_SECS, RANK_LAST, REWARD_INTERVAL, START_BALLS};
use crate::demo::{DemoRecorder, DemoStart};
use crate::error::ProgressError;
use crate::level::{LevelId, LevelRanks, LevelStore, SetRanks};
use crate::mode::{Mode, Status};
use crate::settings::Config;
use crate::sim::Simulation;


/// Balls, score and time carried from level to level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub balls: i32,
    pub score: i32,
    /// Total time in centiseconds
    pub times: i32,
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self {
            balls: START_BALLS,
            score: 0,
            times: 0,
        }
    }
}

/// Collaborators the tracker talks to, borrowed from the session driver
pub struct Services<'a> {
    pub store: &'a mut dyn LevelStore,
    pub demo: &'a mut dyn DemoRecorder,
    pub sim: &'a mut dyn Simulation,
    pub config: &'a dyn Config,
    pub music: &'a mut dyn Music,
}

/// Whether a score milestone grants an extra ball
pub fn reward_ball(score: i32) -> bool {
    score > 0 && score % REWARD_INTERVAL == 0
}

/// Progress through a play session
#[derive(Debug, Clone)]
pub struct Progress {
    // Session
    mode: Mode,
    replay: bool,
    done: bool,
    bonus: i32,
    curr: SessionProgress,
    /// Snapshot taken when the current level started
    prev: SessionProgress,
    set_ranks: SetRanks,

    // Level
    level: Option<LevelId>,
    next: Option<LevelId>,
    status: Status,
    coins: i32,
    timer: i32,
    goal: i32,
    goal_initial: i32,
    goal_enabled: bool,
    /// Keep `goal_enabled` as is on the next `play`
    reuse_goal_enabled: bool,
    level_ranks: LevelRanks,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(Mode::Normal)
    }
}

impl Progress {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            replay: false,
            done: false,
            bonus: 0,
            curr: SessionProgress::default(),
            prev: SessionProgress::default(),
            set_ranks: SetRanks::default(),

            level: None,
            next: None,
            status: Status::None,
            coins: 0,
            timer: 0,
            goal: 0,
            goal_initial: 0,
            goal_enabled: false,
            reuse_goal_enabled: false,
            level_ranks: LevelRanks::default(),
        }
    }

    /// Start a new session
    pub fn init(&mut self, mode: Mode) {
        *self = Self::new(mode);
        log::debug!("Session started in {} mode", mode.as_str());
    }

    /// Start (or restart) a level
    ///
    /// Locked levels are refused unless cheats are on. On error the caller
    /// must not proceed to gameplay.
    pub fn play(&mut self, svc: &mut Services, level: Option<LevelId>) -> Result<(), ProgressError> {
        let id = level.ok_or(ProgressError::NoLevel)?;
        let info = svc.store.level(id).ok_or(ProgressError::UnknownLevel(id))?;

        if !info.opened && !svc.config.cheat() {
            return Err(ProgressError::Locked(id));
        }

        let goal = info.goal;
        let completed = info.completed;

        self.level = Some(id);
        self.next = None;
        self.status = Status::None;
        self.coins = 0;
        self.timer = 0;
        self.goal = goal;
        self.goal_initial = goal;

        if self.reuse_goal_enabled {
            self.reuse_goal_enabled = false;
        } else {
            self.goal_enabled = (self.mode != Mode::Challenge && completed && !svc.config.lock_goals())
                || goal == 0;
        }

        self.prev = self.curr;
        self.level_ranks = LevelRanks::default();

        self.init_level(svc, id)
    }

    fn init_level(&mut self, svc: &mut Services, id: LevelId) -> Result<(), ProgressError> {
        let info = svc.store.level(id).ok_or(ProgressError::UnknownLevel(id))?;

        let start = DemoStart {
            player: svc.config.player().to_string(),
            level_name: info.name.clone(),
            level_file: info.file.clone(),
            mode: self.mode,
            time: info.time,
            goal: info.goal,
            goal_enabled: self.goal_enabled,
            score: self.curr.score,
            balls: self.curr.balls,
            times: self.curr.times,
        };
        if let Err(e) = svc.demo.play_init(&start) {
            log::warn!("Not recording {}: {}", info.file, e);
        }

        if svc.sim.client_init(&info.file) && svc.sim.server_init(&info.file, info.time, self.goal_enabled) {
            svc.sim.client_sync();
            svc.music.fade_to(MUSIC_FADE_SECS, &info.song);
            log::info!(
                "Playing '{}' (goal {}{})",
                info.name,
                info.goal,
                if self.goal_enabled { ", exit open" } else { "" }
            );
            return Ok(());
        }

        svc.demo.play_abort();
        Err(ProgressError::LevelInit(info.file.clone()))
    }

    /// Update the goal countdown; call once per simulation update
    pub fn step(&mut self, svc: &mut Services) {
        if self.goal > 0 {
            self.goal = self.goal_initial - svc.sim.coins();

            if self.goal <= 0 {
                if !self.replay {
                    svc.sim.set_goal();
                }
                self.goal = 0;
            }
        }
    }

    /// Record how the level attempt ended
    ///
    /// Returns whether high scores were flushed to storage.
    pub fn stat(&mut self, svc: &mut Services, status: Status) -> Result<bool, ProgressError> {
        let id = self.level.ok_or(ProgressError::NoLevel)?;
        let time_limit = svc.store.level(id).ok_or(ProgressError::UnknownLevel(id))?.time;

        self.status = status;
        self.coins = svc.sim.coins();
        self.timer = if time_limit == 0 {
            svc.sim.clock()
        } else {
            time_limit - svc.sim.clock()
        };

        let dirty = match status {
            Status::Goal => self.record_goal(svc, id),
            // Falling and running out of time are the same miss
            miss if miss.is_miss() => {
                self.record_miss(svc, id);
                false
            }
            _ => false,
        };

        if dirty {
            if let Err(e) = svc.store.store_hs() {
                log::warn!("Failed to save high scores: {}", e);
            }
        }

        svc.demo.play_stat(self.status, self.coins, self.timer);
        Ok(dirty)
    }

    /// Bank the level result and pick the next level; returns whether records changed
    fn record_goal(&mut self, svc: &mut Services, id: LevelId) -> bool {
        let mut dirty = false;

        let old_score = self.curr.score;
        let rewards = (old_score + 1..=old_score + self.coins)
            .filter(|&s| reward_ball(s))
            .count() as i32;
        self.curr.balls += rewards;
        self.curr.score += self.coins;
        self.curr.times += self.timer;

        let player = svc.config.player();
        let goal_met = self.goal == 0;
        let (ranks, changed) = svc
            .store
            .level_score_update(id, player, self.timer, self.coins, goal_met);
        self.level_ranks = ranks;
        dirty |= changed;

        if !svc.store.is_completed(id) {
            svc.store.complete(id);
            dirty = true;
        }

        self.next = match self.mode {
            Mode::Challenge => {
                let mut next = svc.store.successor(id);
                while let Some(n) = next.filter(|&n| svc.store.is_bonus(n)) {
                    if !svc.store.is_opened(n) {
                        svc.store.open(n);
                        self.bonus += 1;
                        dirty = true;
                        log::info!("Bonus level {:?} unlocked", n);
                    }
                    next = svc.store.successor(n);
                }
                next
            }
            // Locked bonus levels are passed over without opening them
            Mode::Normal => {
                let mut next = svc.store.successor(id);
                while let Some(n) = next.filter(|&n| svc.store.is_bonus(n) && !svc.store.is_opened(n)) {
                    next = svc.store.successor(n);
                }
                next
            }
        };

        match self.next {
            Some(next) => {
                if !svc.store.is_opened(next) {
                    svc.store.open(next);
                    dirty = true;
                    log::info!("Level {:?} unlocked", next);
                }
            }
            None => {
                self.done = self.mode == Mode::Challenge;
                if self.done {
                    log::info!("Challenge complete");
                }
            }
        }

        dirty
    }

    fn record_miss(&mut self, svc: &mut Services, id: LevelId) {
        let mut next = svc.store.successor(id);
        while let Some(n) = next.filter(|&n| !svc.store.is_opened(n)) {
            next = svc.store.successor(n);
        }
        self.next = next;

        self.curr.times += self.timer;
        self.curr.balls -= 1;
    }

    /// Finish the active recording
    pub fn stop(&self, svc: &mut Services) {
        svc.demo.play_stop();
    }

    /// Record the finished session in the set leaderboards
    ///
    /// # Panics
    ///
    /// Panics if the session isn't done.
    pub fn exit(&mut self, svc: &mut Services) {
        assert!(self.done, "progress exit before the session is done");

        let (ranks, changed) =
            svc.store
                .set_score_update(svc.config.player(), self.curr.times, self.curr.score);
        self.set_ranks = ranks;

        if changed {
            if let Err(e) = svc.store.store_hs() {
                log::warn!("Failed to save high scores: {}", e);
            }
        }
    }

    /// Restore session state from a recording for playback
    ///
    /// Nothing changes if the recording can't be loaded.
    pub fn replay(&mut self, svc: &mut Services, path: &Path) -> Result<(), ProgressError> {
        let info = svc.demo.replay_init(path)?;

        self.goal = info.goal;
        self.goal_initial = info.goal;
        self.mode = info.mode;
        self.curr.balls = info.balls;
        self.curr.score = info.score;
        self.curr.times = info.times;
        self.replay = true;
        Ok(())
    }

    /// Whether `next` may be called
    pub fn next_avail(&self, store: &dyn LevelStore) -> bool {
        match self.next {
            Some(_) if self.mode == Mode::Challenge => self.status == Status::Goal,
            Some(next) => store.is_opened(next),
            None => false,
        }
    }

    /// Whether `same` may be called
    pub fn same_avail(&self) -> bool {
        match self.status {
            Status::None => self.mode != Mode::Challenge,
            _ if self.mode == Mode::Challenge => !self.dead(),
            _ => true,
        }
    }

    /// Move on to the next level
    pub fn next(&mut self, svc: &mut Services) -> Result<(), ProgressError> {
        self.stop(svc);
        self.play(svc, self.next)
    }

    /// Retry the current level
    ///
    /// After a goal, the score and time banked on it are given back.
    pub fn same(&mut self, svc: &mut Services) -> Result<(), ProgressError> {
        self.stop(svc);

        if self.status == Status::Goal {
            self.curr = self.prev;
        }
        self.reuse_goal_enabled = true;

        self.play(svc, self.level)
    }

    /// Out of balls in challenge mode
    pub fn dead(&self) -> bool {
        self.mode == Mode::Challenge && self.curr.balls < 0
    }

    /// Challenge run finished the whole set
    pub fn done(&self) -> bool {
        self.done
    }

    /// Just finished the final level outside challenge mode
    pub fn last(&self) -> bool {
        self.mode != Mode::Challenge && self.status == Status::Goal && self.next.is_none()
    }

    /// Placed on any leaderboard of the level just played
    pub fn lvl_high(&self) -> bool {
        self.level_ranks.time < RANK_LAST
            || self.level_ranks.goal < RANK_LAST
            || self.level_ranks.coin < RANK_LAST
    }

    /// Placed on any leaderboard of the set
    pub fn set_high(&self) -> bool {
        self.set_ranks.score < RANK_LAST || self.set_ranks.times < RANK_LAST
    }

    /// Apply the configured player name to the records just placed
    pub fn rename(&mut self, svc: &mut Services, set_only: bool) {
        let player = svc.config.player();

        if set_only {
            svc.store.set_rename_player(self.set_ranks, player);
        } else {
            if let Some(id) = self.level {
                svc.store.level_rename_player(id, self.level_ranks, player);
            }

            match svc.demo.rename_player(player) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => log::debug!("No recording to rename"),
                Err(e) => log::warn!("Failed to rename recording: {}", e),
            }

            if self.done {
                svc.store.set_rename_player(self.set_ranks, player);
            }
        }

        if let Err(e) = svc.store.store_hs() {
            log::warn!("Failed to save high scores: {}", e);
        }
    }

    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    pub fn next_level(&self) -> Option<LevelId> {
        self.next
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn bonus(&self) -> i32 {
        self.bonus
    }

    pub fn current(&self) -> SessionProgress {
        self.curr
    }

    pub fn balls(&self) -> i32 {
        self.curr.balls
    }

    pub fn score(&self) -> i32 {
        self.curr.score
    }

    pub fn times(&self) -> i32 {
        self.curr.times
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn coins(&self) -> i32 {
        self.coins
    }

    pub fn timer(&self) -> i32 {
        self.timer
    }

    /// Coins still needed to open the exit
    pub fn goal(&self) -> i32 {
        self.goal
    }

    pub fn goal_enabled(&self) -> bool {
        self.goal_enabled
    }

    pub fn level_ranks(&self) -> LevelRanks {
        self.level_ranks
    }

    pub fn set_ranks(&self) -> SetRanks {
        self.set_ranks
    }
}
