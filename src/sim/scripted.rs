//! Scripted stand-in for the game client/server
//!
//! Deterministic for a given seed: the same seed and call sequence always
//! yields the same coins, clock and outcomes.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Simulation;
use crate::mode::Status;

/// Clock advance per tick (centiseconds)
pub const TICK_CS: i32 = 10;

/// Chance of picking up coins on a tick
const COIN_CHANCE: f64 = 0.2;
/// Chance of falling off on a tick
const FALL_CHANCE: f64 = 0.002;
/// Earliest/latest point the ball reaches the exit
const EXIT_MIN_CS: i32 = 1500;
const EXIT_MAX_CS: i32 = 6000;

/// Deterministic simulation driven by a seeded RNG
#[derive(Debug, Clone)]
pub struct ScriptedSim {
    rng: Pcg32,
    /// Level files that fail to load
    broken: HashSet<String>,
    file: Option<String>,
    synced: bool,
    running: bool,
    time_limit: i32,
    goal_open: bool,
    coins: i32,
    elapsed: i32,
    exit_at: i32,
}

impl ScriptedSim {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            broken: HashSet::new(),
            file: None,
            synced: false,
            running: false,
            time_limit: 0,
            goal_open: false,
            coins: 0,
            elapsed: 0,
            exit_at: EXIT_MAX_CS,
        }
    }

    /// Make `file` fail to initialize
    pub fn break_file(&mut self, file: impl Into<String>) {
        self.broken.insert(file.into());
    }

    /// Level file currently loaded
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn is_goal_open(&self) -> bool {
        self.goal_open
    }

    pub fn set_coins(&mut self, coins: i32) {
        self.coins = coins;
    }

    /// Set the elapsed time (centiseconds)
    pub fn set_elapsed(&mut self, elapsed: i32) {
        self.elapsed = elapsed;
    }

    /// Advance one tick, returning the outcome if the attempt ended
    pub fn tick(&mut self) -> Option<Status> {
        if !self.running {
            return None;
        }

        self.elapsed += TICK_CS;

        if self.rng.random_bool(COIN_CHANCE) {
            self.coins += self.rng.random_range(1..=5);
        }

        let outcome = if self.rng.random_bool(FALL_CHANCE) {
            Some(Status::Fall)
        } else if self.time_limit > 0 && self.elapsed >= self.time_limit {
            Some(Status::Time)
        } else if self.goal_open && self.elapsed >= self.exit_at {
            Some(Status::Goal)
        } else {
            None
        };

        if outcome.is_some() {
            self.running = false;
        }
        outcome
    }
}

impl Simulation for ScriptedSim {
    fn client_init(&mut self, file: &str) -> bool {
        self.synced = false;
        if self.broken.contains(file) {
            log::warn!("Client failed to load {}", file);
            self.file = None;
            return false;
        }
        self.file = Some(file.to_string());
        true
    }

    fn server_init(&mut self, file: &str, time: i32, goal_enabled: bool) -> bool {
        if self.broken.contains(file) {
            log::warn!("Server failed to load {}", file);
            self.running = false;
            return false;
        }
        self.running = true;
        self.time_limit = time;
        self.goal_open = goal_enabled;
        self.coins = 0;
        self.elapsed = 0;
        self.exit_at = self.rng.random_range(EXIT_MIN_CS..=EXIT_MAX_CS);
        true
    }

    fn client_sync(&mut self) {
        self.synced = true;
    }

    fn coins(&self) -> i32 {
        self.coins
    }

    fn clock(&self) -> i32 {
        if self.time_limit == 0 {
            self.elapsed
        } else {
            (self.time_limit - self.elapsed).max(0)
        }
    }

    fn set_goal(&mut self) {
        if !self.goal_open {
            log::debug!("Exit opened");
        }
        self.goal_open = true;
    }
}
