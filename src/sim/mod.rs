//! Simulation engine interface
//!
//! The tracker drives the game client and server through [`Simulation`]:
//! - Initialize both for a level file
//! - Sync the client to the server's first command batch
//! - Query coins and clock while a level runs
//! - Tell the server when the goal is met so it can open the exit

pub mod scripted;

pub use scripted::ScriptedSim;

/// Game client and server as seen by the tracker
pub trait Simulation {
    /// Load a level file into the client
    fn client_init(&mut self, file: &str) -> bool;
    /// Load a level file into the server with its time limit and goal state
    fn server_init(&mut self, file: &str, time: i32, goal_enabled: bool) -> bool;
    /// Apply the server's initial commands to the client
    fn client_sync(&mut self);
    /// Coins collected so far in this attempt
    fn coins(&self) -> i32;
    /// Elapsed time on untimed levels, remaining time on timed ones (centiseconds)
    fn clock(&self) -> i32;
    /// Open the exit
    fn set_goal(&mut self);
}
