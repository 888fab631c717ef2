//! Three-slot leaderboards
//!
//! Ranks are 0-based; `RANK_LAST` means the result didn't place.

use serde::{Deserialize, Serialize};

use crate::consts::RANK_LAST;

/// How a leaderboard orders its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Ordering {
    /// Lowest timer first, more coins break ties
    #[default]
    Time,
    /// Most coins first, lower timer breaks ties
    Coins,
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: String,
    /// Time in centiseconds
    pub timer: i32,
    pub coins: i32,
}

/// A ranked table of at most `RANK_LAST` entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub ordering: Ordering,
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new(ordering: Ordering) -> Self {
        Self {
            ordering,
            entries: Vec::new(),
        }
    }

    fn beats(&self, timer: i32, coins: i32, entry: &ScoreEntry) -> bool {
        match self.ordering {
            Ordering::Time => timer < entry.timer || (timer == entry.timer && coins > entry.coins),
            Ordering::Coins => coins > entry.coins || (coins == entry.coins && timer < entry.timer),
        }
    }

    /// Get the rank a result would achieve (`RANK_LAST` if it doesn't place)
    pub fn potential_rank(&self, timer: i32, coins: i32) -> usize {
        let pos = self
            .entries
            .iter()
            .position(|e| self.beats(timer, coins, e))
            .unwrap_or(self.entries.len());
        pos.min(RANK_LAST)
    }

    /// Insert a result, returning the rank achieved or `RANK_LAST`
    pub fn insert(&mut self, player: &str, timer: i32, coins: i32) -> usize {
        let rank = self.potential_rank(timer, coins);
        if rank < RANK_LAST {
            self.entries.insert(
                rank,
                ScoreEntry {
                    player: player.to_string(),
                    timer,
                    coins,
                },
            );
            self.entries.truncate(RANK_LAST);
        }
        rank
    }

    /// Re-attribute the entry at `rank`; unranked or empty slots are ignored
    pub fn rename(&mut self, rank: usize, player: &str) {
        if let Some(entry) = self.entries.get_mut(rank) {
            entry.player = player.to_string();
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top entry (if any)
    pub fn best(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ordering() {
        let mut board = Leaderboard::new(Ordering::Time);
        assert_eq!(board.insert("a", 3000, 10), 0);
        assert_eq!(board.insert("b", 2000, 5), 0);
        assert_eq!(board.insert("c", 2000, 8), 0);
        assert_eq!(board.insert("d", 4000, 50), RANK_LAST);

        let players: Vec<_> = board.entries.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(players, ["c", "b", "a"]);
    }

    #[test]
    fn test_coin_ordering() {
        let mut board = Leaderboard::new(Ordering::Coins);
        assert_eq!(board.insert("a", 3000, 10), 0);
        assert_eq!(board.insert("b", 2000, 10), 0);
        assert_eq!(board.insert("c", 100, 1), 2);
        assert_eq!(board.best().map(|e| e.player.as_str()), Some("b"));
    }

    #[test]
    fn test_equal_result_does_not_displace() {
        let mut board = Leaderboard::new(Ordering::Time);
        board.insert("a", 1000, 5);
        assert_eq!(board.insert("b", 1000, 5), 1);
        assert_eq!(board.best().map(|e| e.player.as_str()), Some("a"));
    }

    #[test]
    fn test_full_board_truncates() {
        let mut board = Leaderboard::new(Ordering::Coins);
        for coins in [10, 20, 30, 40] {
            board.insert("p", 1000, coins);
        }
        assert_eq!(board.entries.len(), RANK_LAST);
        assert_eq!(board.potential_rank(1000, 5), RANK_LAST);
        assert_eq!(board.entries.last().map(|e| e.coins), Some(20));
    }

    #[test]
    fn test_rename() {
        let mut board = Leaderboard::new(Ordering::Time);
        let rank = board.insert("Player", 500, 0);
        board.rename(rank, "Alice");
        board.rename(RANK_LAST, "Nobody");
        assert_eq!(board.entries[0].player, "Alice");
        assert_eq!(board.entries.len(), 1);
    }
}
