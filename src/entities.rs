/// Progression data types — pure data, no logic.

use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Shop,
    GameOver,
    /// Only ever forced from outside through `set_status`.
    Victory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShopItemKind {
    /// Allows a second jump while airborne. One-time unlock.
    DoubleJump,
    /// Adds a heart slot and fills it.
    MaxLife,
    /// Restores one life, never past the cap.
    Heal,
    /// Unlocks the 5-second invincibility ability. One-time unlock.
    Immortal,
}

/// A catalogue entry as shown in the shop.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopItem {
    pub kind: ShopItemKind,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub one_time: bool,
}

// ── Master run state ──────────────────────────────────────────────────────────

/// Everything the progression engine owns.  Cloneable so the pure
/// transitions in `compute` can return a fresh copy.
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub status: GameStatus,
    pub score: u32,
    pub lives: u32,
    pub max_lives: u32,
    /// Forward velocity in world units per second.
    pub speed: f32,
    /// Indices into `target_word` picked up during the current word cycle.
    pub collected_letters: BTreeSet<usize>,
    pub target_word: Vec<char>,
    pub level: u32,
    pub lane_count: u32,
    /// Lifetime non-letter pickups.
    pub items_collected: u32,
    /// Distance travelled in the current run attempt.
    pub distance: f32,
    pub has_double_jump: bool,
    pub has_immortality: bool,
    pub is_immortality_active: bool,
    /// Simulated time, advanced by `compute::advance_clock`.
    pub clock: Duration,
    /// Deadline at which an active immortality wears off.
    pub immortality_expires_at: Option<Duration>,
}

impl RunState {
    pub fn word_complete(&self) -> bool {
        self.collected_letters.len() == self.target_word.len()
    }

    /// Indices of `target_word` still missing this cycle, in order.
    pub fn missing_letters(&self) -> Vec<usize> {
        (0..self.target_word.len())
            .filter(|i| !self.collected_letters.contains(i))
            .collect()
    }

    /// Time left on the active immortality, if any.
    pub fn immortality_remaining(&self) -> Option<Duration> {
        self.immortality_expires_at
            .map(|at| at.saturating_sub(self.clock))
    }
}
