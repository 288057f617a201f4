/// Pure progression-engine transitions.
///
/// Every public function takes an immutable reference to the current
/// `RunState` (and, where needed, an RNG handle) and returns a brand-new
/// `RunState`.  Side effects are limited to the injected RNG and logging.

use std::collections::BTreeSet;
use std::time::Duration;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::{GameStatus, RunState, ShopItemKind};

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Forward speed at level 1, shared with the spawn/collision layer.
pub const BASE_SPEED: f32 = 22.5;

/// Levels beyond this keep counting but no longer get faster.
pub const MAX_LEVELS: u32 = 50;

/// Speed bonus for every letter picked up inside a level.
pub const LETTER_SPEED_BONUS: f32 = 0.5;

pub const STARTING_LIVES: u32 = 5;
pub const MIN_LANES: u32 = 3;
pub const MAX_LANES: u32 = 9;

/// Lanes widen every time a level divisible by this is reached.
pub const LANE_EXPANSION_INTERVAL: u32 = 5;

pub const IMMORTALITY_DURATION: Duration = Duration::from_secs(5);

pub const FIRST_WORD: &str = "SASSY";

pub const WORD_POOL: [&str; 11] = [
    "QUEEN", "SLAY", "GLAM", "DIVA", "ICONIC", "CHIC", "BOSS", "VIBE", "STYLE", "LUXE", "FIERCE",
];

fn spell(word: &str) -> Vec<char> {
    word.chars().collect()
}

/// Speed for a level: +5% of base per level, frozen past `MAX_LEVELS`.
pub fn calculate_speed(level: u32) -> f32 {
    let effective = level.clamp(1, MAX_LEVELS);
    BASE_SPEED + (effective - 1) as f32 * (BASE_SPEED * 0.05)
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// The state at process start: menu shown, nothing moving.
pub fn init_state() -> RunState {
    RunState {
        status: GameStatus::Menu,
        score: 0,
        lives: STARTING_LIVES,
        max_lives: STARTING_LIVES,
        speed: 0.0,
        collected_letters: BTreeSet::new(),
        target_word: spell(FIRST_WORD),
        level: 1,
        lane_count: MIN_LANES,
        items_collected: 0,
        distance: 0.0,
        has_double_jump: false,
        has_immortality: false,
        is_immortality_active: false,
        clock: Duration::ZERO,
        immortality_expires_at: None,
    }
}

impl Default for RunState {
    fn default() -> Self {
        init_state()
    }
}

// ── Run lifecycle ────────────────────────────────────────────────────────────

/// Full reset used when starting from the main menu.
pub fn start_game(state: &RunState) -> RunState {
    info!("new game started");
    RunState {
        status: GameStatus::Playing,
        speed: BASE_SPEED,
        clock: state.clock,
        ..init_state()
    }
}

/// Checkpoint reset used when retrying after a game over.
///
/// Keeps level, score, word, lanes and every upgrade; refills lives and
/// wipes the per-run fields.
pub fn restart_game(state: &RunState) -> RunState {
    info!(
        "run restarted at level {} with {} lives",
        state.level, state.max_lives
    );
    RunState {
        status: GameStatus::Playing,
        lives: state.max_lives,
        distance: 0.0,
        collected_letters: BTreeSet::new(),
        is_immortality_active: false,
        immortality_expires_at: None,
        speed: calculate_speed(state.level),
        ..state.clone()
    }
}

pub fn take_damage(state: &RunState) -> RunState {
    if state.is_immortality_active || state.lives == 0 {
        return state.clone();
    }
    if state.lives > 1 {
        debug!("hit, {} lives left", state.lives - 1);
        return RunState {
            lives: state.lives - 1,
            ..state.clone()
        };
    }
    info!("game over at level {} with score {}", state.level, state.score);
    RunState {
        lives: 0,
        status: GameStatus::GameOver,
        speed: 0.0,
        ..state.clone()
    }
}

// ── Scoring & pickups ────────────────────────────────────────────────────────

pub fn add_score(state: &RunState, amount: u32) -> RunState {
    RunState {
        score: state.score.saturating_add(amount),
        ..state.clone()
    }
}

/// Pick up a non-letter collectible worth `value` points.
pub fn collect_item(state: &RunState, value: u32) -> RunState {
    RunState {
        score: state.score.saturating_add(value),
        items_collected: state.items_collected + 1,
        ..state.clone()
    }
}

/// Pick up the letter at `index` of the target word.  Duplicate or
/// out-of-range indices are ignored.  Completing the word advances the
/// level within the same transition.
pub fn collect_letter(state: &RunState, index: usize, rng: &mut impl Rng) -> RunState {
    if index >= state.target_word.len() || state.collected_letters.contains(&index) {
        return state.clone();
    }

    let mut collected_letters = state.collected_letters.clone();
    collected_letters.insert(index);
    debug!(
        "letter {:?} collected ({}/{})",
        state.target_word[index],
        collected_letters.len(),
        state.target_word.len()
    );

    let next = RunState {
        collected_letters,
        speed: state.speed + LETTER_SPEED_BONUS,
        ..state.clone()
    };

    if next.word_complete() {
        advance_level(&next, rng)
    } else {
        next
    }
}

pub fn advance_level(state: &RunState, rng: &mut impl Rng) -> RunState {
    let level = state.level + 1;
    let word = WORD_POOL.choose(rng).copied().unwrap_or(FIRST_WORD);

    let lane_count = if level % LANE_EXPANSION_INTERVAL == 0 && state.lane_count < MAX_LANES {
        state.lane_count + 2
    } else {
        state.lane_count
    };

    info!("advanced to level {} ({} lanes), next word {}", level, lane_count, word);

    RunState {
        level,
        target_word: spell(word),
        lane_count,
        collected_letters: BTreeSet::new(),
        speed: calculate_speed(level),
        status: GameStatus::Playing,
        ..state.clone()
    }
}

// ── Shop ─────────────────────────────────────────────────────────────────────

pub fn open_shop(state: &RunState) -> RunState {
    RunState {
        status: GameStatus::Shop,
        ..state.clone()
    }
}

pub fn close_shop(state: &RunState) -> RunState {
    RunState {
        status: GameStatus::Playing,
        ..state.clone()
    }
}

/// Try to buy `kind` for `cost`.  Returns the new state and whether the
/// purchase went through; an unaffordable item leaves the state untouched.
pub fn buy_item(state: &RunState, kind: ShopItemKind, cost: u32) -> (RunState, bool) {
    if state.score < cost {
        debug!("cannot afford {:?}: {} < {}", kind, state.score, cost);
        return (state.clone(), false);
    }

    let paid = RunState {
        score: state.score - cost,
        ..state.clone()
    };

    let next = match kind {
        ShopItemKind::DoubleJump => RunState {
            has_double_jump: true,
            ..paid
        },
        ShopItemKind::MaxLife => RunState {
            max_lives: paid.max_lives + 1,
            lives: paid.lives + 1,
            ..paid
        },
        ShopItemKind::Heal => RunState {
            lives: (paid.lives + 1).min(paid.max_lives),
            ..paid
        },
        ShopItemKind::Immortal => RunState {
            has_immortality: true,
            ..paid
        },
    };

    info!("bought {:?} for {}, {} left", kind, cost, next.score);
    (next, true)
}

// ── Immortality & time ───────────────────────────────────────────────────────

pub fn activate_immortality(state: &RunState) -> RunState {
    if !state.has_immortality || state.is_immortality_active {
        return state.clone();
    }
    debug!("immortality on until {:?}", state.clock + IMMORTALITY_DURATION);
    RunState {
        is_immortality_active: true,
        immortality_expires_at: Some(state.clock + IMMORTALITY_DURATION),
        ..state.clone()
    }
}

/// Move the simulated clock forward by `dt`, expiring immortality once its
/// deadline has passed.  Status changes never cancel the deadline.
pub fn advance_clock(state: &RunState, dt: Duration) -> RunState {
    let clock = state.clock + dt;
    match state.immortality_expires_at {
        Some(at) if clock >= at => {
            debug!("immortality expired");
            RunState {
                clock,
                is_immortality_active: false,
                immortality_expires_at: None,
                ..state.clone()
            }
        }
        _ => RunState {
            clock,
            ..state.clone()
        },
    }
}

// ── Direct setters ───────────────────────────────────────────────────────────

pub fn set_distance(state: &RunState, distance: f32) -> RunState {
    RunState {
        distance,
        ..state.clone()
    }
}

/// Force a status.  Nothing moves in the menu or after a game over, so
/// entering either one stops the runner.
pub fn set_status(state: &RunState, status: GameStatus) -> RunState {
    let speed = match status {
        GameStatus::Menu | GameStatus::GameOver => 0.0,
        _ => state.speed,
    };
    RunState {
        status,
        speed,
        ..state.clone()
    }
}
