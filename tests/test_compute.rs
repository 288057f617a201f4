use std::time::Duration;

use glam_runner::compute::*;
use glam_runner::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> RunState {
    start_game(&init_state())
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── init_state / start_game ───────────────────────────────────────────────────

#[test]
fn init_state_is_menu_and_still() {
    let s = init_state();
    assert_eq!(s.status, GameStatus::Menu);
    assert_eq!(s.speed, 0.0);
    assert_eq!(s.lives, 5);
    assert_eq!(s.max_lives, 5);
    assert_eq!(s.level, 1);
    assert_eq!(s.lane_count, 3);
    assert_eq!(s.target_word, vec!['S', 'A', 'S', 'S', 'Y']);
}

#[test]
fn start_game_full_reset() {
    let mut s = make_state();
    s.score = 9000;
    s.level = 12;
    s.lane_count = 7;
    s.max_lives = 8;
    s.lives = 2;
    s.items_collected = 40;
    s.distance = 812.0;
    s.has_double_jump = true;
    s.has_immortality = true;
    s.is_immortality_active = true;
    s.immortality_expires_at = Some(Duration::from_secs(3));
    s.collected_letters.insert(1);
    s.status = GameStatus::GameOver;

    let s2 = start_game(&s);
    assert_eq!(s2.status, GameStatus::Playing);
    assert_eq!(s2.score, 0);
    assert_eq!(s2.lives, 5);
    assert_eq!(s2.max_lives, 5);
    assert_eq!(s2.speed, BASE_SPEED);
    assert!(s2.collected_letters.is_empty());
    assert_eq!(s2.target_word, vec!['S', 'A', 'S', 'S', 'Y']);
    assert_eq!(s2.level, 1);
    assert_eq!(s2.lane_count, 3);
    assert_eq!(s2.items_collected, 0);
    assert_eq!(s2.distance, 0.0);
    assert!(!s2.has_double_jump);
    assert!(!s2.has_immortality);
    assert!(!s2.is_immortality_active);
    assert_eq!(s2.immortality_expires_at, None);
}

// ── calculate_speed ───────────────────────────────────────────────────────────

#[test]
fn speed_at_level_one_is_base() {
    assert_eq!(calculate_speed(1), BASE_SPEED);
}

#[test]
fn speed_caps_at_level_fifty() {
    assert_eq!(calculate_speed(50), calculate_speed(200));
    assert_eq!(calculate_speed(51), calculate_speed(50));
}

#[test]
fn speed_strictly_increases_up_to_cap() {
    for level in 1..50 {
        assert!(calculate_speed(level + 1) > calculate_speed(level), "level {}", level);
    }
}

#[test]
fn speed_grows_five_percent_of_base_per_level() {
    let step = calculate_speed(2) - calculate_speed(1);
    assert!((step - BASE_SPEED * 0.05).abs() < 1e-4);
    assert!((calculate_speed(50) - BASE_SPEED * 3.45).abs() < 1e-3);
}

// ── take_damage ───────────────────────────────────────────────────────────────

#[test]
fn damage_decrements_lives() {
    let s = make_state();
    let s2 = take_damage(&s);
    assert_eq!(s2.lives, 4);
    assert_eq!(s2.status, GameStatus::Playing);
    assert_eq!(s2.speed, s.speed);
}

#[test]
fn last_life_ends_the_run() {
    let mut s = make_state();
    s.lives = 1;
    let s2 = take_damage(&s);
    assert_eq!(s2.lives, 0);
    assert_eq!(s2.status, GameStatus::GameOver);
    assert_eq!(s2.speed, 0.0);
}

#[test]
fn repeated_damage_never_goes_negative() {
    let mut s = make_state();
    let mut game_overs = 0;
    for _ in 0..20 {
        let before = s.status;
        s = take_damage(&s);
        if before != GameStatus::GameOver && s.status == GameStatus::GameOver {
            game_overs += 1;
            assert_eq!(s.lives, 0);
            assert_eq!(s.speed, 0.0);
        }
        assert_eq!(s.lives == 0, s.status == GameStatus::GameOver);
    }
    assert_eq!(s.lives, 0);
    assert_eq!(game_overs, 1);
}

#[test]
fn damage_while_game_over_changes_nothing() {
    let mut s = make_state();
    s.lives = 1;
    let over = take_damage(&s);
    assert_eq!(take_damage(&over), over);
}

#[test]
fn damage_ignored_while_immortal() {
    let mut s = make_state();
    s.has_immortality = true;
    let s = activate_immortality(&s);
    assert_eq!(take_damage(&s), s);

    let mut last = s.clone();
    last.lives = 1;
    assert_eq!(take_damage(&last), last);
}

// ── add_score / collect_item ──────────────────────────────────────────────────

#[test]
fn add_score_accumulates() {
    let s = add_score(&make_state(), 250);
    let s = add_score(&s, 50);
    assert_eq!(s.score, 300);
    assert_eq!(s.items_collected, 0);
}

#[test]
fn collect_item_scores_and_counts() {
    let s = collect_item(&make_state(), 100);
    let s = collect_item(&s, 50);
    assert_eq!(s.score, 150);
    assert_eq!(s.items_collected, 2);
}

// ── collect_letter ────────────────────────────────────────────────────────────

#[test]
fn letter_collection_adds_index_and_speed() {
    let s = make_state();
    let s2 = collect_letter(&s, 3, &mut seeded_rng());
    assert!(s2.collected_letters.contains(&3));
    assert_eq!(s2.collected_letters.len(), 1);
    assert_eq!(s2.speed, BASE_SPEED + LETTER_SPEED_BONUS);
}

#[test]
fn duplicate_letter_is_ignored() {
    let s = make_state();
    let mut rng = seeded_rng();
    let once = collect_letter(&s, 2, &mut rng);
    let twice = collect_letter(&once, 2, &mut rng);
    assert_eq!(twice, once);
}

#[test]
fn out_of_range_letter_is_ignored() {
    let s = make_state();
    let s2 = collect_letter(&s, 5, &mut seeded_rng());
    assert_eq!(s2, s);
}

#[test]
fn completing_the_word_advances_exactly_one_level() {
    let s = make_state();
    let mut rng = seeded_rng();
    let mut s2 = s.clone();
    for index in [4, 0, 2, 1, 3] {
        s2 = collect_letter(&s2, index, &mut rng);
    }
    assert_eq!(s2.level, 2);
    assert!(s2.collected_letters.is_empty());
    assert_eq!(s2.speed, calculate_speed(2));
    assert_eq!(s2.status, GameStatus::Playing);
    let word: String = s2.target_word.iter().collect();
    assert!(WORD_POOL.contains(&word.as_str()), "unexpected word {}", word);
}

#[test]
fn partial_word_keeps_level() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    for index in 0..4 {
        s = collect_letter(&s, index, &mut rng);
    }
    assert_eq!(s.level, 1);
    assert_eq!(s.collected_letters.len(), 4);
    assert_eq!(s.speed, BASE_SPEED + 4.0 * LETTER_SPEED_BONUS);
}

// ── advance_level ─────────────────────────────────────────────────────────────

#[test]
fn advance_level_from_four_adds_lanes() {
    let mut s = make_state();
    s.level = 4;
    let s2 = advance_level(&s, &mut seeded_rng());
    assert_eq!(s2.level, 5);
    assert_eq!(s2.lane_count, 5);
}

#[test]
fn lanes_grow_every_fifth_level_up_to_nine() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    let mut lanes_at = std::collections::HashMap::new();
    while s.level < 25 {
        s = advance_level(&s, &mut rng);
        lanes_at.insert(s.level, s.lane_count);
    }
    assert_eq!(lanes_at[&4], 3);
    assert_eq!(lanes_at[&5], 5);
    assert_eq!(lanes_at[&9], 5);
    assert_eq!(lanes_at[&10], 7);
    assert_eq!(lanes_at[&15], 9);
    assert_eq!(lanes_at[&20], 9);
    assert_eq!(lanes_at[&25], 9);
}

#[test]
fn advance_level_resets_word_cycle_and_resumes_play() {
    let mut s = make_state();
    s.status = GameStatus::Shop;
    s.collected_letters.insert(0);
    s.score = 1234;
    let s2 = advance_level(&s, &mut seeded_rng());
    assert_eq!(s2.status, GameStatus::Playing);
    assert!(s2.collected_letters.is_empty());
    assert_eq!(s2.score, 1234);
    assert_eq!(s2.speed, calculate_speed(2));
}

#[test]
fn advance_level_word_is_reproducible_with_seed() {
    let s = make_state();
    let a = advance_level(&s, &mut StdRng::seed_from_u64(7));
    let b = advance_level(&s, &mut StdRng::seed_from_u64(7));
    assert_eq!(a.target_word, b.target_word);
}

#[test]
fn level_keeps_counting_past_the_cap() {
    let mut s = make_state();
    s.level = 50;
    let s2 = advance_level(&s, &mut seeded_rng());
    assert_eq!(s2.level, 51);
    assert_eq!(s2.speed, calculate_speed(50));
}

// ── shop ──────────────────────────────────────────────────────────────────────

#[test]
fn open_and_close_shop_only_touch_status() {
    let s = make_state();
    let shop = open_shop(&s);
    assert_eq!(shop.status, GameStatus::Shop);
    let back = close_shop(&shop);
    assert_eq!(back, s);
}

#[test]
fn heal_restores_one_life() {
    let mut s = make_state();
    s.score = 1000;
    s.lives = 3;
    let (s2, ok) = buy_item(&s, ShopItemKind::Heal, 1000);
    assert!(ok);
    assert_eq!(s2.score, 0);
    assert_eq!(s2.lives, 4);
}

#[test]
fn heal_never_overheals_but_still_charges() {
    let mut s = make_state();
    s.score = 1000;
    let (s2, ok) = buy_item(&s, ShopItemKind::Heal, 1000);
    assert!(ok);
    assert_eq!(s2.lives, 5);
    assert_eq!(s2.score, 0);
}

#[test]
fn max_life_adds_and_fills_a_slot() {
    let mut s = make_state();
    s.score = 1500;
    s.lives = 3;
    let (s2, ok) = buy_item(&s, ShopItemKind::MaxLife, 1500);
    assert!(ok);
    assert_eq!(s2.max_lives, 6);
    assert_eq!(s2.lives, 4);
    assert_eq!(s2.score, 0);
}

#[test]
fn unlocks_set_their_flags() {
    let mut s = make_state();
    s.score = 4000;
    let (s2, ok) = buy_item(&s, ShopItemKind::DoubleJump, 1000);
    assert!(ok && s2.has_double_jump && !s2.has_immortality);
    let (s3, ok) = buy_item(&s2, ShopItemKind::Immortal, 3000);
    assert!(ok && s3.has_immortality);
    assert!(!s3.is_immortality_active);
    assert_eq!(s3.score, 0);
}

#[test]
fn unaffordable_purchase_fails_without_change() {
    let mut s = make_state();
    s.score = 999;
    let (s2, ok) = buy_item(&s, ShopItemKind::Heal, 1000);
    assert!(!ok);
    assert_eq!(s2, s);
}

// ── restart_game ──────────────────────────────────────────────────────────────

#[test]
fn restart_is_a_checkpoint_reset() {
    let mut s = make_state();
    s.level = 7;
    s.score = 5000;
    s.items_collected = 12;
    s.lane_count = 5;
    s.max_lives = 6;
    s.lives = 2;
    s.distance = 640.0;
    s.has_double_jump = true;
    s.target_word = vec!['D', 'I', 'V', 'A'];
    s.collected_letters.insert(1);
    s.is_immortality_active = true;
    s.immortality_expires_at = Some(Duration::from_secs(2));
    s.status = GameStatus::GameOver;

    let s2 = restart_game(&s);
    assert_eq!(s2.status, GameStatus::Playing);
    assert_eq!(s2.lives, 6);
    assert_eq!(s2.distance, 0.0);
    assert!(s2.collected_letters.is_empty());
    assert!(!s2.is_immortality_active);
    assert_eq!(s2.immortality_expires_at, None);
    assert_eq!(s2.speed, calculate_speed(7));

    assert_eq!(s2.score, 5000);
    assert_eq!(s2.items_collected, 12);
    assert_eq!(s2.lane_count, 5);
    assert_eq!(s2.level, 7);
    assert_eq!(s2.max_lives, 6);
    assert_eq!(s2.target_word, vec!['D', 'I', 'V', 'A']);
    assert!(s2.has_double_jump);
}

#[test]
fn restart_from_pristine_engine_plays_level_one() {
    let s2 = restart_game(&init_state());
    assert_eq!(s2.status, GameStatus::Playing);
    assert_eq!(s2.level, 1);
    assert_eq!(s2.lives, 5);
    assert_eq!(s2.speed, BASE_SPEED);
}

// ── immortality ───────────────────────────────────────────────────────────────

#[test]
fn immortality_requires_the_unlock() {
    let s = make_state();
    assert_eq!(activate_immortality(&s), s);
}

#[test]
fn immortality_lasts_exactly_five_seconds() {
    let mut s = make_state();
    s.has_immortality = true;
    let active = activate_immortality(&s);
    assert!(active.is_immortality_active);
    assert_eq!(active.immortality_remaining(), Some(IMMORTALITY_DURATION));

    let almost = advance_clock(&active, Duration::from_millis(4999));
    assert!(almost.is_immortality_active);

    let expired = advance_clock(&almost, Duration::from_millis(1));
    assert!(!expired.is_immortality_active);
    assert_eq!(expired.immortality_expires_at, None);

    // Nothing else moved apart from the clock
    let expected = RunState {
        clock: Duration::from_secs(5),
        ..s
    };
    assert_eq!(expired, expected);
}

#[test]
fn reactivating_while_active_is_a_no_op() {
    let mut s = make_state();
    s.has_immortality = true;
    let active = activate_immortality(&s);
    let later = advance_clock(&active, Duration::from_secs(3));
    assert_eq!(activate_immortality(&later), later);

    // Original deadline still applies
    let done = advance_clock(&later, Duration::from_secs(2));
    assert!(!done.is_immortality_active);
}

#[test]
fn expiry_survives_status_changes() {
    let mut s = make_state();
    s.has_immortality = true;
    let s = activate_immortality(&s);
    let s = open_shop(&s);
    let s = advance_clock(&s, Duration::from_secs(6));
    assert_eq!(s.status, GameStatus::Shop);
    assert!(!s.is_immortality_active);
}

#[test]
fn can_reactivate_after_expiry() {
    let mut s = make_state();
    s.has_immortality = true;
    let s = advance_clock(&activate_immortality(&s), Duration::from_secs(5));
    let again = activate_immortality(&s);
    assert!(again.is_immortality_active);
    assert_eq!(again.immortality_expires_at, Some(Duration::from_secs(10)));
}

// ── setters ───────────────────────────────────────────────────────────────────

#[test]
fn set_distance_is_direct() {
    let s = set_distance(&make_state(), 321.5);
    assert_eq!(s.distance, 321.5);
}

#[test]
fn set_status_can_force_victory() {
    let s = set_status(&make_state(), GameStatus::Victory);
    assert_eq!(s.status, GameStatus::Victory);
    assert_eq!(s.speed, BASE_SPEED);
}

#[test]
fn set_status_menu_stops_the_runner() {
    let s = set_status(&make_state(), GameStatus::Menu);
    assert_eq!(s.status, GameStatus::Menu);
    assert_eq!(s.speed, 0.0);
}
