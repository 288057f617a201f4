/// The lane world the runner travels through.
///
/// This is the spawn/collision collaborator of the progression engine:
/// it owns the runner's lane and jump (pure kinematics, not progression)
/// plus the objects ahead, and reports every overlap to `compute`.

use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::compute::{
    advance_clock, collect_item, collect_letter, open_shop, set_distance, take_damage,
};
use crate::entities::{GameStatus, RunState};

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Objects appear this far ahead of the runner.
pub const SPAWN_DISTANCE: f32 = 120.0;
/// Objects are dropped once this far behind the runner.
pub const REMOVE_DISTANCE: f32 = 20.0;
/// Distance travelled between two spawned objects.
pub const SPAWN_GAP: f32 = 9.0;

pub const JUMP_HEIGHT: f32 = 2.5;
/// Seconds from take-off to landing for a single jump.
pub const JUMP_DURATION: f32 = 0.6;
/// Above this height the runner sails over obstacles.
pub const CLEAR_HEIGHT: f32 = 1.0;
/// Half-depth of the runner's hit box along the track.
pub const HIT_DEPTH: f32 = 1.0;
/// After losing a life the runner ignores obstacles for this long.
pub const HIT_GRACE: Duration = Duration::from_millis(1500);

/// Chance that a spawn slot holds one of the missing letters.
pub const LETTER_CHANCE: f64 = 0.25;
pub const OBSTACLE_CHANCE: f64 = 0.55;
pub const ITEM_POINTS: [u32; 3] = [50, 100, 150];

const GRAVITY: f32 = 8.0 * JUMP_HEIGHT / (JUMP_DURATION * JUMP_DURATION);
const JUMP_VELOCITY: f32 = 4.0 * JUMP_HEIGHT / JUMP_DURATION;

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Obstacle,
    Item { points: u32 },
    /// Index into the target word at spawn time.
    Letter { index: usize, ch: char },
    /// Spans every lane; running through it opens the shop.
    ShopPortal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldObject {
    /// Lane offset from the centre lane (negative = left).
    pub lane: i32,
    /// Distance ahead of the runner.
    pub z: f32,
    pub kind: ObjectKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Runner {
    pub lane: i32,
    pub height: f32,
    pub vertical_velocity: f32,
    /// Jumps used since last touching the ground.
    pub jumps: u32,
    /// Clock time until which obstacle hits are ignored.
    pub grace_until: Option<Duration>,
}

impl Runner {
    pub fn airborne(&self) -> bool {
        self.jumps > 0
    }

    pub fn in_grace(&self, clock: Duration) -> bool {
        self.grace_until.map_or(false, |until| clock < until)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub runner: Runner,
    pub objects: Vec<WorldObject>,
    /// Distance mark at which the next object spawns.
    pub next_spawn_at: f32,
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn init_world() -> World {
    World {
        runner: Runner {
            lane: 0,
            height: 0.0,
            vertical_velocity: 0.0,
            jumps: 0,
            grace_until: None,
        },
        objects: Vec::new(),
        next_spawn_at: 0.0,
    }
}

/// Outermost lane offset for a given lane count.
pub fn max_lane(lane_count: u32) -> i32 {
    (lane_count / 2) as i32
}

// ── Input-driven transitions (pure) ──────────────────────────────────────────

pub fn move_left(world: &World, lane_count: u32) -> World {
    let lane = (world.runner.lane - 1).max(-max_lane(lane_count));
    World {
        runner: Runner { lane, ..world.runner.clone() },
        ..world.clone()
    }
}

pub fn move_right(world: &World, lane_count: u32) -> World {
    let lane = (world.runner.lane + 1).min(max_lane(lane_count));
    World {
        runner: Runner { lane, ..world.runner.clone() },
        ..world.clone()
    }
}

/// Take off, or jump again mid-air when the double jump is owned.
pub fn jump(world: &World, has_double_jump: bool) -> World {
    let max_jumps = if has_double_jump { 2 } else { 1 };
    if world.runner.jumps >= max_jumps {
        return world.clone();
    }
    World {
        runner: Runner {
            vertical_velocity: JUMP_VELOCITY,
            jumps: world.runner.jumps + 1,
            ..world.runner.clone()
        },
        ..world.clone()
    }
}

// ── Per-frame step (RNG injected) ────────────────────────────────────────────

fn step_runner(runner: &Runner, lane_count: u32, secs: f32) -> Runner {
    let limit = max_lane(lane_count);
    let lane = runner.lane.clamp(-limit, limit);
    if !runner.airborne() {
        return Runner { lane, ..runner.clone() };
    }

    let vertical_velocity = runner.vertical_velocity - GRAVITY * secs;
    let height = runner.height + runner.vertical_velocity * secs;
    if height <= 0.0 {
        Runner {
            lane,
            height: 0.0,
            vertical_velocity: 0.0,
            jumps: 0,
            ..runner.clone()
        }
    } else {
        Runner {
            lane,
            height,
            vertical_velocity,
            ..runner.clone()
        }
    }
}

fn spawn_object(state: &RunState, rng: &mut impl Rng) -> WorldObject {
    let limit = max_lane(state.lane_count);
    let lane = rng.gen_range(-limit..=limit);
    let missing = state.missing_letters();

    let kind = if !missing.is_empty() && rng.gen_bool(LETTER_CHANCE) {
        let index = missing[rng.gen_range(0..missing.len())];
        ObjectKind::Letter {
            index,
            ch: state.target_word[index],
        }
    } else if rng.gen_bool(OBSTACLE_CHANCE) {
        ObjectKind::Obstacle
    } else {
        ObjectKind::Item {
            points: ITEM_POINTS[rng.gen_range(0..ITEM_POINTS.len())],
        }
    };

    WorldObject {
        lane,
        z: SPAWN_DISTANCE,
        kind,
    }
}

/// Route one overlap to the engine.  Returns the new state and whether
/// the object is used up.  A lost life starts the runner's grace window.
fn resolve_hit(
    state: &RunState,
    runner: &mut Runner,
    kind: &ObjectKind,
    rng: &mut impl Rng,
) -> (RunState, bool) {
    match kind {
        ObjectKind::Obstacle
            if runner.height >= CLEAR_HEIGHT || runner.in_grace(state.clock) =>
        {
            (state.clone(), false)
        }
        ObjectKind::Obstacle => {
            let next = take_damage(state);
            if next.lives < state.lives {
                runner.grace_until = Some(state.clock + HIT_GRACE);
            }
            (next, true)
        }
        ObjectKind::Item { points } => (collect_item(state, *points), true),
        ObjectKind::Letter { index, .. } => (collect_letter(state, *index, rng), true),
        ObjectKind::ShopPortal => (open_shop(state), true),
    }
}

/// Advance the world by `dt`.
///
/// The simulated clock always runs so a pending immortality keeps
/// counting down in the shop.  Everything else only moves while playing.
pub fn step(
    world: &World,
    state: &RunState,
    dt: Duration,
    rng: &mut impl Rng,
) -> (World, RunState) {
    let mut state = advance_clock(state, dt);
    if state.status != GameStatus::Playing {
        return (world.clone(), state);
    }

    let secs = dt.as_secs_f32();
    let mut runner = step_runner(&world.runner, state.lane_count, secs);
    let travel = state.speed * secs;
    let distance = state.distance + travel;
    state = set_distance(&state, distance);

    // ── Move objects & resolve overlaps ──────────────────────────────────────
    let level_before = state.level;
    let mut objects = Vec::with_capacity(world.objects.len() + 1);
    for object in &world.objects {
        let z = object.z - travel;
        let in_lane = object.kind == ObjectKind::ShopPortal || object.lane == runner.lane;
        let overlaps = object.z > -HIT_DEPTH && z <= HIT_DEPTH;

        if in_lane && overlaps && state.status == GameStatus::Playing {
            let (next, used) = resolve_hit(&state, &mut runner, &object.kind, rng);
            state = next;
            if used {
                continue;
            }
        }
        if z > -REMOVE_DISTANCE {
            objects.push(WorldObject { z, ..object.clone() });
        }
    }

    // A finished word invalidates the letters still on the track.
    if state.level != level_before {
        objects.retain(|o| !matches!(o.kind, ObjectKind::Letter { .. }));
        objects.push(WorldObject {
            lane: 0,
            z: SPAWN_DISTANCE,
            kind: ObjectKind::ShopPortal,
        });
        debug!("shop portal spawned for level {}", state.level);
    }

    // ── Spawn ────────────────────────────────────────────────────────────────
    let mut next_spawn_at = world.next_spawn_at;
    if state.status == GameStatus::Playing && distance >= next_spawn_at {
        objects.push(spawn_object(&state, rng));
        next_spawn_at = distance + SPAWN_GAP;
    }

    (
        World {
            runner,
            objects,
            next_spawn_at,
        },
        state,
    )
}
