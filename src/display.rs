/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// run.  No game logic is performed; this module only translates state
/// into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam_runner::compute::MAX_LEVELS;
use glam_runner::entities::{GameStatus, RunState, ShopItem};
use glam_runner::shop::can_afford;
use glam_runner::world::{max_lane, ObjectKind, World, WorldObject, SPAWN_DISTANCE};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkMagenta;
const C_HUD_SCORE: Color = Color::Green;
const C_HUD_STASH: Color = Color::Cyan;
const C_HUD_LIVES: Color = Color::Magenta;
const C_HUD_LEVEL: Color = Color::Yellow;
const C_RUNNER: Color = Color::White;
const C_RUNNER_IMMORTAL: Color = Color::Yellow;
const C_OBSTACLE: Color = Color::Red;
const C_ITEM: Color = Color::Cyan;
const C_PORTAL: Color = Color::Blue;
const C_LETTER_MISSING: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;

/// Cycled across the letters of the word, like the neon HUD of the web build.
const GLAM_COLORS: [Color; 6] = [
    Color::Magenta,
    Color::Green,
    Color::Cyan,
    Color::Red,
    Color::Yellow,
    Color::White,
];

/// Columns per lane on screen.
const LANE_WIDTH: u16 = 5;
/// First row of the track (rows above are HUD).
const TRACK_TOP: u16 = 4;

/// Everything one frame needs.
pub struct Frame<'a> {
    pub state: &'a RunState,
    pub world: &'a World,
    pub offers: &'a [ShopItem],
    /// Best score as it stood when the current run began.
    pub previous_best: u32,
    pub width: u16,
    pub height: u16,
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_track(out, frame)?;
    for object in &frame.world.objects {
        draw_object(out, frame, object)?;
    }
    draw_runner(out, frame)?;
    draw_hud(out, frame)?;
    draw_controls_hint(out, frame)?;

    match frame.state.status {
        GameStatus::Shop => draw_shop(out, frame)?,
        GameStatus::GameOver => draw_game_over(out, frame)?,
        GameStatus::Victory => draw_victory(out, frame)?,
        GameStatus::Menu | GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, frame.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Geometry ──────────────────────────────────────────────────────────────────

fn track_bottom(frame: &Frame) -> u16 {
    frame.height.saturating_sub(3)
}

fn track_left(frame: &Frame) -> u16 {
    let track_width = frame.state.lane_count as u16 * LANE_WIDTH;
    (frame.width / 2).saturating_sub(track_width / 2)
}

/// Centre column of a lane offset.
fn lane_column(frame: &Frame, lane: i32) -> u16 {
    let slot = (lane + max_lane(frame.state.lane_count)).max(0) as u16;
    track_left(frame) + slot * LANE_WIDTH + LANE_WIDTH / 2
}

/// Screen row for a depth ahead of the runner, or `None` when off-track.
fn depth_row(frame: &Frame, z: f32) -> Option<u16> {
    if !(0.0..=SPAWN_DISTANCE).contains(&z) {
        return None;
    }
    let bottom = track_bottom(frame);
    let rows = bottom.saturating_sub(TRACK_TOP) as f32;
    let offset = (z / SPAWN_DISTANCE * rows).round() as u16;
    Some(bottom.saturating_sub(offset))
}

fn print_centered<W: Write>(
    out: &mut W,
    frame: &Frame,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (frame.width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Track ─────────────────────────────────────────────────────────────────────

fn draw_track<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let left = track_left(frame);
    let lanes = frame.state.lane_count as u16;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    for row in TRACK_TOP..=track_bottom(frame) {
        for divider in 0..=lanes {
            out.queue(cursor::MoveTo(left + divider * LANE_WIDTH, row))?;
            out.queue(Print(if divider == 0 || divider == lanes { "║" } else { "┊" }))?;
        }
    }
    Ok(())
}

fn draw_object<W: Write>(out: &mut W, frame: &Frame, object: &WorldObject) -> std::io::Result<()> {
    let row = match depth_row(frame, object.z) {
        Some(row) => row,
        None => return Ok(()),
    };

    match &object.kind {
        ObjectKind::ShopPortal => {
            let left = track_left(frame) + 1;
            let span = (frame.state.lane_count as u16 * LANE_WIDTH).saturating_sub(1);
            out.queue(cursor::MoveTo(left, row))?;
            out.queue(style::SetForegroundColor(C_PORTAL))?;
            out.queue(Print("═".repeat(span as usize)))?;
        }
        ObjectKind::Obstacle => {
            out.queue(cursor::MoveTo(lane_column(frame, object.lane).saturating_sub(1), row))?;
            out.queue(style::SetForegroundColor(C_OBSTACLE))?;
            out.queue(Print("▓▓▓"))?;
        }
        ObjectKind::Item { .. } => {
            out.queue(cursor::MoveTo(lane_column(frame, object.lane), row))?;
            out.queue(style::SetForegroundColor(C_ITEM))?;
            out.queue(Print("◆"))?;
        }
        ObjectKind::Letter { index, ch } => {
            out.queue(cursor::MoveTo(lane_column(frame, object.lane), row))?;
            out.queue(style::SetForegroundColor(GLAM_COLORS[index % GLAM_COLORS.len()]))?;
            out.queue(Print(ch))?;
        }
    }
    Ok(())
}

fn draw_runner<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let runner = &frame.world.runner;
    // Blink while recovering from a hit
    let clock = frame.state.clock;
    if runner.in_grace(clock) && (clock.as_millis() / 100) % 2 == 1 {
        return Ok(());
    }
    let col = lane_column(frame, runner.lane);
    let row = track_bottom(frame);
    let color = if frame.state.is_immortality_active {
        C_RUNNER_IMMORTAL
    } else {
        C_RUNNER
    };
    out.queue(style::SetForegroundColor(color))?;

    if runner.airborne() {
        out.queue(cursor::MoveTo(col, row.saturating_sub(1)))?;
        out.queue(Print("☻"))?;
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("˙"))?;
    } else {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("☻"))?;
    }
    Ok(())
}

// ── HUD (rows 0-2) ────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let state = frame.state;

    // Score + stash — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("{:>8}", state.score)))?;
    out.queue(cursor::MoveTo(1, 1))?;
    out.queue(style::SetForegroundColor(C_HUD_STASH))?;
    out.queue(Print(format!("STASH: {}", state.items_collected)))?;

    // Level — centre
    let level_str = format!("[ LEVEL {} / {} ]", state.level, MAX_LEVELS);
    print_centered(out, frame, 0, &level_str, C_HUD_LEVEL)?;

    // Hearts — right, empty slots dimmed
    let rx = frame
        .width
        .saturating_sub(state.max_lives as u16 * 2 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    for slot in 0..state.max_lives {
        let color = if slot < state.lives { C_HUD_LIVES } else { C_HINT };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print("♥ "))?;
    }

    // Word progress
    let word_width = state.target_word.len() as u16 * 2;
    let wx = (frame.width / 2).saturating_sub(word_width / 2);
    out.queue(cursor::MoveTo(wx, 1))?;
    for (idx, ch) in state.target_word.iter().enumerate() {
        let color = if state.collected_letters.contains(&idx) {
            GLAM_COLORS[idx % GLAM_COLORS.len()]
        } else {
            C_LETTER_MISSING
        };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(format!("{} ", ch)))?;
    }

    if let Some(remaining) = state.immortality_remaining() {
        let tag = format!("♛ QUEEN MODE {:.1}s", remaining.as_secs_f32());
        print_centered(out, frame, 2, &tag, C_RUNNER_IMMORTAL)?;
    }

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let mut hint = String::from("← → / A D : Lane   ↑ / W : Jump");
    if frame.state.has_immortality {
        hint.push_str("   SPACE : Queen mode");
    }
    hint.push_str("   Q : Quit");

    out.queue(cursor::MoveTo(1, frame.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_box<W: Write>(
    out: &mut W,
    frame: &Frame,
    start_row: u16,
    title: &str,
    color: Color,
) -> std::io::Result<u16> {
    let lines = [
        "╔════════════════════════╗".to_string(),
        format!("║{:^24}║", title),
        "╚════════════════════════╝".to_string(),
    ];
    for (i, line) in lines.iter().enumerate() {
        print_centered(out, frame, start_row + i as u16, line, color)?;
    }
    Ok(start_row + lines.len() as u16)
}

fn draw_shop<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let state = frame.state;
    let start_row = (frame.height / 2).saturating_sub(6);
    let mut row = draw_box(out, frame, start_row, "GLAM  SHOP", Color::Cyan)?;

    let stash = format!("STASH: {} POINTS", state.score);
    print_centered(out, frame, row, &stash, C_HUD_SCORE)?;
    row += 2;

    if frame.offers.is_empty() {
        print_centered(out, frame, row, "Sold out!", C_HINT)?;
        row += 1;
    }
    for (slot, item) in frame.offers.iter().enumerate() {
        let color = if can_afford(state, item) { Color::White } else { C_HINT };
        let line = format!("[{}] {:<15} {:>5}  {}", slot + 1, item.name, item.cost, item.description);
        print_centered(out, frame, row, &line, color)?;
        row += 1;
    }

    print_centered(out, frame, row + 1, "ENTER - Resume Run", Color::White)?;
    Ok(())
}

/// Best-score caption for the end of a run, and whether it is a record.
fn best_score_line(score: u32, previous_best: u32) -> (String, bool) {
    if score > previous_best {
        (format!("★ NEW BEST: {:>8} ★", score), true)
    } else {
        (format!("Best Score: {:>8}", previous_best), false)
    }
}

fn draw_game_over<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let state = frame.state;
    let (best_line, new_best) = best_score_line(state.score, frame.previous_best);
    let start_row = (frame.height / 2).saturating_sub(4);
    let row = draw_box(out, frame, start_row, "GAME  OVER", Color::Red)?;

    let score_line = format!("Score: {:>8}   Level: {}", state.score, state.level);
    print_centered(out, frame, row, &score_line, Color::Yellow)?;

    let best_color = if new_best { Color::Yellow } else { C_HINT };
    print_centered(out, frame, row + 1, &best_line, best_color)?;

    let hint = format!("R - Retry Level {}   M - Main Menu   Q - Quit", state.level);
    print_centered(out, frame, row + 2, &hint, Color::White)?;
    Ok(())
}

fn draw_victory<W: Write>(out: &mut W, frame: &Frame) -> std::io::Result<()> {
    let start_row = (frame.height / 2).saturating_sub(3);
    let row = draw_box(out, frame, start_row, "YOU SLAYED IT", Color::Green)?;

    let score_line = format!("Final Score: {:>8}", frame.state.score);
    print_centered(out, frame, row, &score_line, Color::Yellow)?;
    print_centered(out, frame, row + 1, "R - Next Runway   M - Main Menu   Q - Quit", Color::White)?;
    Ok(())
}
