mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use glam_runner::compute::{
    activate_immortality, close_shop, init_state, restart_game, set_status, start_game,
};
use glam_runner::config::Settings;
use glam_runner::entities::{GameStatus, RunState, ShopItem};
use glam_runner::error::{Result, RunnerError};
use glam_runner::shop::{prune_offers, purchase, roll_offers, SHOP_ITEMS};
use glam_runner::world::{init_world, jump, move_left, move_right, step, World};

use display::Frame;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Best-score persistence ────────────────────────────────────────────────────

fn load_high_score(path: &Path) -> u32 {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn save_high_score(path: &Path, score: u32) {
    if let Err(e) = std::fs::write(path, score.to_string()) {
        warn!("could not save best score to {}: {}", path.display(), e);
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log records go to a file, never to the raw-mode terminal.
fn init_logging(settings: &Settings) -> Result<()> {
    let path = match &settings.log_file {
        Some(path) => path,
        None => return Ok(()),
    };
    let file = File::create(path).map_err(|source| RunnerError::LogFile {
        path: path.clone(),
        source,
    })?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  GLAM  RUNNER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Magenta))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Collect letters to spell the word,"))?;
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(2)))?;
    out.queue(Print("dodge ▓▓▓, grab ◆ for the shop."))?;

    // Shop legend
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Shop upgrades (run through ═══ after a word):"))?;
    for (i, item) in SHOP_ITEMS.iter().enumerate() {
        let row = cy + 1 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::Cyan))?;
        out.queue(Print(format!("{:<15}", item.name)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" {:>5}  {}", item.cost, item.description)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 6))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print("ENTER : Start   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// One keypress applied to the run.  Returns `Some` when the loop should end.
fn handle_key(
    code: KeyCode,
    modifiers: KeyModifiers,
    state: &mut RunState,
    world: &mut World,
    offers: &mut Vec<ShopItem>,
) -> Option<LoopExit> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(LoopExit::Quit),
        // Esc leaves the shop instead
        KeyCode::Esc if state.status != GameStatus::Shop => return Some(LoopExit::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(LoopExit::Quit);
        }
        _ => {}
    }

    match state.status {
        GameStatus::Playing => match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                *world = move_left(world, state.lane_count);
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                *world = move_right(world, state.lane_count);
            }
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                *world = jump(world, state.has_double_jump);
            }
            KeyCode::Char(' ') => *state = activate_immortality(state),
            _ => {}
        },
        GameStatus::Shop => match code {
            KeyCode::Char(c @ '1'..='9') => {
                let slot = c as usize - '1' as usize;
                let (next, bought) = purchase(state, offers, slot);
                if bought {
                    *offers = prune_offers(&next, offers);
                }
                *state = next;
            }
            KeyCode::Enter | KeyCode::Esc => *state = close_shop(state),
            _ => {}
        },
        GameStatus::GameOver | GameStatus::Victory => match code {
            KeyCode::Char('r') | KeyCode::Char('R') => {
                *state = restart_game(state);
                *world = init_world();
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                *state = set_status(state, GameStatus::Menu);
                return Some(LoopExit::Menu);
            }
            _ => {}
        },
        GameStatus::Menu => {}
    }
    None
}

fn game_loop<W: Write>(
    out: &mut W,
    state: &mut RunState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    settings: &Settings,
    high_score: &mut u32,
) -> Result<LoopExit> {
    let mut world = init_world();
    let mut offers: Vec<ShopItem> = Vec::new();
    let mut previous_best = *high_score;

    loop {
        let frame_start = Instant::now();
        let status_before = state.status;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = ev {
                if let Some(exit) = handle_key(code, modifiers, state, &mut world, &mut offers) {
                    return Ok(exit);
                }
            }
        }

        // A retry starts a new run against the current record
        if matches!(status_before, GameStatus::GameOver | GameStatus::Victory)
            && state.status == GameStatus::Playing
        {
            previous_best = *high_score;
        }

        let (next_world, next_state) = step(&world, state, FRAME, rng);
        world = next_world;
        *state = next_state;

        if let Some(finish) = settings.finish_distance {
            if state.status == GameStatus::Playing && state.distance >= finish {
                info!("finish line reached at {:.0}", state.distance);
                *state = set_status(state, GameStatus::Victory);
            }
        }

        // Fresh offers on every shop visit
        if state.status == GameStatus::Shop && status_before != GameStatus::Shop {
            offers = roll_offers(state, rng);
        }

        if matches!(state.status, GameStatus::GameOver | GameStatus::Victory)
            && state.score > *high_score
        {
            *high_score = state.score;
            save_high_score(&settings.score_file, *high_score);
        }

        let (width, height) = terminal::size()?;
        display::render(
            out,
            &Frame {
                state,
                world: &world,
                offers: &offers,
                previous_best,
                width,
                height,
            },
        )?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let settings = Settings::from_env()?;
    init_logging(&settings)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &settings);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, settings: &Settings) -> Result<()> {
    let mut high_score = load_high_score(&settings.score_file);
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut state = init_state();

    loop {
        match show_menu(out, rx, high_score)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                state = start_game(&state);
                let exit = game_loop(out, &mut state, rx, &mut rng, settings, &mut high_score)?;
                if let LoopExit::Quit = exit {
                    break;
                }
            }
        }
    }
    Ok(())
}
