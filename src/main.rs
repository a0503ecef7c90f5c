mod display;

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use glam::Vec2;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use arcade_shooter::audio::{SoundCue, SoundSink};
use arcade_shooter::config::GameConfig;
use arcade_shooter::engine::Engine;
use arcade_shooter::entities::{Difficulty, GameState, GameStatus};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

const LOCAL_PLAYER_ID: &str = "local";

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between shots while Space is held.
/// 6 frames @ 30 FPS = 5 shots/sec.
const SHOOT_COOLDOWN: u32 = 6;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "arcade_shooter", about = "Terminal front-end for the arcade shooter core")]
struct Args {
    /// TOML file overriding the default game configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the simulation RNG (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Display name of the local player.
    #[arg(long, default_value = "Pilot")]
    name: String,

    /// Tracing output goes here when RUST_LOG is set.
    #[arg(long, default_value = "arcade_shooter.log")]
    log_file: PathBuf,
}

/// Only enabled with RUST_LOG; output goes to a file, never the game terminal.
fn init_tracing(path: &Path) -> std::io::Result<()> {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The terminal has no mixer; cues are traced instead of played.
struct LogSound;

impl SoundSink for LogSound {
    fn play(&mut self, cue: SoundCue) {
        debug!(cue = cue.name(), "sound cue");
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Difficulty),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  ARCADE  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Easy  ", Color::Green, "Small waves, generous pickups"),
        ("2", "Medium", Color::Yellow, "Balanced challenge"),
        ("3", "Hard  ", Color::Red, "Bigger, faster waves"),
        ("4", "Expert", Color::Magenta, "Relentless from the start"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    // Power-up legend
    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Power-ups (fly into falling items):"))?;

    let legend: &[(&str, Color, &str)] = &[
        ("♥", Color::Magenta, " Health      +50 HP"),
        ("★", Color::Yellow, " Weapon      spread fire, 10s"),
        ("◆", Color::Blue, " Shield      absorbs 100 damage, 8s"),
        ("»", Color::Green, " Speed       ×1.5 speed, 6s"),
        ("$", Color::DarkYellow, " Multiplier  ×2 score, 12s"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        let row = cy + 5 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    let mut click = LogSound;
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            let choice = match code {
                KeyCode::Char('1') => MenuResult::Start(Difficulty::Easy),
                KeyCode::Char('2') => MenuResult::Start(Difficulty::Medium),
                KeyCode::Char('3') => MenuResult::Start(Difficulty::Hard),
                KeyCode::Char('4') => MenuResult::Start(Difficulty::Expert),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => MenuResult::Quit,
                _ => continue,
            };
            click.play(SoundCue::ButtonClick);
            return Ok(choice);
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key, and each frame applies every key that is still
/// "fresh".  Held directions become a velocity for the local player, so
/// diagonal movement and firing can happen at the same time.
///
/// The engine pushes a snapshot after every tick; the renderer only ever
/// draws the latest snapshot it received.
fn game_loop<W: Write>(
    out: &mut W,
    engine: &mut Engine,
    rx: &mpsc::Receiver<Event>,
    snapshots: &mpsc::Receiver<GameState>,
) -> std::io::Result<bool> {
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_secs_f64() * 1000.0;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut latest = engine.state().clone();

    engine.start_game(now_ms());

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    let status = engine.state().status;
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => match status {
                            GameStatus::Playing => engine.pause_game(),
                            GameStatus::Paused => engine.resume_game(now_ms()),
                            _ => {}
                        },
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if matches!(status, GameStatus::GameOver | GameStatus::Victory) =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if engine.state().status == GameStatus::Playing {
            let left = any_held(&key_frame, &LEFT_KEYS, frame);
            let right = any_held(&key_frame, &RIGHT_KEYS, frame);
            let up = any_held(&key_frame, &UP_KEYS, frame);
            let down = any_held(&key_frame, &DOWN_KEYS, frame);
            let shoot = is_held(&key_frame, &KeyCode::Char(' '), frame);

            let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
            let direction = Vec2::new(axis(left, right), axis(up, down));
            engine.set_player_velocity(LOCAL_PLAYER_ID, direction);

            if shoot_cooldown == 0 && shoot {
                engine.player_shoot(LOCAL_PLAYER_ID);
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        engine.update(now_ms());

        while let Ok(snapshot) = snapshots.try_recv() {
            latest = snapshot;
        }
        // No ticks arrive while paused; show the paused state as-is.
        if !engine.is_running() && latest.status != engine.state().status {
            latest = engine.state().clone();
        }

        display::render(out, &latest, engine.config().difficulty)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

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

    let result = run(&mut out, &rx, &config, &args.name);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result?;
    Ok(())
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    name: &str,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(difficulty) => {
                let mut config = config.clone();
                config.difficulty = difficulty;

                let (tx, snapshots) = mpsc::channel::<GameState>();
                let mut engine = Engine::new(config).with_sound(LogSound);
                engine.on_state_update(move |snapshot| {
                    // Fire-and-forget: a closed channel just drops the frame.
                    let _ = tx.send(snapshot);
                });
                engine.add_player(LOCAL_PLAYER_ID, name, true);

                if game_loop(out, &mut engine, rx, &snapshots)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
