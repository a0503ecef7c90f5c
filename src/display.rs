//! Rendering layer: all terminal output lives here.
//!
//! Each function receives a writer and a read-only snapshot.  No game logic
//! is performed; pixel-space positions are scaled onto the terminal grid.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use glam::Vec2;

use arcade_shooter::entities::{
    BulletKind, Difficulty, EnemyKind, GameState, GameStatus, PowerUpKind, WeaponKind,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_WAVE: Color = Color::Cyan;
const C_PLAYER_LOCAL: Color = Color::White;
const C_PLAYER_REMOTE: Color = Color::Grey;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;
const C_EFFECT: Color = Color::Yellow;

/// Rows used above the playfield (HUD + top border).
const TOP_ROWS: u16 = 2;
/// Rows used below the playfield (bottom border + hint line).
const BOTTOM_ROWS: u16 = 2;

/// Terminal-cell view of the pixel playfield.
struct Viewport {
    cols: u16,
    rows: u16,
    world_w: f32,
    world_h: f32,
}

impl Viewport {
    fn new(cols: u16, rows: u16, state: &GameState) -> Self {
        Viewport {
            cols,
            rows,
            world_w: state.width.max(1.0),
            world_h: state.height.max(1.0),
        }
    }

    fn inner_cols(&self) -> u16 {
        self.cols.saturating_sub(2).max(1)
    }

    fn inner_rows(&self) -> u16 {
        self.rows.saturating_sub(TOP_ROWS + BOTTOM_ROWS).max(1)
    }

    /// Map a pixel position to a cell inside the border, or `None` if it is
    /// off the visible field.
    fn cell(&self, p: Vec2) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.world_w || p.y >= self.world_h {
            return None;
        }
        let col = 1 + (p.x / self.world_w * self.inner_cols() as f32) as u16;
        let row = TOP_ROWS + (p.y / self.world_h * self.inner_rows() as f32) as u16;
        Some((col, row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    difficulty: Difficulty,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let view = Viewport::new(cols, rows, state);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, state, &view, difficulty)?;

    for explosion in &state.explosions {
        let glyph = if explosion.progress < 0.5 { "✶" } else { "·" };
        draw_glyph(out, &view, explosion.position, glyph, C_EXPLOSION)?;
    }
    for power_up in &state.power_ups {
        let (glyph, color) = power_up_glyph(power_up.kind);
        draw_glyph(out, &view, power_up.entity.position, glyph, color)?;
    }
    for enemy in &state.enemies {
        let (glyph, color) = enemy_glyph(enemy.kind);
        draw_centered(out, &view, enemy.entity.position, glyph, color)?;
    }
    for bullet in &state.bullets {
        let (glyph, color) = match bullet.kind {
            BulletKind::Player => ("║", C_BULLET_PLAYER),
            BulletKind::Enemy => ("↓", C_BULLET_ENEMY),
        };
        draw_glyph(out, &view, bullet.entity.position, glyph, color)?;
    }
    for player in &state.players {
        let color = if player.is_local { C_PLAYER_LOCAL } else { C_PLAYER_REMOTE };
        draw_centered(out, &view, player.entity.position, "/▲\\", color)?;
    }

    draw_controls_hint(out, &view)?;

    match state.status {
        GameStatus::Paused => draw_banner(out, &view, &[("PAUSED", Color::Yellow)])?,
        GameStatus::GameOver => draw_end_screen(out, state, &view, "GAME  OVER", Color::Red)?,
        GameStatus::Victory => draw_end_screen(out, state, &view, " VICTORY! ", Color::Green)?,
        _ => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn enemy_glyph(kind: EnemyKind) -> (&'static str, Color) {
    match kind {
        EnemyKind::Basic => ("«▼»", Color::Green),
        EnemyKind::Fast => ("›v‹", Color::DarkCyan),
        EnemyKind::Heavy => ("[▼]", Color::Red),
        EnemyKind::Boss => ("<═◎═>", Color::Magenta),
    }
}

fn power_up_glyph(kind: PowerUpKind) -> (&'static str, Color) {
    match kind {
        PowerUpKind::Health => ("♥", Color::Magenta),
        PowerUpKind::WeaponUpgrade => ("★", Color::Yellow),
        PowerUpKind::Shield => ("◆", Color::Blue),
        PowerUpKind::SpeedBoost => ("»", Color::Green),
        PowerUpKind::ScoreMultiplier => ("$", Color::DarkYellow),
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    at: Vec2,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(at) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

/// Like `draw_glyph`, but centers a multi-column sprite on the cell and keeps
/// it clear of the side walls.
fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    at: Vec2,
    sprite: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(at) {
        let width = sprite.chars().count() as u16;
        let max_col = view.cols.saturating_sub(1 + width).max(1);
        let left = col.saturating_sub(width / 2).clamp(1, max_col);
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(sprite))?;
    }
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let bottom = TOP_ROWS + view.inner_rows();

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, TOP_ROWS - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in TOP_ROWS..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    difficulty: Difficulty,
) -> std::io::Result<()> {
    // Score: left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}", state.score)))?;

    // Wave + difficulty: centre
    let label = match difficulty {
        Difficulty::Easy => "EASY",
        Difficulty::Medium => "MEDIUM",
        Difficulty::Hard => "HARD",
        Difficulty::Expert => "EXPERT",
    };
    let centre = format!("[ WAVE {} · {} ]", state.wave, label);
    let cx = (view.cols / 2).saturating_sub(centre.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(cx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&centre))?;

    // Local player effects + lives: right side
    let Some(player) = state.local_player() else {
        return Ok(());
    };

    let mut tags = String::new();
    if player.weapon == WeaponKind::Spread {
        tags.push_str(&format!("[SPREAD L{}] ", player.weapon_level));
    }
    for effect in &player.effects {
        let name = match effect.kind {
            PowerUpKind::Shield => "SHIELD",
            PowerUpKind::SpeedBoost => "SPEED",
            PowerUpKind::ScoreMultiplier => "x2",
            PowerUpKind::WeaponUpgrade | PowerUpKind::Health => continue,
        };
        tags.push_str(&format!("[{} {:>2}s] ", name, (effect.remaining_ms / 1000.0).ceil()));
    }
    let lives = format!(
        "HP:{:>3} Lives:{}",
        player.entity.health,
        "♥".repeat(player.lives as usize)
    );

    let total = tags.chars().count() + lives.chars().count();
    let rx = view.cols.saturating_sub(total as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if !tags.is_empty() {
        out.queue(style::SetForegroundColor(C_EFFECT))?;
        out.queue(Print(&tags))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→ / WASD : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_end_screen<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    title: &str,
    color: Color,
) -> std::io::Result<()> {
    let title_line = format!("║    {}      ║", title);
    let score_line = format!("Final Score: {:>6}", state.score);
    let stats_line = format!(
        "Wave {}  Kills {}  Accuracy {:.0}%",
        state.wave, state.enemies_killed, state.accuracy
    );

    draw_banner(
        out,
        view,
        &[
            ("╔════════════════════╗", color),
            (title_line.as_str(), color),
            ("╚════════════════════╝", color),
            (score_line.as_str(), Color::Yellow),
            (stats_line.as_str(), Color::DarkGrey),
            ("R - Play Again  Q - Quit", Color::White),
        ],
    )
}
