//! Layout and drawing: menu, playfield, sidebar, pause, game over.

use crate::app::{App, Screen};
use crate::game::GameState;
use crate::highscores::ScoreEntry;
use crate::piece::{Shape, TetrominoKind};
use crate::playfield::Cell;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Terminal columns per grid cell; two keeps cells roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
/// Pieces shown in the small next row, after the large one.
const SMALL_PREVIEWS: usize = 4;
const SMALL_PREVIEW_WIDTH: u16 = 5;

/// Board plus border, in terminal cells.
fn playfield_outer_size(state: &GameState) -> (u16, u16) {
    let pf = state.playfield();
    (pf.width() as u16 * CELL_WIDTH + 2, pf.height() as u16 + 2)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.div_line).bg(theme.bg)
}

/// Draw the current screen with any overlay.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let theme = app.theme();
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(theme.bg));
    match (app.screen(), app.game()) {
        (Screen::Menu, _) | (_, None) => draw_menu(frame.buffer_mut(), app, area),
        (Screen::Playing, Some(state)) => {
            draw_game(frame.buffer_mut(), state, app.player_name(), theme, area);
            if state.is_paused() {
                draw_pause_overlay(frame.buffer_mut(), theme, area);
            }
        }
        (Screen::GameOver, Some(state)) => {
            draw_game(frame.buffer_mut(), state, app.player_name(), theme, area);
            draw_game_over(frame.buffer_mut(), app, state, area);
        }
    }
}

fn draw_menu(buf: &mut Buffer, app: &App, area: Rect) {
    let theme = app.theme();
    let fg = Style::default().fg(theme.main_fg);
    let scores = score_lines(app.scores(), None, theme);
    let popup = centered(area, 48, 12 + scores.len() as u16);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Stack ", Style::default().fg(theme.title).bold()),
            Span::styled("tui ", fg.bold()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Name: ", Style::default().fg(theme.title)),
            Span::styled(format!("{:<12}", app.name_input()), fg.add_modifier(Modifier::UNDERLINED)),
            Span::styled("_", Style::default().fg(theme.inactive_fg)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter  Start    Esc  Quit",
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " ─ High Scores ─ ",
            Style::default().fg(theme.div_line),
        )),
    ];
    lines.extend(scores);

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(theme)),
        )
        .render(popup, buf);
}

/// One line per entry, best first; `highlight` marks the entry just saved.
fn score_lines(
    scores: &[ScoreEntry],
    highlight: Option<&ScoreEntry>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if scores.is_empty() {
        return vec![Line::from(Span::styled(
            "No scores yet",
            Style::default().fg(theme.inactive_fg),
        ))];
    }
    scores
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let text = format!(
                "{:>2}. {:<12} {:>7}  {}",
                i + 1,
                e.name,
                e.score,
                e.date.with_timezone(&chrono::Local).format("%Y-%m-%d")
            );
            let style = if highlight == Some(e) {
                Style::default().fg(theme.bg).bg(theme.title).bold()
            } else {
                Style::default().fg(theme.main_fg)
            };
            Line::from(Span::styled(text, style))
        })
        .collect()
}

/// Playfield + sidebar, centered as one unit.
fn draw_game(buf: &mut Buffer, state: &GameState, player: &str, theme: &Theme, area: Rect) {
    let (pw, ph) = playfield_outer_size(state);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    draw_playfield(buf, state, theme, inner[0]);
    draw_sidebar(buf, state, player, theme, inner[1]);
}

fn draw_playfield(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" Stacktui ", theme.title));
    let board = block.inner(area);
    block.render(area, buf);

    for (y, row) in state.playfield().rows().iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            match cell {
                Cell::Filled(color) => {
                    put_block(buf, board, x as u16, y as u16, theme.piece_color(*color), theme);
                }
                Cell::Empty => put_dot(buf, board, x as u16, y as u16, theme),
            }
        }
    }

    // A piece that spawned into a collision is not part of the board.
    if state.is_game_over() {
        return;
    }
    let piece = state.piece();
    let color = theme.piece_color(piece.kind.color());
    for (x, y) in piece.cells() {
        if x >= 0 && y >= 0 {
            put_block(buf, board, x as u16, y as u16, color, theme);
        }
    }
}

/// Full-width block at grid (x, y) inside `board`. Clipped to `board`.
fn put_block(buf: &mut Buffer, board: Rect, x: u16, y: u16, color: Color, theme: &Theme) {
    let rx = board.x + x * CELL_WIDTH;
    let ry = board.y + y;
    if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
        buf.set_string(rx, ry, "██", Style::default().fg(color).bg(theme.bg));
    }
}

fn put_dot(buf: &mut Buffer, board: Rect, x: u16, y: u16, theme: &Theme) {
    let rx = board.x + x * CELL_WIDTH;
    let ry = board.y + y;
    if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
        buf.set_string(
            rx,
            ry,
            " ·",
            Style::default().fg(theme.inactive_fg).bg(theme.bg),
        );
    }
}

fn draw_sidebar(buf: &mut Buffer, state: &GameState, player: &str, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Player, score, lines
            Constraint::Length(8), // Next: large + small row
            Constraint::Fill(1),   // Controls
        ])
        .split(area);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme));
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], buf);
    let stats = vec![
        Line::from(vec![
            Span::styled("Player: ", title_style),
            Span::styled(player.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Score:  ", title_style),
            Span::styled(state.score().to_string(), fg_style.bold()),
        ]),
        Line::from(vec![
            Span::styled("Lines:  ", title_style),
            Span::styled(state.lines_cleared().to_string(), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, buf);

    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme));
    let next_inner = next_block.inner(chunks[1]);
    next_block.render(chunks[1], buf);
    draw_next_preview(buf, state, theme, next_inner);

    let controls_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" Controls ", title_style));
    let controls_inner = controls_block.inner(chunks[2]);
    controls_block.render(chunks[2], buf);
    let hint = Style::default().fg(theme.inactive_fg);
    let controls: Vec<Line> = [
        ("←/→ h/l", "Move"),
        ("↑ k", "Rotate"),
        ("↓ j", "Soft drop"),
        ("Space", "Hard drop"),
        ("P", "Pause"),
        ("Q/Esc", "Menu"),
    ]
    .into_iter()
    .map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("{key:<9}"), fg_style),
            Span::styled(what, hint),
        ])
    })
    .collect();
    Paragraph::new(Text::from(controls)).render(controls_inner, buf);
}

/// Next piece large, then the following four small.
fn draw_next_preview(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) {
    let next = state.next_kind();
    let upcoming = state.upcoming(1 + SMALL_PREVIEWS).skip(1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);
    Paragraph::new(Line::from(vec![
        Span::styled("Next ", Style::default().fg(theme.title)),
        Span::styled(next.name(), Style::default().fg(theme.inactive_fg)),
    ]))
    .render(rows[0], buf);
    draw_piece_preview(buf, theme, rows[1], next, CELL_WIDTH);

    for (i, kind) in upcoming.enumerate() {
        let slot = Rect {
            x: rows[3].x + i as u16 * SMALL_PREVIEW_WIDTH,
            width: SMALL_PREVIEW_WIDTH,
            ..rows[3]
        };
        draw_piece_preview(buf, theme, slot.intersection(rows[3]), kind, 1);
    }
}

/// Base-rotation shape trimmed to its bounds and centered in `area`.
fn draw_piece_preview(buf: &mut Buffer, theme: &Theme, area: Rect, kind: TetrominoKind, cell_w: u16) {
    let shape: Shape = kind.base_shape();
    let Some((c0, r0, c1, r1)) = shape.bounds() else {
        return;
    };
    let bw = (c1 - c0 + 1) as u16 * cell_w;
    let bh = (r1 - r0 + 1) as u16;
    let off_x = area.x + area.width.saturating_sub(bw) / 2;
    let off_y = area.y + area.height.saturating_sub(bh) / 2;
    let color = theme.piece_color(kind.color());
    let symbol = if cell_w == 1 { "█" } else { "██" };

    for row in 0..shape.size() {
        for col in 0..shape.size() {
            if !shape.is_filled(row, col) {
                continue;
            }
            let rx = off_x + (col as u16 - c0 as u16) * cell_w;
            let ry = off_y + (row as u16 - r0 as u16);
            if rx + cell_w <= area.x + area.width && ry < area.y + area.height {
                buf.set_string(rx, ry, symbol, Style::default().fg(color).bg(theme.bg));
            }
        }
    }
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(
            "P  Resume    Q  Menu",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(theme)),
        )
        .render(popup, buf);
}

fn draw_game_over(buf: &mut Buffer, app: &App, state: &GameState, area: Rect) {
    let theme = app.theme();
    let scores = score_lines(app.scores(), app.last_entry(), theme);
    let popup = centered(area, 46, 10 + scores.len() as u16);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Final score: {}", state.score()),
            Style::default().fg(theme.main_fg).bold(),
        )),
        Line::from(""),
    ];
    lines.extend(scores);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "R  Again    M  Menu    Q  Quit",
        Style::default().fg(theme.main_fg),
    )));

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(theme))
                .title(Span::styled(" Stacktui ", theme.title)),
        )
        .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::Bag;
    use chrono::{TimeZone, Utc};

    fn entry(name: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            name: name.into(),
            score,
            date: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_score_lines_empty() {
        let lines = score_lines(&[], None, &Theme::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "No scores yet");
    }

    #[test]
    fn test_score_lines_highlight() {
        let theme = Theme::default();
        let scores = vec![entry("ada", 800), entry("bob", 100)];
        let lines = score_lines(&scores, Some(&scores[1]), &theme);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].to_string().starts_with(" 1. ada"));
        assert!(lines[1].to_string().contains("100"));
        assert_eq!(lines[1].spans[0].style.bg, Some(theme.title));
        assert_ne!(lines[0].spans[0].style.bg, Some(theme.title));
    }

    #[test]
    fn test_playfield_draws_spawned_piece() {
        let state = GameState::new(Bag::with_seed(3));
        let theme = Theme::default();
        let (w, h) = playfield_outer_size(&state);
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        draw_playfield(&mut buf, &state, &theme, area);

        let color = theme.piece_color(state.piece().kind.color());
        for (x, y) in state.piece().cells() {
            let cell = &buf[(1 + x as u16 * CELL_WIDTH, 1 + y as u16)];
            assert_eq!(cell.symbol(), "█");
            assert_eq!(cell.fg, color);
        }
        // Bottom row is empty.
        assert_eq!(row_text(&buf, h - 2).trim_matches('│').trim(), "· · · · · · · · · ·");
    }
}
