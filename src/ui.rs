#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::app::App;
use crate::components::{GameState, Phase, Piece, PieceKind};
use crate::config;
use crate::game::{BOARD_HEIGHT, BOARD_WIDTH};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

// Each cell is 2 characters wide and 1 tall to look roughly square
const CELL_WIDTH: u16 = 2;

pub fn render(f: &mut Frame, app: &mut App) {
    let board_width = BOARD_WIDTH as u16 * CELL_WIDTH + 2; // +2 for borders
    let board_height = BOARD_HEIGHT as u16 + 2;
    let min_info_width = 20u16;
    let min_total_width = board_width + min_info_width;
    let min_total_height = board_height + 3;

    // Too small to draw the board; show a warning instead
    if f.area().width < min_total_width || f.area().height < min_total_height {
        let warning_text = Paragraph::new(
            "Terminal too small!\nPlease resize your terminal\nto continue playing.",
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Blockfall"));
        let warning_area = centered_rect(50, 30, f.area());
        f.render_widget(warning_text, warning_area);
        return;
    }

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Min(min_info_width)])
        .split(f.area());

    let game_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // Title
            Constraint::Length(board_height), // Game board
            Constraint::Min(0),
        ])
        .split(main_layout[0]);

    let info_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(6), // Score, level, lines, speed
            Constraint::Length(7), // Next piece preview
            Constraint::Min(5),    // Controls
        ])
        .split(main_layout[1]);

    let title = Paragraph::new("BLOCKFALL")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, game_layout[0]);

    render_game_board(f, app, game_layout[1]);

    let info_title = Paragraph::new("INFO")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(info_title, info_layout[0]);

    let (score, level, lines) = {
        let game_state = app.world.resource::<GameState>();
        (game_state.score, game_state.level, game_state.lines_cleared)
    };
    let speed = config::CONFIG.read().unwrap().speed;
    let stats = format!("Score: {score}\nLevel: {level}\nLines: {lines}\nSpeed: {speed}");
    let stats_widget = Paragraph::new(stats)
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: true });
    f.render_widget(stats_widget, info_layout[1]);

    render_next_piece(f, app.next_piece(), info_layout[2]);

    let controls = Paragraph::new(
        "Controls:\n\
        ←/→: Move left/right\n\
        ↓: Soft drop\n\
        Space: Hard drop\n\
        ↑: Rotate\n\
        P: Pause  R: Restart\n\
        +/-: Speed  Q: Quit\n\
        ",
    )
    .block(Block::default().borders(Borders::TOP))
    .wrap(Wrap { trim: true });
    f.render_widget(controls, info_layout[3]);
}

fn render_game_board(f: &mut Frame, app: &mut App, area: Rect) {
    let inner_area = Block::default().borders(Borders::ALL).inner(area);
    f.render_widget(Block::default().borders(Borders::ALL), area);

    let phase = app.world.resource::<GameState>().phase;
    let show_ghost = config::CONFIG.read().unwrap().show_ghost;

    // Ghost first so the active piece draws over it where they overlap
    if show_ghost && phase == Phase::Running {
        for position in app.ghost_cells() {
            draw_cell(f, inner_area, position.x, position.y, "░", Color::DarkGray);
        }
    }

    for (position, cell_id) in app.render_cells() {
        let color = PieceKind::from_cell_id(cell_id).map_or(Color::White, PieceKind::color);
        draw_cell(f, inner_area, position.x, position.y, "█", color);
    }

    match phase {
        Phase::Paused => render_board_overlay(f, inner_area, "PAUSED", Color::Yellow),
        Phase::GameOver => render_board_overlay(f, inner_area, "GAME OVER", Color::Red),
        Phase::Running => {}
    }
}

// Clips cells above the visible board (y < 0) and outside the grid
fn draw_cell(f: &mut Frame, area: Rect, x: i32, y: i32, symbol: &str, color: Color) {
    if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 || y >= BOARD_HEIGHT as i32 {
        return;
    }
    let cell_x = area.left() + x as u16 * CELL_WIDTH;
    let cell_y = area.top() + y as u16;
    if cell_x + 1 >= area.right() || cell_y >= area.bottom() {
        return;
    }
    for dx in 0..CELL_WIDTH {
        if let Some(cell) = f.buffer_mut().cell_mut((cell_x + dx, cell_y)) {
            cell.set_symbol(symbol);
            cell.set_fg(color);
            cell.set_bg(Color::Black);
        }
    }
}

fn render_board_overlay(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let overlay = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    let overlay_area = Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: 1,
    };
    f.render_widget(overlay, overlay_area);
}

fn render_next_piece(f: &mut Frame, next: Option<Piece>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("NEXT");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(piece) = next else {
        return;
    };
    let shape = piece.shape;
    let color = piece.kind.color();

    // Center the shape's active extent inside the preview box
    let offset_x = (inner.width.saturating_sub(shape.width() as u16 * CELL_WIDTH)) / 2;
    let offset_y = (inner.height.saturating_sub(shape.height() as u16)) / 2;

    for y in 0..shape.height() {
        for x in 0..shape.width() {
            if shape.cell(x, y) == 0 {
                continue;
            }
            let cell_x = inner.left() + offset_x + x as u16 * CELL_WIDTH;
            let cell_y = inner.top() + offset_y + y as u16;
            if cell_x + 1 >= inner.right() || cell_y >= inner.bottom() {
                continue;
            }
            for dx in 0..CELL_WIDTH {
                if let Some(cell) = f.buffer_mut().cell_mut((cell_x + dx, cell_y)) {
                    cell.set_symbol("█");
                    cell.set_fg(color);
                    cell.set_bg(Color::Black);
                }
            }
        }
    }
}

/// Helper function to create a centered rect using up certain percentage of the available rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
