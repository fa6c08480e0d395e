#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap,
    // Allow more than 3 bools in structs for input handling where bools represent distinct flags
    clippy::struct_excessive_bools
)]

use bevy_ecs::prelude::*;
use std::collections::VecDeque;

use crate::game::{self, BOARD_HEIGHT, BOARD_WIDTH, STARTING_LEVEL};

/// Largest shape extent; every shape lives in a matrix this size.
pub const SHAPE_MAX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Cell value written into the board when this piece settles.
    /// Non-zero; doubles as the color index.
    #[must_use]
    pub fn cell_id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    #[must_use]
    pub fn from_cell_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }

    #[must_use]
    pub fn color(self) -> ratatui::style::Color {
        match self {
            PieceKind::I => ratatui::style::Color::Cyan,
            PieceKind::O => ratatui::style::Color::Yellow,
            PieceKind::T => ratatui::style::Color::Magenta,
            PieceKind::S => ratatui::style::Color::Green,
            PieceKind::Z => ratatui::style::Color::Red,
            PieceKind::J => ratatui::style::Color::Blue,
            PieceKind::L => ratatui::style::Color::LightYellow,
        }
    }

    /// Spawn-orientation shape for this kind. I uses the full 4x4
    /// extent, O a 2x2, everything else a 3x3.
    #[must_use]
    pub fn template(self) -> Shape {
        match self {
            PieceKind::I => Shape::new(
                4,
                4,
                [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            PieceKind::O => Shape::new(
                2,
                2,
                [[2, 2, 0, 0], [2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            PieceKind::T => Shape::new(
                3,
                3,
                [[0, 3, 0], [3, 3, 3], [0, 0, 0], [0, 0, 0]].map(pad_row),
            ),
            PieceKind::S => Shape::new(
                3,
                3,
                [[0, 4, 4], [4, 4, 0], [0, 0, 0], [0, 0, 0]].map(pad_row),
            ),
            PieceKind::Z => Shape::new(
                3,
                3,
                [[5, 5, 0], [0, 5, 5], [0, 0, 0], [0, 0, 0]].map(pad_row),
            ),
            PieceKind::J => Shape::new(
                3,
                3,
                [[6, 0, 0], [6, 6, 6], [0, 0, 0], [0, 0, 0]].map(pad_row),
            ),
            PieceKind::L => Shape::new(
                3,
                3,
                [[0, 0, 7], [7, 7, 7], [0, 0, 0], [0, 0, 0]].map(pad_row),
            ),
        }
    }
}

fn pad_row(row: [u8; 3]) -> [u8; SHAPE_MAX] {
    [row[0], row[1], row[2], 0]
}

/// A piece's occupied cells in its current orientation. Stored as a
/// bounded matrix with an explicit active extent so 2x2, 3x3 and 4x4
/// shapes share one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    cells: [[u8; SHAPE_MAX]; SHAPE_MAX],
    width: usize,
    height: usize,
}

impl Shape {
    #[must_use]
    pub fn new(width: usize, height: usize, cells: [[u8; SHAPE_MAX]; SHAPE_MAX]) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell value at column `x`, row `y` of the active extent.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.cells[y][x]
    }

    /// 90-degree clockwise rotation: for an h x w input, the w x h
    /// output satisfies `out[x][h-1-y] = in[y][x]`. The active extent
    /// swaps accordingly.
    #[must_use]
    pub fn rotated_cw(&self) -> Shape {
        let mut out = Shape {
            cells: [[0; SHAPE_MAX]; SHAPE_MAX],
            width: self.height,
            height: self.width,
        };
        for y in 0..self.height {
            for x in 0..self.width {
                out.cells[x][self.height - 1 - y] = self.cells[y][x];
            }
        }
        out
    }
}

/// Grid coordinates of a piece matrix's top-left cell. `y` may be
/// negative while a freshly spawned piece is still above the visible
/// board.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// The falling piece: its kind plus an owned copy of the shape matrix,
/// replaced wholesale on rotation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.template(),
        }
    }

    /// Horizontally centered, one row above the visible board.
    #[must_use]
    pub fn spawn_position(&self) -> Position {
        Position {
            x: ((BOARD_WIDTH - self.shape.width()) / 2) as i32,
            y: -1,
        }
    }
}

/// 7-bag piece randomizer: every run of seven draws is a permutation
/// of the seven kinds.
#[derive(Resource, Debug, Clone)]
pub struct Bag {
    remaining: Vec<PieceKind>,
}

impl Bag {
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: Vec::with_capacity(PieceKind::ALL.len()),
        }
    }

    pub fn next(&mut self) -> PieceKind {
        if self.remaining.is_empty() {
            self.refill();
        }
        self.remaining.pop().unwrap_or(PieceKind::I)
    }

    // Fisher-Yates over a fresh set of all seven kinds; popping from
    // the end afterwards is uniformly random.
    fn refill(&mut self) {
        self.remaining.extend_from_slice(&PieceKind::ALL);
        for i in (1..self.remaining.len()).rev() {
            let j = fastrand::usize(..=i);
            self.remaining.swap(i, j);
        }
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

/// The settled grid. Row 0 is the top; each row holds cell values
/// 0..=7 where 0 is empty. Rows are a deque so a cleared row is
/// removed in place and a fresh one pushed on top.
#[derive(Resource, Debug, Clone)]
pub struct Board {
    rows: VecDeque<[u8; BOARD_WIDTH]>,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        let mut rows = VecDeque::with_capacity(BOARD_HEIGHT);
        for _ in 0..BOARD_HEIGHT {
            rows.push_back([0; BOARD_WIDTH]);
        }
        Self { rows }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            *row = [0; BOARD_WIDTH];
        }
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: u8) {
        self.rows[y][x] = value;
    }

    /// Sole legality check for movement, rotation, spawn and ghost
    /// projection. True if any occupied shape cell would land outside
    /// the columns, at or below the floor, or on a settled cell. Rows
    /// above the board never collide, so pieces may overhang the top.
    #[must_use]
    pub fn collides(&self, position: Position, shape: &Shape) -> bool {
        for y in 0..shape.height() {
            for x in 0..shape.width() {
                if shape.cell(x, y) == 0 {
                    continue;
                }
                let nx = position.x + x as i32;
                let ny = position.y + y as i32;
                if nx < 0 || nx >= BOARD_WIDTH as i32 {
                    return true;
                }
                if ny >= BOARD_HEIGHT as i32 {
                    return true;
                }
                if ny >= 0 && self.rows[ny as usize][nx as usize] != 0 {
                    return true;
                }
            }
        }
        false
    }

    /// Writes the shape's occupied cells into the grid. Cells still
    /// above row 0 are dropped silently in case a piece locks while
    /// partially off-screen.
    pub fn merge(&mut self, position: Position, shape: &Shape) {
        for y in 0..shape.height() {
            for x in 0..shape.width() {
                let v = shape.cell(x, y);
                if v == 0 {
                    continue;
                }
                let bx = position.x + x as i32;
                let by = position.y + y as i32;
                if bx >= 0 && bx < BOARD_WIDTH as i32 && by >= 0 && by < BOARD_HEIGHT as i32 {
                    self.rows[by as usize][bx as usize] = v;
                }
            }
        }
    }

    /// Removes every full row, inserting empty rows at the top so the
    /// board keeps exactly `BOARD_HEIGHT` rows. Scans bottom-up and
    /// re-checks the same index after a removal, since the rows above
    /// shift down into it. Returns the number of rows cleared.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT - 1;
        loop {
            if self.rows[y].iter().all(|&c| c != 0) {
                let _ = self.rows.remove(y);
                self.rows.push_front([0; BOARD_WIDTH]);
                cleared += 1;
            } else if y == 0 {
                break;
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of one game. Pause toggles between `Running` and
/// `Paused`; a blocked spawn is the only way into `GameOver`, and a
/// full reset is the only way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Running,
    Paused,
    GameOver,
}

#[derive(Resource, Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub next_piece: Option<Piece>,
    pub soft_drop: bool,
    /// Level-derived base interval, recomputed when the level changes.
    pub drop_interval_ms: f32,
    /// Unconsumed milliseconds carried between gravity ticks.
    pub drop_acc_ms: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::Running,
            score: 0,
            level: STARTING_LEVEL,
            lines_cleared: 0,
            next_piece: None,
            soft_drop: false,
            drop_interval_ms: game::drop_interval_ms(STARTING_LEVEL),
            drop_acc_ms: 0.0,
        }
    }
}

impl GameState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Scores a lock that cleared `cleared` rows, accumulates the line
    /// total, and re-derives level and base drop interval.
    pub fn award_line_clear(&mut self, cleared: u32) {
        if cleared == 0 {
            return;
        }
        self.score += game::line_clear_points(cleared) * self.level;
        self.lines_cleared += cleared;
        let new_level = game::level_for_lines(self.lines_cleared);
        if new_level != self.level {
            self.level = new_level;
            self.drop_interval_ms = game::drop_interval_ms(new_level);
        }
    }

    /// Interval the scheduler drains against this tick: the soft-drop
    /// interval while soft-dropping, otherwise the level-derived base,
    /// scaled by the user speed multiplier.
    #[must_use]
    pub fn effective_interval_ms(&self, speed_multiplier: f32) -> f32 {
        let base = if self.soft_drop {
            game::SOFT_DROP_INTERVAL_MS
        } else {
            self.drop_interval_ms
        };
        base * speed_multiplier
    }
}

/// Pending commands from the keyboard, consumed once per game tick.
/// `soft_drop` is level-triggered (held key); everything else is
/// edge-triggered and cleared after consumption.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub rotate: bool,
    pub hard_drop: bool,
    /// Tracks the hard drop key's release so key-repeat duplicates are
    /// ignored.
    pub hard_drop_released: bool,
    pub soft_drop: bool,
    pub toggle_pause: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            left: false,
            right: false,
            rotate: false,
            hard_drop: false,
            hard_drop_released: true,
            soft_drop: false,
            toggle_pause: false,
        }
    }
}
