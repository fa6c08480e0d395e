#![warn(clippy::all, clippy::pedantic)]

// Game board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

// Line clear scoring (base values, multiplied by the current level)
pub const POINTS_SINGLE: u32 = 100;
pub const POINTS_DOUBLE: u32 = 300;
pub const POINTS_TRIPLE: u32 = 500;
pub const POINTS_TETRIS: u32 = 800;
pub const POINTS_PER_EXTRA_LINE: u32 = 200;

// Drop rewards, per cell
pub const SOFT_DROP_POINTS: u32 = 1;
pub const HARD_DROP_POINTS: u32 = 2;

// Level progression
pub const LINES_PER_LEVEL: u32 = 10;
pub const STARTING_LEVEL: u32 = 1;

// Gravity timing
pub const BASE_DROP_INTERVAL_MS: f32 = 800.0;
pub const DROP_INTERVAL_STEP_MS: f32 = 60.0;
pub const MIN_DROP_INTERVAL_MS: f32 = 80.0;
pub const SOFT_DROP_INTERVAL_MS: f32 = 40.0;

/// Base milliseconds between gravity steps at the given level.
/// Decreases linearly with level and never goes below the floor.
#[must_use]
pub fn drop_interval_ms(level: u32) -> f32 {
    let level = level.max(STARTING_LEVEL);
    (BASE_DROP_INTERVAL_MS - (level - 1) as f32 * DROP_INTERVAL_STEP_MS).max(MIN_DROP_INTERVAL_MS)
}

/// Base points for clearing `cleared` rows in one lock. Counts above
/// four cannot happen with standard pieces but are still paid out.
#[must_use]
pub fn line_clear_points(cleared: u32) -> u32 {
    match cleared {
        0 => 0,
        1 => POINTS_SINGLE,
        2 => POINTS_DOUBLE,
        3 => POINTS_TRIPLE,
        4 => POINTS_TETRIS,
        n => n * POINTS_PER_EXTRA_LINE,
    }
}

/// Level derived from total lines cleared.
#[must_use]
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + STARTING_LEVEL
}
