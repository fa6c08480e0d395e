#![warn(clippy::all, clippy::pedantic)]

// Test modules
pub mod app_tests;
pub mod config_tests;

// Import test utilities
#[cfg(test)]
pub mod test_utils {
    use crate::Time;
    use crate::components::{Bag, Board, GameState, Input, Piece, PieceKind, Position};
    use crate::game::BOARD_WIDTH;
    use bevy_ecs::prelude::*;

    // Helper function to create a world with all game resources
    #[must_use]
    pub fn setup_world() -> World {
        let mut world = World::new();
        world.insert_resource(GameState::default());
        world.insert_resource(Board::new());
        world.insert_resource(Bag::new());
        world.insert_resource(Input::default());
        world.insert_resource(Time::new());
        world
    }

    // Spawn a specific piece at a specific position, bypassing the bag
    pub fn spawn_piece_at(world: &mut World, kind: PieceKind, x: i32, y: i32) -> Entity {
        world.spawn((Piece::new(kind), Position { x, y })).id()
    }

    // Fill a whole row with the given cell value
    pub fn fill_row(board: &mut Board, y: usize, value: u8) {
        for x in 0..BOARD_WIDTH {
            board.set_cell(x, y, value);
        }
    }

    // Fill a row leaving the listed columns empty
    pub fn fill_row_except(board: &mut Board, y: usize, value: u8, gaps: &[usize]) {
        for x in 0..BOARD_WIDTH {
            if !gaps.contains(&x) {
                board.set_cell(x, y, value);
            }
        }
    }

    #[must_use]
    pub fn count_settled_cells(board: &Board) -> usize {
        let mut count = 0;
        for y in 0..crate::game::BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                if board.cell(x, y) != 0 {
                    count += 1;
                }
            }
        }
        count
    }
}
