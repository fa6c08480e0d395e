#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow potential wrapping when casting between types as board coordinates are within reasonable ranges
    clippy::cast_possible_wrap
)]

use bevy_ecs::prelude::*;
use std::error;

use crate::Time;
use crate::components::{Bag, Board, GameState, Input, Piece, Position};
use crate::game::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::systems::{ghost_row, spawn_piece};

pub type AppResult<T> = std::result::Result<T, Box<dyn error::Error>>;

/// Owner of the game world. The frontend drives it through the input
/// flags and the per-tick systems, and reads render snapshots back.
pub struct App {
    pub world: World,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(Time::new());
        world.insert_resource(Input::default());
        world.insert_resource(GameState::default());
        world.insert_resource(Bag::new());
        world.insert_resource(Board::new());

        let mut app = Self {
            world,
            should_quit: false,
        };
        spawn_piece(&mut app.world);
        app
    }

    /// Replaces the entire game state in one step: fresh board, fresh
    /// bag, fresh pieces, zeroed counters. No partial state survives.
    pub fn reset(&mut self) {
        self.world.insert_resource(GameState::default());
        self.world.insert_resource(Board::new());
        self.world.insert_resource(Input::default());
        self.world.insert_resource(Bag::new());

        let stale: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Piece>>()
            .iter(&self.world)
            .collect();
        for entity in stale {
            self.world.despawn(entity);
        }

        spawn_piece(&mut self.world);
    }

    /// Every visible cell: the settled grid plus the active piece,
    /// as board positions with their cell values. Cells above the
    /// board are included; the renderer clips them.
    pub fn render_cells(&mut self) -> Vec<(Position, u8)> {
        let mut cells = Vec::new();

        if let Some(board) = self.world.get_resource::<Board>() {
            for y in 0..BOARD_HEIGHT {
                for x in 0..BOARD_WIDTH {
                    let v = board.cell(x, y);
                    if v != 0 {
                        cells.push((
                            Position {
                                x: x as i32,
                                y: y as i32,
                            },
                            v,
                        ));
                    }
                }
            }
        }

        let active: Vec<(Position, u8)> = self
            .world
            .query::<(&Piece, &Position)>()
            .iter(&self.world)
            .flat_map(|(piece, position)| {
                let shape = piece.shape;
                let (px, py) = (position.x, position.y);
                (0..shape.height()).flat_map(move |y| {
                    (0..shape.width()).filter_map(move |x| {
                        let v = shape.cell(x, y);
                        (v != 0).then_some((
                            Position {
                                x: px + x as i32,
                                y: py + y as i32,
                            },
                            v,
                        ))
                    })
                })
            })
            .collect();

        cells.extend(active);
        cells
    }

    /// Cells of the ghost projection: where the active piece would
    /// settle if dropped now. Empty when there is no active piece.
    pub fn ghost_cells(&mut self) -> Vec<Position> {
        let Some(target_y) = ghost_row(&mut self.world) else {
            return Vec::new();
        };
        self.world
            .query::<(&Piece, &Position)>()
            .iter(&self.world)
            .flat_map(|(piece, position)| {
                let shape = piece.shape;
                let px = position.x;
                (0..shape.height()).flat_map(move |y| {
                    (0..shape.width()).filter_map(move |x| {
                        (shape.cell(x, y) != 0).then_some(Position {
                            x: px + x as i32,
                            y: target_y + y as i32,
                        })
                    })
                })
            })
            .collect()
    }

    /// The queued piece shown in the preview panel.
    #[must_use]
    pub fn next_piece(&self) -> Option<Piece> {
        self.world.resource::<GameState>().next_piece
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
