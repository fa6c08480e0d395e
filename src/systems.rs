#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss
)]

use bevy_ecs::prelude::*;
use log::{debug, info, trace};

use crate::components::{Bag, Board, GameState, Input, Phase, Piece, Position};
use crate::game::{HARD_DROP_POINTS, SOFT_DROP_POINTS};

/// Horizontal wall-kick search order, applied after the unshifted
/// rotation is rejected. No vertical kicks.
pub const KICK_OFFSETS: [i32; 4] = [1, -1, 2, -2];

/// Promotes the queued piece to active (drawing one from the bag on
/// the very first spawn), queues a fresh next piece, and spawns the
/// active piece entity at its spawn position. A blocked spawn position
/// ends the game instead.
pub fn spawn_piece(world: &mut World) {
    // Clear stale one-shot commands so a lock doesn't leak a queued
    // move into the fresh piece. Held state survives.
    if let Some(mut input) = world.get_resource_mut::<Input>() {
        let hard_drop_released = input.hard_drop_released;
        let soft_drop = input.soft_drop;
        *input = Input::default();
        input.hard_drop_released = hard_drop_released;
        input.soft_drop = soft_drop;
    }

    let active = match world.resource_mut::<GameState>().next_piece.take() {
        Some(piece) => piece,
        None => {
            let kind = world.resource_mut::<Bag>().next();
            Piece::new(kind)
        }
    };
    let queued_kind = world.resource_mut::<Bag>().next();
    world.resource_mut::<GameState>().next_piece = Some(Piece::new(queued_kind));

    let position = active.spawn_position();
    if world.resource::<Board>().collides(position, &active.shape) {
        info!("spawn position blocked, game over");
        world.resource_mut::<GameState>().phase = Phase::GameOver;
        return;
    }

    trace!("spawning {:?} at ({}, {})", active.kind, position.x, position.y);
    world.spawn((active, position));
}

/// The single active piece, if one exists.
fn active_piece(world: &mut World) -> Option<(Entity, Piece, Position)> {
    let mut query = world.query::<(Entity, &Piece, &Position)>();
    query
        .iter(world)
        .next()
        .map(|(entity, piece, position)| (entity, *piece, *position))
}

/// Attempts to translate the active piece. Returns whether the move
/// was applied; an illegal move leaves everything unchanged.
pub fn try_move(world: &mut World, dx: i32, dy: i32) -> bool {
    if world.resource::<GameState>().phase != Phase::Running {
        return false;
    }
    let Some((entity, piece, position)) = active_piece(world) else {
        return false;
    };
    let target = Position {
        x: position.x + dx,
        y: position.y + dy,
    };
    if world.resource::<Board>().collides(target, &piece.shape) {
        return false;
    }
    world.entity_mut(entity).insert(target);
    true
}

/// Rotates the active piece clockwise, trying the unshifted position
/// first and then each wall-kick offset in order. Returns whether a
/// placement was found; otherwise piece and position are unchanged.
pub fn try_rotate(world: &mut World) -> bool {
    if world.resource::<GameState>().phase != Phase::Running {
        return false;
    }
    let Some((entity, piece, position)) = active_piece(world) else {
        return false;
    };
    let rotated = piece.shape.rotated_cw();
    for dx in std::iter::once(0).chain(KICK_OFFSETS) {
        let target = Position {
            x: position.x + dx,
            y: position.y,
        };
        if !world.resource::<Board>().collides(target, &rotated) {
            if dx != 0 {
                debug!("rotation kicked {dx} columns");
            }
            let mut updated = piece;
            updated.shape = rotated;
            world.entity_mut(entity).insert((updated, target));
            return true;
        }
    }
    false
}

/// Lowest legal row for the active piece from its current position,
/// without moving it. Drives both the hard drop and the ghost preview.
pub fn ghost_row(world: &mut World) -> Option<i32> {
    let (_, piece, position) = active_piece(world)?;
    let board = world.resource::<Board>();
    let mut y = position.y;
    while !board.collides(
        Position {
            x: position.x,
            y: y + 1,
        },
        &piece.shape,
    ) {
        y += 1;
    }
    Some(y)
}

/// Drops the active piece straight to its ghost row, pays out per cell
/// traveled, and locks unconditionally.
pub fn hard_drop(world: &mut World) {
    if world.resource::<GameState>().phase != Phase::Running {
        return;
    }
    let Some((entity, _, position)) = active_piece(world) else {
        return;
    };
    let Some(target_y) = ghost_row(world) else {
        return;
    };
    let distance = target_y - position.y;
    if distance > 0 {
        world.entity_mut(entity).insert(Position {
            x: position.x,
            y: target_y,
        });
        world.resource_mut::<GameState>().score += distance as u32 * HARD_DROP_POINTS;
        debug!("hard drop fell {distance} rows");
    }
    lock_piece(world);
}

/// One scored soft-drop step: moves down if legal and pays the
/// per-cell reward, otherwise locks.
fn soft_drop_step(world: &mut World) -> bool {
    if try_move(world, 0, 1) {
        world.resource_mut::<GameState>().score += SOFT_DROP_POINTS;
        true
    } else {
        lock_piece(world);
        false
    }
}

/// Fixes the active piece into the board, resolves line clears and
/// scoring, and hands control to the next spawn. Any sub-interval
/// gravity progress is discarded with the locked piece.
pub fn lock_piece(world: &mut World) {
    let Some((entity, piece, position)) = active_piece(world) else {
        return;
    };
    world.resource_mut::<Board>().merge(position, &piece.shape);
    let cleared = world.resource_mut::<Board>().clear_lines();
    {
        let mut game_state = world.resource_mut::<GameState>();
        game_state.award_line_clear(cleared);
        game_state.drop_acc_ms = 0.0;
    }
    if cleared > 0 {
        let game_state = world.resource::<GameState>();
        info!(
            "cleared {} lines (score {}, level {})",
            cleared, game_state.score, game_state.level
        );
    }
    world.despawn(entity);
    spawn_piece(world);
}

/// Running <-> Paused. A finished game ignores the toggle.
pub fn toggle_pause(world: &mut World) {
    let mut game_state = world.resource_mut::<GameState>();
    game_state.phase = match game_state.phase {
        Phase::Running => Phase::Paused,
        Phase::Paused => Phase::Running,
        Phase::GameOver => Phase::GameOver,
    };
    debug!("phase toggled to {:?}", game_state.phase);
}

/// Applies the commands gathered since the last tick, then clears the
/// edge-triggered flags. Movement commands are only honored while the
/// game is running; the pause toggle is honored from either side.
pub fn input_system(world: &mut World) {
    let input = *world.resource::<Input>();

    {
        let mut game_state = world.resource_mut::<GameState>();
        game_state.soft_drop = input.soft_drop && game_state.phase == Phase::Running;
    }

    if input.toggle_pause {
        toggle_pause(world);
    }

    if world.resource::<GameState>().phase == Phase::Running {
        if input.left {
            try_move(world, -1, 0);
        }
        if input.right {
            try_move(world, 1, 0);
        }
        if input.rotate {
            try_rotate(world);
        }
        if input.hard_drop {
            hard_drop(world);
        }
    }

    let mut input = world.resource_mut::<Input>();
    input.left = false;
    input.right = false;
    input.rotate = false;
    input.hard_drop = false;
    input.toggle_pause = false;
}

/// The drop scheduler. Accumulates elapsed wall-clock milliseconds and
/// converts them into discrete downward steps, draining the backlog in
/// a loop so arbitrarily large gaps still resolve. A step that can't
/// move down locks the piece and stops the drain.
pub fn gravity_system(world: &mut World, delta_ms: f32, speed_multiplier: f32) {
    if world.resource::<GameState>().phase != Phase::Running {
        return;
    }
    if active_piece(world).is_none() {
        spawn_piece(world);
        return;
    }

    world.resource_mut::<GameState>().drop_acc_ms += delta_ms;

    loop {
        let (acc, interval, soft_drop) = {
            let game_state = world.resource::<GameState>();
            (
                game_state.drop_acc_ms,
                game_state.effective_interval_ms(speed_multiplier),
                game_state.soft_drop,
            )
        };
        if interval <= 0.0 || acc < interval {
            break;
        }
        world.resource_mut::<GameState>().drop_acc_ms = acc - interval;
        trace!("gravity step (acc {acc:.1}ms, interval {interval:.1}ms)");

        let stepped = if soft_drop {
            soft_drop_step(world)
        } else if try_move(world, 0, 1) {
            true
        } else {
            lock_piece(world);
            false
        };
        if !stepped {
            break;
        }
    }
}
