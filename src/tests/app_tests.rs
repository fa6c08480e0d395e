#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::components::{GameState, Phase, Piece};
    use crate::systems::spawn_piece;
    use crate::tests::test_utils::{count_settled_cells, fill_row};

    #[test]
    fn test_new_app_starts_running() {
        let mut app = App::new();

        let game_state = app.world.resource::<GameState>();
        assert_eq!(game_state.phase, Phase::Running);
        assert_eq!(game_state.score, 0);
        assert_eq!(game_state.level, 1);
        assert_eq!(game_state.lines_cleared, 0);
        assert!(game_state.next_piece.is_some());

        let count = app.world.query::<&Piece>().iter(&app.world).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_render_cells_cover_the_active_piece() {
        let mut app = App::new();

        // Empty board, so the only visible cells are the piece's four
        let cells = app.render_cells();
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|(_, v)| *v != 0));
    }

    #[test]
    fn test_ghost_matches_active_piece_columns() {
        let mut app = App::new();
        let ghost = app.ghost_cells();
        assert_eq!(ghost.len(), 4);

        let cells = app.render_cells();
        let mut piece_columns: Vec<i32> = cells.iter().map(|(p, _)| p.x).collect();
        let mut ghost_columns: Vec<i32> = ghost.iter().map(|p| p.x).collect();
        piece_columns.sort_unstable();
        ghost_columns.sort_unstable();
        assert_eq!(piece_columns, ghost_columns);
    }

    #[test]
    fn test_reset_restores_a_fresh_game() {
        let mut app = App::new();

        // Wreck the state: blocked top row, game over, scores on the board
        {
            let mut board = app.world.resource_mut::<crate::components::Board>();
            fill_row(&mut board, 0, 1);
        }
        {
            let mut game_state = app.world.resource_mut::<GameState>();
            game_state.score = 4200;
            game_state.lines_cleared = 31;
            game_state.level = 4;
        }
        let entities: Vec<_> = app
            .world
            .query_filtered::<bevy_ecs::prelude::Entity, bevy_ecs::prelude::With<Piece>>()
            .iter(&app.world)
            .collect();
        for entity in entities {
            app.world.despawn(entity);
        }
        spawn_piece(&mut app.world);
        assert_eq!(app.world.resource::<GameState>().phase, Phase::GameOver);

        app.reset();

        let game_state = app.world.resource::<GameState>();
        assert_eq!(game_state.phase, Phase::Running);
        assert_eq!(game_state.score, 0);
        assert_eq!(game_state.lines_cleared, 0);
        assert_eq!(game_state.level, 1);
        assert_eq!(
            count_settled_cells(app.world.resource::<crate::components::Board>()),
            0
        );
        let count = app.world.query::<&Piece>().iter(&app.world).count();
        assert_eq!(count, 1);
    }
}
