#![warn(clippy::all, clippy::pedantic)]

use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use blockfall::Time;
use blockfall::app::{App, AppResult};
use blockfall::components::{GameState, Input, Phase};
use blockfall::{config, systems, ui};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use crossterm::execute;
use log::{debug, error, info};
use ratatui::{Terminal, prelude::*};

const RENDER_TICK: Duration = Duration::from_millis(33); // ~30 FPS
const GAME_TICK: Duration = Duration::from_millis(50);
const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(2);

fn main() -> AppResult<()> {
    // Create log file and redirect stderr to it, so log output never
    // corrupts the alternate screen
    let log_path = "blockfall.log";
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .expect("Failed to create log file");

    let stderr_handle = std::io::stderr();
    let stderr_fd = stderr_handle.as_raw_fd();
    let log_file_fd = log_file.as_raw_fd();

    // Safety: We're redirecting stderr to our log file using standard POSIX operations
    unsafe {
        libc::dup2(log_file_fd, stderr_fd);
    }

    // Set RUST_BACKTRACE environment variable for detailed panic messages
    unsafe {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    info!("starting blockfall");

    match config::load_config_from_file() {
        Ok(loaded) => {
            *config::CONFIG.write().unwrap() = loaded;
            info!("configuration loaded");
        }
        Err(e) => {
            error!("failed to load configuration, using defaults: {e:?}");
        }
    }

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Key release events need the enhanced keyboard protocol; without
    // it, held keys arrive as repeated presses instead
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new();
    let res = run_app(&mut terminal, app, keyboard_enhanced);

    // Restore terminal
    disable_raw_mode()?;
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("game error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    keyboard_enhanced: bool,
) -> AppResult<()> {
    let mut last_render = Instant::now();
    let mut last_game_tick = Instant::now();
    let mut last_config_check = Instant::now();

    // Flush any input events queued before the terminal was ready
    while event::poll(Duration::from_millis(0))? {
        let _ = event::read()?;
    }

    loop {
        if last_render.elapsed() >= RENDER_TICK {
            terminal.draw(|f| ui::render(f, &mut app))?;
            last_render = Instant::now();
        }

        if last_game_tick.elapsed() >= GAME_TICK {
            last_game_tick = Instant::now();
            let delta_ms = {
                let mut time = app.world.resource_mut::<Time>();
                time.update();
                time.delta_ms()
            };

            if app.should_quit {
                return Ok(());
            }

            systems::input_system(&mut app.world);
            systems::gravity_system(&mut app.world, delta_ms, config::speed_multiplier());

            // Without release events a held soft drop is re-asserted by
            // key repeat, so expire it every tick; the hard drop key
            // re-arms the same way
            if !keyboard_enhanced {
                let mut input = app.world.resource_mut::<Input>();
                input.soft_drop = false;
                input.hard_drop_released = true;
            }
        }

        if last_config_check.elapsed() >= CONFIG_CHECK_INTERVAL {
            last_config_check = Instant::now();
            if config::reload_if_changed() {
                info!("configuration reloaded");
            }
        }

        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(key) = event::read()? {
                debug!("key event: {key:?}");
                handle_key(&mut app, key);
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Key releases end held commands and re-arm the hard drop key
    if key.kind == KeyEventKind::Release {
        let mut input = app.world.resource_mut::<Input>();
        match key.code {
            KeyCode::Down | KeyCode::Char('s') => input.soft_drop = false,
            KeyCode::Char(' ') => input.hard_drop_released = true,
            _ => {}
        }
        return;
    }

    // Key-repeat duplicates of one-shot commands are ignored; held
    // soft drop is level-triggered so repeats are harmless
    if key.kind == KeyEventKind::Repeat {
        if matches!(key.code, KeyCode::Down | KeyCode::Char('s')) {
            app.world.resource_mut::<Input>().soft_drop = true;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q' | 'Q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('p') => {
            app.world.resource_mut::<Input>().toggle_pause = true;
            return;
        }
        KeyCode::Char('r') => {
            info!("restart requested");
            app.reset();
            return;
        }
        KeyCode::Char('+' | '=') => {
            let speed = config::adjust_speed(1);
            debug!("speed set to {speed}");
            return;
        }
        KeyCode::Char('-' | '_') => {
            let speed = config::adjust_speed(-1);
            debug!("speed set to {speed}");
            return;
        }
        _ => {}
    }

    // Gameplay keys only register while the game is running
    if app.world.resource::<GameState>().phase != Phase::Running {
        return;
    }

    let mut input = app.world.resource_mut::<Input>();
    match key.code {
        KeyCode::Left | KeyCode::Char('a') => input.left = true,
        KeyCode::Right | KeyCode::Char('d') => input.right = true,
        KeyCode::Down | KeyCode::Char('s') => input.soft_drop = true,
        KeyCode::Up | KeyCode::Char('w') => input.rotate = true,
        KeyCode::Char(' ') => {
            // Only fire if the key was seen released since the last drop
            if input.hard_drop_released {
                input.hard_drop = true;
                input.hard_drop_released = false;
            }
        }
        _ => {}
    }
}
