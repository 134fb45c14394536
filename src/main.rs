//! cafmenu - Browse upcoming dining hall menus
//!
//! A terminal UI that lists the meals of the next few days from a local cache
//! of CampusDish menus. Menus are downloaded by a background prefetch so the
//! view itself never waits on the network.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};

use cafmenu::app::{App, AppState};
use cafmenu::cache::{CacheManager, MenuCache};
use cafmenu::cli::{Cli, Command, RunMode, StartupConfig};
use cafmenu::config::{AppPaths, Settings};
use cafmenu::data::{CampusDishClient, MenuFetcher};
use cafmenu::prefetch::{prefetch, BackgroundPrefetch};
use cafmenu::presentation::MenuBuilder;
use cafmenu::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Configures `env_logger`
///
/// The interactive view owns the terminal and background prefetches have no
/// stderr, so both log to a file in the cache directory. `list` logs to stderr.
/// The filter comes from `RUST_LOG` and defaults to `warn`.
fn init_logging(paths: &AppPaths, command: Option<Command>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if command == Some(Command::List) {
        builder.target(env_logger::Target::Stderr).init();
        return;
    }

    let log_file = fs::create_dir_all(paths.cache_dir()).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths.log_file())
    });
    match log_file {
        Ok(file) => {
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(_) => {
            // nowhere safe to write while the TUI is up
            builder.filter_level(log::LevelFilter::Off).init();
        }
    }
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => {
            render_loading(frame);
        }
        AppState::MealList => {
            ui::render_meal_list(frame, app);
        }
        AppState::MealDetail(index) => {
            ui::render_meal_detail(frame, app, *index);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the cache is read
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading menus...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Rebuilds the meal list from the cache
async fn reload<F: MenuFetcher>(builder: &MenuBuilder<'_, F>, app: &mut App, num_days: u32) {
    let now = Local::now().naive_local();
    app.set_meals(builder.build_meals(now.date(), num_days, now).await);
}

/// Draws and handles input until the user quits
async fn event_loop<B: Backend, F: MenuFetcher>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    builder: &MenuBuilder<'_, F>,
    num_days: u32,
    mut background: Option<BackgroundPrefetch>,
) -> io::Result<()> {
    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, app))?;
    reload(builder, app, num_days).await;

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if let Some(child) = background.as_mut() {
            if !child.is_running() {
                background = None;
                app.prefetch_finished();
            }
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            reload(builder, app, num_days).await;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Runs the interactive view
async fn run_interactive<F: MenuFetcher>(
    cache: &MenuCache<F>,
    startup: &StartupConfig,
) -> Result<(), Box<dyn Error>> {
    let settings = &startup.settings;
    let mut app = App::new();

    let background = if startup.background_prefetch {
        match BackgroundPrefetch::spawn_current_exe(settings.days) {
            Ok(prefetch) => {
                app.prefetch_running = true;
                Some(prefetch)
            }
            Err(e) => {
                log::warn!("Could not start background prefetch: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let builder = MenuBuilder::from_settings(cache, settings);
    let result = event_loop(&mut terminal, &mut app, &builder, settings.days, background).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(result?)
}

/// Prints cached menus to stdout
async fn run_list<F: MenuFetcher>(
    cache: &MenuCache<F>,
    settings: &Settings,
) -> Result<(), Box<dyn Error>> {
    let now = Local::now().naive_local();
    let meals = MenuBuilder::from_settings(cache, settings)
        .build_meals(now.date(), settings.days, now)
        .await?;

    if meals.is_empty() {
        eprintln!("No cached menus. Run `cafmenu prefetch` to download them.");
    }

    for meal in meals {
        println!("{}", meal.label);
        for line in meal.lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("cafmenu: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let paths = AppPaths::discover().ok_or("Could not determine a home directory for cafmenu")?;
    init_logging(&paths, cli.command);

    let settings = Settings::load(&paths)?;
    let startup = StartupConfig::from_cli(&cli, settings)?;
    let settings = &startup.settings;

    let client = CampusDishClient::new(
        settings.location_id,
        Duration::from_secs(settings.fetch_timeout_secs),
    )?;
    let cache = MenuCache::new(CacheManager::new(paths.cache_dir()), client);

    match startup.mode {
        RunMode::Interactive => run_interactive(&cache, &startup).await?,
        RunMode::List => run_list(&cache, settings).await?,
        RunMode::Prefetch => {
            let now = Local::now().naive_local();
            let summary = prefetch(&cache, &settings.exclusions, now.date(), settings.days, now).await;
            println!(
                "{} menus cached, {} failed",
                summary.available, summary.failed
            );
        }
    }

    Ok(())
}
