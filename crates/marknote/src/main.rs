use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{fs::OpenOptions, io, time::Duration};

use marknote::{storage, ui, App, Mode};

const LOG_FILE: &str = "marknote.log";

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let app = match App::new().await {
        Ok(app) => {
            log::info!("Application initialized successfully");
            app
        }
        Err(e) => {
            log::error!("Failed to initialize: {:#}", e);
            eprintln!("Failed to start marknote: {:#}", e);
            return Err(e);
        }
    };

    // Setup terminal
    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialize the terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        eprintln!("Failed to set up the terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    restore_terminal()?;

    if let Err(err) = res {
        log::error!("Application error: {:#}", err);
        eprintln!("marknote stopped with an error: {:#}", err);
        return Err(err);
    }

    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file in the data
/// directory. Falls back to stderr when that file cannot be opened.
fn init_logger() {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        for module in ["marknote", "editcore", "mdcore"] {
            logger.filter_module(module, LevelFilter::Debug);
        }
    }

    let file = storage::data_dir().ok().and_then(|dir| {
        std::fs::create_dir_all(&dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
            .ok()
    });
    if let Some(file) = file {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }

    logger.init();
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
        }
        // The new buffer is on screen, so a staged selection can be restored.
        app.after_render();

        app.update_status();

        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Ctrl+C quits like Ctrl+Q, asking first if changes are unsaved
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                        && app.ui_state.mode() != Mode::ConfirmQuit
                    {
                        log::info!("Exit requested via Ctrl+C");
                        app.ui_state.enter_edit_mode();
                        app.request_quit();
                        continue;
                    }
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {:#}", e);
                        app.ui_state.status.error(format!("{:#}", e));
                    }
                }
                Event::Resize(_, _) => {
                    log::debug!("Terminal resized");
                }
                _ => {}
            }
        }
    }

    log::info!("Application loop ended");
    Ok(())
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
