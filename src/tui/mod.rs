mod app;
mod event_handler;
mod preview;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use crate::config::{Config, DisplayMode};

use app::{App, AppMode};
use preview::FramePreview;

/// Input poll timeout; short enough to keep a 100 ms animation smooth
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run the TUI application
pub async fn run(config: &Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone());
    if config.output.display == DisplayMode::Terminal {
        app = app.with_preview(FramePreview::detect());
    }

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Pick up progress and results from the generation task
        app.drain_events();
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        // Give the spawned generation task a chance to run
        tokio::task::yield_now().await;

        if poll(POLL_INTERVAL)? {
            if let Event::Key(key) = read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match app.mode {
                    AppMode::Form => event_handler::handle_form_input(app, key).await?,
                    AppMode::Editing => event_handler::handle_edit_input(app, key)?,
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
