//! TUI module for the interactive movie browser.
//!
//! Uses `ratatui` + `crossterm` for rendering. The controllers in [`list`] and
//! [`detail`] are pure state machines; this module owns the terminal, the
//! input thread and the event loop that executes their commands.

pub mod detail;
pub mod genres;
pub mod list;
pub mod runtime;
pub mod state;
pub mod timer;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use marquee_api::tmdb::MovieApi;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use self::list::{ListController, ListSettings};
use self::runtime::{AppEvent, CommandRunner};
use self::state::App;
use crate::bootstrap::Prerequisites;

/// Interval at which timers (debounce, reveal, settle) are checked.
const TICK_RATE: Duration = Duration::from_millis(50);

/// How long the input thread blocks before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Runs the movie browser until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup, drawing or cleanup fails.
#[instrument(skip_all)]
pub async fn run_browser<A>(
    api: Arc<A>,
    prerequisites: Prerequisites,
    settings: ListSettings,
) -> Result<()>
where
    A: MovieApi + Send + Sync + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let app = App::new(prerequisites, ListController::new(settings));
    let result = run_event_loop(&mut terminal, api, app).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<A>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<A>,
    mut app: App,
) -> Result<()>
where
    A: MovieApi + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    let runner = CommandRunner::new(api, tx);

    let size = terminal.size().context("failed to read terminal size")?;
    app.list
        .set_viewport(ui::split(Rect::new(0, 0, size.width, size.height)).list);
    runner.run_all(app.list.activate());

    let mut ticker = tokio::time::interval(TICK_RATE);
    loop {
        terminal
            .draw(|frame| {
                app.list.set_viewport(ui::split(frame.area()).list);
                ui::draw(frame, &app);
            })
            .context("failed to draw TUI")?;

        let commands = tokio::select! {
            event = rx.recv() => match event {
                Some(event) => app.handle_event(event, Instant::now()),
                None => break,
            },
            _ = ticker.tick() => app.list.on_tick(Instant::now()),
        };
        runner.run_all(commands);

        if let Some(url) = app.take_trailer_request() {
            info!(%url, "opening trailer");
            if let Err(err) = open::that_detached(&url) {
                warn!(error = %err, "failed to open trailer");
                app.notice = Some(format!("Failed to open browser: {err}"));
            }
        }
        if app.should_quit() {
            debug!("quit requested");
            break;
        }
    }
    Ok(())
}

/// Forwards terminal events from a dedicated thread; crossterm reads block.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(AppEvent::Input(ev)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to poll terminal events");
                    break;
                }
            }
        }
    });
}
