mod app;
mod input;
mod line;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    clipboard::CopyToClipboard,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;

pub use app::ChatApp;

use crate::config::Settings;
use crate::error::ToolError;

pub async fn run(settings: Settings) -> Result<(), ToolError> {
    info!(base_url = %settings.base_url, agent_id = %settings.agent_id, "Starting chat");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = ChatApp::new(settings);

    // Run event loop
    let result = run_loop(&mut terminal, &mut app).await;

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

/// Copies `text` to the system clipboard through the terminal (OSC 52).
pub(crate) fn write_clipboard(text: &str) -> io::Result<()> {
    execute!(io::stdout(), CopyToClipboard::to_clipboard_from(text))
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut ChatApp,
) -> Result<(), ToolError> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Poll with a timeout so finished network tasks are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        app.poll_completions();

        if app.should_quit {
            break;
        }

        // Let spawned tasks make progress on the runtime
        tokio::task::yield_now().await;
    }

    Ok(())
}
