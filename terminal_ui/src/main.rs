mod api;
mod app;
mod controller;
#[cfg(test)]
mod testing;
mod ui;

use std::error::Error;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flexi_logger::{FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use log::info;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::{HttpTodoApi, TodoApi};
use crate::app::App;
use crate::controller::TodoController;

#[derive(Debug, Parser)]
#[command(name = "todo-terminal-ui", version, about = "Terminal client for the todo list")]
struct Args {
    /// Base URL of the todo server.
    #[arg(long, env = "TODO_API_URL", default_value = "http://localhost:5010/")]
    api_url: String,

    /// Directory for the log file; defaults to the system temp dir.
    #[arg(long, env = "TODO_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn init_logging(log_dir: Option<PathBuf>) -> Result<LoggerHandle, FlexiLoggerError> {
    let dir = log_dir.unwrap_or_else(|| std::env::temp_dir().join("todo-terminal-ui"));
    Logger::try_with_env_or_str("info")?
        .log_to_file(FileSpec::default().directory(dir).basename("todo-terminal-ui"))
        .format_for_files(flexi_logger::detailed_format)
        .start()
}

async fn run<B: Backend, A: TodoApi>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> Result<(), Box<dyn Error>> {
    while !app.should_quit() {
        terminal.draw(|f| ui::draw(f, &*app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }
    }
    Ok(())
}

async fn session<A: TodoApi>(app: &mut App<A>) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    run(&mut terminal, app).await
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

/// Runs `body`, then `restore` whether or not `body` failed. A body error
/// takes precedence over a restore error.
async fn restoring<T, F, R>(body: F, restore: R) -> Result<T, Box<dyn Error>>
where
    F: Future<Output = Result<T, Box<dyn Error>>>,
    R: FnOnce() -> io::Result<()>,
{
    let result = body.await;
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _logger = init_logging(args.log_dir)?;

    let api = HttpTodoApi::new(&args.api_url)?;
    info!("connecting to {}", args.api_url);
    let mut app = App::new(TodoController::new(api));
    app.start().await;

    enable_raw_mode()?;
    restoring(session(&mut app), restore_terminal).await
}
