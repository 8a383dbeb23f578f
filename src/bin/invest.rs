use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vantage_utils::error::{Result, VantageError};
use vantage_utils::event::{Event, EventHandler};
use vantage_utils::invest::{ui, FlowMessage, InvestApp, InvestConfig};

#[derive(Parser, Debug)]
#[command(name = "vantage-invest")]
#[command(author, version, about = "Guided investment flow for the Vantage assistant")]
struct Args {
    /// Path to flow config file (default: <config dir>/vantage/invest.toml)
    #[arg(long)]
    config: Option<String>,

    /// Override the simulated submission delay, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified
    if let Some(ref log_path) = args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok();

        if let Some(file) = file {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();

            info!("Starting vantage-invest");
        }
    }

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let result = run_flow(&mut terminal, &args).await;

    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Flow error: {}", e);
    }

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| VantageError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| VantageError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal =
        Terminal::new(backend).map_err(|e| VantageError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| VantageError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen)
        .map_err(|e| VantageError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run_flow(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    args: &Args,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut events = EventHandler::new(tick_rate);

    // Load config from specified path, default path, or use defaults
    let mut config = match args.config.as_deref() {
        Some(path) => InvestConfig::load_from(path).unwrap_or_default(),
        None => InvestConfig::load().unwrap_or_default(),
    };

    if let Some(delay) = args.delay_ms {
        config.executor.delay_ms = delay;
    }

    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel::<FlowMessage>();
    let mut app =
        InvestApp::new(config, outcome_tx).map_err(|e| VantageError::Flow(e.to_string()))?;

    loop {
        terminal
            .draw(|frame| ui::draw(frame, &app))
            .map_err(|e| VantageError::Terminal(e.to_string()))?;

        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Event::Key(key)) => app.handle_key(key),
                    Some(Event::Resize) => {}
                    Some(Event::Tick) => app.tick(),
                    None => break,
                }
            }
            message = outcomes.recv() => {
                match message {
                    Some(message) => app.handle_message(message),
                    None => break,
                }
            }
        }

        if app.should_exit {
            info!("Exiting investment flow");
            break;
        }
    }

    Ok(())
}
