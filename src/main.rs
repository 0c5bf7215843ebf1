use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use syncwatch::app::{write_report, App};
use syncwatch::source::{ChannelSource, DataSource};
use syncwatch::{events, scheduler, ui, Coordinator, Settings, SyncReport};

#[derive(Parser, Debug)]
#[command(name = "syncwatch")]
#[command(about = "Watch how far a local Monero node is behind the network")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Display name of the node
    #[arg(short, long)]
    name: Option<String>,

    /// URL reporting the network's best block height
    #[arg(long)]
    global_height_url: Option<String>,

    /// Response shape of the global height URL
    #[arg(long, value_parser = ["nested", "flat"])]
    global_height_format: Option<String>,

    /// URL of the local node's get_height endpoint
    #[arg(long)]
    local_height_url: Option<String>,

    /// URL reporting the XMR/USD price
    #[arg(long)]
    price_url: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Print one JSON report per cycle instead of the dashboard
    #[arg(long, conflicts_with_all = ["once", "export"])]
    headless: bool,

    /// Run a single cycle, print the report as JSON and exit
    #[arg(long)]
    once: bool,

    /// Run a single cycle, write the report to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Start without trial-fetching each endpoint
    #[arg(long)]
    skip_validation: bool,

    /// Write logs to this file (the dashboard otherwise discards them)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line values that take precedence over file and environment.
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(ref name) = self.name {
            overrides.push(("name", name.clone()));
        }
        if let Some(ref url) = self.global_height_url {
            overrides.push(("global_height_url", url.clone()));
        }
        if let Some(ref format) = self.global_height_format {
            overrides.push(("global_height_format", format.clone()));
        }
        if let Some(ref url) = self.local_height_url {
            overrides.push(("local_height_url", url.clone()));
        }
        if let Some(ref url) = self.price_url {
            overrides.push(("price_url", url.clone()));
        }
        if let Some(secs) = self.refresh {
            overrides.push(("refresh_interval", secs.to_string()));
        }
        overrides
    }

    fn interactive(&self) -> bool {
        !(self.headless || self.once || self.export.is_some())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref(), args.overrides())
        .context("failed to load settings")?;

    init_tracing(&args)?;

    let rt = Runtime::new()?;

    settings.validate()?;
    if !args.skip_validation {
        rt.block_on(settings.verify_endpoints())?;
        info!(node = %settings.name, "all endpoints reachable");
    }

    // Handle single-cycle modes (non-interactive)
    if args.once || args.export.is_some() {
        let report = rt.block_on(refresh_once(settings))?;
        if let Some(ref path) = args.export {
            write_report(&report, path)?;
            println!("Exported sync report to: {}", path.display());
        } else {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    if args.headless {
        return rt.block_on(run_headless(settings));
    }

    let guard = rt.enter();
    let interval = settings.refresh_interval();
    let name = settings.name.clone();
    let description = settings.local_height_url.clone();
    let handle = scheduler::spawn(Coordinator::new(settings)?, interval)?;

    let source = Box::new(ChannelSource::from_scheduler(&handle, &description));
    let result = run_tui(source, &name, interval);

    drop(guard);
    rt.block_on(handle.shutdown());
    result
}

/// Log to stderr outside the dashboard, to the log file (if any) inside it.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if !args.interactive() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

async fn refresh_once(settings: Settings) -> Result<SyncReport> {
    let mut coordinator = Coordinator::new(settings)?;
    let report = coordinator.refresh().await.cloned();
    coordinator.shutdown();
    Ok(report?)
}

/// Print each successful report as one JSON line until interrupted.
async fn run_headless(settings: Settings) -> Result<()> {
    let interval = settings.refresh_interval();
    let handle = scheduler::spawn(Coordinator::new(settings)?, interval)?;
    let mut rx = handle.subscribe();
    let mut seen_cycles = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.in_flight || state.cycles == seen_cycles {
                    continue;
                }
                seen_cycles = state.cycles;

                match (state.last_error, state.report) {
                    (Some(err), _) => warn!(error = %err, "cycle failed, keeping last report"),
                    (None, Some(report)) => println!("{}", serde_json::to_string(&report)?),
                    (None, None) => {}
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, name: &str, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, name, refresh_interval);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

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

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5u16.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(12),   // Dashboard
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::dashboard::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        // The watch channel makes this a cheap no-op between cycles
        app.reload_data();
    }

    Ok(())
}

