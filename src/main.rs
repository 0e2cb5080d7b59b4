// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

mod app;
mod data;
mod events;
mod replay;
mod sink;
mod source;
mod ui;

use app::{App, View};
use sink::{FileSink, RecordSink};
use source::{StreamSource, TailSource, TelemetrySource};

#[derive(Parser, Debug)]
#[command(name = "thermwatch")]
#[command(about = "Live TUI and replay tool for thermal mix-valve control telemetry")]
struct Args {
    /// Tail a CSV capture file being appended by another process
    #[arg(short, long, default_value = "capture.csv", conflicts_with_all = ["connect", "replay"])]
    file: PathBuf,

    /// Connect to a TCP endpoint for the live line stream (host:port)
    #[arg(short, long, conflicts_with_all = ["replay"])]
    connect: Option<String>,

    /// Replay an archived capture non-interactively and print a summary
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Write the replay summary as JSON to this path (with --replay)
    #[arg(short, long, requires = "replay")]
    export: Option<PathBuf>,

    /// Time window to keep and chart, in seconds (live default: 120;
    /// replay covers the whole capture unless set)
    #[arg(short, long)]
    window: Option<u64>,

    /// Ingestion tick interval in milliseconds
    #[arg(short, long, default_value = "200")]
    tick: u64,

    /// Safety bound on records drained per tick
    #[arg(long, default_value = "512")]
    max_per_tick: usize,

    /// Mirror every raw line to this CSV file while streaming
    #[arg(short, long)]
    outfile: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle replay mode (non-interactive)
    if let Some(ref capture) = args.replay {
        return run_replay(capture, args.export.as_deref(), args.window);
    }

    let window_ms = args.window.unwrap_or(120).saturating_mul(1000);
    let tick = Duration::from_millis(args.tick.max(1));

    let sink: Option<Box<dyn RecordSink>> = match args.outfile {
        Some(ref path) => Some(Box::new(FileSink::create(path)?)),
        None => None,
    };

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, sink, window_ms, args.max_per_tick, tick);
    }

    // Default: tail a file
    let source = Box::new(TailSource::new(&args.file));
    run_tui(source, sink, window_ms, args.max_per_tick, tick)
}

/// Replay a capture through the same buffer/span core and report the result.
fn run_replay(
    capture: &std::path::Path,
    export: Option<&std::path::Path>,
    window: Option<u64>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let window_ms = window.map(|w| w.saturating_mul(1000));
    let summary = replay::replay_file(capture, window_ms)?;

    println!(
        "{}: {} samples accepted, {} rejected, {} link drop(s)",
        capture.display(),
        summary.accepted,
        summary.rejected,
        summary.spans.len()
    );
    for span in &summary.spans {
        println!(
            "  link lost {:.1}s - {:.1}s ({:.1}s)",
            span.start_ms as f64 / 1000.0,
            span.end_ms as f64 / 1000.0,
            span.duration_ms() as f64 / 1000.0
        );
    }

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)?;
        println!("Exported summary to: {}", path.display());
    }

    Ok(())
}

/// Run with a TCP stream data source
fn run_with_tcp(
    addr: &str,
    sink: Option<Box<dyn RecordSink>>,
    window_ms: u64,
    max_per_tick: usize,
    tick: Duration,
) -> Result<()> {
    // Build a tokio runtime for the TCP connection; the reader task stays on
    // it while the TUI runs on the main thread
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn TelemetrySource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // Keep the runtime alive for the reader task while the TUI runs
    run_tui(source, sink, window_ms, max_per_tick, tick)
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn TelemetrySource>,
    sink: Option<Box<dyn RecordSink>>,
    window_ms: u64,
    max_per_tick: usize,
    tick: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, sink, window_ms, max_per_tick)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, tick);

    // Release the source and sink on every exit path
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    // Minimum terminal size for usable charts
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Charts
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Temperature => ui::temperature::render(frame, app, chunks[2]),
                View::Control => ui::control::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for input with a short timeout so the tick cadence holds
        if let Some(event) = events::poll_event(Duration::from_millis(50))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Drain the source on the tick cadence
        if !app.paused && last_tick.elapsed() >= tick {
            if let Err(e) = app.drain_tick() {
                // Source fault: surface it and stop the session
                app.load_error = Some(e.to_string());
                break;
            }
            last_tick = Instant::now();
        }
    }

    if let Some(ref err) = app.load_error {
        anyhow::bail!("session ended: {}", err);
    }
    Ok(())
}
