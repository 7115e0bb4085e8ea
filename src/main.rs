//! report-tui - browse a dataset through the report widgets
//!
//! Loads a report definition and a dataset, then runs the tick-driven
//! event loop. Logs go to `~/.report-tui/report-tui.log` because stdout
//! belongs to the terminal UI.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::Event;
use report_tui::action::Action;
use report_tui::app::App;
use report_tui::component::Component;
use report_tui::config::{Config, ReportDefinition};
use report_tui::services::load_rows;
use report_tui::tui::{Tui, DEFAULT_TICK_RATE};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser)]
#[command(name = "report-tui")]
#[command(about = "Filter, sort, page and export a dataset in the terminal")]
#[command(version)]
struct Args {
    /// Report definition (.json, .yaml or .yml); defaults to the last one opened
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Dataset (.csv or .json); defaults to the last one opened
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Export file (overrides the report's filename and the export directory)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "REPORT_TUI_LOG", default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let Some(log_path) = Config::log_path() else {
        return Ok(());
    };
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_new(format!("report_tui={}", level))
        .unwrap_or_else(|_| EnvFilter::new("report_tui=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Resolve inputs from the arguments and the saved config
fn load_report(args: &Args, config: &mut Config) -> Result<App> {
    let Some(report_path) = args.report.clone().or_else(|| config.last_report.clone()) else {
        bail!("No report definition given (use --report <file>)");
    };
    let mut definition = ReportDefinition::load(&report_path)?;

    let stale = definition.prune_stale_criteria();
    if stale > 0 {
        warn!(stale, "dropped criteria keys missing from the catalog");
    }
    if definition.apply_default_pagination(config.default_page_size) {
        info!(page_size = config.default_page_size, "paging with the configured page size");
    }

    let data_path = args.data.clone().or_else(|| config.last_data.clone());
    let rows = match &data_path {
        Some(path) => load_rows(path)?,
        None => {
            warn!("no dataset given, starting empty");
            Vec::new()
        }
    };
    info!(
        report = %report_path.display(),
        rows = rows.len(),
        "report loaded"
    );

    let export_path = match &args.export {
        Some(path) => path.clone(),
        None => config.export_path(&definition.export.filename),
    };

    config.last_report = Some(report_path);
    config.last_data = data_path;

    Ok(App::new(definition, rows).with_export_path(export_path))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut config = Config::load().unwrap_or_default();
    let mut app = load_report(&args, &mut config)?;
    if let Err(e) = config.save() {
        warn!(error = %e, "failed to save config");
    }

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(DEFAULT_TICK_RATE);
    tui.enter()?;
    app.init()?;

    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    info!("exiting");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                warn!(error = %e, "draw failed");
            }
        })?;

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        } else {
            // No event - send a tick for background polling
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
