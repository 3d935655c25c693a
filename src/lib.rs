#[macro_use]
mod logging;

pub mod connection;
pub mod console;
pub mod editor;
pub mod io;
pub mod params;
pub mod settings;
pub mod ui;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::connection::event_channel;
use crate::editor::Editor;
use crate::io::serial::{list_serial_ports, BAUD_RATE};
use crate::settings::EditorSettings;

// ============================================================================
// Command Line
// ============================================================================

/// Settings editor and serial console for the Thonk Synth t10 MIDI-to-CV module.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "t10-editor", version, about)]
pub struct CliArgs {
    /// Serial port to use when connecting, instead of choosing from the picker
    #[arg(short, long)]
    pub port: Option<String>,

    /// Settings file (defaults to <config dir>/t10-editor/settings.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a log file into this directory (overrides the settings file)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Print the available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// With --list-ports, print JSON instead of one port per line
    #[arg(long, requires = "list_ports")]
    pub json: bool,
}

// ============================================================================
// Entry Point
// ============================================================================

fn load_config(args: &CliArgs) -> Result<EditorSettings, String> {
    match args.config.clone().or_else(settings::default_settings_path) {
        Some(path) => settings::load_settings(&path),
        None => Ok(EditorSettings::default()),
    }
}

fn print_ports(json: bool) -> Result<(), String> {
    let ports = list_serial_ports()?;
    if json {
        let out = serde_json::to_string_pretty(&ports)
            .map_err(|e| format!("Failed to serialize port list: {}", e))?;
        println!("{}", out);
    } else if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        for port in &ports {
            println!("{}", port.label());
        }
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), String> {
    if args.list_ports {
        return print_ports(args.json);
    }

    let settings = load_config(&args)?;

    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| settings.file_logging.then(|| PathBuf::from(&settings.log_dir)));
    if let Some(dir) = &log_dir {
        logging::init_file_logging(dir)?;
    }

    tlog!(
        "[setup] Starting t10-editor {} (refresh: {} ms, port: {:?})",
        env!("CARGO_PKG_VERSION"),
        settings.refresh_interval_ms,
        args.port
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {}", e))?;

    let result = runtime.block_on(async {
        let (events, rx) = event_channel();
        let editor = Editor::new(BAUD_RATE, events);
        let app = ui::App::new(
            editor,
            args.port.clone(),
            Duration::from_millis(settings.read_timeout_ms),
        );
        ui::run(app, rx, Duration::from_millis(settings.refresh_interval_ms)).await
    });

    // Blocking serial readers poll on a timeout, so they notice the closed channel and exit
    runtime.shutdown_timeout(Duration::from_millis(settings.read_timeout_ms.saturating_mul(4)));
    logging::stop_file_logging();

    result
}
