//! Subcommand handlers.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use super::args::ConfigAction;
use crate::config::{default_path as get_config_path, Config, ConfigError};
use crate::error::{Error, Result};
use crate::service::{ArchiveService, CursorResponse, StatusResponse, SubmitResponse};

/// How often `convert` polls the job status.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Global flag set by the Ctrl+C handler.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C was received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// Playback checks `ctrlc_received()` between frames and stops cleanly.
pub fn setup_ctrlc_handler() -> std::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Submit a video and block until its render finishes.
pub fn run_convert(
    service: &ArchiveService,
    video: &Path,
    width: Option<u32>,
    name: Option<&str>,
) -> Result<()> {
    eprintln!("Rendering {}", video.display());
    let SubmitResponse::Accepted { name } = service.submit_file(video, name, width)?;

    loop {
        match service.status(&name) {
            StatusResponse::Running { progress } => {
                eprint!("\r  {}: {:>6.2}%", name, progress);
                let _ = std::io::stderr().flush();
            }
            StatusResponse::Finished | StatusResponse::NotRunning => break,
            StatusResponse::Failed { error } => {
                eprintln!();
                return Err(Error::RenderFailed {
                    name,
                    reason: error,
                });
            }
        }
        thread::sleep(POLL_INTERVAL);
    }

    eprintln!("\r  {}: 100.00%", name);
    println!(
        "Saved {} to {}",
        name,
        service.store().path_for(&name).display()
    );
    Ok(())
}

/// Print archive metadata as JSON.
pub fn run_info(service: &ArchiveService, name: &str) -> Result<()> {
    print_json(&service.info(name)?)
}

/// Print a frame window as JSON.
pub fn run_frames(service: &ArchiveService, name: &str, start: usize, count: usize) -> Result<()> {
    print_json(&service.frames(name, start, count)?)
}

/// Replay an archive at its frame rate, fetching `batch` frames at a time
/// through a cursor.
pub fn run_play(service: &ArchiveService, name: &str, batch: usize) -> Result<()> {
    let mut reference_id: Option<String> = None;
    let mut stdout = std::io::stdout();

    'playback: loop {
        let response = service.advance(name, reference_id.as_deref(), batch)?;
        let (id, frames, complete, fps) = match response {
            CursorResponse::Processing { progress } => {
                eprintln!("'{}' is still rendering ({:.2}%)", name, progress);
                return Ok(());
            }
            CursorResponse::Frames {
                reference_id,
                frames,
                complete,
                fps,
            } => (reference_id, frames, complete, fps),
        };

        let delay = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        for frame in frames.values() {
            if ctrlc_received() {
                break 'playback;
            }
            // Home the cursor and clear before each frame
            let _ = write!(stdout, "\x1b[H\x1b[2J{}", frame);
            let _ = stdout.flush();
            thread::sleep(delay);
        }

        if complete || frames.is_empty() {
            break;
        }
        reference_id = Some(id);
    }

    let _ = writeln!(stdout);
    Ok(())
}

/// List archive names.
pub fn run_list(service: &ArchiveService) -> Result<()> {
    let names = service.list()?;
    if names.is_empty() {
        println!("No archives in {}", service.store().dir().display());
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# ascii-reel configuration

[storage]
# Directory holding {name}.txt.gz archives
dir = "./files"

[jobs]
# Renders allowed to run at once
max_concurrent = 5
# Columns per frame when none is given
default_width = 240

[cache]
# Seconds an archive stays in memory without being read
idle_timeout_secs = 600
# Archives loaded at startup and never evicted
preload = []

[render]
# Glyph palette: classic, standard
palette = "classic"
# Map bright pixels to dense glyphs (for light terminals)
invert = false
"#;

/// Handle config subcommand actions.
///
/// `config` is the effective configuration, `path` the file it came from
/// (or the default location).
pub fn handle_config_action(action: ConfigAction, config: &Config, path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!();
            print!("{}", config.to_toml()?);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'ascii-reel config show' to view current settings.");
                return Ok(());
            }

            let io_err = |source| ConfigError::IoError {
                path: config_path.clone(),
                source,
            };
            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(io_err)?;

            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
