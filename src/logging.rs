use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Timestamped logging macro.
/// Prepends `HH:MM:SS.mmm` local time to every message. Writes to stderr unless
/// the echo is switched off, and to the log file when file logging is enabled.
macro_rules! tlog {
    ($($arg:tt)*) => {{
        use std::io::Write as _;
        let msg = format!("{} {}", chrono::Local::now().format("%H:%M:%S%.3f"), format_args!($($arg)*));
        if $crate::logging::STDERR_ECHO.load(std::sync::atomic::Ordering::Relaxed) {
            eprintln!("{}", msg);
        }
        if let Ok(mut guard) = $crate::logging::LOG_FILE.lock() {
            if let Some(ref mut f) = *guard {
                let _ = writeln!(f, "{}", msg);
            }
        }
    }};
}

/// Global log file handle. When `Some`, `tlog!` writes every line to this file.
pub(crate) static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

/// Whether `tlog!` also echoes to stderr. Cleared while the terminal UI owns the screen.
pub(crate) static STDERR_ECHO: AtomicBool = AtomicBool::new(true);

/// Initialise file logging to the given reports directory.
/// Creates a timestamped log file and a `t10-editor.log` symlink (Unix only).
pub(crate) fn init_file_logging(reports_dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(reports_dir)
        .map_err(|e| format!("Failed to create reports dir: {}", e))?;

    let filename = chrono::Local::now()
        .format("%Y%m%d-%H%M%S-t10-editor.log")
        .to_string();
    let log_path = reports_dir.join(&filename);

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to create log file: {}", e))?;

    // Symlink is Unix only, Windows symlinks require elevated privileges
    #[cfg(unix)]
    {
        let symlink_path = reports_dir.join("t10-editor.log");
        let _ = std::fs::remove_file(&symlink_path);
        if let Err(e) = std::os::unix::fs::symlink(&filename, &symlink_path) {
            tlog!("[logging] Failed to create t10-editor.log symlink: {}", e);
        }
    }

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    tlog!("[logging] File logging started: {}", log_path.display());

    Ok(log_path)
}

/// Stop file logging and close the log file.
pub(crate) fn stop_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if guard.is_some() {
            *guard = None;
            if STDERR_ECHO.load(Ordering::Relaxed) {
                eprintln!(
                    "{} [logging] File logging stopped",
                    chrono::Local::now().format("%H:%M:%S%.3f")
                );
            }
        }
    }
}

/// Turn the stderr echo of `tlog!` on or off.
pub(crate) fn set_stderr_echo(enabled: bool) {
    STDERR_ECHO.store(enabled, Ordering::Relaxed);
}
