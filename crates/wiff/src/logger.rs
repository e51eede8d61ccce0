//! File-based logging. The UI owns the terminal, so logs go to
//! `wiff.log` in the cache directory (or the system temp directory as a
//! fallback). Initialization failure is tolerated; the viewer runs fine
//! without a log file.

use std::fs::File;
use std::path::PathBuf;

use simplelog::{Config, LevelFilter, WriteLogger};

fn log_file_path() -> PathBuf {
    let dir = dirs::cache_dir()
        .map(|base| base.join("wiff"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .unwrap_or_else(std::env::temp_dir);
    dir.join("wiff.log")
}

fn level() -> LevelFilter {
    let default = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match std::env::var("RUST_LOG").ok().as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => default,
    }
}

pub fn init() {
    let Ok(file) = File::create(log_file_path()) else {
        return;
    };
    let _ = WriteLogger::init(level(), Config::default(), file);
}
