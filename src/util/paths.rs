//! Where research-replay keeps its config file and logs.
//!
//! Everything lives under one data directory, `~/.research-replay` unless
//! `--data-dir` overrides it:
//!
//! ```text
//! <data dir>/
//!   config.toml
//!   logs/research-replay.log
//! ```

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

const DIR_NAME: &str = ".research-replay";
const CONFIG_FILE: &str = "config.toml";
const LOGS_DIR: &str = "logs";
const LOG_FILE: &str = "research-replay.log";

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// File layout below a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE)
    }

    /// Open the log file for appending, creating `logs/` first if needed
    pub fn open_log_file(&self) -> io::Result<File> {
        fs::create_dir_all(self.logs_dir())?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_file())
    }
}

/// Pin the data directory for the rest of the process.
///
/// Call before anything reads a path. Only the first call takes effect.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if let Err(rejected) = DATA_DIR.set(path) {
        tracing::debug!(
            rejected = %rejected.display(),
            current = %data_dir().display(),
            "Data directory already initialized"
        );
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DIR_NAME))
}

pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

pub fn layout() -> DataLayout {
    DataLayout::under(data_dir())
}

pub fn config_path() -> PathBuf {
    layout().config_file()
}
