use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::errors::{CounterError, Result};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Log level for tracing (e.g. "info", "debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub storage: StorageMode,

    /// Directory holding likes.json, views.json and shares.json.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Static assets. `index.html` inside it answers every unmatched path.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

/// Where counts live. `memory` keeps nothing across restarts.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    Json,
    Memory,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            log_level: default_log_level(),
            storage: StorageMode::default(),
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CounterError::Config(format!("cannot read {}: {e}", path.display())))?;

        Self::parse(&text).map_err(|e| CounterError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

/// Find config.json next to the executable, one level above it, or in the
/// working directory, in that order.
pub fn locate() -> Result<PathBuf> {
    let mut candidates = Vec::new();

    let exe = env::current_exe().ok();
    if let Some(exe_dir) = exe.as_deref().and_then(Path::parent) {
        candidates.push(exe_dir.join(CONFIG_FILE));
        candidates.push(exe_dir.join("..").join(CONFIG_FILE));
    }
    candidates.push(PathBuf::from(CONFIG_FILE));

    candidates.iter().find(|p| p.exists()).cloned().ok_or_else(|| {
        let tried: Vec<String> = candidates.iter().map(|p| format!("  {}", p.display())).collect();
        CounterError::Config(format!("{CONFIG_FILE} not found in:\n{}", tried.join("\n")))
    })
}
