use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Server the app talks to when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5050";

/// Voice preselected on first launch.
pub const DEFAULT_VOICE: &str = "expr-voice-2-f";

/// Voices offered before the server's own catalog arrives.
pub const BUILTIN_VOICES: &[&str] = &[
    "expr-voice-2-m",
    "expr-voice-2-f",
    "expr-voice-3-m",
    "expr-voice-3-f",
    "expr-voice-4-m",
    "expr-voice-4-f",
    "expr-voice-5-m",
    "expr-voice-5-f",
];

/// Overrides `server_url` from the config file when set.
pub const SERVER_URL_ENV: &str = "TTS_STUDIO_SERVER_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the speech server, e.g. "http://localhost:5050"
    pub server_url: String,
    /// Last voice used for a generation request.
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_voice() -> String {
    DEFAULT_VOICE.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            voice: default_voice(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/tts-studio/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("tts-studio");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        let mut config: Self = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }
        config
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
