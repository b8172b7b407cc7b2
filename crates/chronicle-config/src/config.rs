/// Engine configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "CHRONICLE_CONFIG";

/// Largest context window accepted by `sanitize`.
const MAX_CONTEXT_LINES: usize = 20;

/// Largest exact LCS table accepted by `sanitize`, in cells.
const MAX_EXACT_LCS_CELLS: usize = 64_000_000;

/// Longest debounce window accepted by `sanitize`, in milliseconds.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Tunables for the change-tracking engine and the highlighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Unchanged lines kept on each side of a hunk.
    pub context_lines: usize,
    /// Largest `baseline_lines * current_lines` product that still uses the
    /// exact LCS table. Bigger inputs use the greedy approximation.
    pub exact_lcs_cell_limit: usize,
    /// Quiet period after the last keystroke before unsaved changes are
    /// recomputed.
    pub debounce_ms: u64,
    /// Whether fenced code blocks are tokenized by language.
    pub highlight_code_fences: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            exact_lcs_cell_limit: 4_000_000,
            debounce_ms: 300,
            highlight_code_fences: true,
        }
    }
}

impl EngineConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `CHRONICLE_CONFIG` environment variable
    /// 2. `chronicle.json` next to the executable
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("chronicle.json")))
            .unwrap_or_else(|| PathBuf::from("chronicle.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EngineConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Don't overwrite a broken file
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config to {}", path.display()))
    }

    /// Debounce window as a `Duration`.
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.context_lines = self.context_lines.min(MAX_CONTEXT_LINES);
        self.exact_lcs_cell_limit = self.exact_lcs_cell_limit.clamp(1, MAX_EXACT_LCS_CELLS);
        self.debounce_ms = self.debounce_ms.min(MAX_DEBOUNCE_MS);
    }
}
