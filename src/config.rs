//! Runtime configuration from `DIABSCREEN_*` environment variables.

use std::path::PathBuf;

use crate::domain::{ThresholdPolicy, TierDisplay};
use crate::DiabscreenError;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File on an interactive terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

impl std::str::FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(format!("unknown log mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub policy: ThresholdPolicy,
    pub tier_display: TierDisplay,
    pub require_manifest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            policy: ThresholdPolicy::default(),
            tier_display: TierDisplay::default(),
            require_manifest: false,
            log_mode: LogMode::default(),
            log_file: PathBuf::from("diabscreen.log"),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DiabscreenError::Config(format!(
            "{key}: expected a boolean, got '{value}'"
        ))),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Config` for any unparseable or out-of-range value.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults.
    ///
    /// # Errors
    /// Returns `Config` for any unparseable or out-of-range value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("DIABSCREEN_MODEL_DIR") {
            config.model_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("DIABSCREEN_THRESHOLD") {
            let threshold: f64 = raw.trim().parse().map_err(|_| {
                DiabscreenError::Config(format!("DIABSCREEN_THRESHOLD: not a number: '{raw}'"))
            })?;
            config.policy = ThresholdPolicy::new(threshold)
                .map_err(|e| DiabscreenError::Config(format!("DIABSCREEN_THRESHOLD: {e}")))?;
        }

        if let Some(raw) = lookup("DIABSCREEN_TIER_DISPLAY") {
            config.tier_display = raw
                .parse()
                .map_err(|e| DiabscreenError::Config(format!("DIABSCREEN_TIER_DISPLAY: {e}")))?;
        }

        if let Some(raw) = lookup("DIABSCREEN_REQUIRE_MANIFEST") {
            config.require_manifest = parse_bool("DIABSCREEN_REQUIRE_MANIFEST", &raw)?;
        }

        if let Some(raw) = lookup("DIABSCREEN_LOG_MODE") {
            config.log_mode = raw
                .parse()
                .map_err(|e| DiabscreenError::Config(format!("DIABSCREEN_LOG_MODE: {e}")))?;
        }

        if let Some(file) = lookup("DIABSCREEN_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }

        Ok(config)
    }
}
