//! Runtime configuration.
//!
//! Defaults are overridden by `THYROCAST_*` environment variables; the
//! binaries then apply their command-line flags on top.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::pipeline::UnknownCategoryPolicy;
use crate::ThyrocastError;

pub const DATASET_PATH_ENV: &str = "THYROCAST_DATASET_PATH";
pub const ARTIFACT_DIR_ENV: &str = "THYROCAST_ARTIFACT_DIR";
pub const SPLIT_SEED_ENV: &str = "THYROCAST_SPLIT_SEED";
pub const TEST_FRACTION_ENV: &str = "THYROCAST_TEST_FRACTION";
pub const UNKNOWN_CATEGORY_ENV: &str = "THYROCAST_UNKNOWN_CATEGORY";
pub const MIN_TEST_ACCURACY_ENV: &str = "THYROCAST_MIN_TEST_ACCURACY";
pub const LOG_MODE_ENV: &str = "THYROCAST_LOG_MODE";
pub const LOG_FILE_ENV: &str = "THYROCAST_LOG_FILE";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
    /// Keeps stdout free for command output
    Stderr,
}

impl LogMode {
    /// Whether to log to a file given whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout | Self::Stderr => false,
            Self::Auto => interactive,
        }
    }
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(format!(
                "unknown log mode '{other}' (expected auto, file, stdout or stderr)"
            )),
        }
    }
}

/// Application configuration shared by the binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Labelled training CSV
    pub dataset_path: PathBuf,
    /// Directory holding the model artifacts
    pub artifact_dir: PathBuf,
    pub seed: u64,
    pub test_fraction: f64,
    pub unknown_category: UnknownCategoryPolicy,
    pub min_test_accuracy: Option<f64>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("input/Thyroid_Diff.csv"),
            artifact_dir: PathBuf::from("."),
            seed: 0,
            test_fraction: 0.3,
            unknown_category: UnknownCategoryPolicy::Reject,
            min_test_accuracy: None,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("thyrocast.log"),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    /// Returns `Config` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ThyrocastError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// # Errors
    /// Returns `Config` if a value cannot be parsed or is out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ThyrocastError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(DATASET_PATH_ENV) {
            config.dataset_path = PathBuf::from(v);
        }
        if let Some(v) = get(ARTIFACT_DIR_ENV) {
            config.artifact_dir = PathBuf::from(v);
        }
        if let Some(v) = get(SPLIT_SEED_ENV) {
            config.seed = parse(SPLIT_SEED_ENV, &v)?;
        }
        if let Some(v) = get(TEST_FRACTION_ENV) {
            config.test_fraction = parse(TEST_FRACTION_ENV, &v)?;
        }
        if let Some(v) = get(UNKNOWN_CATEGORY_ENV) {
            config.unknown_category = v
                .parse()
                .map_err(|e| ThyrocastError::Config(format!("{UNKNOWN_CATEGORY_ENV}: {e}")))?;
        }
        if let Some(v) = get(MIN_TEST_ACCURACY_ENV) {
            config.min_test_accuracy = Some(parse(MIN_TEST_ACCURACY_ENV, &v)?);
        }
        if let Some(v) = get(LOG_MODE_ENV) {
            config.log_mode = v
                .parse()
                .map_err(|e| ThyrocastError::Config(format!("{LOG_MODE_ENV}: {e}")))?;
        }
        if let Some(v) = get(LOG_FILE_ENV) {
            config.log_file = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `Config` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ThyrocastError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ThyrocastError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if let Some(min) = self.min_test_accuracy {
            if !(0.0..=1.0).contains(&min) {
                return Err(ThyrocastError::Config(format!(
                    "min_test_accuracy must be in [0, 1], got {min}"
                )));
            }
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ThyrocastError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ThyrocastError::Config(format!("{key}='{value}': {e}")))
}

/// Install the global tracing subscriber.
///
/// Writing logs to the terminal would corrupt the TUI's alternate screen, so
/// in `Auto` mode an interactive stdout sends logs to `log_file` instead.
/// Keep the returned guard alive for the life of the process.
///
/// # Errors
/// Returns error if the log file cannot be opened.
pub fn init_logging(config: &AppConfig) -> std::io::Result<WorkerGuard> {
    let interactive = std::io::stdout().is_terminal();

    let (writer, guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else if config.log_mode == LogMode::Stderr {
        tracing_appender::non_blocking(std::io::stderr())
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    Ok(guard)
}
