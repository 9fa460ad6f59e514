//! Runner configuration
//!
//! Values come from defaults, then `CASEBOOK_*` environment variables, then
//! command-line flags applied by the binary.

use std::path::PathBuf;

/// Bundled report template shipped with the crate
pub const DEFAULT_TEMPLATE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/report.html");

pub const ENV_REPORT_NAME: &str = "CASEBOOK_REPORT_NAME";
pub const ENV_REPORT_FILE: &str = "CASEBOOK_REPORT_FILE";
pub const ENV_REPORT_DIR: &str = "CASEBOOK_REPORT_DIR";
pub const ENV_LOG: &str = "CASEBOOK_LOG";
pub const ENV_LOG_DIR: &str = "CASEBOOK_LOG_DIR";
pub const ENV_TEMPLATE: &str = "CASEBOOK_TEMPLATE";
pub const ENV_KNOWN_EXCEPTIONS: &str = "CASEBOOK_KNOWN_EXCEPTIONS";

/// Configuration for one report run
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Run label stored as the summary name
    pub report_name: Option<String>,
    /// Report filename; `.html` is appended when missing
    pub filename: Option<String>,
    /// Directory the report is written to
    pub report_dir: PathBuf,
    /// Append log output to a dated file under `log_dir`
    pub enable_logging: bool,
    pub log_dir: PathBuf,
    pub template_path: PathBuf,
    /// YAML or JSON mapping of failure type to reason
    pub known_exceptions: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            report_name: None,
            filename: None,
            report_dir: PathBuf::from("."),
            enable_logging: false,
            log_dir: PathBuf::from("."),
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            known_exceptions: None,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_REPORT_NAME) {
            config.report_name = Some(name);
        }

        if let Some(file) = lookup(ENV_REPORT_FILE) {
            config.filename = Some(file);
        }

        if let Some(dir) = lookup(ENV_REPORT_DIR) {
            config.report_dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup(ENV_LOG) {
            config.enable_logging = parse_flag(&val);
        }

        if let Some(dir) = lookup(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup(ENV_TEMPLATE) {
            config.template_path = PathBuf::from(path);
        }

        if let Some(path) = lookup(ENV_KNOWN_EXCEPTIONS) {
            config.known_exceptions = Some(PathBuf::from(path));
        }

        config
    }

    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    pub fn with_known_exceptions(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_exceptions = Some(path.into());
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
