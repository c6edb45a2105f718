use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};

/// Name of the configuration file picked up from the current directory
pub const DEFAULT_CONFIG_FILE: &str = "greeter.yaml";

/// Upper bound on `driver.iterations`, every line is kept for the run report
pub const MAX_ITERATIONS: u32 = 100_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub sample: SampleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the greeting loop
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriverConfig {
    /// Number of users greeted, counting up from zero
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Prepended to the iteration index to build each user name
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

/// Shape of the random sample drawn before the loop
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SampleConfig {
    #[serde(default = "default_sample_len")]
    pub len: usize,

    /// Inclusive lower bound
    #[serde(default = "default_sample_min")]
    pub min: u32,

    /// Inclusive upper bound
    #[serde(default = "default_sample_max")]
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub verbosity: VerbosityConfig,

    #[serde(default)]
    pub file: RotatingFileConfig,
}

/// Console stream that receives log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

/// Log verbosity threshold configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerbosityConfig {
    /// Threshold for INFO level logging
    #[serde(default = "default_info_threshold")]
    pub info_threshold: usize,

    /// Threshold for DEBUG level logging
    #[serde(default = "default_debug_threshold")]
    pub debug_threshold: usize,

    /// Threshold for TRACE level logging
    #[serde(default = "default_trace_threshold")]
    pub trace_threshold: usize,
}

/// Settings for the optional per-run log file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RotatingFileConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_directory")]
    pub log_directory: String,

    /// Base name, a run timestamp is inserted before the extension
    #[serde(default = "default_log_filename")]
    pub filename: String,

    /// Run logs kept in the directory, oldest are removed first
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Writes past this size are dropped for the rest of the run
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            name_prefix: default_name_prefix(),
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            len: default_sample_len(),
            min: default_sample_min(),
            max: default_sample_max(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: LogOutput::default(),
            verbosity: VerbosityConfig::default(),
            file: RotatingFileConfig::default(),
        }
    }
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self {
            info_threshold: default_info_threshold(),
            debug_threshold: default_debug_threshold(),
            trace_threshold: default_trace_threshold(),
        }
    }
}

impl Default for RotatingFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_directory: default_log_directory(),
            filename: default_log_filename(),
            max_files: default_max_files(),
            max_size_mb: default_max_size_mb(),
        }
    }
}

// Default functions for serde
fn default_iterations() -> u32 { 3 }
fn default_name_prefix() -> String { "User".to_string() }
fn default_sample_len() -> usize { 5 }
fn default_sample_min() -> u32 { 1 }
fn default_sample_max() -> u32 { 100 }
fn default_log_level() -> String { "info".to_string() }
fn default_info_threshold() -> usize { 50 }
fn default_debug_threshold() -> usize { 100 }
fn default_trace_threshold() -> usize { 200 }
fn default_log_directory() -> String { "greeter_logs".to_string() }
fn default_log_filename() -> String { "greeter.log".to_string() }
fn default_max_files() -> usize { 10 }
fn default_max_size_mb() -> u64 { 5 }

impl Config {
    /// Load configuration from greeter.yaml, or use defaults if not found
    pub fn load() -> Result<Self> {
        let config_path = Path::new(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Self::load_from(config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty or `~` document is null, not an empty map
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        if value.is_null() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.driver.iterations > MAX_ITERATIONS {
            bail!(
                "driver.iterations ({}) is greater than the maximum of {}",
                self.driver.iterations,
                MAX_ITERATIONS
            );
        }
        self.sample.validate()?;
        if self.logging.file.enabled && self.logging.file.max_files == 0 {
            bail!("logging.file.max_files must be at least 1");
        }
        Ok(())
    }
}

impl SampleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.len == 0 {
            bail!("sample.len must be at least 1");
        }
        if self.min > self.max {
            bail!("sample.min ({}) is greater than sample.max ({})", self.min, self.max);
        }
        Ok(())
    }
}
