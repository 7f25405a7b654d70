//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a default so a partial (or absent) file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::TextStyle;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Work, log and output paths.
    #[serde(default)]
    pub paths: PathSettings,

    /// Input download behaviour.
    #[serde(default)]
    pub fetch: FetchSettings,

    /// External engine locations and limits.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Caption fonts and colours.
    #[serde(default)]
    pub overlay: OverlaySettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Identifies one section of the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Fetch,
    Tools,
    Overlay,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Fetch,
        ConfigSection::Tools,
        ConfigSection::Overlay,
        ConfigSection::Logging,
    ];

    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Fetch => "fetch",
            ConfigSection::Tools => "tools",
            ConfigSection::Overlay => "overlay",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Work, log and output locations",
            ConfigSection::Fetch => "Input download retries",
            ConfigSection::Tools => "ffmpeg / ffprobe",
            ConfigSection::Overlay => "Caption fonts and colours",
            ConfigSection::Logging => "Logging configuration",
        }
    }

    /// Look up a section by table name.
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.table_name() == name)
    }
}

/// Path configuration for work files, logs and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for per-job work directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Default output file when none is given on the command line.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_output_file() -> String {
    "final.mp4".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            output_file: default_output_file(),
        }
    }
}

/// Download retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Attempts per input before the job fails.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Per-request timeout for HTTP downloads, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Download the four inputs concurrently.
    #[serde(default)]
    pub parallel: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    2
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl FetchSettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            parallel: false,
        }
    }
}

/// External engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// ffmpeg executable (name on PATH or absolute path).
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    /// ffprobe executable (name on PATH or absolute path).
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// Encode timeout in seconds; 0 waits forever.
    #[serde(default = "default_encode_timeout_secs")]
    pub encode_timeout_secs: u64,

    /// Per-invocation ffprobe timeout in seconds; 0 waits forever.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Inspect the finished output with ffprobe for the diagnostic trail.
    #[serde(default = "default_true")]
    pub inspect_output: bool,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_encode_timeout_secs() -> u64 {
    600
}

fn default_probe_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl ToolSettings {
    /// Encode timeout, `None` when disabled.
    pub fn encode_timeout(&self) -> Option<Duration> {
        (self.encode_timeout_secs > 0).then(|| Duration::from_secs(self.encode_timeout_secs))
    }

    /// ffprobe timeout, `None` when disabled.
    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            encode_timeout_secs: default_encode_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            inspect_output: true,
        }
    }
}

/// Caption styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(default = "TextStyle::hook_default")]
    pub hook: TextStyle,

    #[serde(default = "TextStyle::title_default")]
    pub title: TextStyle,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            hook: TextStyle::hook_default(),
            title: TextStyle::title_default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for job logs; `RUST_LOG` overrides it for tracing.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep engine output in the tail buffer only.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of engine output lines kept for error reports.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Show the ffmpeg arguments one per line.
    #[serde(default)]
    pub show_command_pretty: bool,

    /// Show the ffmpeg arguments as a JSON array.
    #[serde(default)]
    pub show_command_json: bool,

    /// Log the pipeline plan as JSON before encoding.
    #[serde(default)]
    pub show_plan_json: bool,
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            show_command_pretty: false,
            show_command_json: false,
            show_plan_json: false,
        }
    }
}
