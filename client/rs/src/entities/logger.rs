use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
  /// The logging verbosity. Default: `info`.
  #[serde(default)]
  pub level: LogLevel,

  /// How to write logs to stdio. Default: `standard`.
  #[serde(default)]
  pub stdio: StdioLogMode,

  /// Use pretty (multi line) stdio logging.
  #[serde(default)]
  pub pretty: bool,

  /// Include the log source location in stdio logs.
  #[serde(default)]
  pub location: bool,

  /// Color stdio logs.
  #[serde(default = "default_ansi")]
  pub ansi: bool,

  /// Export traces over OTLP when non empty.
  #[serde(default)]
  pub otlp_endpoint: String,

  #[serde(default = "default_service_name")]
  pub opentelemetry_service_name: String,

  #[serde(default = "default_scope_name")]
  pub opentelemetry_scope_name: String,
}

fn default_ansi() -> bool {
  true
}

fn default_service_name() -> String {
  String::from("Caravan")
}

fn default_scope_name() -> String {
  String::from("caravan")
}

impl Default for LogConfig {
  fn default() -> LogConfig {
    LogConfig {
      level: Default::default(),
      stdio: Default::default(),
      pretty: false,
      location: false,
      ansi: default_ansi(),
      otlp_endpoint: String::new(),
      opentelemetry_service_name: default_service_name(),
      opentelemetry_scope_name: default_scope_name(),
    }
  }
}

#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Error,
  Warn,
  #[default]
  Info,
  Debug,
  Trace,
}

impl From<LogLevel> for tracing::Level {
  fn from(value: LogLevel) -> tracing::Level {
    match value {
      LogLevel::Error => tracing::Level::ERROR,
      LogLevel::Warn => tracing::Level::WARN,
      LogLevel::Info => tracing::Level::INFO,
      LogLevel::Debug => tracing::Level::DEBUG,
      LogLevel::Trace => tracing::Level::TRACE,
    }
  }
}

#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StdioLogMode {
  #[default]
  Standard,
  Json,
  None,
}
