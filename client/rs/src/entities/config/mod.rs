//! Connection configuration for the console core.
//!
//! The browser UI collects the cluster address and access token at
//! login; everything else in this repo receives them as an explicit
//! [ConsoleConfig] rather than through ambient global state. The
//! CLI loads the same shape from `CARAVAN_` environment variables
//! (see [Env]), optionally through a `.env` file.

use serde::Deserialize;

use crate::entities::logger::{LogConfig, LogLevel};

pub mod cli;

/// Fallback cluster address when none is configured, the standard
/// local agent port.
pub const DEFAULT_CLUSTER_ADDRESS: &str = "http://127.0.0.1:4646";

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
  /// The cluster API base address.
  /// Default: `http://127.0.0.1:4646`.
  #[serde(default = "default_cluster_address")]
  pub cluster_address: String,

  /// The cluster ACL token attached to every request.
  /// Empty disables the token header.
  #[serde(default)]
  pub cluster_token: String,

  /// Namespace used when a call does not specify one.
  /// Default: `default`.
  #[serde(default = "default_namespace")]
  pub namespace: String,

  /// Logging configuration.
  #[serde(default)]
  pub logging: LogConfig,
}

fn default_cluster_address() -> String {
  String::from(DEFAULT_CLUSTER_ADDRESS)
}

fn default_namespace() -> String {
  String::from("default")
}

impl Default for ConsoleConfig {
  fn default() -> ConsoleConfig {
    ConsoleConfig {
      cluster_address: default_cluster_address(),
      cluster_token: String::new(),
      namespace: default_namespace(),
      logging: Default::default(),
    }
  }
}

/// Environment overrides for [ConsoleConfig]. Parse with
/// `envy::from_env::<Env>()`.
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
  /// Override `cluster_address`
  pub caravan_address: Option<String>,
  /// Override `cluster_token`
  pub caravan_token: Option<String>,
  /// Override `namespace`
  pub caravan_namespace: Option<String>,
  /// Override `logging.level`
  pub caravan_log_level: Option<LogLevel>,
}

impl Env {
  /// Folds the environment overrides onto a base config.
  pub fn merge_onto(self, config: &mut ConsoleConfig) {
    let Env {
      caravan_address,
      caravan_token,
      caravan_namespace,
      caravan_log_level,
    } = self;
    if let Some(address) = caravan_address {
      config.cluster_address = address;
    }
    if let Some(token) = caravan_token {
      config.cluster_token = token;
    }
    if let Some(namespace) = caravan_namespace {
      config.namespace = namespace;
    }
    if let Some(level) = caravan_log_level {
      config.logging.level = level;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn env_overrides_only_what_it_sets() {
    let mut config = ConsoleConfig::default();
    Env {
      caravan_address: Some("http://10.0.0.5:4646".into()),
      caravan_token: None,
      caravan_namespace: Some("apps".into()),
      caravan_log_level: Some(LogLevel::Debug),
    }
    .merge_onto(&mut config);

    assert_eq!(config.cluster_address, "http://10.0.0.5:4646");
    assert_eq!(config.cluster_token, "");
    assert_eq!(config.namespace, "apps");
    assert_eq!(config.logging.level, LogLevel::Debug);
  }

  #[test]
  fn defaults_point_at_the_local_agent() {
    let config = ConsoleConfig::default();
    assert_eq!(config.cluster_address, DEFAULT_CLUSTER_ADDRESS);
    assert_eq!(config.namespace, "default");
  }
}
