use clap::{Parser, Subcommand};

use crate::entities::logger::LogLevel;

pub mod args;

/// Operate a Nomad cluster from the terminal,
/// using the same core the Caravan web console runs on.
#[derive(Debug, Clone, Parser)]
#[command(name = "cvn", version, about)]
pub struct CliArgs {
  #[command(subcommand)]
  pub command: Command,

  /// The cluster API address.
  /// Falls back to CARAVAN_ADDRESS, then the local agent.
  #[arg(long, short = 'a', global = true)]
  pub address: Option<String>,

  /// The cluster ACL token.
  /// Falls back to CARAVAN_TOKEN.
  #[arg(long, global = true)]
  pub token: Option<String>,

  /// The namespace to operate in.
  /// Falls back to CARAVAN_NAMESPACE, then `default`.
  #[arg(long, short = 'n', global = true)]
  pub namespace: Option<String>,

  /// Stdio log level.
  #[arg(long, global = true, value_enum)]
  pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
  /// List, inspect and manage jobs.
  Jobs(args::jobs::JobsArgs),
  /// List a job's allocations.
  Allocs(args::jobs::AllocsArgs),
  /// List namespaces.
  Namespaces,
  /// Read or follow task logs.
  Logs(args::logs::LogsArgs),
}
