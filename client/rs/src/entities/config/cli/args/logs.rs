use clap::Args;

use crate::entities::logs::LogKind;

#[derive(Debug, Clone, Args)]
pub struct LogsArgs {
  /// The allocation id (full or short form the cluster accepts).
  pub allocation: String,

  /// The task within the allocation.
  pub task: String,

  /// Which output stream to read.
  #[arg(long, short = 'k', value_enum, default_value_t = LogKind::Stdout)]
  pub kind: LogKind,

  /// Keep the stream open and print new lines as they arrive.
  /// Stop with ctrl-c.
  #[arg(long, short = 'f', default_value_t = false)]
  pub follow: bool,
}
