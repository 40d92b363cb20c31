use clap::{Args, Subcommand};

#[derive(Debug, Clone, Args)]
pub struct JobsArgs {
  #[command(subcommand)]
  pub command: JobsCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum JobsCommand {
  /// List jobs in the namespace.
  List,
  /// Print a job spec as JSON.
  Inspect(JobSelector),
  /// Register a job from a form file.
  Deploy(Deploy),
  /// Stop (deregister) a job.
  Stop(Stop),
  /// Restart a job by re-registering its current spec.
  Restart(JobSelector),
}

#[derive(Debug, Clone, Args)]
pub struct JobSelector {
  /// The job id.
  pub job: String,
}

#[derive(Debug, Clone, Args)]
pub struct Deploy {
  /// Path to a JSON file holding the job form
  /// (the same shape the web console edits).
  pub file: String,

  /// Update an existing job instead of creating a new one,
  /// preserving its metadata, constraints and priority.
  #[arg(long, short = 'u', default_value_t = false)]
  pub update: bool,
}

#[derive(Debug, Clone, Args)]
pub struct Stop {
  /// The job id.
  pub job: String,

  /// Remove the job from the cluster entirely
  /// instead of marking it stopped.
  #[arg(long, default_value_t = false)]
  pub purge: bool,
}

#[derive(Debug, Clone, Args)]
pub struct AllocsArgs {
  /// The job id.
  pub job: String,
}
