use anyhow::Context;
use caravan_client::entities::config::{
  ConsoleConfig, Env, cli::CliArgs,
};

/// Defaults, then `CARAVAN_*` environment, then CLI flags.
pub fn load(args: &CliArgs) -> anyhow::Result<ConsoleConfig> {
  let env = envy::from_env::<Env>()
    .context("Failed to parse CARAVAN_* environment")?;

  let mut config = ConsoleConfig::default();
  env.merge_onto(&mut config);

  if let Some(address) = &args.address {
    config.cluster_address = address.clone();
  }
  if let Some(token) = &args.token {
    config.cluster_token = token.clone();
  }
  if let Some(namespace) = &args.namespace {
    config.namespace = namespace.clone();
  }
  if let Some(level) = args.log_level {
    config.logging.level = level;
  }

  Ok(config)
}
