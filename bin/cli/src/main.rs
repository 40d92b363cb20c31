use caravan_client::{
  NomadClient,
  entities::config::cli::{CliArgs, Command},
};
use clap::Parser;
use colored::Colorize;

#[macro_use]
extern crate tracing;

mod command;
mod config;

async fn app() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let args = CliArgs::parse();
  let config = config::load(&args)?;
  logger::init(&config.logging)?;

  debug!(
    "Using cluster at {} (namespace {})",
    config.cluster_address, config.namespace
  );

  let client = NomadClient::from_config(&config);

  match &args.command {
    Command::Jobs(jobs) => {
      command::jobs::handle(&jobs.command, &client, &config).await
    }
    Command::Allocs(allocs) => {
      command::jobs::handle_allocs(allocs, &client, &config).await
    }
    Command::Namespaces => {
      command::jobs::handle_namespaces(&client).await
    }
    Command::Logs(logs) => {
      command::logs::handle(logs, client).await
    }
  }
}

#[tokio::main]
async fn main() {
  let code = match app().await {
    Ok(()) => 0,
    Err(e) => {
      eprintln!("{}: {e:#}", "error".red());
      1
    }
  };
  std::process::exit(code);
}
