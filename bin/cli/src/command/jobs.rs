use anyhow::Context;
use caravan_client::{
  NomadClient,
  convert::{apply_update, build_spec},
  entities::{
    config::{
      ConsoleConfig,
      cli::args::jobs::{
        AllocsArgs, Deploy, JobSelector, JobsCommand, Stop,
      },
    },
    form::FormJob,
    job::JobRegisterResponse,
  },
};
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use validations::{
  is_valid_job_name, validate_image_name, validate_port_value,
  validate_registry_auth,
};

pub async fn handle(
  command: &JobsCommand,
  client: &NomadClient,
  config: &ConsoleConfig,
) -> anyhow::Result<()> {
  match command {
    JobsCommand::List => list(client, &config.namespace).await,
    JobsCommand::Inspect(selector) => {
      inspect(selector, client, &config.namespace).await
    }
    JobsCommand::Deploy(deploy) => {
      deploy_job(deploy, client, &config.namespace).await
    }
    JobsCommand::Stop(stop) => {
      stop_job(stop, client, &config.namespace).await
    }
    JobsCommand::Restart(selector) => {
      restart_job(selector, client, &config.namespace).await
    }
  }
}

async fn list(
  client: &NomadClient,
  namespace: &str,
) -> anyhow::Result<()> {
  let jobs = client.list_jobs(namespace).await?;

  if jobs.is_empty() {
    println!("No jobs in namespace {namespace}");
    return Ok(());
  }

  let mut table = Table::new();
  table.set_header([
    "ID", "STATUS", "TYPE", "PRIORITY", "RUNNING", "SUBMITTED",
  ]);
  for job in jobs {
    let running = job
      .summary
      .as_ref()
      .map(|summary| {
        summary
          .summary
          .values()
          .map(|group| group.running)
          .sum::<u64>()
          .to_string()
      })
      .unwrap_or_default();
    table.add_row([
      Cell::new(&job.id),
      status_cell(&job.status),
      Cell::new(&job.job_type),
      Cell::new(job.priority),
      Cell::new(running),
      Cell::new(format_nanos(job.submit_time)),
    ]);
  }
  println!("{table}");

  Ok(())
}

async fn inspect(
  JobSelector { job }: &JobSelector,
  client: &NomadClient,
  namespace: &str,
) -> anyhow::Result<()> {
  let job = client.get_job(job, namespace).await?;
  let json = serde_json::to_string_pretty(&job)
    .context("Failed to serialize job spec")?;
  println!("{json}");
  Ok(())
}

async fn deploy_job(
  Deploy { file, update }: &Deploy,
  client: &NomadClient,
  namespace: &str,
) -> anyhow::Result<()> {
  let contents = std::fs::read_to_string(file)
    .with_context(|| format!("Failed to read {file}"))?;
  let mut form: FormJob = serde_json::from_str(&contents)
    .with_context(|| {
      format!("Failed to parse {file} as a job form")
    })?;
  if form.namespace.is_empty() {
    form.namespace = namespace.to_string();
  }

  validate_form(&form)?;

  let response = if *update {
    let original = client
      .get_job(&form.name, &form.namespace)
      .await
      .context("--update requires an existing job")?;
    let spec = apply_update(&original, &form);
    client.update_job(&spec).await?
  } else {
    let spec = build_spec(&form);
    client.create_job(&spec).await?
  };

  print_register_response(&form.name, &response);

  Ok(())
}

async fn stop_job(
  Stop { job, purge }: &Stop,
  client: &NomadClient,
  namespace: &str,
) -> anyhow::Result<()> {
  let response =
    client.stop_job(job, namespace, *purge).await?;
  println!(
    "{} {job} | eval {}",
    "Stopped".red(),
    response.eval_id
  );
  Ok(())
}

async fn restart_job(
  JobSelector { job }: &JobSelector,
  client: &NomadClient,
  namespace: &str,
) -> anyhow::Result<()> {
  let response = client.restart_job(job, namespace).await?;
  println!(
    "{} {job} | eval {}",
    "Restarted".green(),
    response.eval_id
  );
  Ok(())
}

pub async fn handle_allocs(
  AllocsArgs { job }: &AllocsArgs,
  client: &NomadClient,
  config: &ConsoleConfig,
) -> anyhow::Result<()> {
  let allocations = client
    .list_job_allocations(job, &config.namespace)
    .await?;

  if allocations.is_empty() {
    println!("No allocations for job {job}");
    return Ok(());
  }

  let mut table = Table::new();
  table.set_header([
    "ID", "GROUP", "STATUS", "NODE", "TASKS", "CREATED",
  ]);
  for allocation in allocations {
    let tasks = allocation
      .task_states
      .iter()
      .map(|(task, state)| format!("{task}:{}", state.state))
      .collect::<Vec<_>>()
      .join(" ");
    table.add_row([
      Cell::new(short_id(&allocation.id)),
      Cell::new(&allocation.task_group),
      status_cell(&allocation.client_status),
      Cell::new(&allocation.node_name),
      Cell::new(tasks),
      Cell::new(format_nanos(allocation.create_time)),
    ]);
  }
  println!("{table}");

  Ok(())
}

pub async fn handle_namespaces(
  client: &NomadClient,
) -> anyhow::Result<()> {
  let namespaces = client.list_namespaces().await?;

  let mut table = Table::new();
  table.set_header(["NAME", "DESCRIPTION"]);
  for namespace in namespaces {
    table.add_row([namespace.name, namespace.description]);
  }
  println!("{table}");

  Ok(())
}

/// The same checks the web form runs before submission.
fn validate_form(form: &FormJob) -> anyhow::Result<()> {
  if !is_valid_job_name(&form.name) {
    return Err(anyhow::anyhow!(
      "Invalid job name '{}'. Must start with a letter or digit, followed by letters, digits, dots, underscores, or hyphens",
      form.name
    ));
  }
  for group in &form.task_groups {
    validate_image_name(&group.image).with_context(|| {
      format!("Invalid image in group {}", group.name)
    })?;
    let auth = group.registry_auth.as_ref();
    validate_registry_auth(
      group.use_private_registry,
      auth.map(|auth| auth.username.as_str()),
      auth.map(|auth| auth.password.as_str()),
    )
    .with_context(|| {
      format!("Invalid registry auth in group {}", group.name)
    })?;
    for port in &group.ports {
      if port.is_static {
        validate_port_value(port.host_value).with_context(
          || format!("Invalid port in group {}", group.name),
        )?;
      }
    }
  }
  Ok(())
}

fn print_register_response(
  job: &str,
  response: &JobRegisterResponse,
) {
  if !response.warnings.is_empty() {
    warn!("{}", response.warnings);
  }
  println!(
    "{} {job} | eval {}",
    "Deployed".green(),
    response.eval_id
  );
}

fn status_cell(status: &str) -> Cell {
  let color = match status {
    "running" => Color::Green,
    "pending" => Color::Yellow,
    "dead" | "failed" | "lost" => Color::Red,
    _ => Color::Reset,
  };
  Cell::new(status).fg(color)
}

fn short_id(id: &str) -> &str {
  id.split('-').next().unwrap_or(id)
}

fn format_nanos(nanos: Option<i64>) -> String {
  let Some(nanos) = nanos else {
    return String::new();
  };
  chrono::DateTime::from_timestamp_nanos(nanos)
    .format("%Y-%m-%d %H:%M:%S")
    .to_string()
}
