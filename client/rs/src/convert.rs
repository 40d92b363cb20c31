//! Bidirectional mapping between the flat job form and the
//! cluster's nested job specification.
//!
//! [build_spec] and [to_form_data] are pure and never validate;
//! input checking belongs to `validations` before submission, and
//! the cluster rejects anything the form let through. The form
//! models exactly one task per task group on both paths.

use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::entities::{
  form::{
    CheckKind, EnvVar, FormJob, FormPort, FormResources,
    FormTaskGroup, HealthCheckForm, RegistryAuth,
  },
  job::{
    CheckRestart, JOB_TYPE_SERVICE, Job, NetworkResource, Port,
    Resources, Service, ServiceCheck, Task, TaskGroup,
  },
  nanos_to_secs, secs_to_nanos,
};

/// Service port label when the group declares a health check but
/// no ports.
pub const FALLBACK_PORT_LABEL: &str = "http";

/// Synthesized port for wire groups that declare networking but
/// no ports.
pub const DEFAULT_PORT: u64 = 8080;

/// Fixed restart limit on generated health checks.
const CHECK_RESTART_LIMIT: u64 = 3;

/// Builds the wire job spec from the form. `ID` and `Name` both
/// take the form's name; `Type` is always `service`.
pub fn build_spec(form: &FormJob) -> Job {
  Job {
    id: form.name.clone(),
    name: form.name.clone(),
    namespace: form.namespace.clone(),
    job_type: JOB_TYPE_SERVICE.to_string(),
    datacenters: form.datacenters.clone(),
    task_groups: form
      .task_groups
      .iter()
      .map(build_task_group)
      .collect(),
    meta: None,
    constraints: None,
    priority: None,
    status: None,
  }
}

fn build_task_group(group: &FormTaskGroup) -> TaskGroup {
  TaskGroup {
    name: group.name.clone(),
    count: group.count as i64,
    tasks: vec![build_task(group)],
    networks: build_networks(group),
    services: build_services(group),
    meta: None,
    constraints: None,
  }
}

fn build_task(group: &FormTaskGroup) -> Task {
  // Blank keys are dropped, a later duplicate overwrites an
  // earlier one.
  let mut env = IndexMap::new();
  for EnvVar { key, value } in &group.env_vars {
    if key.trim().is_empty() {
      continue;
    }
    env.insert(key.clone(), value.clone());
  }

  let mut config = IndexMap::<String, Value>::new();
  config.insert("image".to_string(), json!(group.image));
  if group.use_private_registry {
    let RegistryAuth { username, password } =
      group.registry_auth.clone().unwrap_or_default();
    config.insert(
      "auth".to_string(),
      json!({ "username": username, "password": password }),
    );
  }

  Task {
    name: group.name.clone(),
    driver: group.driver.clone(),
    config,
    env,
    resources: Some(Resources {
      cpu: Some(group.resources.cpu_mhz),
      memory_mb: Some(group.resources.memory_mb),
      disk_mb: Some(group.resources.disk_mb),
    }),
  }
}

fn build_networks(
  group: &FormTaskGroup,
) -> Option<Vec<NetworkResource>> {
  if !group.enable_network {
    return None;
  }
  let mut dynamic_ports = Vec::new();
  let mut reserved_ports = Vec::new();
  for port in &group.ports {
    if port.label.is_empty() {
      continue;
    }
    if port.is_static {
      reserved_ports.push(Port {
        label: port.label.clone(),
        value: Some(port.host_value),
        to: port.container_port,
      });
    } else {
      dynamic_ports.push(Port {
        label: port.label.clone(),
        value: None,
        to: port.container_port,
      });
    }
  }
  // Enabled networking with nothing to declare is still omitted.
  if dynamic_ports.is_empty() && reserved_ports.is_empty() {
    return None;
  }
  Some(vec![NetworkResource {
    mode: group.network_mode.as_ref().to_string(),
    dynamic_ports,
    reserved_ports,
  }])
}

fn build_services(
  group: &FormTaskGroup,
) -> Option<Vec<Service>> {
  if !group.enable_health_check {
    return None;
  }
  let check = group.health_check.clone().unwrap_or_default();
  let port_label = group
    .ports
    .first()
    .map(|port| port.label.clone())
    .unwrap_or_else(|| FALLBACK_PORT_LABEL.to_string());
  Some(vec![Service {
    name: group.name.clone(),
    port_label,
    checks: vec![ServiceCheck {
      name: String::from("health"),
      check_type: check.kind.as_ref().to_string(),
      path: match check.kind {
        CheckKind::Http => {
          Some(check.path.clone().unwrap_or_default())
        }
        _ => None,
      },
      command: match check.kind {
        CheckKind::Script => {
          Some(check.command.clone().unwrap_or_default())
        }
        _ => None,
      },
      interval: Some(secs_to_nanos(check.interval_secs)),
      timeout: Some(secs_to_nanos(check.timeout_secs)),
      check_restart: Some(CheckRestart {
        limit: CHECK_RESTART_LIMIT,
        grace: secs_to_nanos(check.initial_delay_secs),
        ignore_warnings: false,
      }),
      failures_before_critical: None,
      success_before_passing: None,
    }],
  }])
}

/// Rebuilds the form from a wire job, the edit-flow inverse of
/// [build_spec]. Sections absent on the wire come back as their
/// disabled form defaults.
pub fn to_form_data(job: &Job) -> FormJob {
  FormJob {
    name: job.name.clone(),
    namespace: job.namespace.clone(),
    datacenters: job.datacenters.clone(),
    task_groups: job
      .task_groups
      .iter()
      .map(read_task_group)
      .collect(),
  }
}

fn read_task_group(group: &TaskGroup) -> FormTaskGroup {
  // Only the first task is representable in the form.
  let task = group.tasks.first().cloned().unwrap_or_default();

  // Sorted for deterministic display, not a wire requirement.
  let mut env_vars = task
    .env
    .iter()
    .map(|(key, value)| EnvVar {
      key: key.clone(),
      value: value.clone(),
    })
    .collect::<Vec<_>>();
  env_vars.sort_by(|a, b| a.key.cmp(&b.key));

  let image = config_str(&task.config, "image");
  let (use_private_registry, registry_auth) =
    read_registry_auth(&task.config);

  let network =
    group.networks.as_ref().and_then(|n| n.first());
  let mut ports = Vec::new();
  if let Some(network) = network {
    for port in &network.dynamic_ports {
      ports.push(FormPort {
        label: port.label.clone(),
        host_value: 0,
        container_port: port.to,
        is_static: false,
      });
    }
    for port in &network.reserved_ports {
      ports.push(FormPort {
        label: port.label.clone(),
        host_value: port.value.unwrap_or_default(),
        container_port: port.to,
        is_static: true,
      });
    }
    if ports.is_empty() {
      ports.push(FormPort {
        label: FALLBACK_PORT_LABEL.to_string(),
        host_value: DEFAULT_PORT,
        container_port: DEFAULT_PORT,
        is_static: false,
      });
    }
  }

  let check = group
    .services
    .as_ref()
    .and_then(|services| services.first())
    .and_then(|service| service.checks.first());

  let resources = task.resources.clone().unwrap_or_default();

  FormTaskGroup {
    name: group.name.clone(),
    count: group.count.max(0) as u64,
    image,
    driver: task.driver.clone(),
    resources: FormResources {
      cpu_mhz: resources.cpu.unwrap_or_default(),
      memory_mb: resources.memory_mb.unwrap_or_default(),
      disk_mb: resources.disk_mb.unwrap_or_default(),
    },
    env_vars,
    use_private_registry,
    registry_auth,
    enable_network: network.is_some(),
    network_mode: network
      .map(|network| network.mode.parse().unwrap_or_default())
      .unwrap_or_default(),
    ports,
    enable_health_check: check.is_some(),
    health_check: check.map(read_health_check),
  }
}

fn read_health_check(check: &ServiceCheck) -> HealthCheckForm {
  HealthCheckForm {
    kind: check.check_type.parse().unwrap_or_default(),
    path: check.path.clone(),
    command: check.command.clone(),
    interval_secs: check
      .interval
      .map(nanos_to_secs)
      .unwrap_or(30),
    timeout_secs: check.timeout.map(nanos_to_secs).unwrap_or(5),
    initial_delay_secs: check
      .check_restart
      .as_ref()
      .map(|restart| nanos_to_secs(restart.grace))
      .unwrap_or(5),
    failure_threshold: check
      .failures_before_critical
      .unwrap_or(3),
    success_threshold: check.success_before_passing.unwrap_or(2),
  }
}

/// Derived, never stored: the registry toggle is on iff both
/// credentials are present on the task config.
fn read_registry_auth(
  config: &IndexMap<String, Value>,
) -> (bool, Option<RegistryAuth>) {
  let Some(auth) = config.get("auth") else {
    return (false, None);
  };
  let field = |key: &str| {
    auth
      .get(key)
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string()
  };
  let auth = RegistryAuth {
    username: field("username"),
    password: field("password"),
  };
  if auth.username.is_empty() || auth.password.is_empty() {
    return (false, None);
  }
  (true, Some(auth))
}

fn config_str(
  config: &IndexMap<String, Value>,
  key: &str,
) -> String {
  config
    .get(key)
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}

/// Rebuilds the spec from the form while preserving what the form
/// cannot edit: the original identity (`ID`, `Name`), top level
/// `Meta` / `Constraints` / `Priority`, and per-group
/// `Meta` / `Constraints` for groups whose name is unchanged.
/// Renamed or newly added groups inherit nothing.
pub fn apply_update(original: &Job, form: &FormJob) -> Job {
  let mut job = build_spec(form);
  job.id = original.id.clone();
  job.name = original.name.clone();
  if original.meta.is_some() {
    job.meta = original.meta.clone();
  }
  if original.constraints.is_some() {
    job.constraints = original.constraints.clone();
  }
  if original.priority.is_some() {
    job.priority = original.priority;
  }
  for group in &mut job.task_groups {
    let previous = original
      .task_groups
      .iter()
      .find(|previous| previous.name == group.name);
    if let Some(previous) = previous {
      group.meta = previous.meta.clone();
      group.constraints = previous.constraints.clone();
    }
  }
  job
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::form::{FormUpdate, NetworkMode};
  use crate::entities::job::Constraint;

  fn form_group(name: &str) -> FormTaskGroup {
    let mut group = FormTaskGroup::new(name);
    group.image = String::from("nginx:1.27");
    group
  }

  fn full_form() -> FormJob {
    let mut web = form_group("web");
    web.count = 3;
    web.resources = FormResources {
      cpu_mhz: 500,
      memory_mb: 256,
      disk_mb: 300,
    };
    // Already key-sorted so the read-side sort is a no-op.
    web.env_vars = vec![
      EnvVar {
        key: "PORT".into(),
        value: "8080".into(),
      },
      EnvVar {
        key: "RUST_LOG".into(),
        value: "info".into(),
      },
    ];
    web.use_private_registry = true;
    web.registry_auth = Some(RegistryAuth {
      username: "deploy".into(),
      password: "hunter2".into(),
    });
    web.enable_network = true;
    web.network_mode = NetworkMode::Bridge;
    // Dynamic before static, matching read-side ordering.
    web.ports = vec![
      FormPort {
        label: "http".into(),
        host_value: 0,
        container_port: 8080,
        is_static: false,
      },
      FormPort {
        label: "metrics".into(),
        host_value: 9100,
        container_port: 9100,
        is_static: true,
      },
    ];
    web.enable_health_check = true;
    web.health_check = Some(HealthCheckForm {
      kind: CheckKind::Http,
      path: Some("/healthz".into()),
      command: None,
      interval_secs: 10,
      timeout_secs: 2,
      initial_delay_secs: 15,
      // The wire carries neither threshold, so only the
      // defaults survive a round trip.
      failure_threshold: 3,
      success_threshold: 2,
    });

    let worker = form_group("worker");

    FormJob {
      name: "demo".into(),
      namespace: "default".into(),
      datacenters: vec!["dc1".into(), "dc2".into()],
      task_groups: vec![web, worker],
    }
  }

  #[test]
  fn round_trip_preserves_the_form() {
    let form = full_form();
    assert_eq!(to_form_data(&build_spec(&form)), form);
  }

  #[test]
  fn spec_identity_and_type() {
    let spec = build_spec(&full_form());
    assert_eq!(spec.id, "demo");
    assert_eq!(spec.name, "demo");
    assert_eq!(spec.job_type, JOB_TYPE_SERVICE);
    assert_eq!(spec.task_groups.len(), 2);
    for group in &spec.task_groups {
      assert_eq!(group.tasks.len(), 1);
    }
  }

  #[test]
  fn env_blank_keys_dropped_and_last_write_wins() {
    let mut group = form_group("g");
    group.env_vars = vec![
      EnvVar {
        key: "A".into(),
        value: "1".into(),
      },
      EnvVar {
        key: "".into(),
        value: "ignored".into(),
      },
      EnvVar {
        key: "   ".into(),
        value: "ignored".into(),
      },
      EnvVar {
        key: "A".into(),
        value: "2".into(),
      },
    ];
    let task = build_task(&group);
    assert_eq!(task.env.len(), 1);
    assert_eq!(task.env.get("A").map(String::as_str), Some("2"));
  }

  #[test]
  fn dynamic_and_reserved_ports_partition() {
    let mut group = form_group("g");
    group.enable_network = true;
    group.ports = vec![FormPort {
      label: "http".into(),
      host_value: 0,
      container_port: 8080,
      is_static: false,
    }];
    let networks = build_networks(&group).unwrap();
    assert_eq!(networks.len(), 1);
    let network = &networks[0];
    assert_eq!(network.mode, "bridge");
    assert_eq!(
      network.dynamic_ports,
      vec![Port {
        label: "http".into(),
        value: None,
        to: 8080,
      }]
    );
    assert!(network.reserved_ports.is_empty());
  }

  #[test]
  fn networks_omitted_when_disabled_or_empty() {
    let mut group = form_group("g");
    assert!(build_networks(&group).is_none());

    group.enable_network = true;
    assert!(build_networks(&group).is_none());

    // Blank labels are skipped, leaving nothing to declare.
    group.ports = vec![FormPort {
      label: String::new(),
      host_value: 0,
      container_port: 80,
      is_static: false,
    }];
    assert!(build_networks(&group).is_none());
  }

  #[test]
  fn registry_auth_only_when_enabled() {
    let mut group = form_group("g");
    group.registry_auth = Some(RegistryAuth {
      username: "u".into(),
      password: "p".into(),
    });
    assert!(!build_task(&group).config.contains_key("auth"));

    group.use_private_registry = true;
    let config = build_task(&group).config;
    assert_eq!(
      config.get("auth"),
      Some(&json!({ "username": "u", "password": "p" }))
    );
  }

  #[test]
  fn health_check_port_label_falls_back() {
    let mut group = form_group("g");
    group.enable_health_check = true;

    let services = build_services(&group).unwrap();
    assert_eq!(services[0].port_label, FALLBACK_PORT_LABEL);

    group.ports.push(FormPort {
      label: "admin".into(),
      host_value: 0,
      container_port: 9000,
      is_static: false,
    });
    let services = build_services(&group).unwrap();
    assert_eq!(services[0].port_label, "admin");
  }

  #[test]
  fn health_check_durations_in_nanoseconds() {
    let mut group = form_group("g");
    group.enable_health_check = true;
    group.health_check = Some(HealthCheckForm {
      interval_secs: 30,
      timeout_secs: 5,
      initial_delay_secs: 7,
      ..Default::default()
    });
    let services = build_services(&group).unwrap();
    let check = &services[0].checks[0];
    assert_eq!(check.interval, Some(30_000_000_000));
    assert_eq!(check.timeout, Some(5_000_000_000));
    let restart = check.check_restart.as_ref().unwrap();
    assert_eq!(restart.limit, 3);
    assert_eq!(restart.grace, 7_000_000_000);
    assert!(!restart.ignore_warnings);
  }

  #[test]
  fn script_check_carries_command_not_path() {
    let mut group = form_group("g");
    group.enable_health_check = true;
    group.health_check = Some(HealthCheckForm {
      kind: CheckKind::Script,
      path: None,
      command: Some("/bin/check".into()),
      ..Default::default()
    });
    let services = build_services(&group).unwrap();
    let check = &services[0].checks[0];
    assert_eq!(check.check_type, "script");
    assert_eq!(check.path, None);
    assert_eq!(check.command.as_deref(), Some("/bin/check"));
  }

  #[test]
  fn read_side_sorts_env_by_key() {
    let mut spec = build_spec(&full_form());
    let env = &mut spec.task_groups[0].tasks[0].env;
    env.clear();
    env.insert("Z".into(), "3".into());
    env.insert("A".into(), "1".into());
    env.insert("M".into(), "2".into());
    let form = to_form_data(&spec);
    let keys = form.task_groups[0]
      .env_vars
      .iter()
      .map(|var| var.key.as_str())
      .collect::<Vec<_>>();
    assert_eq!(keys, ["A", "M", "Z"]);
  }

  #[test]
  fn read_side_synthesizes_default_port() {
    let mut spec = build_spec(&full_form());
    spec.task_groups[0].networks =
      Some(vec![NetworkResource {
        mode: "bridge".into(),
        dynamic_ports: Vec::new(),
        reserved_ports: Vec::new(),
      }]);
    let form = to_form_data(&spec);
    assert_eq!(
      form.task_groups[0].ports,
      vec![FormPort {
        label: "http".into(),
        host_value: 8080,
        container_port: 8080,
        is_static: false,
      }]
    );
  }

  #[test]
  fn read_side_derives_registry_toggle() {
    let mut spec = build_spec(&full_form());
    let config = &mut spec.task_groups[0].tasks[0].config;
    config.insert(
      "auth".into(),
      json!({ "username": "u", "password": "" }),
    );
    let form = to_form_data(&spec);
    assert!(!form.task_groups[0].use_private_registry);
    assert!(form.task_groups[0].registry_auth.is_none());
  }

  #[test]
  fn read_side_uses_first_task_only() {
    let mut spec = build_spec(&full_form());
    let mut second = spec.task_groups[0].tasks[0].clone();
    second.name = String::from("sidecar");
    spec.task_groups[0].tasks.push(second);
    let form = to_form_data(&spec);
    // The sidecar is not representable and drops on the next
    // write.
    assert_eq!(
      build_spec(&form).task_groups[0].tasks.len(),
      1
    );
  }

  #[test]
  fn missing_check_fields_fall_back() {
    let mut spec = build_spec(&full_form());
    let service = spec.task_groups[0]
      .services
      .as_mut()
      .unwrap()
      .first_mut()
      .unwrap();
    let check = &mut service.checks[0];
    check.interval = None;
    check.timeout = None;
    check.check_restart = None;
    let form = to_form_data(&spec);
    let check =
      form.task_groups[0].health_check.as_ref().unwrap();
    assert_eq!(check.interval_secs, 30);
    assert_eq!(check.timeout_secs, 5);
    assert_eq!(check.initial_delay_secs, 5);
    assert_eq!(check.failure_threshold, 3);
    assert_eq!(check.success_threshold, 2);
  }

  #[test]
  fn update_keeps_original_identity_and_metadata() {
    let mut original = build_spec(&full_form());
    original.id = String::from("job1");
    original.name = String::from("job1");
    original.meta = Some(
      [(String::from("owner"), String::from("platform"))]
        .into_iter()
        .collect(),
    );
    original.constraints = Some(vec![Constraint {
      l_target: "${attr.kernel.name}".into(),
      r_target: "linux".into(),
      operand: "=".into(),
    }]);
    original.priority = Some(80);
    original.task_groups[0].meta = Some(
      [(String::from("tier"), String::from("edge"))]
        .into_iter()
        .collect(),
    );

    let mut form = full_form();
    form.apply(FormUpdate::Name("job1-renamed".into()));
    // Rename the second group; it must lose its inheritance.
    form.task_groups[1].name = String::from("worker-v2");

    let updated = apply_update(&original, &form);

    assert_eq!(updated.id, "job1");
    assert_eq!(updated.name, "job1");
    assert_eq!(updated.meta, original.meta);
    assert_eq!(updated.constraints, original.constraints);
    assert_eq!(updated.priority, Some(80));
    assert_eq!(
      updated.task_groups[0].meta,
      original.task_groups[0].meta
    );
    assert_eq!(updated.task_groups[1].meta, None);
  }
}
