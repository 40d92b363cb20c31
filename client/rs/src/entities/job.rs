use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{I64, U64};

/// The only job type the console submits.
pub const JOB_TYPE_SERVICE: &str = "service";

/// A job specification as the cluster API accepts and returns it.
/// Field names follow the orchestrator's wire format.
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Job {
  #[serde(rename = "ID")]
  pub id: String,

  #[serde(rename = "Name")]
  pub name: String,

  #[serde(default, rename = "Namespace")]
  pub namespace: String,

  /// Scheduler type, eg `service` or `batch`.
  /// The console only ever writes `service`.
  #[serde(default, rename = "Type")]
  pub job_type: String,

  #[serde(default, rename = "Datacenters")]
  pub datacenters: Vec<String>,

  #[serde(default, rename = "TaskGroups")]
  pub task_groups: Vec<TaskGroup>,

  /// User metadata. Not editable through the form,
  /// preserved across form-driven updates.
  #[serde(
    default,
    rename = "Meta",
    skip_serializing_if = "Option::is_none"
  )]
  pub meta: Option<IndexMap<String, String>>,

  /// Placement constraints. Same preservation rule as `Meta`.
  #[serde(
    default,
    rename = "Constraints",
    skip_serializing_if = "Option::is_none"
  )]
  pub constraints: Option<Vec<Constraint>>,

  #[serde(
    default,
    rename = "Priority",
    skip_serializing_if = "Option::is_none"
  )]
  pub priority: Option<I64>,

  /// Read side only, the cluster reports it.
  #[serde(
    default,
    rename = "Status",
    skip_serializing_if = "Option::is_none"
  )]
  pub status: Option<String>,
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct TaskGroup {
  #[serde(rename = "Name")]
  pub name: String,

  #[serde(default = "default_count", rename = "Count")]
  pub count: I64,

  /// The console models exactly one task per group.
  /// Extra tasks on foreign jobs are not representable in the form.
  #[serde(default, rename = "Tasks")]
  pub tasks: Vec<Task>,

  #[serde(
    default,
    rename = "Networks",
    skip_serializing_if = "Option::is_none"
  )]
  pub networks: Option<Vec<NetworkResource>>,

  #[serde(
    default,
    rename = "Services",
    skip_serializing_if = "Option::is_none"
  )]
  pub services: Option<Vec<Service>>,

  #[serde(
    default,
    rename = "Meta",
    skip_serializing_if = "Option::is_none"
  )]
  pub meta: Option<IndexMap<String, String>>,

  #[serde(
    default,
    rename = "Constraints",
    skip_serializing_if = "Option::is_none"
  )]
  pub constraints: Option<Vec<Constraint>>,
}

fn default_count() -> I64 {
  1
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Task {
  #[serde(rename = "Name")]
  pub name: String,

  /// Execution driver, eg `docker`.
  #[serde(default, rename = "Driver")]
  pub driver: String,

  /// Driver specific configuration. For the docker driver the
  /// console writes `image` and optionally `auth`.
  #[serde(default, rename = "Config")]
  pub config: IndexMap<String, Value>,

  #[serde(default, rename = "Env")]
  pub env: IndexMap<String, String>,

  #[serde(
    default,
    rename = "Resources",
    skip_serializing_if = "Option::is_none"
  )]
  pub resources: Option<Resources>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Resources {
  /// MHz
  #[serde(
    default,
    rename = "CPU",
    skip_serializing_if = "Option::is_none"
  )]
  pub cpu: Option<U64>,

  #[serde(
    default,
    rename = "MemoryMB",
    skip_serializing_if = "Option::is_none"
  )]
  pub memory_mb: Option<U64>,

  #[serde(
    default,
    rename = "DiskMB",
    skip_serializing_if = "Option::is_none"
  )]
  pub disk_mb: Option<U64>,
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct NetworkResource {
  #[serde(default, rename = "Mode")]
  pub mode: String,

  /// Ports the scheduler assigns at placement time.
  #[serde(default, rename = "DynamicPorts")]
  pub dynamic_ports: Vec<Port>,

  /// Ports pinned to a fixed host value by the job author.
  #[serde(default, rename = "ReservedPorts")]
  pub reserved_ports: Vec<Port>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Port {
  #[serde(rename = "Label")]
  pub label: String,

  /// Host port. Only meaningful on reserved ports.
  #[serde(
    default,
    rename = "Value",
    skip_serializing_if = "Option::is_none"
  )]
  pub value: Option<U64>,

  /// Container port the host port maps to.
  #[serde(default, rename = "To")]
  pub to: U64,
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Service {
  #[serde(rename = "Name")]
  pub name: String,

  #[serde(default, rename = "PortLabel")]
  pub port_label: String,

  #[serde(default, rename = "Checks")]
  pub checks: Vec<ServiceCheck>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct ServiceCheck {
  #[serde(default, rename = "Name")]
  pub name: String,

  /// `http`, `tcp` or `script`.
  #[serde(default, rename = "Type")]
  pub check_type: String,

  /// Only written for http checks.
  #[serde(
    default,
    rename = "Path",
    skip_serializing_if = "Option::is_none"
  )]
  pub path: Option<String>,

  /// Only written for script checks.
  #[serde(
    default,
    rename = "Command",
    skip_serializing_if = "Option::is_none"
  )]
  pub command: Option<String>,

  /// Nanoseconds.
  #[serde(
    default,
    rename = "Interval",
    skip_serializing_if = "Option::is_none"
  )]
  pub interval: Option<I64>,

  /// Nanoseconds.
  #[serde(
    default,
    rename = "Timeout",
    skip_serializing_if = "Option::is_none"
  )]
  pub timeout: Option<I64>,

  #[serde(
    default,
    rename = "CheckRestart",
    skip_serializing_if = "Option::is_none"
  )]
  pub check_restart: Option<CheckRestart>,

  /// The console does not write these two, but reads them off
  /// foreign jobs when present.
  #[serde(
    default,
    rename = "FailuresBeforeCritical",
    skip_serializing_if = "Option::is_none"
  )]
  pub failures_before_critical: Option<U64>,

  #[serde(
    default,
    rename = "SuccessBeforePassing",
    skip_serializing_if = "Option::is_none"
  )]
  pub success_before_passing: Option<U64>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct CheckRestart {
  #[serde(default, rename = "Limit")]
  pub limit: U64,

  /// Nanoseconds before the first check counts.
  #[serde(default, rename = "Grace")]
  pub grace: I64,

  #[serde(default, rename = "IgnoreWarnings")]
  pub ignore_warnings: bool,
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Constraint {
  #[serde(default, rename = "LTarget")]
  pub l_target: String,

  #[serde(default, rename = "RTarget")]
  pub r_target: String,

  #[serde(default, rename = "Operand")]
  pub operand: String,
}

//

/// Stub returned by the job list endpoint.
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct JobListItem {
  #[serde(rename = "ID")]
  pub id: String,

  #[serde(default, rename = "Name")]
  pub name: String,

  #[serde(default, rename = "Namespace")]
  pub namespace: String,

  #[serde(default, rename = "Type")]
  pub job_type: String,

  #[serde(default, rename = "Status")]
  pub status: String,

  #[serde(default, rename = "Priority")]
  pub priority: I64,

  /// Unix nanoseconds.
  #[serde(
    default,
    rename = "SubmitTime",
    skip_serializing_if = "Option::is_none"
  )]
  pub submit_time: Option<I64>,

  #[serde(
    default,
    rename = "JobSummary",
    skip_serializing_if = "Option::is_none"
  )]
  pub summary: Option<JobSummary>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct JobSummary {
  #[serde(default, rename = "JobID")]
  pub job_id: String,

  /// Allocation counts per task group.
  #[serde(default, rename = "Summary")]
  pub summary: IndexMap<String, TaskGroupSummary>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct TaskGroupSummary {
  #[serde(default, rename = "Queued")]
  pub queued: U64,
  #[serde(default, rename = "Starting")]
  pub starting: U64,
  #[serde(default, rename = "Running")]
  pub running: U64,
  #[serde(default, rename = "Complete")]
  pub complete: U64,
  #[serde(default, rename = "Failed")]
  pub failed: U64,
  #[serde(default, rename = "Lost")]
  pub lost: U64,
}

//

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct JobRegisterResponse {
  #[serde(default, rename = "EvalID")]
  pub eval_id: String,

  #[serde(default, rename = "EvalCreateIndex")]
  pub eval_create_index: U64,

  #[serde(default, rename = "JobModifyIndex")]
  pub job_modify_index: U64,

  /// Non fatal scheduler warnings, surfaced to the submitter.
  #[serde(default, rename = "Warnings")]
  pub warnings: String,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct JobDeregisterResponse {
  #[serde(default, rename = "EvalID")]
  pub eval_id: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_field_names_are_pascal_case() {
    let job = Job {
      id: "web".into(),
      name: "web".into(),
      job_type: JOB_TYPE_SERVICE.into(),
      ..Default::default()
    };
    let json = serde_json::to_value(&job).unwrap();
    assert_eq!(json["ID"], "web");
    assert_eq!(json["Type"], "service");
    // Absent optional sections stay off the wire entirely.
    assert!(json.get("Meta").is_none());
    assert!(json.get("Constraints").is_none());
    assert!(json.get("Priority").is_none());
  }

  #[test]
  fn dynamic_ports_omit_the_host_value() {
    let port = Port {
      label: "http".into(),
      value: None,
      to: 8080,
    };
    let json = serde_json::to_value(&port).unwrap();
    assert_eq!(json["Label"], "http");
    assert_eq!(json["To"], 8080);
    assert!(json.get("Value").is_none());
  }

  #[test]
  fn deserializes_a_cluster_job_payload() {
    let payload = r#"{
      "ID": "web",
      "Name": "web",
      "Namespace": "default",
      "Type": "service",
      "Datacenters": ["dc1"],
      "Status": "running",
      "TaskGroups": [{
        "Name": "web",
        "Count": 2,
        "Tasks": [{
          "Name": "web",
          "Driver": "docker",
          "Config": { "image": "nginx:1.27" },
          "Env": { "PORT": "8080" },
          "Resources": { "CPU": 500, "MemoryMB": 256 }
        }],
        "Networks": [{
          "Mode": "bridge",
          "DynamicPorts": [{ "Label": "http", "To": 8080 }],
          "ReservedPorts": []
        }]
      }]
    }"#;
    let job: Job = serde_json::from_str(payload).unwrap();
    assert_eq!(job.id, "web");
    assert_eq!(job.status.as_deref(), Some("running"));
    let group = &job.task_groups[0];
    assert_eq!(group.count, 2);
    let task = &group.tasks[0];
    assert_eq!(
      task.config.get("image").and_then(|v| v.as_str()),
      Some("nginx:1.27")
    );
    let network =
      &group.networks.as_ref().unwrap()[0];
    assert_eq!(network.dynamic_ports[0].to, 8080);
    assert_eq!(network.dynamic_ports[0].value, None);
    // Resources with no DiskMB leave the field unset.
    assert_eq!(
      task.resources.as_ref().unwrap().disk_mb,
      None
    );
  }
}
