use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{I64, U64};

/// A running instantiation of a task group placed on a node.
/// Covers both the list stubs and the single-allocation read.
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Allocation {
  #[serde(rename = "ID")]
  pub id: String,

  #[serde(default, rename = "Name")]
  pub name: String,

  #[serde(default, rename = "Namespace")]
  pub namespace: String,

  #[serde(default, rename = "JobID")]
  pub job_id: String,

  #[serde(default, rename = "TaskGroup")]
  pub task_group: String,

  #[serde(default, rename = "NodeName")]
  pub node_name: String,

  /// What the scheduler wants, eg `run` or `stop`.
  #[serde(default, rename = "DesiredStatus")]
  pub desired_status: String,

  /// What the client reports, eg `running` or `failed`.
  #[serde(default, rename = "ClientStatus")]
  pub client_status: String,

  /// Per task state, keyed by task name.
  #[serde(default, rename = "TaskStates")]
  pub task_states: IndexMap<String, TaskState>,

  /// Unix nanoseconds.
  #[serde(
    default,
    rename = "CreateTime",
    skip_serializing_if = "Option::is_none"
  )]
  pub create_time: Option<I64>,

  #[serde(
    default,
    rename = "ModifyTime",
    skip_serializing_if = "Option::is_none"
  )]
  pub modify_time: Option<I64>,
}

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct TaskState {
  #[serde(default, rename = "State")]
  pub state: String,

  #[serde(default, rename = "Failed")]
  pub failed: bool,

  #[serde(default, rename = "Restarts")]
  pub restarts: U64,

  #[serde(
    default,
    rename = "StartedAt",
    skip_serializing_if = "Option::is_none"
  )]
  pub started_at: Option<String>,

  #[serde(
    default,
    rename = "FinishedAt",
    skip_serializing_if = "Option::is_none"
  )]
  pub finished_at: Option<String>,
}
