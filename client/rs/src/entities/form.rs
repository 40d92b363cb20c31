//! The flat, UI-facing job form model.
//!
//! The browser form edits these types directly; [crate::convert]
//! maps them to and from the cluster's nested job specification.
//! Field updates go through [FormUpdate] so every edit is an
//! explicit, exhaustively-matched operation instead of a dotted
//! field-path string.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use typeshare::typeshare;

use super::U64;

/// A job as the form edits it.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormJob {
  pub name: String,
  pub namespace: String,
  pub datacenters: Vec<String>,
  pub task_groups: Vec<FormTaskGroup>,
}

impl FormJob {
  /// A fresh empty form for the create flow, with one default
  /// task group. Every call returns newly allocated containers,
  /// nothing is shared between instances.
  pub fn new_empty() -> FormJob {
    FormJob {
      name: String::new(),
      namespace: String::from("default"),
      datacenters: vec![String::from("dc1")],
      task_groups: vec![FormTaskGroup::new("group-1")],
    }
  }
}

/// One form task group. Maps 1:1 to a wire task group holding a
/// single task.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTaskGroup {
  /// Unique within the job's group list.
  pub name: String,
  pub count: U64,
  /// Container image reference.
  pub image: String,
  /// Execution driver, eg `docker`.
  pub driver: String,
  pub resources: FormResources,
  /// Ordered; duplicate keys allowed while editing,
  /// last write wins on conversion.
  pub env_vars: Vec<EnvVar>,
  pub use_private_registry: bool,
  /// Only meaningful while `use_private_registry` is set.
  pub registry_auth: Option<RegistryAuth>,
  pub enable_network: bool,
  pub network_mode: NetworkMode,
  pub ports: Vec<FormPort>,
  pub enable_health_check: bool,
  pub health_check: Option<HealthCheckForm>,
}

impl FormTaskGroup {
  /// Fresh group from the default template. Returns a new value
  /// each call so groups never alias nested containers.
  pub fn new(name: impl Into<String>) -> FormTaskGroup {
    FormTaskGroup {
      name: name.into(),
      count: 1,
      image: String::new(),
      driver: String::from("docker"),
      resources: FormResources::default(),
      env_vars: Vec::new(),
      use_private_registry: false,
      registry_auth: None,
      enable_network: false,
      network_mode: NetworkMode::Bridge,
      ports: Vec::new(),
      enable_health_check: false,
      health_check: None,
    }
  }
}

#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResources {
  pub cpu_mhz: U64,
  pub memory_mb: U64,
  pub disk_mb: U64,
}

impl Default for FormResources {
  fn default() -> FormResources {
    FormResources {
      cpu_mhz: 100,
      memory_mb: 300,
      disk_mb: 300,
    }
  }
}

#[typeshare]
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct EnvVar {
  pub key: String,
  pub value: String,
}

#[typeshare]
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct RegistryAuth {
  pub username: String,
  pub password: String,
}

#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkMode {
  None,
  Host,
  #[default]
  Bridge,
}

#[typeshare]
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct FormPort {
  pub label: String,
  /// Only meaningful while `is_static` is set.
  pub host_value: U64,
  pub container_port: U64,
  pub is_static: bool,
}

#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckKind {
  #[default]
  Http,
  Tcp,
  Script,
}

#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckForm {
  pub kind: CheckKind,
  /// http checks only.
  pub path: Option<String>,
  /// script checks only.
  pub command: Option<String>,
  pub interval_secs: U64,
  pub timeout_secs: U64,
  pub initial_delay_secs: U64,
  pub failure_threshold: U64,
  pub success_threshold: U64,
}

impl Default for HealthCheckForm {
  fn default() -> HealthCheckForm {
    HealthCheckForm {
      kind: CheckKind::Http,
      path: Some(String::from("/")),
      command: None,
      interval_secs: 30,
      timeout_secs: 5,
      initial_delay_secs: 5,
      failure_threshold: 3,
      success_threshold: 2,
    }
  }
}

//

/// A discrete edit to a [FormJob]. The UI dispatches these instead
/// of patching fields through string paths.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum FormUpdate {
  Name(String),
  Namespace(String),
  Datacenters(Vec<String>),
  AddGroup,
  RemoveGroup { group: u32 },
  Group { group: u32, update: GroupUpdate },
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum GroupUpdate {
  Name(String),
  Count(U64),
  Image(String),
  Driver(String),
  Resource { field: ResourceField, value: U64 },
  UsePrivateRegistry(bool),
  RegistryUsername(String),
  RegistryPassword(String),
  EnableNetwork(bool),
  NetworkMode(NetworkMode),
  AddEnvVar,
  RemoveEnvVar { index: u32 },
  EnvVar { index: u32, field: EnvVarField, value: String },
  AddPort,
  RemovePort { index: u32 },
  Port { index: u32, update: PortUpdate },
  EnableHealthCheck(bool),
  HealthCheck(HealthCheckUpdate),
}

#[typeshare]
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceField {
  Cpu,
  Memory,
  Disk,
}

#[typeshare]
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnvVarField {
  Key,
  Value,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum PortUpdate {
  Label(String),
  HostValue(U64),
  ContainerPort(U64),
  IsStatic(bool),
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum HealthCheckUpdate {
  Kind(CheckKind),
  Path(String),
  Command(String),
  IntervalSecs(U64),
  TimeoutSecs(U64),
  InitialDelaySecs(U64),
  FailureThreshold(U64),
  SuccessThreshold(U64),
}

impl FormJob {
  /// Applies one edit. Out of range group / row indices are
  /// ignored, the UI can race removals against stale events.
  pub fn apply(&mut self, update: FormUpdate) {
    match update {
      FormUpdate::Name(name) => self.name = name,
      FormUpdate::Namespace(namespace) => {
        self.namespace = namespace
      }
      FormUpdate::Datacenters(datacenters) => {
        self.datacenters = datacenters
      }
      FormUpdate::AddGroup => {
        let name = format!("group-{}", self.task_groups.len() + 1);
        self.task_groups.push(FormTaskGroup::new(name));
      }
      FormUpdate::RemoveGroup { group } => {
        let group = group as usize;
        if group < self.task_groups.len() {
          self.task_groups.remove(group);
        }
      }
      FormUpdate::Group { group, update } => {
        if let Some(group) =
          self.task_groups.get_mut(group as usize)
        {
          group.apply(update);
        }
      }
    }
  }
}

impl FormTaskGroup {
  fn apply(&mut self, update: GroupUpdate) {
    match update {
      GroupUpdate::Name(name) => self.name = name,
      GroupUpdate::Count(count) => self.count = count,
      GroupUpdate::Image(image) => self.image = image,
      GroupUpdate::Driver(driver) => self.driver = driver,
      GroupUpdate::Resource { field, value } => match field {
        ResourceField::Cpu => self.resources.cpu_mhz = value,
        ResourceField::Memory => self.resources.memory_mb = value,
        ResourceField::Disk => self.resources.disk_mb = value,
      },
      GroupUpdate::UsePrivateRegistry(enable) => {
        self.use_private_registry = enable;
        if enable {
          self.registry_auth.get_or_insert_with(Default::default);
        } else {
          self.registry_auth = None;
        }
      }
      GroupUpdate::RegistryUsername(username) => {
        self
          .registry_auth
          .get_or_insert_with(Default::default)
          .username = username;
      }
      GroupUpdate::RegistryPassword(password) => {
        self
          .registry_auth
          .get_or_insert_with(Default::default)
          .password = password;
      }
      GroupUpdate::EnableNetwork(enable) => {
        self.enable_network = enable
      }
      GroupUpdate::NetworkMode(mode) => self.network_mode = mode,
      GroupUpdate::AddEnvVar => {
        self.env_vars.push(EnvVar::default())
      }
      GroupUpdate::RemoveEnvVar { index } => {
        let index = index as usize;
        if index < self.env_vars.len() {
          self.env_vars.remove(index);
        }
      }
      GroupUpdate::EnvVar {
        index,
        field,
        value,
      } => {
        if let Some(var) = self.env_vars.get_mut(index as usize) {
          match field {
            EnvVarField::Key => var.key = value,
            EnvVarField::Value => var.value = value,
          }
        }
      }
      GroupUpdate::AddPort => {
        self.ports.push(FormPort::default())
      }
      GroupUpdate::RemovePort { index } => {
        let index = index as usize;
        if index < self.ports.len() {
          self.ports.remove(index);
        }
      }
      GroupUpdate::Port { index, update } => {
        if let Some(port) = self.ports.get_mut(index as usize) {
          match update {
            PortUpdate::Label(label) => port.label = label,
            PortUpdate::HostValue(value) => {
              port.host_value = value
            }
            PortUpdate::ContainerPort(value) => {
              port.container_port = value
            }
            PortUpdate::IsStatic(is_static) => {
              port.is_static = is_static
            }
          }
        }
      }
      GroupUpdate::EnableHealthCheck(enable) => {
        self.enable_health_check = enable;
        if enable {
          self.health_check.get_or_insert_with(Default::default);
        }
      }
      GroupUpdate::HealthCheck(update) => {
        let check =
          self.health_check.get_or_insert_with(Default::default);
        match update {
          HealthCheckUpdate::Kind(kind) => check.kind = kind,
          HealthCheckUpdate::Path(path) => {
            check.path = Some(path)
          }
          HealthCheckUpdate::Command(command) => {
            check.command = Some(command)
          }
          HealthCheckUpdate::IntervalSecs(secs) => {
            check.interval_secs = secs
          }
          HealthCheckUpdate::TimeoutSecs(secs) => {
            check.timeout_secs = secs
          }
          HealthCheckUpdate::InitialDelaySecs(secs) => {
            check.initial_delay_secs = secs
          }
          HealthCheckUpdate::FailureThreshold(count) => {
            check.failure_threshold = count
          }
          HealthCheckUpdate::SuccessThreshold(count) => {
            check.success_threshold = count
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fresh_groups_do_not_alias() {
    let mut a = FormTaskGroup::new("a");
    let b = FormTaskGroup::new("b");
    a.env_vars.push(EnvVar {
      key: "K".into(),
      value: "V".into(),
    });
    assert!(b.env_vars.is_empty());
  }

  #[test]
  fn enabling_registry_synthesizes_auth() {
    let mut form = FormJob::new_empty();
    form.apply(FormUpdate::Group {
      group: 0,
      update: GroupUpdate::UsePrivateRegistry(true),
    });
    assert!(form.task_groups[0].registry_auth.is_some());
    form.apply(FormUpdate::Group {
      group: 0,
      update: GroupUpdate::UsePrivateRegistry(false),
    });
    assert!(form.task_groups[0].registry_auth.is_none());
  }

  #[test]
  fn out_of_range_updates_are_ignored() {
    let mut form = FormJob::new_empty();
    let before = form.clone();
    form.apply(FormUpdate::Group {
      group: 7,
      update: GroupUpdate::Image("nginx".into()),
    });
    form.apply(FormUpdate::RemoveGroup { group: 7 });
    assert_eq!(form, before);
  }

  #[test]
  fn port_rows_edit_in_place() {
    let mut form = FormJob::new_empty();
    form.apply(FormUpdate::Group {
      group: 0,
      update: GroupUpdate::AddPort,
    });
    form.apply(FormUpdate::Group {
      group: 0,
      update: GroupUpdate::Port {
        index: 0,
        update: PortUpdate::Label("http".into()),
      },
    });
    form.apply(FormUpdate::Group {
      group: 0,
      update: GroupUpdate::Port {
        index: 0,
        update: PortUpdate::ContainerPort(8080),
      },
    });
    let port = &form.task_groups[0].ports[0];
    assert_eq!(port.label, "http");
    assert_eq!(port.container_port, 8080);
    assert!(!port.is_static);
  }
}
