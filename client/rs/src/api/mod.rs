//! Calls against the cluster HTTP API, grouped by resource.

pub mod allocations;
pub mod jobs;
pub mod logs;
pub mod namespaces;

use serde::Serialize;

/// Standard namespace selector most job endpoints take.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceQuery<'a> {
  pub namespace: &'a str,
}
