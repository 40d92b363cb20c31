use serde::{Deserialize, Serialize};

use super::U64;

#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct Namespace {
  #[serde(rename = "Name")]
  pub name: String,

  #[serde(default, rename = "Description")]
  pub description: String,

  #[serde(
    default,
    rename = "CreateIndex",
    skip_serializing_if = "Option::is_none"
  )]
  pub create_index: Option<U64>,

  #[serde(
    default,
    rename = "ModifyIndex",
    skip_serializing_if = "Option::is_none"
  )]
  pub modify_index: Option<U64>,
}
