use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use typeshare::typeshare;

use super::U64;

/// Which output stream of the task to read.
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
  clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogKind {
  #[default]
  Stdout,
  Stderr,
}

/// One newline-delimited JSON record in the log follow stream.
/// `Data` carries a base64 chunk of log bytes, `FileEvent` a file
/// lifecycle notice (`file truncated` / `file deleted`).
#[derive(
  Debug, Clone, Default, PartialEq, Serialize, Deserialize,
)]
pub struct StreamFrame {
  #[serde(
    default,
    rename = "Data",
    skip_serializing_if = "Option::is_none"
  )]
  pub data: Option<String>,

  #[serde(
    default,
    rename = "FileEvent",
    skip_serializing_if = "Option::is_none"
  )]
  pub file_event: Option<String>,

  #[serde(
    default,
    rename = "Offset",
    skip_serializing_if = "Option::is_none"
  )]
  pub offset: Option<U64>,

  #[serde(
    default,
    rename = "File",
    skip_serializing_if = "Option::is_none"
  )]
  pub file: Option<String>,
}
