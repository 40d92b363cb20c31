use anyhow::Context;
use serde::Serialize;

use crate::{NomadClient, entities::logs::LogKind};

/// Query parameters on the allocation log endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LogQuery<'a> {
  pub task: &'a str,
  #[serde(rename = "type")]
  pub kind: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub follow: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub origin: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub offset: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub plain: Option<bool>,
}

impl NomadClient {
  /// One-shot, non-follow log read. With `plain` the endpoint
  /// returns raw text instead of JSON frames.
  pub async fn fetch_logs(
    &self,
    allocation: &str,
    task: &str,
    kind: LogKind,
    plain: bool,
  ) -> anyhow::Result<String> {
    let response = self
      .get_raw(
        &log_path(allocation),
        &LogQuery {
          task,
          kind: kind.as_ref(),
          follow: Some(false),
          origin: Some("start"),
          offset: None,
          plain: plain.then_some(true),
        },
      )
      .await
      .with_context(|| {
        format!("Failed to fetch logs for allocation {allocation}")
      })?;
    response
      .text()
      .await
      .context("Failed to read log response")
  }

  /// Opens the follow stream consumed by
  /// [LogTail][crate::tail::LogTail], starting `offset_from_end`
  /// bytes before the current end of the file.
  pub async fn follow_logs(
    &self,
    allocation: &str,
    task: &str,
    kind: LogKind,
    offset_from_end: u64,
  ) -> anyhow::Result<reqwest::Response> {
    self
      .get_raw(
        &log_path(allocation),
        &LogQuery {
          task,
          kind: kind.as_ref(),
          follow: Some(true),
          origin: Some("end"),
          offset: Some(offset_from_end),
          plain: None,
        },
      )
      .await
      .with_context(|| {
        format!(
          "Failed to open log stream for allocation {allocation}"
        )
      })
  }
}

fn log_path(allocation: &str) -> String {
  format!("/v1/client/fs/logs/{}", urlencoding::encode(allocation))
}
