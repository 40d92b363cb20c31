//! # Caravan Client
//!
//! Core client for the Caravan web console: typed entities for
//! the cluster's job API, the form ⇄ job-spec converter, and a
//! follow-mode log tailer. The browser frontend's types are
//! generated from the `typeshare` annotations in
//! [entities].
//!
//! ```rust,no_run
//! use caravan_client::NomadClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let client =
//!     NomadClient::new("http://127.0.0.1:4646", "token");
//!   client.ping().await?;
//!   for job in client.list_jobs("default").await? {
//!     println!("{} ({})", job.id, job.status);
//!   }
//!   Ok(())
//! }
//! ```

use anyhow::Context;
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};

use crate::entities::config::{ConsoleConfig, Env};

pub mod api;
pub mod convert;
pub mod entities;
pub mod tail;

/// Header carrying the cluster ACL token on every request.
pub const TOKEN_HEADER: &str = "X-Nomad-Token";

/// Non-success response from the cluster API.
#[derive(Debug, thiserror::Error)]
#[error("{status} | {body}")]
pub struct ApiError {
  pub status: StatusCode,
  pub body: String,
}

/// Client for the cluster HTTP API. Holds the address and token
/// explicitly; there is no ambient session state. Created at
/// login, dropped at logout.
#[derive(Clone)]
pub struct NomadClient {
  pub address: String,
  token: String,
  http: reqwest::Client,
}

impl NomadClient {
  pub fn new(
    address: impl Into<String>,
    token: impl Into<String>,
  ) -> NomadClient {
    let address: String = address.into();
    NomadClient {
      address: address.trim_end_matches('/').to_string(),
      token: token.into(),
      http: reqwest::Client::new(),
    }
  }

  pub fn from_config(config: &ConsoleConfig) -> NomadClient {
    NomadClient::new(
      &config.cluster_address,
      &config.cluster_token,
    )
  }

  /// Builds a client from `CARAVAN_ADDRESS` / `CARAVAN_TOKEN`,
  /// falling back to the local agent address.
  pub fn from_env() -> anyhow::Result<NomadClient> {
    let env = envy::from_env::<Env>()
      .context("Failed to parse environment")?;
    let mut config = ConsoleConfig::default();
    env.merge_onto(&mut config);
    Ok(NomadClient::from_config(&config))
  }

  /// Checks address and token against the cluster agent
  /// endpoint. The login flow calls this before storing either.
  pub async fn ping(&self) -> anyhow::Result<()> {
    self
      .request(self.http.get(self.url("/v1/agent/self")))
      .await
      .context("Failed to reach cluster agent")?;
    Ok(())
  }

  pub(crate) fn url(&self, path: &str) -> String {
    format!("{}{path}", self.address)
  }

  pub(crate) fn url_with_query(
    &self,
    path: &str,
    query: &impl Serialize,
  ) -> anyhow::Result<String> {
    let query = serde_qs::to_string(query)
      .context("Failed to serialize query string")?;
    if query.is_empty() {
      Ok(self.url(path))
    } else {
      Ok(format!("{}{path}?{query}", self.address))
    }
  }

  pub(crate) async fn get<R: DeserializeOwned>(
    &self,
    path: &str,
    query: &impl Serialize,
  ) -> anyhow::Result<R> {
    let url = self.url_with_query(path, query)?;
    let response = self.request(self.http.get(url)).await?;
    response
      .json()
      .await
      .context("Failed to parse response body")
  }

  pub(crate) async fn post<R: DeserializeOwned>(
    &self,
    path: &str,
    body: &impl Serialize,
  ) -> anyhow::Result<R> {
    let response = self
      .request(self.http.post(self.url(path)).json(body))
      .await?;
    response
      .json()
      .await
      .context("Failed to parse response body")
  }

  pub(crate) async fn delete<R: DeserializeOwned>(
    &self,
    path: &str,
    query: &impl Serialize,
  ) -> anyhow::Result<R> {
    let url = self.url_with_query(path, query)?;
    let response = self.request(self.http.delete(url)).await?;
    response
      .json()
      .await
      .context("Failed to parse response body")
  }

  /// GET returning the raw response, for log payloads and the
  /// follow stream.
  pub(crate) async fn get_raw(
    &self,
    path: &str,
    query: &impl Serialize,
  ) -> anyhow::Result<reqwest::Response> {
    let url = self.url_with_query(path, query)?;
    self.request(self.http.get(url)).await
  }

  async fn request(
    &self,
    builder: reqwest::RequestBuilder,
  ) -> anyhow::Result<reqwest::Response> {
    let builder = if self.token.is_empty() {
      builder
    } else {
      builder.header(TOKEN_HEADER, &self.token)
    };
    let response = builder
      .send()
      .await
      .context("Failed to reach cluster API")?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError { status, body }.into())
  }
}

/// Serializes to an empty query string.
#[derive(Serialize)]
pub(crate) struct NoQuery {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trailing_slash_is_trimmed() {
    let client =
      NomadClient::new("http://10.0.0.1:4646/", "token");
    assert_eq!(client.url("/v1/jobs"), "http://10.0.0.1:4646/v1/jobs");
  }

  #[test]
  fn query_string_is_appended() {
    #[derive(Serialize)]
    struct Query<'a> {
      namespace: &'a str,
    }
    let client = NomadClient::new("http://10.0.0.1:4646", "");
    let url = client
      .url_with_query("/v1/jobs", &Query { namespace: "apps" })
      .unwrap();
    assert_eq!(url, "http://10.0.0.1:4646/v1/jobs?namespace=apps");
    let url = client
      .url_with_query("/v1/namespaces", &NoQuery {})
      .unwrap();
    assert_eq!(url, "http://10.0.0.1:4646/v1/namespaces");
  }
}
