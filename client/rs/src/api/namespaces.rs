use anyhow::Context;

use crate::{
  NoQuery, NomadClient, entities::namespace::Namespace,
};

impl NomadClient {
  pub async fn list_namespaces(
    &self,
  ) -> anyhow::Result<Vec<Namespace>> {
    self
      .get("/v1/namespaces", &NoQuery {})
      .await
      .context("Failed to list namespaces")
  }
}
