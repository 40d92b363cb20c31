use anyhow::Context;

use crate::{
  NoQuery, NomadClient, entities::allocation::Allocation,
};

use super::NamespaceQuery;

impl NomadClient {
  pub async fn list_job_allocations(
    &self,
    id: &str,
    namespace: &str,
  ) -> anyhow::Result<Vec<Allocation>> {
    self
      .get(
        &format!(
          "/v1/job/{}/allocations",
          urlencoding::encode(id)
        ),
        &NamespaceQuery { namespace },
      )
      .await
      .with_context(|| {
        format!("Failed to list allocations for job {id}")
      })
  }

  pub async fn get_allocation(
    &self,
    id: &str,
  ) -> anyhow::Result<Allocation> {
    self
      .get(
        &format!("/v1/allocation/{}", urlencoding::encode(id)),
        &NoQuery {},
      )
      .await
      .with_context(|| format!("Failed to get allocation {id}"))
  }
}
