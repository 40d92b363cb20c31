use anyhow::Context;
use serde::Serialize;

use crate::{
  NomadClient,
  entities::job::{
    Job, JobDeregisterResponse, JobListItem, JobRegisterResponse,
  },
};

use super::NamespaceQuery;

/// Register/update body. The cluster expects the spec wrapped in
/// a `Job` envelope.
#[derive(Serialize)]
struct RegisterBody<'a> {
  #[serde(rename = "Job")]
  job: &'a Job,
}

#[derive(Serialize)]
struct StopQuery<'a> {
  namespace: &'a str,
  purge: bool,
}

impl NomadClient {
  pub async fn list_jobs(
    &self,
    namespace: &str,
  ) -> anyhow::Result<Vec<JobListItem>> {
    self
      .get("/v1/jobs", &NamespaceQuery { namespace })
      .await
      .context("Failed to list jobs")
  }

  pub async fn get_job(
    &self,
    id: &str,
    namespace: &str,
  ) -> anyhow::Result<Job> {
    self
      .get(
        &format!("/v1/job/{}", urlencoding::encode(id)),
        &NamespaceQuery { namespace },
      )
      .await
      .with_context(|| format!("Failed to get job {id}"))
  }

  /// Registers a new job. The caller is responsible for having
  /// validated the form before building the spec.
  pub async fn create_job(
    &self,
    job: &Job,
  ) -> anyhow::Result<JobRegisterResponse> {
    self
      .post("/v1/jobs", &RegisterBody { job })
      .await
      .with_context(|| {
        format!("Failed to register job {}", job.id)
      })
  }

  /// Re-registers an existing job under its id.
  pub async fn update_job(
    &self,
    job: &Job,
  ) -> anyhow::Result<JobRegisterResponse> {
    self
      .post(
        &format!("/v1/job/{}", urlencoding::encode(&job.id)),
        &RegisterBody { job },
      )
      .await
      .with_context(|| format!("Failed to update job {}", job.id))
  }

  /// Deregisters the job. With `purge` the job is removed from
  /// cluster state entirely instead of being marked stopped.
  pub async fn stop_job(
    &self,
    id: &str,
    namespace: &str,
    purge: bool,
  ) -> anyhow::Result<JobDeregisterResponse> {
    self
      .delete(
        &format!("/v1/job/{}", urlencoding::encode(id)),
        &StopQuery { namespace, purge },
      )
      .await
      .with_context(|| format!("Failed to stop job {id}"))
  }

  /// Restart by re-registering the current spec. The fresh
  /// evaluation reschedules the job's allocations.
  pub async fn restart_job(
    &self,
    id: &str,
    namespace: &str,
  ) -> anyhow::Result<JobRegisterResponse> {
    let job = self.get_job(id, namespace).await?;
    self
      .update_job(&job)
      .await
      .with_context(|| format!("Failed to restart job {id}"))
  }
}
