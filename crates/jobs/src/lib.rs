use parking_lot::RwLock;
use sched_core::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use types::{GenerateRequest, GenerateResult};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done { result: GenerateResult },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Done { .. } | JobStatus::Failed { .. })
    }
}

/// Generation jobs kept in memory for the life of the process.
pub struct InMemJobs<G: Generator> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    generator: Arc<G>,
}

impl<G: Generator> Clone for InMemJobs<G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            generator: self.generator.clone(),
        }
    }
}

impl<G: Generator> InMemJobs<G> {
    pub fn new(generator: G) -> Self {
        Self {
            inner: Default::default(),
            generator: Arc::new(generator),
        }
    }

    /// Registers the job and runs it on the tokio runtime.
    pub fn enqueue(&self, req: GenerateRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let generator = self.generator.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write().insert(id_for_task.clone(), JobStatus::Running);
            match generator.generate(req).await {
                Ok(result) => {
                    info!(job = %id_for_task, created = result.report.totals.created, "job done");
                    map.write().insert(id_for_task, JobStatus::Done { result });
                }
                Err(e) => {
                    error!(?e, job = %id_for_task, "job failed");
                    map.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            message: format!("{e:#}"),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use types::{Catalog, GenerationReport, PlacementStats, RunOptions, RunStatus};

    struct Canned;

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResult> {
            if req.only.is_empty() {
                Ok(GenerateResult {
                    report: GenerationReport {
                        status: RunStatus::Complete,
                        totals: PlacementStats::default(),
                        subjects: Default::default(),
                        warnings: vec![],
                        created: vec![],
                    },
                    roster: req.roster,
                })
            } else {
                anyhow::bail!("unknown subject {}", req.only[0])
            }
        }
    }

    fn request(only: Vec<&str>) -> GenerateRequest {
        GenerateRequest {
            catalog: Catalog::default(),
            options: RunOptions::default(),
            roster: vec![],
            only: only.into_iter().map(Into::into).collect(),
        }
    }

    async fn settle(jobs: &InMemJobs<Canned>, id: &JobId) -> JobStatus {
        for _ in 0..1000 {
            if let Some(st) = jobs.get(&id.0).filter(JobStatus::is_finished) {
                return st;
            }
            tokio::task::yield_now().await;
        }
        panic!("job {} never finished", id.0);
    }

    #[tokio::test]
    async fn jobs_end_done_or_failed() {
        let jobs = InMemJobs::new(Canned);

        let ok = jobs.enqueue(request(vec![]));
        assert!(matches!(settle(&jobs, &ok).await, JobStatus::Done { .. }));

        let bad = jobs.enqueue(request(vec!["Nope"]));
        match settle(&jobs, &bad).await {
            JobStatus::Failed { message } => assert_eq!(message, "unknown subject Nope"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(jobs.get("missing").is_none());
    }

    #[test]
    fn status_is_tagged() {
        let v = serde_json::to_value(JobStatus::Failed { message: "boom".into() }).unwrap();
        assert_eq!(v, serde_json::json!({"status": "failed", "message": "boom"}));
    }
}
