/// In-memory registry of parse jobs, keyed by match id.
///
/// Jobs only live for the lifetime of the process. Finished matches are
/// served from disk, so a restart loses the progress records but not the
/// results.
#[derive(Default)]
pub struct JobStore {
    jobs: std::sync::RwLock<std::collections::HashMap<String, ParseJob>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Parsing,
    Ready,
    Error,
}

impl JobStore {
    pub fn create(&self, id: String) {
        let job = ParseJob {
            id: id.clone(),
            status: JobStatus::Parsing,
            error: None,
            progress: 0.0,
        };
        self.jobs.write().unwrap().insert(id, job);
    }

    pub fn get(&self, id: &str) -> Option<ParseJob> {
        self.jobs.read().unwrap().get(id).cloned()
    }

    pub fn set_progress(&self, id: &str, progress: f32) {
        if let Some(job) = self.jobs.write().unwrap().get_mut(id) {
            job.progress = progress;
        }
    }

    pub fn mark_ready(&self, id: &str) {
        if let Some(job) = self.jobs.write().unwrap().get_mut(id) {
            job.status = JobStatus::Ready;
            job.progress = 1.0;
        }
    }

    pub fn mark_error(&self, id: &str, message: String) {
        if let Some(job) = self.jobs.write().unwrap().get_mut(id) {
            job.status = JobStatus::Error;
            job.error = Some(message);
        }
    }
}
