use chrono::Local;
use orion_sync_engine::{db_types::ReconcileSummary, materialize::DATE_FORMAT};
use serde::Serialize;

/// The JSON document a job prints to stdout when it finishes. Cron wrappers parse this (and the
/// process exit code) to decide whether the run succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub job: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_existing: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_not_found: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_seconds: f64,
}

impl RunReport {
    pub fn new(job: &str) -> Self {
        Self {
            success: false,
            job: job.to_string(),
            url: None,
            inserted: None,
            updated: None,
            skipped_existing: None,
            skipped_not_found: None,
            file: None,
            records: None,
            bytes: None,
            error: None,
            duration_seconds: 0.0,
        }
    }

    pub fn failed(mut self, error: impl ToString, duration_seconds: f64) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self.duration_seconds = round4(duration_seconds);
        self
    }

    pub fn reconciled(mut self, summary: &ReconcileSummary) -> Self {
        self.success = true;
        self.inserted = Some(summary.inserted);
        self.updated = Some(summary.updated);
        self.skipped_existing = Some(summary.skipped_existing);
        self.skipped_not_found = Some(summary.skipped_not_found);
        self.duration_seconds = summary.duration_seconds;
        self
    }
}

/// The aggregate document printed by `run-all`. It succeeds only when every job did.
#[derive(Debug, Clone, Serialize)]
pub struct MasterReport {
    pub success: bool,
    pub generated_at: String,
    pub jobs: Vec<RunReport>,
    pub duration_seconds: f64,
}

impl MasterReport {
    pub fn new(jobs: Vec<RunReport>, duration_seconds: f64) -> Self {
        Self {
            success: jobs.iter().all(|j| j.success),
            generated_at: Local::now().format(DATE_FORMAT).to_string(),
            jobs,
            duration_seconds: round4(duration_seconds),
        }
    }
}

pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reports_omit_fields_that_do_not_apply() {
        let report = RunReport::new("import").failed("boom", 0.123_456);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["error"], serde_json::json!("boom"));
        assert_eq!(value["duration_seconds"], serde_json::json!(0.1235));
        assert!(value.get("inserted").is_none());
        assert!(value.get("file").is_none());
    }

    #[test]
    fn master_success_is_the_conjunction_of_job_successes() {
        let good = RunReport::new("import").reconciled(&ReconcileSummary::default());
        let bad = RunReport::new("snapshot-orders").failed("disk full", 0.1);
        assert!(MasterReport::new(vec![good.clone()], 0.2).success);
        assert!(!MasterReport::new(vec![good, bad], 0.2).success);
    }
}
