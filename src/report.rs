//! Serializable per-company reports for batch runs.

use leadscout_discovery::{BatchOutcome, DiscoveryResult, JobOutcome};
use serde::{Deserialize, Serialize};

/// How one company's job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
    NotStarted,
}

/// The outcome of one company's job, ready to print as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub company_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DiscoveryResult>,
}

impl From<BatchOutcome> for JobReport {
    fn from(outcome: BatchOutcome) -> Self {
        let company_id = outcome.company_id;
        match outcome.outcome {
            JobOutcome::Completed(result) => Self {
                company_id,
                status: JobStatus::Completed,
                error: None,
                result: Some(result),
            },
            JobOutcome::Failed(err) => Self {
                company_id,
                status: JobStatus::Failed,
                error: Some(err.to_string()),
                result: None,
            },
            JobOutcome::NotStarted => Self {
                company_id,
                status: JobStatus::NotStarted,
                error: None,
                result: None,
            },
        }
    }
}

/// Totals across a batch, for the closing log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub companies: usize,
    pub completed: usize,
    pub failed: usize,
    pub not_started: usize,
    pub executives: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[JobReport]) -> Self {
        reports.iter().fold(
            Self {
                companies: reports.len(),
                ..Self::default()
            },
            |mut acc, report| {
                match report.status {
                    JobStatus::Completed => acc.completed += 1,
                    JobStatus::Failed => acc.failed += 1,
                    JobStatus::NotStarted => acc.not_started += 1,
                }
                acc.executives += report.result.as_ref().map_or(0, |r| r.executives.len());
                acc
            },
        )
    }
}
