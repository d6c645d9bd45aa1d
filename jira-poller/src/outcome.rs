use std::time::Duration;

use jira_search::{SearchError, SearchResponse};

/// How many issue keys a success outcome carries as a sample.
pub const SAMPLE_KEY_LIMIT: usize = 3;

/// Result of a single poll tick. Exactly one variant per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Success {
        issue_count: u64,
        sample_keys: Vec<String>,
    },
    Failure {
        error_kind: &'static str,
        error_message: String,
    },
}

impl TickOutcome {
    pub fn from_result(result: Result<SearchResponse, SearchError>) -> Self {
        match result {
            Ok(response) => TickOutcome::Success {
                issue_count: response.total,
                sample_keys: response.sample_keys(SAMPLE_KEY_LIMIT),
            },
            Err(err) => TickOutcome::Failure {
                error_kind: err.kind(),
                error_message: err.to_string(),
            },
        }
    }
}

/// Per-tick measurements, derived from the outcome and consumed by the
/// metric emission. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMetrics {
    pub elapsed_ms: f64,
    pub issue_count: u64,
    pub ok: bool,
    pub error_kind: Option<&'static str>,
}

impl TickMetrics {
    pub fn derive(outcome: &TickOutcome, elapsed: Duration) -> Self {
        let (issue_count, ok, error_kind) = match outcome {
            TickOutcome::Success { issue_count, .. } => (*issue_count, true, None),
            TickOutcome::Failure { error_kind, .. } => (0, false, Some(*error_kind)),
        };

        Self {
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            issue_count,
            ok,
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jira_search::SearchError;

    fn response(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_truncates_sample_keys_in_order() {
        let outcome = TickOutcome::from_result(Ok(response(
            r#"{"total": 7, "issues": [
                {"key":"A-1"},{"key":"A-2"},{"key":"A-3"},{"key":"A-4"}
            ]}"#,
        )));

        assert_eq!(
            outcome,
            TickOutcome::Success {
                issue_count: 7,
                sample_keys: vec!["A-1".into(), "A-2".into(), "A-3".into()],
            }
        );
    }

    #[test]
    fn success_with_fewer_issues_keeps_them_all() {
        let outcome = TickOutcome::from_result(Ok(response(
            r#"{"total": 2, "issues": [{"key":"B-1"},{"key":"B-2"}]}"#,
        )));

        assert_eq!(
            outcome,
            TickOutcome::Success {
                issue_count: 2,
                sample_keys: vec!["B-1".into(), "B-2".into()],
            }
        );
    }

    #[test]
    fn empty_result_set_is_a_success() {
        let outcome = TickOutcome::from_result(Ok(response(r#"{"total": 0, "issues": []}"#)));

        assert_eq!(
            outcome,
            TickOutcome::Success {
                issue_count: 0,
                sample_keys: vec![],
            }
        );
    }

    #[test]
    fn failure_carries_kind_and_message() {
        let outcome = TickOutcome::from_result(Err(SearchError::Timeout));

        let TickOutcome::Failure {
            error_kind,
            error_message,
        } = outcome
        else {
            panic!("expected a failure outcome");
        };
        assert_eq!(error_kind, "timeout");
        assert!(!error_message.is_empty());
    }

    #[test]
    fn metrics_zero_the_gauge_on_failure() {
        let outcome = TickOutcome::Failure {
            error_kind: "timeout",
            error_message: "request timed out".into(),
        };
        let metrics = TickMetrics::derive(&outcome, Duration::from_millis(1500));

        assert_eq!(metrics.issue_count, 0);
        assert!(!metrics.ok);
        assert_eq!(metrics.error_kind, Some("timeout"));
        assert!((metrics.elapsed_ms - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn metrics_report_the_success_count() {
        let outcome = TickOutcome::Success {
            issue_count: 7,
            sample_keys: vec!["A-1".into()],
        };
        let metrics = TickMetrics::derive(&outcome, Duration::from_millis(40));

        assert_eq!(metrics.issue_count, 7);
        assert!(metrics.ok);
        assert_eq!(metrics.error_kind, None);
    }
}
