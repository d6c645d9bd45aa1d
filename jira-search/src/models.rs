use serde::{Deserialize, Serialize};

/// Fields requested from the search endpoint. Kept to the minimum the
/// poller reports on.
pub const DEFAULT_FIELDS: [&str; 3] = ["key", "summary", "updated"];

pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// One search request body, as the Jira Cloud `/search/jql` endpoint
/// expects it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub max_results: u32,
    pub fields: Vec<String>,
}

impl SearchRequest {
    /// Build a request from configuration. Pure and idempotent: the same
    /// inputs always yield a structurally identical request.
    pub fn new(jql: impl Into<String>, max_results: Option<u32>) -> Self {
        Self {
            jql: jql.into(),
            max_results: max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Successful search response. `total` and `issues` both default when the
/// server omits them; an issue without a `key` is a decode failure.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchResponse {
    /// The first `limit` issue keys, in response order.
    pub fn sample_keys(&self, limit: usize) -> Vec<String> {
        self.issues
            .iter()
            .take(limit)
            .map(|issue| issue.key.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_jira_wire_shape() {
        let request = SearchRequest::new("project = ABC", Some(10));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "jql": "project = ABC",
                "maxResults": 10,
                "fields": ["key", "summary", "updated"],
            })
        );
    }

    #[test]
    fn request_defaults_max_results() {
        let request = SearchRequest::new("project = ABC", None);

        assert_eq!(request.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn request_builder_is_idempotent() {
        let first = SearchRequest::new("assignee = currentUser()", Some(5));
        let second = SearchRequest::new("assignee = currentUser()", Some(5));

        assert_eq!(first, second);
    }

    #[test]
    fn response_decodes_total_and_keys() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "total": 7,
                "issues": [
                    {"key": "A-1", "fields": {"summary": "first", "updated": "2024-01-01T00:00:00.000+0000"}},
                    {"key": "A-2"},
                    {"key": "A-3"},
                    {"key": "A-4"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.total, 7);
        assert_eq!(response.sample_keys(3), vec!["A-1", "A-2", "A-3"]);
    }

    #[test]
    fn response_defaults_missing_total_and_issues() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();

        assert_eq!(response.total, 0);
        assert!(response.issues.is_empty());
        assert!(response.sample_keys(3).is_empty());
    }

    #[test]
    fn issue_without_key_fails_to_decode() {
        let result: Result<SearchResponse, _> =
            serde_json::from_str(r#"{"total": 1, "issues": [{"id": "10001"}]}"#);

        assert!(result.is_err());
    }
}
