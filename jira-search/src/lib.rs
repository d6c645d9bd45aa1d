mod client;
mod jira_url;
pub mod models;

pub(crate) use jira_url::*;

pub use client::*;
pub use models::{Issue, IssueFields, SearchRequest, SearchResponse};
