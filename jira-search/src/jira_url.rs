#[derive(Debug, Clone)]
pub struct JiraUrl(String);

impl AsRef<str> for JiraUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl JiraUrl {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self(base_url.into())
    }

    /// Append the given path to the URL, normalizing slashes on both sides.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }
}
