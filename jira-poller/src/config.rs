use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

/// Poller settings, sourced from the environment once at startup and
/// read-only for the lifetime of the loop.
#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    #[serde(default = "default_jql")]
    pub jira_jql: String,
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(default)]
    pub jira_max_results: Option<u32>,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_agent_host")]
    pub dd_agent_host: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_dogstatsd_port")]
    pub dd_dogstatsd_port: u16,
    #[serde(default = "default_service")]
    pub dd_service: String,
    #[serde(default = "default_environment")]
    pub dd_env: String,
    #[serde(default = "default_version")]
    pub dd_version: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_jql() -> String {
    "assignee = currentUser() ORDER BY updated DESC".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_agent_host() -> String {
    "127.0.0.1".to_string()
}

fn default_dogstatsd_port() -> u16 {
    8125
}

fn default_service() -> String {
    "jira-poller".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Identity tags attached to every metric emission.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub service: String,
    pub environment: String,
    pub version: String,
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            service: self.dd_service.clone(),
            environment: self.dd_env.clone(),
            version: self.dd_version.clone(),
        }
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let required = [
            ("JIRA_BASE_URL", &self.jira_base_url),
            ("JIRA_EMAIL", &self.jira_email),
            ("JIRA_API_TOKEN", &self.jira_api_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!(
                    "{name} must not be empty"
                )));
            }
        }
        if self.poll_interval_seconds == 0 {
            return Err(config::ConfigError::Message(
                "POLL_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    read_config_from(config::Environment::default())
}

fn read_config_from(source: config::Environment) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(source)
        .build()?
        .try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
