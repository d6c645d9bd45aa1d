use std::process;

use jira_search::{Credentials, SearchClient};
use tracing::info;

mod config;
mod emitter;
mod outcome;
mod scheduler;
mod telemetry;

use emitter::TickEmitter;
use scheduler::PollScheduler;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Configuration is validated before any telemetry exists: a
    // misconfigured process exits without emitting a single log line,
    // span, or metric.
    let settings = match config::read_config() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("fatal: invalid configuration: {err}");
            process::exit(1);
        }
    };

    telemetry::init_tracing(&settings.log_level);

    let emitter = match TickEmitter::from_settings(&settings) {
        Ok(emitter) => emitter,
        Err(err) => {
            eprintln!("fatal: could not set up statsd client: {err}");
            process::exit(1);
        }
    };

    let credentials = Credentials::new(settings.jira_email.clone(), settings.jira_api_token.clone());
    let client = match SearchClient::new(settings.jira_base_url.clone(), credentials) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("fatal: could not build search client: {err}");
            process::exit(1);
        }
    };

    info!(
        jira_base_url = %settings.jira_base_url,
        poll_interval_seconds = settings.poll_interval_seconds,
        dd_agent_host = %settings.dd_agent_host,
        dd_dogstatsd_port = settings.dd_dogstatsd_port,
        service = %settings.dd_service,
        env = %settings.dd_env,
        version = %settings.dd_version,
        "starting"
    );

    let scheduler = PollScheduler::new(client, emitter, &settings);

    // An in-flight request is simply dropped on termination; nothing is
    // persisted mid-tick.
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }
}
