use std::net::UdpSocket;

use cadence::{
    Counted, Gauged, Histogrammed, MetricError, MetricResult, StatsdClient, UdpMetricSink,
};
use tokio::time::Instant;
use tracing::warn;

use crate::config::{ServiceIdentity, Settings};
use crate::outcome::{TickMetrics, TickOutcome};

/// Metric names end up as `jira.poll.issue_count` and friends.
pub const METRIC_PREFIX: &str = "jira.poll";

/// Emits the per-tick observability triple: one structured log event and
/// the statsd metric set. Sink failures are logged and swallowed; nothing
/// in here may interrupt the poll loop.
pub struct TickEmitter {
    statsd: StatsdClient,
    identity: ServiceIdentity,
}

impl TickEmitter {
    pub fn new(statsd: StatsdClient, identity: ServiceIdentity) -> Self {
        Self { statsd, identity }
    }

    /// Wire up a DogStatsD client over UDP from the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, MetricError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        let sink = UdpMetricSink::from(
            (settings.dd_agent_host.as_str(), settings.dd_dogstatsd_port),
            socket,
        )?;
        let statsd = StatsdClient::builder(METRIC_PREFIX, sink).build();

        Ok(Self::new(statsd, settings.identity()))
    }

    /// Emit exactly one log event and one metric set for the tick.
    /// `tick_started` is the tick's T0; the latency histogram covers the
    /// request plus the log emission, measured just before the sends.
    pub fn emit(&self, outcome: &TickOutcome, tick_started: Instant) {
        match outcome {
            TickOutcome::Success {
                issue_count,
                sample_keys,
            } => {
                tracing::info!(issue_count, sample_keys = ?sample_keys, "jira_search_ok");
            }
            TickOutcome::Failure {
                error_kind,
                error_message,
            } => {
                tracing::error!(error_kind, error_message = %error_message, "jira_search_error");
            }
        }

        let metrics = TickMetrics::derive(outcome, tick_started.elapsed());
        self.send_metrics(&metrics);
    }

    fn send_metrics(&self, metrics: &TickMetrics) {
        let ServiceIdentity {
            service,
            environment,
            version,
        } = &self.identity;

        log_sink_error(
            "issue_count",
            self.statsd
                .gauge_with_tags("issue_count", metrics.issue_count)
                .with_tag("service", service)
                .with_tag("env", environment)
                .with_tag("version", version)
                .try_send(),
        );

        log_sink_error(
            "latency_ms",
            self.statsd
                .histogram_with_tags("latency_ms", metrics.elapsed_ms)
                .with_tag("service", service)
                .with_tag("env", environment)
                .with_tag("version", version)
                .try_send(),
        );

        let counter_name = if metrics.ok { "success" } else { "failure" };
        let mut counter = self
            .statsd
            .count_with_tags(counter_name, 1)
            .with_tag("service", service)
            .with_tag("env", environment)
            .with_tag("version", version);
        if let Some(kind) = metrics.error_kind {
            counter = counter.with_tag("error_kind", kind);
        }
        log_sink_error(counter_name, counter.try_send());
    }
}

fn log_sink_error<T>(metric: &str, result: MetricResult<T>) {
    if let Err(err) = result {
        warn!(metric, error = %err, "failed to send statsd metric");
    }
}
