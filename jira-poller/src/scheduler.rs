use std::time::Duration;

use jira_search::{models::SearchRequest, IssueSearcher};
use tokio::time::Instant;
use tracing::{field, info, info_span, Instrument, Span};

use crate::config::Settings;
use crate::emitter::TickEmitter;
use crate::outcome::TickOutcome;

/// The poll loop. One tick: build the request, execute the search inside
/// its span, emit the outcome, then sleep whatever is left of the
/// interval.
pub struct PollScheduler<S> {
    searcher: S,
    emitter: TickEmitter,
    interval: Duration,
    base_url: String,
    jql: String,
    max_results: Option<u32>,
}

impl<S: IssueSearcher> PollScheduler<S> {
    pub fn new(searcher: S, emitter: TickEmitter, settings: &Settings) -> Self {
        Self {
            searcher,
            emitter,
            interval: settings.poll_interval(),
            base_url: settings.jira_base_url.clone(),
            jql: settings.jira_jql.clone(),
            max_results: settings.jira_max_results,
        }
    }

    /// Fixed-rate loop: the sleep budget is the interval minus the time
    /// the tick took, floored at zero. A slow tick is followed by an
    /// immediate next tick, never by a catch-up burst.
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            jql = %self.jql,
            "poll loop started"
        );

        loop {
            let started = Instant::now();
            self.tick(started).await;
            tokio::time::sleep(sleep_budget(self.interval, started.elapsed())).await;
        }
    }

    async fn tick(&self, started: Instant) {
        let request = SearchRequest::new(self.jql.clone(), self.max_results);

        // The span brackets the search call only; the emission happens
        // after it closes.
        let span = info_span!(
            "jira.poll",
            "jira.base_url" = %self.base_url,
            "jira.jql" = %request.jql,
            error = field::Empty,
            "error.type" = field::Empty,
            "error.msg" = field::Empty,
        );
        let result = async {
            let result = self.searcher.search(&request).await;
            if let Err(err) = &result {
                let span = Span::current();
                span.record("error", true);
                span.record("error.type", err.kind());
                span.record("error.msg", field::display(err));
            }
            result
        }
        .instrument(span)
        .await;

        let outcome = TickOutcome::from_result(result);
        self.emitter.emit(&outcome, started);
    }
}

fn sleep_budget(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
