//! Run metrics: counters for fetch outcomes, timers for fetch duration.
//!
//! Generalized from the proxy's statsd-backed `Metrics` wrapper. A batch job
//! has no long-lived statsd agent to assume is present, so `Metrics::new`
//! can fail over to [`Metrics::new_noop`] the same way the original falls
//! back to a `Noop` backend rather than making every caller handle a missing
//! sink.

use cadence::{Counted, MetricError, StatsdClient, Timed, UdpMetricSink};
use std::net::UdpSocket;
use std::sync::Arc;

enum Backend {
    Statsd(StatsdClient),
    Noop,
}

#[derive(Clone)]
pub struct Metrics {
    backend: Arc<Backend>,
}

impl Metrics {
    pub fn new(statsd_host: &str, statsd_port: u16, prefix: &str) -> Result<Self, MetricError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        let sink = UdpMetricSink::from((statsd_host, statsd_port), socket)?;
        let client = StatsdClient::from_sink(prefix, sink);
        Ok(Metrics { backend: Arc::new(Backend::Statsd(client)) })
    }

    pub fn new_noop() -> Self {
        Metrics { backend: Arc::new(Backend::Noop) }
    }

    pub fn incr(&self, metric: &str, tags: &[(&str, &str)]) {
        let Backend::Statsd(client) = self.backend.as_ref() else { return };
        let result = if tags.is_empty() {
            client.count(metric, 1)
        } else {
            let mut counter = client.count_with_tags(metric, 1);
            for (k, v) in tags {
                counter = counter.with_tag(k, v);
            }
            counter.try_send()
        };
        if let Err(e) = result {
            tracing::warn!(metric, error = %e, "failed to send metric");
        }
    }

    pub fn timing(&self, metric: &str, value_ms: u64, tags: &[(&str, &str)]) {
        let Backend::Statsd(client) = self.backend.as_ref() else { return };
        let result = if tags.is_empty() {
            client.time(metric, value_ms)
        } else {
            let mut timer = client.time_with_tags(metric, value_ms);
            for (k, v) in tags {
                timer = timer.with_tag(k, v);
            }
            timer.try_send()
        };
        if let Err(e) = result {
            tracing::warn!(metric, error = %e, "failed to send metric");
        }
    }
}
