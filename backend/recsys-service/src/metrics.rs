use prometheus::{Encoder, Histogram, IntCounter, IntCounterVec, TextEncoder};

lazy_static::lazy_static! {
    pub static ref EVENTS_RECORDED_TOTAL: IntCounter = prometheus::register_int_counter!(
        "recsys_events_recorded_total",
        "Play events recorded in the event history store"
    ).unwrap();

    pub static ref OFFLINE_REQUESTS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "recsys_offline_requests_total",
        "Offline lookups by serving table",
        &["source"]
    ).unwrap();

    pub static ref ONLINE_LEG_OUTCOMES_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "recsys_online_leg_outcomes_total",
        "Online candidate generation outcomes",
        &["outcome"]
    ).unwrap();

    pub static ref BLENDED_REQUEST_DURATION_SECONDS: Histogram = prometheus::register_histogram!(
        "recsys_blended_request_duration_seconds",
        "Latency of blended recommendation requests",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    ).unwrap();
}

/// Online leg outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineOutcome {
    Candidates,
    NoSignal,
    Degraded,
}

impl OnlineOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnlineOutcome::Candidates => "candidates",
            OnlineOutcome::NoSignal => "no_signal",
            OnlineOutcome::Degraded => "degraded",
        }
    }
}

pub fn record_online_outcome(outcome: OnlineOutcome) {
    ONLINE_LEG_OUTCOMES_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
}

/// Render the default registry in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_registered_metrics() {
        EVENTS_RECORDED_TOTAL.inc();
        record_online_outcome(OnlineOutcome::NoSignal);

        let text = render().expect("render metrics");
        assert!(text.contains("recsys_events_recorded_total"));
        assert!(text.contains("recsys_online_leg_outcomes_total"));
    }
}
