use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once from `main`.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics recorder already initialized");
    }

    describe_counter!(
        "transactions_created_total",
        "Transactions opened with a Tripay invoice"
    );
    describe_counter!(
        "tripay_webhooks_total",
        "Tripay callbacks processed, by outcome"
    );

    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_transaction_created() {
    counter!("transactions_created_total").increment(1);
}

/// `outcome` is `applied` or an `ErrorKind` label.
pub fn record_webhook(outcome: &str) {
    counter!("tripay_webhooks_total", "outcome" => outcome.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_counters_are_rendered() {
        init_metrics().unwrap();

        // Other tests in this binary also bump these counters once the
        // recorder is global; only the uniquely labelled series is exact.
        record_transaction_created();
        record_webhook("metrics_unit");
        record_webhook("metrics_unit");

        let rendered = get_metrics();
        assert!(rendered.contains("transactions_created_total"));
        assert!(rendered.contains(r#"tripay_webhooks_total{outcome="metrics_unit"} 2"#));

        assert!(init_metrics().is_err());
    }
}
