//! Metrics exporter for pull-based scraping

use prometheus::{Encoder, Registry, TextEncoder};
use tracing::warn;

/// Export metrics in Prometheus text format.
///
/// Export is best-effort: an encoding failure is logged and yields an
/// empty body rather than an error.
pub fn export_text(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        warn!(error = %e, "metrics text export was not valid UTF-8");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    #[test]
    fn exports_registered_counter() {
        let registry = Registry::new();
        let counter = IntCounter::new("test_counter", "A test counter").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let output = export_text(&registry);
        assert!(output.contains("test_counter"));
        assert!(output.contains('1'));
    }
}
