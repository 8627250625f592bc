use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub authorizations_total: IntCounterVec,
    pub backend_requests_total: IntCounterVec,
    pub backend_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let authorizations_total = IntCounterVec::new(
            Opts::new("authorizations_total", "Route authorization decisions by outcome"),
            &["outcome"],
        )
        .expect("valid authorizations_total metric");

        let backend_requests_total = IntCounterVec::new(
            Opts::new("backend_requests_total", "Backend requests by outcome"),
            &["outcome"],
        )
        .expect("valid backend_requests_total metric");

        let backend_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "backend_latency_seconds",
                "Latency of backend requests in seconds",
            ),
            &["outcome"],
        )
        .expect("valid backend_latency_seconds metric");

        registry
            .register(Box::new(authorizations_total.clone()))
            .expect("register authorizations_total");
        registry
            .register(Box::new(backend_requests_total.clone()))
            .expect("register backend_requests_total");
        registry
            .register(Box::new(backend_latency_seconds.clone()))
            .expect("register backend_latency_seconds");

        Self {
            registry,
            authorizations_total,
            backend_requests_total,
            backend_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
