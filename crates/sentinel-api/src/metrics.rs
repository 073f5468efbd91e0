//! Prometheus counters for the scoring endpoints
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    pub generated_test_cases: IntCounter,
    pub analyses: IntCounter,
    /// Labelled by endpoint name
    pub endpoint_failures: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generated_test_cases = IntCounter::new(
            "sentinel_generated_test_cases_total",
            "Test cases inserted by the generation endpoint",
        )?;
        let analyses = IntCounter::new("sentinel_analyses_total", "Analysis results produced")?;
        let endpoint_failures = IntCounterVec::new(
            Opts::new("sentinel_endpoint_failures_total", "Endpoint calls answered with an error"),
            &["endpoint"],
        )?;

        registry.register(Box::new(generated_test_cases.clone()))?;
        registry.register(Box::new(analyses.clone()))?;
        registry.register(Box::new(endpoint_failures.clone()))?;

        Ok(Self {
            registry,
            generated_test_cases,
            analyses,
            endpoint_failures,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn failed(&self, endpoint: &str) {
        self.endpoint_failures.with_label_values(&[endpoint]).inc();
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
