//! Prometheus metrics registry and instruments.
//!
//! Instruments can be updated before `init_metrics` runs; registration only
//! makes them visible through `REGISTRY`.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref ACTIVITIES_RECEIVED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("apkernel_activities_received_total", "Total number of inbound activities dispatched"),
        &["activity_type"]
    ).expect("metric can be created");
    pub static ref DELETE_DISPATCH_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("apkernel_delete_dispatch_total", "Delete activities by routing outcome"),
        &["outcome", "object_class"]
    ).expect("metric can be created");
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("apkernel_errors_total", "Total number of rejected activities"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(ACTIVITIES_RECEIVED_TOTAL.clone()))
        .expect("ACTIVITIES_RECEIVED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(DELETE_DISPATCH_TOTAL.clone()))
        .expect("DELETE_DISPATCH_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Render the registry in the Prometheus text exposition format.
pub fn render() -> String {
    let encoder = prometheus::TextEncoder::new();
    match encoder.encode_to_string(&REGISTRY.gather()) {
        Ok(metrics_text) => metrics_text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            String::new()
        }
    }
}
