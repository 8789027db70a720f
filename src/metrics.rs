//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Auth Metrics
    pub static ref AUTH_EVENTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("lendauth_auth_events_total", "Authentication events by kind and outcome"),
        &["event", "outcome"]
    ).expect("metric can be created");
    pub static ref TOKENS_ISSUED_TOTAL: IntCounter = IntCounter::new(
        "lendauth_tokens_issued_total",
        "Total number of session tokens issued"
    ).expect("metric can be created");
    pub static ref TOKENS_PRUNED_TOTAL: IntCounter = IntCounter::new(
        "lendauth_tokens_pruned_total",
        "Total number of invalid or expired tokens removed from the allow-list"
    ).expect("metric can be created");
    pub static ref ACTIVE_TOKENS: IntGauge = IntGauge::new(
        "lendauth_active_tokens",
        "Tokens on the allow-list after the last sweep"
    ).expect("metric can be created");

    // Application Metrics
    pub static ref USERS_TOTAL: IntGauge = IntGauge::new(
        "lendauth_users_total",
        "Total number of registered users"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("lendauth_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; registration happens on the first call.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(AUTH_EVENTS_TOTAL.clone()))
            .expect("AUTH_EVENTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TOKENS_ISSUED_TOTAL.clone()))
            .expect("TOKENS_ISSUED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TOKENS_PRUNED_TOTAL.clone()))
            .expect("TOKENS_PRUNED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ACTIVE_TOKENS.clone()))
            .expect("ACTIVE_TOKENS can be registered");
        REGISTRY
            .register(Box::new(USERS_TOTAL.clone()))
            .expect("USERS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Record the outcome of an authentication event.
pub fn observe_auth_event(event: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    AUTH_EVENTS_TOTAL.with_label_values(&[event, outcome]).inc();
}
