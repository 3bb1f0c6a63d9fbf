//! Health and version reporting.

use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// GET /HealthCheck - service name, version, and a compact timestamp.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "serviceName": "courier-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": compact_timestamp(Utc::now()),
    }))
}

/// `yyyyMMddHHmmss` timestamp used by the health report.
fn compact_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
