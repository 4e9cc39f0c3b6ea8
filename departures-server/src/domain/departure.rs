//! The `Departure` entity and its delay-status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delay beyond which a departure is classified as delayed (seconds).
/// The mirror image applies for early running.
const STATUS_THRESHOLD_SECS: i64 = 90;

/// How a departure is running relative to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelayStatus {
    Early,
    OnTime,
    Delayed,
}

impl DelayStatus {
    /// Classify a signed delay in seconds. The threshold is ±90 seconds;
    /// exactly 90 (or -90) still counts as on time.
    pub fn from_delay_secs(delay_secs: i64) -> Self {
        if delay_secs > STATUS_THRESHOLD_SECS {
            DelayStatus::Delayed
        } else if delay_secs < -STATUS_THRESHOLD_SECS {
            DelayStatus::Early
        } else {
            DelayStatus::OnTime
        }
    }
}

/// One predicted vehicle departure at one stop.
///
/// A `Departure` is only ever constructed from a feed record that carried a
/// stop id, a route/trip attribution and a departure event; records missing
/// any of those are dropped upstream rather than stored with holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Line identifier.
    pub route_id: String,

    /// Unique identifier of the scheduled run.
    pub trip_id: String,

    /// Stop this prediction applies to.
    pub stop_id: String,

    /// Scheduled departure time. May be the epoch origin when the feed
    /// omitted it.
    pub scheduled_time: DateTime<Utc>,

    /// Predicted departure time: scheduled time plus delay.
    pub predicted_time: DateTime<Utc>,

    /// Signed delay in seconds; negative means running early.
    pub delay_seconds: i64,

    /// Vehicle identifier, when the feed supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,

    /// Derived running status.
    pub status: DelayStatus,
}

/// The value served for one stop: when it was computed, and the departures.
///
/// This is both the `GET /stop/{id}` response body and the value written to
/// the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPayload {
    /// When the ingestion cycle that produced this data completed.
    pub updated_at: DateTime<Utc>,

    /// Departures for the stop, soonest first, at most ten.
    pub departures: Vec<Departure>,
}
