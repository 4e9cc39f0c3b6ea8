//! Departure normalization policy.
//!
//! Converts raw stop-time updates into `Departure`s, applies the temporal
//! window, derives delay status, then groups per stop, sorts by predicted
//! time and caps the list length.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DelayStatus, Departure};

use super::decode::RawStopTimeUpdate;

/// Most departures kept per stop after sorting.
pub const MAX_DEPARTURES_PER_STOP: usize = 10;

/// How far in the past a prediction may be and still be served.
const PAST_GRACE_SECS: i64 = 60;

/// How far in the future a prediction may be and still be served.
const FUTURE_HORIZON_SECS: i64 = 2 * 60 * 60;

/// Normalize raw records into per-stop departure lists.
///
/// Records whose predicted time falls strictly more than 60 seconds before
/// `now`, or strictly more than two hours after it, are dropped. Within a
/// stop the sort is stable, so records with equal predicted times keep
/// their feed order.
pub fn normalize(
    records: Vec<RawStopTimeUpdate>,
    now: DateTime<Utc>,
) -> HashMap<String, Vec<Departure>> {
    let earliest = now - Duration::seconds(PAST_GRACE_SECS);
    let latest = now + Duration::seconds(FUTURE_HORIZON_SECS);

    let mut by_stop: HashMap<String, Vec<Departure>> = HashMap::new();

    for record in records {
        let Some(scheduled) = DateTime::from_timestamp(record.scheduled_epoch_secs, 0) else {
            continue;
        };
        let predicted = scheduled + Duration::seconds(record.delay_secs);

        if predicted < earliest || predicted > latest {
            continue;
        }

        let departure = Departure {
            route_id: record.route_id,
            trip_id: record.trip_id,
            stop_id: record.stop_id.clone(),
            scheduled_time: scheduled,
            predicted_time: predicted,
            delay_seconds: record.delay_secs,
            vehicle_id: record.vehicle_id,
            status: DelayStatus::from_delay_secs(record.delay_secs),
        };

        by_stop.entry(record.stop_id).or_default().push(departure);
    }

    for departures in by_stop.values_mut() {
        departures.sort_by_key(|d| d.predicted_time);
        departures.truncate(MAX_DEPARTURES_PER_STOP);
    }

    by_stop
}
