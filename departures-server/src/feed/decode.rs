//! Binary GTFS-Realtime decoder.
//!
//! Turns a protobuf `FeedMessage` into flat raw records. Attribution is
//! atomic per entity: a trip update whose descriptor lacks a route id or
//! trip id contributes nothing, so no departure can ever be stored with a
//! missing parent.

use gtfs_rt::FeedMessage;
use prost::Message;
use tracing::debug;

use super::error::DecodeError;

/// One stop-time update as read off the wire, before any policy is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStopTimeUpdate {
    pub route_id: String,
    pub trip_id: String,
    pub vehicle_id: Option<String>,
    pub stop_id: String,
    /// Scheduled departure as Unix seconds.
    pub scheduled_epoch_secs: i64,
    /// Signed delay in seconds.
    pub delay_secs: i64,
}

/// Decode a binary GTFS-RT payload into raw stop-time updates.
///
/// Skipped without error: entities with no trip update, trip updates with
/// incomplete route/trip attribution (the whole entity is dropped), and
/// stop-time updates lacking a stop id or a departure event with a time.
pub fn decode_binary(raw: &[u8]) -> Result<Vec<RawStopTimeUpdate>, DecodeError> {
    let feed = FeedMessage::decode(raw)?;
    debug!(entities = feed.entity.len(), "decoded GTFS-RT feed message");

    let mut records = Vec::new();

    for entity in feed.entity {
        let Some(trip_update) = entity.trip_update else {
            continue;
        };

        let trip = &trip_update.trip;
        let (Some(route_id), Some(trip_id)) = (trip.route_id.clone(), trip.trip_id.clone()) else {
            continue;
        };

        let vehicle_id = trip_update.vehicle.as_ref().and_then(|v| v.id.clone());

        for stu in trip_update.stop_time_update {
            let Some(stop_id) = stu.stop_id else {
                continue;
            };
            let Some(departure) = stu.departure else {
                continue;
            };
            let Some(time) = departure.time else {
                continue;
            };

            records.push(RawStopTimeUpdate {
                route_id: route_id.clone(),
                trip_id: trip_id.clone(),
                vehicle_id: vehicle_id.clone(),
                stop_id,
                scheduled_epoch_secs: time,
                delay_secs: i64::from(departure.delay.unwrap_or(0)),
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_rt::{
        trip_update::{StopTimeEvent, StopTimeUpdate},
        FeedEntity, FeedHeader, TripDescriptor, TripUpdate, VehicleDescriptor,
    };

    fn entity(id: &str, trip_update: Option<TripUpdate>) -> FeedEntity {
        FeedEntity {
            id: id.to_string(),
            trip_update,
            ..Default::default()
        }
    }

    fn stop_time(stop_id: Option<&str>, time: Option<i64>, delay: Option<i32>) -> StopTimeUpdate {
        StopTimeUpdate {
            stop_id: stop_id.map(String::from),
            departure: time.map(|t| StopTimeEvent {
                time: Some(t),
                delay,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn trip_update(
        route_id: Option<&str>,
        trip_id: Option<&str>,
        vehicle_id: Option<&str>,
        stop_time_update: Vec<StopTimeUpdate>,
    ) -> TripUpdate {
        TripUpdate {
            trip: TripDescriptor {
                route_id: route_id.map(String::from),
                trip_id: trip_id.map(String::from),
                ..Default::default()
            },
            vehicle: vehicle_id.map(|id| VehicleDescriptor {
                id: Some(id.to_string()),
                ..Default::default()
            }),
            stop_time_update,
            ..Default::default()
        }
    }

    fn encode(entities: Vec<FeedEntity>) -> Vec<u8> {
        let feed = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                ..Default::default()
            },
            entity: entities,
        };
        feed.encode_to_vec()
    }

    #[test]
    fn decodes_complete_records() {
        let raw = encode(vec![entity(
            "e1",
            Some(trip_update(
                Some("RED"),
                Some("trip_1"),
                Some("bus_9"),
                vec![stop_time(Some("72"), Some(1_700_000_000), Some(60))],
            )),
        )]);

        let records = decode_binary(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].route_id, "RED");
        assert_eq!(records[0].trip_id, "trip_1");
        assert_eq!(records[0].vehicle_id.as_deref(), Some("bus_9"));
        assert_eq!(records[0].stop_id, "72");
        assert_eq!(records[0].scheduled_epoch_secs, 1_700_000_000);
        assert_eq!(records[0].delay_secs, 60);
    }

    #[test]
    fn drops_whole_entity_when_attribution_incomplete() {
        // Missing trip_id: the valid stop-time update inside must not leak.
        let raw = encode(vec![
            entity(
                "e1",
                Some(trip_update(
                    Some("RED"),
                    None,
                    None,
                    vec![stop_time(Some("72"), Some(1_700_000_000), Some(0))],
                )),
            ),
            entity(
                "e2",
                Some(trip_update(
                    None,
                    Some("trip_2"),
                    None,
                    vec![stop_time(Some("73"), Some(1_700_000_000), Some(0))],
                )),
            ),
        ]);

        assert!(decode_binary(&raw).unwrap().is_empty());
    }

    #[test]
    fn skips_updates_without_stop_or_departure() {
        let raw = encode(vec![entity(
            "e1",
            Some(trip_update(
                Some("RED"),
                Some("trip_1"),
                None,
                vec![
                    stop_time(None, Some(1_700_000_000), Some(0)),
                    stop_time(Some("74"), None, None),
                    stop_time(Some("75"), Some(1_700_000_100), None),
                ],
            )),
        )]);

        let records = decode_binary(&raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stop_id, "75");
        assert_eq!(records[0].delay_secs, 0);
    }

    #[test]
    fn ignores_entities_without_trip_updates() {
        let raw = encode(vec![entity("e1", None)]);
        assert!(decode_binary(&raw).unwrap().is_empty());
    }

    #[test]
    fn malformed_bytes_are_an_error() {
        let result = decode_binary(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(DecodeError::Protobuf(_))));
    }
}
