//! Fallback text/markup decoder.
//!
//! The upstream agency publishes an undocumented markup rendition of the
//! feed alongside the protobuf one. We scan it leniently: tag names live in
//! [`MarkupSchema`] rather than being scattered through the parser, and
//! numeric fields are read as plain decimal text. An unparseable delay
//! falls back to zero; an unparseable departure time disqualifies the
//! record.

use scraper::{Html, Selector};
use tracing::debug;

use super::decode::RawStopTimeUpdate;
use super::error::DecodeError;

/// Tag names for the fallback document.
///
/// These are observed, not documented; keeping them in one struct means a
/// schema drift upstream is a constants change here.
#[derive(Debug, Clone)]
pub struct MarkupSchema {
    pub trip_update: &'static str,
    pub route_id: &'static str,
    pub trip_id: &'static str,
    pub vehicle_id: &'static str,
    pub stop_time_update: &'static str,
    pub stop_id: &'static str,
    pub departure_time: &'static str,
    pub departure_delay: &'static str,
}

impl Default for MarkupSchema {
    fn default() -> Self {
        Self {
            trip_update: "tripupdate",
            route_id: "routeid",
            trip_id: "tripid",
            vehicle_id: "vehicleid",
            stop_time_update: "stoptimeupdate",
            stop_id: "stopid",
            departure_time: "time",
            departure_delay: "delay",
        }
    }
}

fn selector(tag: &str) -> Result<Selector, DecodeError> {
    Selector::parse(tag).map_err(|e| DecodeError::Selector(e.to_string()))
}

/// Extract the trimmed text of the first matching child element, if any.
fn child_text(el: &scraper::ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel).next().map(|c| {
        c.text().collect::<String>().trim().to_string()
    })
}

/// Decode the fallback markup document into raw stop-time updates.
///
/// The same atomicity rule as the binary path applies: a trip-update
/// element without both a route id and a trip id is dropped whole. A
/// document with no trip-update elements at all is treated as malformed
/// (`DecodeError::EmptyDocument`) so the fetcher can tell "empty rendition"
/// apart from "feed is quiet right now" at the format level.
pub fn decode_markup(
    text: &str,
    schema: &MarkupSchema,
) -> Result<Vec<RawStopTimeUpdate>, DecodeError> {
    let document = Html::parse_document(text);

    let trip_sel = selector(schema.trip_update)?;
    let route_sel = selector(schema.route_id)?;
    let trip_id_sel = selector(schema.trip_id)?;
    let vehicle_sel = selector(schema.vehicle_id)?;
    let stu_sel = selector(schema.stop_time_update)?;
    let stop_sel = selector(schema.stop_id)?;
    let time_sel = selector(schema.departure_time)?;
    let delay_sel = selector(schema.departure_delay)?;

    let mut saw_trip_update = false;
    let mut records = Vec::new();

    for trip_el in document.select(&trip_sel) {
        saw_trip_update = true;

        let route_id = child_text(&trip_el, &route_sel).filter(|s| !s.is_empty());
        let trip_id = child_text(&trip_el, &trip_id_sel).filter(|s| !s.is_empty());
        let (Some(route_id), Some(trip_id)) = (route_id, trip_id) else {
            continue;
        };

        let vehicle_id = child_text(&trip_el, &vehicle_sel).filter(|s| !s.is_empty());

        for stu_el in trip_el.select(&stu_sel) {
            let Some(stop_id) = child_text(&stu_el, &stop_sel).filter(|s| !s.is_empty()) else {
                continue;
            };
            let Some(time) =
                child_text(&stu_el, &time_sel).and_then(|t| t.parse::<i64>().ok())
            else {
                continue;
            };
            let delay = child_text(&stu_el, &delay_sel)
                .and_then(|d| d.parse::<i64>().ok())
                .unwrap_or(0);

            records.push(RawStopTimeUpdate {
                route_id: route_id.clone(),
                trip_id: trip_id.clone(),
                vehicle_id: vehicle_id.clone(),
                stop_id,
                scheduled_epoch_secs: time,
                delay_secs: delay,
            });
        }
    }

    if !saw_trip_update {
        return Err(DecodeError::EmptyDocument);
    }

    debug!(records = records.len(), "decoded fallback markup document");
    Ok(records)
}
