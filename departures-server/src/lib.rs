//! Real-time transit departures server.
//!
//! Ingests a GTFS-Realtime feed on demand, normalizes it into per-stop
//! departure lists, and serves the freshest known data from a two-tier
//! (volatile + durable) cache.

pub mod config;
pub mod domain;
pub mod feed;
pub mod ingest;
pub mod store;
pub mod web;
