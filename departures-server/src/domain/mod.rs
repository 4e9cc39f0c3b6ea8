//! Core domain types for per-stop departure data.

mod departure;

pub use departure::{DelayStatus, Departure, StopPayload};
