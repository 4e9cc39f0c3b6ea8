//! Web layer: JSON API over the read path and the ingestion trigger.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
