//! Feed ingestion: decode, normalize, fetch.

mod decode;
mod error;
mod fetch;
mod markup;
mod normalize;

pub use decode::{RawStopTimeUpdate, decode_binary};
pub use error::{DecodeError, FetchError};
pub use fetch::{FeedFetcher, FetchConfig};
pub use markup::{MarkupSchema, decode_markup};
pub use normalize::{MAX_DEPARTURES_PER_STOP, normalize};
