//! Memory-resident cache for reference-data requests.
//!
//! This module is independent of the remote API:
//! - `CacheStore` keeps the last payload, validators and fetch time per key
//! - `CacheLayer` revalidates with conditional requests on every call and
//!   serves the cached copy when the server reports it unchanged, or when the
//!   request fails and the copy is younger than the staleness ceiling
//! - `Transport` is the request capability the layer is built on

mod error;
mod layer;
mod store;
mod transport;

pub use error::FetchError;
pub use layer::{CacheLayer, DEFAULT_STALENESS_CEILING_DAYS};
pub use store::{CacheEntry, CacheStore, Clock, SystemClock};
pub use transport::{ResourceRequest, Transport, TransportError, TransportResponse, Validators};
