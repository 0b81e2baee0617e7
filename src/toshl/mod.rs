//! Toshl Finance API: client, cached reference data and lookups.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod lookup;
pub mod types;

pub use cached_client::CachedToshlClient;
pub use client::ToshlClient;
