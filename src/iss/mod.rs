mod client;
mod coordinate_deserializer;
mod domain;
mod fetch;

pub use client::{IssClientError, new_client};
pub use fetch::{FetchError, fetch_position};
