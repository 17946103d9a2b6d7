//! Client for a BigCommerce-style store management API.
//!
//! [`ApiClient`] issues authenticated JSON requests against
//! `https://api.bigcommerce.com/stores/<store_hash>/`, unwraps the
//! `{"data": ..., "meta": ...}` envelope, aggregates paginated collections and
//! deletes whole filtered collections page by page.

pub mod client;
pub mod envelope;
pub mod error;
mod retry;

pub use client::{ApiClient, ClientSettings, PageFetch, Query, DEFAULT_DELETE_LIMIT};
pub use envelope::{read_envelope, Envelope, Meta, Page, Pagination};
pub use error::ApiError;
