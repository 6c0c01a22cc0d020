// HTTP client for the ArtWeave API: timeout-bounded requests, classified
// errors, and typed endpoint helpers.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, RequestOptions, DEFAULT_TIMEOUT};
pub use error::{ApiError, ErrorKind};
