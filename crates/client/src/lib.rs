//! Chino.io API client.
//!
//! Async HTTP client using `reqwest`. Credentials live in a shared
//! [`ApiSession`] that every sub-client reads on each request, so a login
//! or logout is seen by all of them. Blob uploads go through
//! [`BlobsApi`], which implements [`chino_blobs::BlobTransport`].

pub mod auth;
pub mod blobs;
pub mod client;
pub mod config;
pub mod error;
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{ApiSession, Credentials};
pub use blobs::BlobsApi;
pub use client::ChinoClient;
pub use config::{AuthConfig, ClientConfig};
pub use error::ApiError;
pub use http::HttpClient;
