//! # Cachify HTTP
//!
//! The small slice of HTTP plumbing the Cachify engine needs to act as a
//! request-pipeline stage: a mutable [`Request`], a [`Response`] whose headers
//! can be adjusted after the downstream stage ran, type-keyed request
//! [`Extensions`], and the [`Handler`] / [`Middleware`] traits.
//!
//! Serving, routing and connection handling belong to the host server.

#![warn(missing_docs)]

pub mod extensions;
pub mod middleware;
pub mod request;
pub mod response;

pub use extensions::Extensions;
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;

/// Errors raised while building requests or running a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The request could not be assembled (invalid URI, missing parts).
	#[error("Invalid request: {0}")]
	InvalidRequest(String),
	/// A handler failed while producing a response.
	#[error("Handler error: {0}")]
	Handler(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
