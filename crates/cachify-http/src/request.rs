//! Inbound request representation.

use crate::{Error, Extensions, Result};
use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};

/// HTTP request as seen by pipeline stages.
///
/// `uri` is public and mutable: a stage that rewrites the request target
/// (for example by stripping a fingerprint segment) replaces it in place before
/// forwarding the request.
#[derive(Debug)]
pub struct Request {
	/// Request method
	pub method: Method,
	/// Request target
	pub uri: Uri,
	/// Protocol version
	pub version: Version,
	/// Request headers
	pub headers: HeaderMap,
	/// Request body
	pub body: Bytes,
	/// Request-scoped values shared with later stages
	pub extensions: Extensions,
}

impl Request {
	/// Start building a request.
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/js/app.js?v=2")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.path(), "/js/app.js");
	/// assert_eq!(request.query(), Some("v=2"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Path component of the request target.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Query component of the request target, without the `?`.
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// Replace the path of the request target, keeping its query string.
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Request;
	///
	/// let mut request = Request::builder()
	///     .uri("/d41d8cd98f/a.js?v=1")
	///     .build()
	///     .unwrap();
	/// request.set_path("/a.js").unwrap();
	/// assert_eq!(request.uri, "/a.js?v=1");
	/// ```
	pub fn set_path(&mut self, path: &str) -> Result<()> {
		let target = match self.uri.query() {
			Some(query) => format!("{}?{}", path, query),
			None => path.to_string(),
		};
		let mut parts = self.uri.clone().into_parts();
		parts.path_and_query = Some(
			target
				.parse()
				.map_err(|e| Error::InvalidRequest(format!("{}: {}", target, e)))?,
		);
		self.uri = Uri::from_parts(parts).map_err(|e| Error::InvalidRequest(e.to_string()))?;
		Ok(())
	}
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
		}
	}
}

impl RequestBuilder {
	/// Set the request method (defaults to `GET`).
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Set the request target.
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	/// Assemble the request.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidRequest`] when the target is not a valid URI.
	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.parse()
			.map_err(|e| Error::InvalidRequest(format!("{}: {}", self.uri, e)))?;
		Ok(Request {
			method: self.method,
			uri,
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			extensions: Extensions::new(),
		})
	}
}
