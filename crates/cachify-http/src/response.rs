use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	/// Status code
	pub status: StatusCode,
	/// Response headers
	pub headers: HeaderMap,
	/// Response body
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Set the response body
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Response;
	///
	/// let response = Response::ok().with_body("console.log(1);");
	/// assert_eq!(&response.body[..], b"console.log(1);");
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a header, ignoring names or values that are not valid HTTP tokens
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Response;
	///
	/// let response = Response::ok().with_header("ETag", "\"abc\"");
	/// assert_eq!(response.headers.get("etag").unwrap(), "\"abc\"");
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}
}
