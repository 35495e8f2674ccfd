//! Middleware and handler traits for HTTP request processing.
//!
//! ## Handler
//!
//! ```rust
//! use cachify_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct StaticFiles;
//!
//! #[async_trait]
//! impl Handler for StaticFiles {
//!     async fn handle(&self, request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body(request.path().to_string()))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware wraps handlers; it may rewrite the request before forwarding it
//! and adjust the response afterwards:
//!
//! ```rust
//! use cachify_http::{Handler, Middleware, Request, Response, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Tracing;
//!
//! #[async_trait]
//! impl Middleware for Tracing {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
//!         println!("{} {}", request.method, request.uri);
//!         next.handle(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Handler trait for processing requests.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request through this middleware.
	///
	/// # Arguments
	///
	/// * `request` - The incoming HTTP request
	/// * `next` - The next handler in the chain to call
	///
	/// # Errors
	///
	/// Returns an error if the middleware or next handler fails.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// Composes middleware in front of a final handler.
///
/// Middleware run in the order they were added: the first one added sees the
/// request first and the response last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	/// Creates a new middleware chain ending in `handler`.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Adds a middleware to the chain using builder pattern.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			current = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current,
			});
		}
		current.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct EchoPathHandler;

	#[async_trait]
	impl Handler for EchoPathHandler {
		async fn handle(&self, request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(request.path().to_string()))
		}
	}

	struct RewriteMiddleware {
		from: &'static str,
		to: &'static str,
	}

	#[async_trait]
	impl Middleware for RewriteMiddleware {
		async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			if request.path() == self.from {
				request.set_path(self.to)?;
			}
			next.handle(request).await
		}
	}

	fn body_of(response: &Response) -> String {
		String::from_utf8(response.body.to_vec()).unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_without_middleware() {
		let chain = MiddlewareChain::new(Arc::new(EchoPathHandler));
		let request = Request::builder().uri("/a.js").build().unwrap();

		let response = chain.handle(request).await.unwrap();
		assert_eq!(body_of(&response), "/a.js");
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_runs_middleware_in_insertion_order() {
		let chain = MiddlewareChain::new(Arc::new(EchoPathHandler))
			.with_middleware(Arc::new(RewriteMiddleware { from: "/a", to: "/b" }))
			.with_middleware(Arc::new(RewriteMiddleware { from: "/b", to: "/c" }));
		let request = Request::builder().uri("/a").build().unwrap();

		let response = chain.handle(request).await.unwrap();
		assert_eq!(body_of(&response), "/c");
	}
}
