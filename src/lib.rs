//! # Cachify
//!
//! Far-future caching for static assets, for any async request pipeline.
//!
//! Cachify rewrites asset URLs in templates to carry a content fingerprint
//! (`/js/main.min.js` becomes `/d41d8cd98f/js/main.min.js`) and, on the way
//! back in, strips verified fingerprints from request paths and marks the
//! responses cacheable for a year. Changing a file changes its URL, so
//! browsers never keep a stale copy.
//!
//! ## Feature Flags
//!
//! - `static-files` (default) - Tag helpers and the request interceptor
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use cachify::prelude::*;
//! use std::sync::Arc;
//!
//! struct StaticFiles;
//!
//! #[async_trait]
//! impl Handler for StaticFiles {
//!     async fn handle(&self, request: Request) -> cachify::http::Result<Response> {
//!         Ok(Response::ok().with_body(request.path().to_string()))
//!     }
//! }
//!
//! # async fn run() -> cachify::Result<()> {
//! let manifest = AssetManifest::new()
//!     .with_asset("/js/main.min.js", ["/js/lib/jquery.js", "/js/main.js"]);
//! let cachify = setup(manifest, CachifyConfig::new().with_root("public"));
//!
//! let app = MiddlewareChain::new(Arc::new(StaticFiles)).with_middleware(cachify.middleware());
//! let markup = cachify
//!     .tags()
//!     .script_tag("/js/main.min.js", &ScriptOptions::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Request pipeline types
pub mod http {
	pub use cachify_http::*;
}

#[cfg(feature = "static-files")]
pub use cachify_static::{
	AssetManifest, AssetReader, Cachified, Cachify, CachifyConfig, CachifyError,
	CachifyMiddleware, FingerprintCodec, Fingerprint, FsReader, GenericOptions, HashStore,
	Interception, LONG_LIVED_CACHE_CONTROL, MemoryReader, Result, ScriptOptions, TagGenerator,
	TagOptions, codec, config, error, manifest, middleware, reader, setup, store, tags,
};

/// Common imports for applications embedding Cachify
pub mod prelude {
	pub use async_trait::async_trait;
	pub use cachify_http::{
		Extensions, Handler, Middleware, MiddlewareChain, Request, Response,
	};
	pub use hyper::StatusCode;

	#[cfg(feature = "static-files")]
	pub use cachify_static::{
		AssetManifest, Cachify, CachifyConfig, GenericOptions, ScriptOptions, TagGenerator,
		TagOptions, setup,
	};
}

#[cfg(all(test, feature = "static-files"))]
mod tests {
	use super::prelude::*;
	use rstest::rstest;
	use std::sync::Arc;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> crate::http::Result<Response> {
			Ok(Response::ok().with_body(request.path().to_string()))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_prelude_wires_engine_into_chain() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("robots.txt"), "").unwrap();
		let cachify = setup(
			AssetManifest::new(),
			CachifyConfig::new().with_root(dir.path()),
		);

		let url = cachify
			.tags()
			.url("/robots.txt", &TagOptions::new())
			.await
			.unwrap();
		assert_eq!(url, "/d41d8cd98f/robots.txt");

		let chain = MiddlewareChain::new(Arc::new(Echo)).with_middleware(cachify.middleware());
		let request = Request::builder().uri(url).build().unwrap();
		let response = chain.handle(request).await.unwrap();

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, "/robots.txt");
		assert_eq!(
			response.headers.get(hyper::header::CACHE_CONTROL).unwrap(),
			crate::LONG_LIVED_CACHE_CONTROL
		);
	}
}
