//! # Cachify Static
//!
//! Far-future caching for static assets through content-fingerprinted URLs.
//!
//! Templates emit URLs such as `/d41d8cd98f/js/main.min.js`, where the
//! segment before the path is the first ten hex characters of the MD5 of the
//! file. Browsers may cache such URLs for a year because the URL changes when
//! the content does. When the request comes back, the middleware verifies the
//! fingerprint, strips it, forwards `/js/main.min.js` to the static file
//! handler and adds `Cache-Control: public, max-age=31536000` to the response.
//!
//! ## Features
//!
//! - **Fingerprinting**: MD5 content hashes, an explicit per-tag hash, or one
//!   global hash for every asset
//! - **Development mode**: bundles expand into their source files as listed in
//!   the [`AssetManifest`]
//! - **Prefixes**: a leading path segment or a fully-qualified CDN URL
//! - **Poisoning guard**: stale or forged fingerprints are passed through
//!   without caching headers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachify_http::MiddlewareChain;
//! use cachify_static::{AssetManifest, CachifyConfig, ScriptOptions, setup};
//! # use cachify_http::{Handler, Request, Response};
//! # use std::sync::Arc;
//! # struct StaticFiles;
//! # #[async_trait::async_trait]
//! # impl Handler for StaticFiles {
//! #     async fn handle(&self, _request: Request) -> cachify_http::Result<Response> {
//! #         Ok(Response::ok())
//! #     }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = AssetManifest::load("assets.json".as_ref())?;
//! let config = CachifyConfig::from_file("cachify.toml".as_ref())?;
//! let cachify = setup(manifest, config);
//!
//! let app = MiddlewareChain::new(Arc::new(StaticFiles)).with_middleware(cachify.middleware());
//!
//! let markup = cachify
//!     .tags()
//!     .script_tag("/js/main.min.js", &ScriptOptions::new().with_defer())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`config`] - Engine configuration
//! - [`manifest`] - Bundle to source mapping
//! - [`reader`] - Asset byte access
//! - [`store`] - Fingerprint computation and memoization
//! - [`codec`] - Fingerprint placement and request recognition
//! - [`tags`] - Template helpers
//! - [`middleware`] - Request interception
//! - [`setup`] - Engine construction
//! - [`error`] - Error types

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod config;
pub mod error;
pub mod manifest;
pub mod middleware;
pub mod reader;
pub mod setup;
pub mod store;
pub mod tags;

// Re-export main types
pub use codec::{Cachified, FingerprintCodec};
pub use config::CachifyConfig;
pub use error::{CachifyError, Result};
pub use manifest::AssetManifest;
pub use middleware::{CachifyMiddleware, Interception, LONG_LIVED_CACHE_CONTROL};
pub use reader::{AssetReader, FsReader, MemoryReader};
pub use setup::{Cachify, setup};
pub use store::{Fingerprint, HashStore};
pub use tags::{GenericOptions, ScriptOptions, TagGenerator, TagOptions};
