//! Request interception for fingerprinted URLs
//!
//! A request whose path looks like `/{prefix}{fingerprint}/{path}` is rewritten
//! to `/{path}` when the fingerprint is the one the asset currently carries,
//! and a successful response gets a far-future `Cache-Control` header.
//! Anything else is forwarded untouched, so a stale or forged fingerprint is
//! never cached for a year.

use crate::codec::{FingerprintCodec, decode_path};
use crate::manifest::AssetManifest;
use crate::tags::TagGenerator;
use async_trait::async_trait;
use cachify_http::{Handler, Middleware, Request, Response, Result};
use hyper::StatusCode;
use hyper::header::{CACHE_CONTROL, ETAG, HeaderValue, LAST_MODIFIED};
use std::sync::Arc;

/// Cache-Control value sent with verified fingerprinted responses (one year)
pub const LONG_LIVED_CACHE_CONTROL: &str = "public, max-age=31536000";

/// How a request path was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
	/// The path does not carry a fingerprint
	NotCandidate,
	/// Fingerprint-shaped, but no asset backs it
	NoSuchAsset,
	/// The embedded fingerprint is not the asset's current one
	HashMismatch,
	/// Forward as `true_path` and mark the response as long-lived
	Verified {
		/// Request path with prefix and fingerprint removed
		true_path: String,
	},
}

/// Pipeline stage that strips verified fingerprints from request paths.
///
/// Every request also receives the engine's [`TagGenerator`] in its extensions.
pub struct CachifyMiddleware {
	codec: Arc<FingerprintCodec>,
	manifest: Arc<AssetManifest>,
	tags: TagGenerator,
	control_headers: bool,
}

impl CachifyMiddleware {
	pub(crate) fn new(
		codec: Arc<FingerprintCodec>,
		manifest: Arc<AssetManifest>,
		tags: TagGenerator,
		control_headers: bool,
	) -> Self {
		Self {
			codec,
			manifest,
			tags,
			control_headers,
		}
	}

	/// Classifies `request_path`
	pub async fn inspect(&self, request_path: &str) -> Interception {
		let Some(candidate) = self.codec.match_candidate(request_path) else {
			return Interception::NotCandidate;
		};
		let true_path = candidate.true_path;
		let logical_path = decode_path(true_path);

		// Prefixed or manifest-declared URLs may be served without a backing file
		let virtual_asset = self.codec.is_prefix_passthrough(request_path)
			|| self.manifest.contains(&logical_path);
		let resolved = self.codec.resolve(&logical_path);
		let exists = virtual_asset
			|| match &resolved {
				Some(path) => self.codec.file_exists(path).await,
				None => false,
			};
		if !exists {
			tracing::warn!("Cachify like URL, but no file found: {}", request_path);
			return Interception::NoSuchAsset;
		}

		let content = match &resolved {
			Some(path) => self.codec.file_fingerprint(path).await,
			None => None,
		};
		let expected = match (content, self.codec.global_hash()) {
			(Some(_), Some(global)) => Some(global.to_string()),
			(Some(fingerprint), None) => Some(fingerprint.to_string()),
			(None, Some(global)) if virtual_asset => Some(global.to_string()),
			(None, _) => None,
		};

		match expected {
			Some(expected) if expected == candidate.fingerprint => Interception::Verified {
				true_path: true_path.to_string(),
			},
			Some(expected) => {
				tracing::debug!(
					"cachify fingerprint {} for {} is not current ({})",
					candidate.fingerprint,
					true_path,
					expected
				);
				Interception::HashMismatch
			}
			None if virtual_asset => Interception::Verified {
				true_path: true_path.to_string(),
			},
			None => Interception::NoSuchAsset,
		}
	}

	fn mark_long_lived(&self, response: &mut Response) {
		response.headers.insert(
			CACHE_CONTROL,
			HeaderValue::from_static(LONG_LIVED_CACHE_CONTROL),
		);
		if self.control_headers {
			response.headers.remove(ETAG);
			response.headers.remove(LAST_MODIFIED);
		}
	}
}

#[async_trait]
impl Middleware for CachifyMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		request.extensions.insert(self.tags.clone());

		let Interception::Verified { true_path } = self.inspect(request.path()).await else {
			return next.handle(request).await;
		};

		if let Err(e) = request.set_path(&true_path) {
			tracing::warn!("cachify could not rewrite request to {}: {}", true_path, e);
			return next.handle(request).await;
		}

		let mut response = next.handle(request).await?;
		if response.status.is_success() || response.status == StatusCode::NOT_MODIFIED {
			self.mark_long_lived(&mut response);
		}
		Ok(response)
	}
}

impl std::fmt::Debug for CachifyMiddleware {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CachifyMiddleware")
			.field("prefix", &self.codec.prefix())
			.field("control_headers", &self.control_headers)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::CachifyConfig;
	use crate::reader::MemoryReader;
	use crate::setup::Cachify;
	use cachify_http::MiddlewareChain;
	use rstest::rstest;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			let tags = request.extensions.contains::<TagGenerator>();
			Ok(Response::ok()
				.with_header("etag", "\"abc\"")
				.with_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
				.with_header("x-has-tags", if tags { "yes" } else { "no" })
				.with_body(request.uri.to_string()))
		}
	}

	fn engine(config: CachifyConfig) -> Cachify {
		let reader = MemoryReader::new();
		reader.insert("/srv/a.js", "");
		reader.insert("/srv/js/app.js", "var app;");
		reader.insert("/srv/fonts/my font.css", "");
		reader.insert("/srv/fonts/café.css", "");
		Cachify::with_reader(
			AssetManifest::new().with_asset("/js/bundle.min.js", ["/js/app.js"]),
			config.with_root("/srv"),
			Arc::new(reader),
		)
	}

	async fn call(cachify: &Cachify, uri: &str) -> Response {
		let chain = MiddlewareChain::new(Arc::new(Echo)).with_middleware(cachify.middleware());
		let request = Request::builder().uri(uri).build().unwrap();
		chain.handle(request).await.unwrap()
	}

	#[rstest]
	#[case("/a.js", Interception::NotCandidate)]
	#[case("/d41d8cd98f/a.js", Interception::Verified { true_path: "/a.js".to_string() })]
	#[case("/0000000000/a.js", Interception::HashMismatch)]
	#[case("/d41d8cd98f/missing.js", Interception::NoSuchAsset)]
	#[case("/d41d8cd98f/../a.js", Interception::NoSuchAsset)]
	#[case("/0123456789/js/bundle.min.js", Interception::Verified { true_path: "/js/bundle.min.js".to_string() })]
	#[tokio::test]
	async fn test_inspect(#[case] path: &str, #[case] expected: Interception) {
		let cachify = engine(CachifyConfig::new());
		assert_eq!(cachify.middleware().inspect(path).await, expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_verified_request_is_rewritten() {
		let cachify = engine(CachifyConfig::new());
		let response = call(&cachify, "/d41d8cd98f/a.js?v=2").await;

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, "/a.js?v=2");
		assert_eq!(
			response.headers.get(CACHE_CONTROL).unwrap(),
			LONG_LIVED_CACHE_CONTROL
		);
		assert!(response.headers.contains_key(ETAG));
		assert_eq!(response.headers.get("x-has-tags").unwrap(), "yes");
	}

	#[rstest]
	#[tokio::test]
	async fn test_control_headers_strip_validators() {
		let cachify = engine(CachifyConfig::new().with_control_headers(true));
		let response = call(&cachify, "/d41d8cd98f/a.js").await;

		assert!(response.headers.contains_key(CACHE_CONTROL));
		assert!(!response.headers.contains_key(ETAG));
		assert!(!response.headers.contains_key(LAST_MODIFIED));
	}

	#[rstest]
	#[case("/0000000000/a.js")]
	#[case("/a.js")]
	#[case("/d41d8cd98f/missing.js")]
	#[tokio::test]
	async fn test_other_requests_pass_untouched(#[case] uri: &str) {
		let cachify = engine(CachifyConfig::new().with_control_headers(true));
		let response = call(&cachify, uri).await;

		assert_eq!(response.body, uri);
		assert!(!response.headers.contains_key(CACHE_CONTROL));
		assert!(response.headers.contains_key(ETAG));
		assert_eq!(response.headers.get("x-has-tags").unwrap(), "yes");
	}

	#[rstest]
	#[tokio::test]
	async fn test_global_hash_is_expected_fingerprint() {
		let cachify = engine(CachifyConfig::new().with_global_hash("abcdef0123"));
		let middleware = cachify.middleware();

		assert_eq!(
			middleware.inspect("/abcdef0123/js/app.js").await,
			Interception::Verified {
				true_path: "/js/app.js".to_string()
			}
		);
		assert_eq!(
			middleware.inspect("/d41d8cd98f/a.js").await,
			Interception::HashMismatch
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_custom_prefix_accepts_virtual_asset() {
		let cachify = engine(CachifyConfig::new().with_prefix("cachify"));
		let response = call(&cachify, "/cachify/d41d8cd98f/other").await;

		assert_eq!(response.body, "/other");
		assert!(response.headers.contains_key(CACHE_CONTROL));
	}

	struct Missing;

	#[async_trait]
	impl Handler for Missing {
		async fn handle(&self, request: Request) -> Result<Response> {
			Ok(Response::not_found().with_body(request.uri.to_string()))
		}
	}

	#[rstest]
	#[case("/cdn/0000000000/does/not/exist.js")]
	#[case("/cdn/ffffffffff/does/not/exist.js")]
	#[tokio::test]
	async fn test_unsuccessful_response_is_not_marked_long_lived(#[case] uri: &str) {
		let cachify = engine(CachifyConfig::new().with_prefix("cdn"));
		let chain =
			MiddlewareChain::new(Arc::new(Missing)).with_middleware(cachify.middleware());
		let request = Request::builder().uri(uri).build().unwrap();

		let response = chain.handle(request).await.unwrap();
		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(response.body, "/does/not/exist.js");
		assert!(!response.headers.contains_key(CACHE_CONTROL));
	}

	#[rstest]
	#[case("/1234567890/js/bundle.min.js", Interception::HashMismatch)]
	#[case("/abcdef0123/js/bundle.min.js", Interception::Verified { true_path: "/js/bundle.min.js".to_string() })]
	#[tokio::test]
	async fn test_global_hash_applies_to_virtual_assets(
		#[case] path: &str,
		#[case] expected: Interception,
	) {
		let cachify = engine(CachifyConfig::new().with_global_hash("abcdef0123"));
		assert_eq!(cachify.middleware().inspect(path).await, expected);
	}

	#[rstest]
	#[case("/fonts/my font.css", "/d41d8cd98f/fonts/my%20font.css", "/fonts/my%20font.css")]
	#[case("/fonts/café.css", "/d41d8cd98f/fonts/caf%C3%A9.css", "/fonts/caf%C3%A9.css")]
	#[tokio::test]
	async fn test_encoded_file_names_round_trip(
		#[case] resource: &str,
		#[case] expected_url: &str,
		#[case] forwarded: &str,
	) {
		let cachify = engine(CachifyConfig::new());
		let url = cachify
			.tags()
			.url(resource, &crate::tags::TagOptions::new())
			.await
			.unwrap();
		assert_eq!(url, expected_url);

		assert_eq!(
			cachify.middleware().inspect(&url).await,
			Interception::Verified {
				true_path: forwarded.to_string()
			}
		);
		let response = call(&cachify, &url).await;
		assert_eq!(response.body, forwarded);
		assert!(response.headers.contains_key(CACHE_CONTROL));
	}
}
