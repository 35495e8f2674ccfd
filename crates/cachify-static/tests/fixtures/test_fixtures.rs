//! Asset trees and handlers shared by integration tests

use async_trait::async_trait;
use cachify_http::{Handler, Request, Response, Result};
use cachify_static::AssetManifest;
use std::fs;
use std::path::Path;
use tempfile::TempDir as TempDirType;

/// Content of `js/app.js`; every other file is empty
pub const APP_JS: &str = "document.title = 'cachify';";

/// Wrapper for tempfile TempDir holding an asset tree
pub struct TempDir {
	inner: TempDirType,
}

impl TempDir {
	fn new(temp_dir: TempDirType) -> Self {
		Self { inner: temp_dir }
	}

	pub fn path(&self) -> &Path {
		self.inner.path()
	}
}

/// Creates an asset root:
///
/// ```text
/// css/site.css
/// js/app.js
/// js/font-loader.js
/// js/lib/jquery.js
/// js/main.js
/// js/main.min.js
/// ```
pub fn asset_dir() -> TempDir {
	let temp_dir = TempDirType::new().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("js/lib")).unwrap();
	fs::create_dir_all(root.join("css")).unwrap();

	for empty in [
		"css/site.css",
		"js/font-loader.js",
		"js/lib/jquery.js",
		"js/main.js",
		"js/main.min.js",
	] {
		fs::write(root.join(empty), "").unwrap();
	}
	fs::write(root.join("js/app.js"), APP_JS).unwrap();

	TempDir::new(temp_dir)
}

/// `/js/main.min.js` bundles jquery and main, in that order
pub fn manifest() -> AssetManifest {
	AssetManifest::new().with_asset("/js/main.min.js", ["/js/lib/jquery.js", "/js/main.js"])
}

/// Answers with the request URI as body and its own validators
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		Ok(Response::ok()
			.with_header("etag", "\"v1\"")
			.with_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
			.with_body(request.uri.to_string()))
	}
}
