//! Memoized file existence and content fingerprints
//!
//! Entries are keyed by resolved filesystem path and are never invalidated:
//! a file changed on disk keeps its first fingerprint until [`HashStore::clear`]
//! is called or the process restarts. Missing files are remembered the same way.

use crate::codec::split_url;
use crate::reader::AssetReader;
use lru::LruCache;
use md5::{Digest, Md5};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};

/// Number of hex characters kept from the content digest.
///
/// Request matching depends on this exact width.
pub const FINGERPRINT_LEN: usize = 10;

/// Truncated lowercase hex MD5 digest of an asset's bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
	/// Fingerprints `content`
	///
	/// # Examples
	///
	/// ```rust
	/// use cachify_static::Fingerprint;
	///
	/// assert_eq!(Fingerprint::compute(b"").as_str(), "d41d8cd98f");
	/// ```
	pub fn compute(content: &[u8]) -> Self {
		let digest = hex::encode(Md5::digest(content));
		Self(digest[..FINGERPRINT_LEN].to_string())
	}

	/// Accepts exactly [`FINGERPRINT_LEN`] lowercase hex characters
	///
	/// # Examples
	///
	/// ```rust
	/// use cachify_static::Fingerprint;
	///
	/// assert!(Fingerprint::parse("baddecafe1").is_some());
	/// assert!(Fingerprint::parse("BADDECAFE1").is_none());
	/// assert!(Fingerprint::parse("baddecafe").is_none());
	/// ```
	pub fn parse(value: &str) -> Option<Self> {
		let valid = value.len() == FINGERPRINT_LEN
			&& value
				.bytes()
				.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
		valid.then(|| Self(value.to_string()))
	}

	/// The hex characters
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// What is known about one resolved path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
	/// Whether the file could be found
	pub exists: bool,
	/// Content fingerprint, once computed
	pub fingerprint: Option<Fingerprint>,
}

impl CacheEntry {
	/// Entry for a file that could not be found or read
	pub fn missing() -> Self {
		Self {
			exists: false,
			fingerprint: None,
		}
	}

	/// Entry for a file known to exist, not yet hashed
	pub fn present() -> Self {
		Self {
			exists: true,
			fingerprint: None,
		}
	}

	/// Entry for a hashed file
	pub fn hashed(fingerprint: Fingerprint) -> Self {
		Self {
			exists: true,
			fingerprint: Some(fingerprint),
		}
	}
}

/// Concurrency-safe cache of [`CacheEntry`] values
///
/// The lock is only held for map operations, never while a read is awaited,
/// so two tasks may hash the same file at once; both arrive at the same value.
pub struct HashStore {
	entries: Mutex<LruCache<PathBuf, CacheEntry>>,
}

impl HashStore {
	/// Creates an unbounded store
	pub fn new() -> Self {
		Self::with_capacity(None)
	}

	/// Creates a store holding at most `max_entries` paths, evicting the least
	/// recently used. `None` (or zero) means unbounded.
	pub fn with_capacity(max_entries: Option<usize>) -> Self {
		let cache = match max_entries.and_then(NonZeroUsize::new) {
			Some(capacity) => LruCache::new(capacity),
			None => LruCache::unbounded(),
		};
		Self {
			entries: Mutex::new(cache),
		}
	}

	/// Returns the entry for `path`, if any
	pub fn lookup(&self, path: &Path) -> Option<CacheEntry> {
		self.entries.lock().get(path).cloned()
	}

	/// Stores the entry for `path`, replacing any previous one
	pub fn record(&self, path: PathBuf, entry: CacheEntry) {
		self.entries.lock().put(path, entry);
	}

	/// Number of remembered paths
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Whether nothing is remembered
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Forgets every entry, positive and negative
	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	/// Fingerprint of the file at `path`, computing and memoizing it on a miss.
	///
	/// Returns `None` when the file cannot be read; that outcome is memoized too.
	pub async fn fingerprint(&self, path: &Path, reader: &dyn AssetReader) -> Option<Fingerprint> {
		match self.lookup(path) {
			Some(CacheEntry {
				fingerprint: Some(fingerprint),
				..
			}) => {
				tracing::debug!("cachify cache hit {}", path.display());
				return Some(fingerprint);
			}
			Some(CacheEntry { exists: false, .. }) => return None,
			_ => {}
		}

		tracing::debug!("cachify cache miss {}", path.display());
		match reader.read(path).await {
			Ok(content) => {
				let fingerprint = Fingerprint::compute(&content);
				self.record(path.to_path_buf(), CacheEntry::hashed(fingerprint.clone()));
				Some(fingerprint)
			}
			Err(e) => {
				tracing::debug!("cachify could not read {}: {}", path.display(), e);
				self.record(path.to_path_buf(), CacheEntry::missing());
				None
			}
		}
	}

	/// Whether a file exists at `path`, probing once and memoizing the answer
	pub async fn exists(&self, path: &Path, reader: &dyn AssetReader) -> bool {
		if let Some(entry) = self.lookup(path) {
			return entry.exists;
		}
		let exists = reader.exists(path).await;
		let entry = if exists {
			CacheEntry::present()
		} else {
			CacheEntry::missing()
		};
		self.record(path.to_path_buf(), entry);
		exists
	}
}

impl Default for HashStore {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for HashStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HashStore")
			.field("len", &self.len())
			.finish()
	}
}

/// Resolves a logical URL to the file that backs it.
///
/// Fragment and query never take part. An entry in `overrides` wins; otherwise
/// the URL path is joined onto `root`. Paths that would leave `root` resolve to
/// `None`.
///
/// # Examples
///
/// ```rust
/// use cachify_static::store::resolve;
/// use std::collections::HashMap;
/// use std::path::{Path, PathBuf};
///
/// let overrides = HashMap::from([("/app.js".to_string(), PathBuf::from("/build/app.js"))]);
/// let root = Path::new("/srv");
///
/// assert_eq!(resolve("/app.js#top", &overrides, root), Some(PathBuf::from("/build/app.js")));
/// assert_eq!(resolve("/js/a.js?v=2", &overrides, root), Some(PathBuf::from("/srv/js/a.js")));
/// assert_eq!(resolve("/../etc/passwd", &overrides, root), None);
/// ```
pub fn resolve(
	logical_url: &str,
	overrides: &HashMap<String, PathBuf>,
	root: &Path,
) -> Option<PathBuf> {
	let (path, _, _) = split_url(logical_url);
	if let Some(target) = overrides.get(path) {
		return Some(target.clone());
	}

	let mut resolved = root.to_path_buf();
	for component in Path::new(path.trim_start_matches('/')).components() {
		match component {
			Component::Normal(part) => resolved.push(part),
			Component::CurDir => {}
			_ => {
				tracing::warn!("cachify refused to resolve {} outside the asset root", path);
				return None;
			}
		}
	}
	Some(resolved)
}
