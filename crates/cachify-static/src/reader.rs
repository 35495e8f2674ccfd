//! Non-blocking asset access
//!
//! Both request interception and tag generation read asset bytes through
//! [`AssetReader`], so a slow disk only delays the task that awaits it.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Source of asset bytes
#[async_trait]
pub trait AssetReader: Send + Sync {
	/// Reads the full content at `path`
	async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

	/// Whether `path` names a readable file
	async fn exists(&self, path: &Path) -> bool;
}

/// Reads assets from the local filesystem with `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

#[async_trait]
impl AssetReader for FsReader {
	async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		tokio::fs::read(path).await
	}

	async fn exists(&self, path: &Path) -> bool {
		tokio::fs::metadata(path)
			.await
			.map(|metadata| metadata.is_file())
			.unwrap_or(false)
	}
}

/// Serves assets from memory, keyed by the resolved path
#[derive(Debug, Default)]
pub struct MemoryReader {
	files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryReader {
	/// Creates an empty reader
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `content` under `path`
	pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
		self.files.write().insert(path.into(), content.into());
	}

	/// Forgets the content stored under `path`
	pub fn remove(&self, path: &Path) {
		self.files.write().remove(path);
	}
}

#[async_trait]
impl AssetReader for MemoryReader {
	async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
		self.files.read().get(path).cloned().ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::NotFound,
				format!("No such asset: {}", path.display()),
			)
		})
	}

	async fn exists(&self, path: &Path) -> bool {
		self.files.read().contains_key(path)
	}
}
