//! Persistent string key-value storage

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Store file {path} is not a JSON object")]
	Corrupt { path: PathBuf },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String-valued storage that outlives a single form instance
#[async_trait]
pub trait KeyValueStore: Send + Sync {
	async fn get(&self, key: &str) -> StorageResult<Option<String>>;

	async fn set(&self, key: &str, value: String) -> StorageResult<()>;

	async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Process-local store
///
/// # Examples
///
/// ```
/// use formstep_utils::{InMemoryStore, KeyValueStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryStore::new();
/// store.set("visitCount", "3".to_string()).await.unwrap();
/// assert_eq!(store.get("visitCount").await.unwrap().as_deref(), Some("3"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
	entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
	async fn get(&self, key: &str) -> StorageResult<Option<String>> {
		Ok(self.entries.read().get(key).cloned())
	}

	async fn set(&self, key: &str, value: String) -> StorageResult<()> {
		self.entries.write().insert(key.to_string(), value);
		Ok(())
	}

	async fn remove(&self, key: &str) -> StorageResult<()> {
		self.entries.write().remove(key);
		Ok(())
	}
}

/// Store backed by a single JSON object file
///
/// A missing file reads as empty. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	write_lock: Mutex<()>,
}

impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn load(&self) -> StorageResult<Map<String, Value>> {
		let content = match tokio::fs::read_to_string(&self.path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
			Err(e) => return Err(e.into()),
		};
		if content.trim().is_empty() {
			return Ok(Map::new());
		}
		match serde_json::from_str(&content)? {
			Value::Object(map) => Ok(map),
			_ => Err(StorageError::Corrupt {
				path: self.path.clone(),
			}),
		}
	}

	async fn persist(&self, map: Map<String, Value>) -> StorageResult<()> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			tokio::fs::create_dir_all(parent).await?;
		}
		let content = serde_json::to_string_pretty(&Value::Object(map))?;
		tokio::fs::write(&self.path, content).await?;
		Ok(())
	}
}

#[async_trait]
impl KeyValueStore for FileStore {
	async fn get(&self, key: &str) -> StorageResult<Option<String>> {
		let map = self.load().await?;
		Ok(map.get(key).map(|value| match value {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		}))
	}

	async fn set(&self, key: &str, value: String) -> StorageResult<()> {
		let _guard = self.write_lock.lock().await;
		let mut map = self.load().await?;
		map.insert(key.to_string(), Value::String(value));
		self.persist(map).await
	}

	async fn remove(&self, key: &str) -> StorageResult<()> {
		let _guard = self.write_lock.lock().await;
		let mut map = self.load().await?;
		if map.remove(key).is_some() {
			self.persist(map).await?;
		}
		Ok(())
	}
}

/// Number of times a form has been mounted, kept under one storage key
///
/// # Examples
///
/// ```
/// use formstep_utils::{InMemoryStore, VisitCounter};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let counter = VisitCounter::new(Arc::new(InMemoryStore::new()), "visitCount");
/// assert_eq!(counter.read().await.unwrap(), 0);
/// assert_eq!(counter.record_visit().await.unwrap(), 1);
/// assert_eq!(counter.record_visit().await.unwrap(), 2);
/// # }
/// ```
#[derive(Clone)]
pub struct VisitCounter {
	store: Arc<dyn KeyValueStore>,
	key: String,
}

impl VisitCounter {
	pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
		Self {
			store,
			key: key.into(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Stored count; absent or unparsable values count as zero
	pub async fn read(&self) -> StorageResult<u64> {
		let Some(raw) = self.store.get(&self.key).await? else {
			return Ok(0);
		};
		match raw.trim().parse::<u64>() {
			Ok(count) => Ok(count),
			Err(_) => {
				tracing::warn!(key = %self.key, value = %raw, "unparsable visit count, starting over");
				Ok(0)
			}
		}
	}

	pub async fn write(&self, count: u64) -> StorageResult<()> {
		self.store.set(&self.key, count.to_string()).await
	}

	/// Increment the stored count and return the new value
	pub async fn record_visit(&self) -> StorageResult<u64> {
		let count = self.read().await?.saturating_add(1);
		self.write(count).await?;
		tracing::debug!(key = %self.key, count, "recorded visit");
		Ok(count)
	}
}
