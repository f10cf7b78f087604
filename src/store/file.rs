//! File-backed [`StateStore`] for lightweight deployments.
//!
//! Each document is one JSON file under the store's root directory, replaced
//! by a write-to-temp + rename so a crash mid-write never leaves a partially
//! written document behind. Version checks compare the fingerprint of the
//! bytes currently on disk.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{
		DocumentKey, DocumentVersion, StateStore, StoreError, StoreFuture, VersionedDocument,
		WriteOutcome,
	},
};

/// Persists hub documents as JSON files under a root directory.
#[derive(Clone, Debug)]
pub struct FileStore {
	root: PathBuf,
	write_gate: Arc<Mutex<()>>,
}
impl FileStore {
	/// Opens (or creates) a store rooted at the provided directory.
	pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let root = root.into();

		fs::create_dir_all(&root).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", root.display()),
		})?;

		Ok(Self { root, write_gate: Arc::new(Mutex::new(())) })
	}

	fn path_for(&self, key: DocumentKey) -> PathBuf {
		self.root.join(key.object_name())
	}

	fn read_document(path: &Path) -> Result<Option<String>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let payload = fs::read_to_string(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		Ok(Some(payload))
	}

	fn replace_document(path: &Path, payload: &str) -> Result<(), StoreError> {
		let mut tmp_path = path.to_path_buf();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(payload.as_bytes()).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}
}
impl StateStore for FileStore {
	fn load<'a>(&'a self, key: DocumentKey) -> StoreFuture<'a, Option<VersionedDocument>> {
		Box::pin(async move {
			let path = self.path_for(key);

			Ok(Self::read_document(&path)?.map(VersionedDocument::new))
		})
	}

	fn write<'a>(
		&'a self,
		key: DocumentKey,
		expected: Option<&'a DocumentVersion>,
		payload: String,
	) -> StoreFuture<'a, WriteOutcome> {
		Box::pin(async move {
			let path = self.path_for(key);
			let _gate = self.write_gate.lock();
			let current = Self::read_document(&path)?.map(|stored| DocumentVersion::fingerprint(&stored));

			if current.as_ref() != expected {
				return Ok(WriteOutcome::VersionMismatch);
			}

			let version = DocumentVersion::fingerprint(&payload);

			Self::replace_document(&path, &payload)?;

			Ok(WriteOutcome::Committed(version))
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_root() -> PathBuf {
		let unique = format!(
			"timeoff_hub_file_store_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn write_and_reload_round_trip() {
		let root = temp_root();
		let store = FileStore::open(&root).expect("Failed to open file store root.");
		let key = DocumentKey::TimeoffMapping;
		let outcome = store
			.write(key, None, "{\"t-1\":{}}".into())
			.await
			.expect("Initial write should succeed.");

		assert!(matches!(outcome, WriteOutcome::Committed(_)));
		drop(store);

		let reopened = FileStore::open(&root).expect("Failed to reopen file store root.");
		let loaded = reopened
			.load(key)
			.await
			.expect("Load should not error.")
			.expect("File store lost document after reopen.");

		assert_eq!(loaded.payload, "{\"t-1\":{}}");

		fs::remove_dir_all(&root).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store root {}: {e}", root.display())
		});
	}

	#[tokio::test]
	async fn conditional_writes_detect_foreign_modification() {
		let root = temp_root();
		let store = FileStore::open(&root).expect("Failed to open file store root.");
		let key = DocumentKey::SyncMetrics;

		store.write(key, None, "{\"v\":1}".into()).await.expect("Initial write should succeed.");

		let loaded = store
			.load(key)
			.await
			.expect("Load should not error.")
			.expect("Document should exist after the initial write.");

		// Simulate another process replacing the blob out from under us.
		fs::write(root.join(key.object_name()), "{\"v\":99}")
			.expect("Foreign write fixture should succeed.");

		let outcome = store
			.write(key, Some(&loaded.version), "{\"v\":2}".into())
			.await
			.expect("Write should not error.");

		assert_eq!(outcome, WriteOutcome::VersionMismatch);

		fs::remove_dir_all(&root).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store root {}: {e}", root.display())
		});
	}
}
