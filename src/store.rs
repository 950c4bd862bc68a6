//! Flat-file resource store: one JSON document per resource name.
//!
//! The store also owns the per-id mutexes that serialize create/transition
//! persist sequences for a single resource; callers hold the guard across
//! the whole handler invocation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::OrcError;

pub struct ResourceStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ResourceStore {
    /// Open a store rooted at the given directory, creating it if needed.
    /// Creation failure is logged, not fatal; `put` re-creates the root and
    /// surfaces the error if it persists.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        if let Err(err) = std::fs::create_dir_all(&root) {
            warn!(root = %root.display(), %err, "could not create store root");
        }
        Self {
            root,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn doc_path(&self, name: &str) -> Result<PathBuf, OrcError> {
        // Resource names are plain ids; a separator would escape the root.
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(OrcError::BadRequest(format!(
                "invalid resource name: {name:?}"
            )));
        }
        Ok(self.root.join(name))
    }

    /// Acquire the per-id lock for a resource. Held for the duration of a
    /// create or transition so overlapping requests cannot interleave their
    /// persist calls.
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock().expect("lock map poisoned");
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }

    pub async fn exists(&self, name: &str) -> Result<bool, OrcError> {
        let path = self.doc_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Fetch a document verbatim; no decoding or re-encoding happens here.
    pub async fn get(&self, name: &str) -> Result<String, OrcError> {
        let path = self.doc_path(name)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OrcError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn put(&self, name: &str, contents: &str) -> Result<(), OrcError> {
        let path = self.doc_path(name)?;
        fs::create_dir_all(&self.root).await?;
        fs::write(&path, contents).await?;
        debug!(resource = name, bytes = contents.len(), "persisted document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> (tempfile::TempDir, ResourceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ResourceStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn get_missing_resource_is_not_found() {
        let (_dir, store) = store();
        let err = store.get("ghost.example.com").await.unwrap_err();
        match err {
            OrcError::NotFound(name) => assert_eq!(name, "ghost.example.com"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_then_get_is_verbatim() {
        let (_dir, store) = store();
        let contents = r#"{"owner":"x","id":"foo","state":"ALLOCATED"}"#;
        store.put("foo.example.com", contents).await.unwrap();
        assert_eq!(store.get("foo.example.com").await.unwrap(), contents);
        assert!(store.exists("foo.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites_existing_document() {
        let (_dir, store) = store();
        store.put("foo", "first").await.unwrap();
        store.put("foo", "second").await.unwrap();
        assert_eq!(store.get("foo").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn names_with_separators_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.get("../escape").await.unwrap_err(),
            OrcError::BadRequest(_)
        ));
        assert!(matches!(
            store.put("a/b", "x").await.unwrap_err(),
            OrcError::BadRequest(_)
        ));
        assert!(matches!(
            store.get("").await.unwrap_err(),
            OrcError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn uncreatable_root_defers_the_error_to_put() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("occupied");
        std::fs::write(&occupied, "x").unwrap();

        // A file where the root should be: new() must not panic, and put()
        // must surface the creation failure.
        let store = ResourceStore::new(occupied.join("db"));
        assert!(matches!(
            store.put("foo", "{}").await.unwrap_err(),
            OrcError::Io(_)
        ));
    }

    #[tokio::test]
    async fn per_id_lock_is_exclusive() {
        let (_dir, store) = store();
        let store = Arc::new(store);

        let guard = store.lock("foo").await;
        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let _guard = store.lock("foo").await;
            })
        };
        // The second lock on the same id must not resolve while held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // A different id is independent.
        let _other = store.lock("bar").await;

        drop(guard);
        contender.await.unwrap();
    }
}
