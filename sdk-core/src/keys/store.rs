//! Process-wide key cache with an explicit lifecycle

use super::{loader, KeyMaterial, KeySource};
use crate::error::{CorpayError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Lazily loaded, shareable key material.
///
/// Warm reads only take the read lock. The cold path is serialized by
/// `load_lock`, so concurrent first callers parse the store once.
pub struct KeyStore {
    source: Option<KeySource>,
    cached: RwLock<Option<Arc<KeyMaterial>>>,
    load_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl KeyStore {
    pub fn new(source: KeySource) -> Self {
        Self {
            source: Some(source),
            cached: RwLock::new(None),
            load_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Store pre-populated with injected keys and no backing source
    pub fn from_material(material: KeyMaterial) -> Self {
        Self {
            source: None,
            cached: RwLock::new(Some(Arc::new(material))),
            load_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Load eagerly, surfacing key problems at startup
    pub fn initialize(&self) -> Result<()> {
        self.get().map(|_| ())
    }

    /// Cached key material, loading it on first use
    pub fn get(&self) -> Result<Arc<KeyMaterial>> {
        if let Some(keys) = self.cached() {
            return Ok(keys);
        }

        // The guarded state is `()`, so a lock poisoned by a panicking
        // loader carries nothing to repair
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have finished loading while we waited
        if let Some(keys) = self.cached() {
            return Ok(keys);
        }

        let source = self
            .source
            .as_ref()
            .ok_or_else(|| CorpayError::KeyLoad("no key source configured".into()))?;

        let keys = Arc::new(loader::load(source)?);
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(keys.clone());

        Ok(keys)
    }

    pub fn is_initialized(&self) -> bool {
        self.cached().is_some()
    }

    /// Drop the cached handles; the next `get` reloads from the source.
    ///
    /// Holders of an `Arc` obtained earlier keep their copy until dropped.
    pub fn shutdown(&self) {
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.cached.write().unwrap_or_else(|e| e.into_inner()).take();
        tracing::info!("key store shut down");
    }

    /// Number of times the backing source has been parsed
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn cached(&self) -> Option<Arc<KeyMaterial>> {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread;

    fn source() -> KeySource {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        KeySource {
            private_key_path: dir.join("client_key.pem"),
            passphrase: None,
            counterparty_cert_path: dir.join("bank_cert.pem"),
        }
    }

    #[test]
    fn test_lazy_then_cached() {
        let store = KeyStore::new(source());
        assert!(!store.is_initialized());

        let a = store.get().unwrap();
        let b = store.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.load_count(), 1);
        assert!(store.is_initialized());
    }

    #[test]
    fn test_concurrent_cold_load_runs_once() {
        let store = Arc::new(KeyStore::new(source()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.get().unwrap())
            })
            .collect();

        let keys: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(store.load_count(), 1);
        assert!(keys.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_shutdown_and_reload() {
        let store = KeyStore::new(source());
        store.initialize().unwrap();
        store.shutdown();
        assert!(!store.is_initialized());

        store.get().unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut bad = source();
        bad.private_key_path = bad.private_key_path.with_file_name("missing.pem");
        let store = KeyStore::new(bad);

        assert!(matches!(store.initialize(), Err(CorpayError::KeyLoad(_))));
        assert!(!store.is_initialized());
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn test_poisoned_load_lock_does_not_wedge_the_store() {
        let store = Arc::new(KeyStore::new(source()));

        let poisoner = store.clone();
        let crashed = thread::spawn(move || {
            let _guard = poisoner.load_lock.lock().unwrap();
            panic!("loader crashed mid-load");
        })
        .join();
        assert!(crashed.is_err());
        assert!(store.load_lock.is_poisoned());

        assert!(store.get().is_ok());
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_injected_material() {
        let keys = loader::load(&source()).unwrap();
        let store = KeyStore::from_material(keys);
        assert!(store.is_initialized());
        assert!(store.get().is_ok());

        store.shutdown();
        assert!(matches!(store.get(), Err(CorpayError::KeyLoad(_))));
    }
}
