//! Path-keyed cache of parsed model templates.
//!
//! Requests are non-blocking: the first request for a path hands it to an
//! [`AssetFetcher`] and records it as loading; completions arrive over a
//! channel and are folded in by [`AssetCache::poll`] on the frame loop.
//! Each path is fetched at most once, so switching views back and forth
//! reuses the parsed template.

use std::sync::mpsc;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::template::ModelTemplate;
use crate::error::StorefrontError;

/// Outcome of one fetch: the path and its parsed template or error.
pub type LoadResult = (String, Result<ModelTemplate, StorefrontError>);

/// Obtains and parses model assets off the frame loop.
pub trait AssetFetcher {
    /// Start fetching `path`; send exactly one [`LoadResult`] on `done`.
    fn fetch(&self, path: &str, done: mpsc::Sender<LoadResult>);
}

/// Load state of one asset path.
#[derive(Debug, Clone)]
pub enum AssetState {
    /// Fetch in flight.
    Loading,
    /// Parsed and ready to mount.
    Ready(Arc<ModelTemplate>),
    /// Fetch or parse failed; the message is for display and logs.
    Failed(String),
}

/// Path-keyed template cache.
pub struct AssetCache {
    entries: FxHashMap<String, AssetState>,
    fetcher: Box<dyn AssetFetcher>,
    done_tx: mpsc::Sender<LoadResult>,
    done_rx: mpsc::Receiver<LoadResult>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl AssetCache {
    /// Empty cache fetching through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Box<dyn AssetFetcher>) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            entries: FxHashMap::default(),
            fetcher,
            done_tx,
            done_rx,
        }
    }

    /// Current state of `path`, starting a fetch on first request.
    pub fn request(&mut self, path: &str) -> AssetState {
        if let Some(state) = self.entries.get(path) {
            return state.clone();
        }
        log::info!("loading model {path}");
        let _ = self.entries.insert(path.to_owned(), AssetState::Loading);
        self.fetcher.fetch(path, self.done_tx.clone());
        AssetState::Loading
    }

    /// State of `path` without starting a fetch.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&AssetState> {
        self.entries.get(path)
    }

    /// Fold in finished fetches. Returns the paths whose state changed.
    pub fn poll(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        while let Ok((path, result)) = self.done_rx.try_recv() {
            let state = match result {
                Ok(template) => AssetState::Ready(Arc::new(template)),
                Err(e) => {
                    log::error!("{e}");
                    AssetState::Failed(e.to_string())
                }
            };
            let _ = self.entries.insert(path.clone(), state);
            changed.push(path);
        }
        changed
    }
}

/// Serves assets from bytes registered up front (embedded models, tests).
/// Results are delivered on the next [`AssetCache::poll`].
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    assets: FxHashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Empty fetcher; unknown paths fail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` as the content of `path`.
    #[must_use]
    pub fn with_asset(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let _ = self.assets.insert(path.into(), bytes);
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, path: &str, done: mpsc::Sender<LoadResult>) {
        let result = self.assets.get(path).map_or_else(
            || Err(StorefrontError::asset_load(path, "no such asset")),
            |bytes| ModelTemplate::from_slice(path, bytes),
        );
        let _ = done.send((path.to_owned(), result));
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ThreadFetcher;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;
    use std::sync::mpsc;

    use super::{AssetFetcher, LoadResult};
    use crate::error::StorefrontError;
    use crate::loader::template::ModelTemplate;

    enum LoadRequest {
        Load {
            path: String,
            done: mpsc::Sender<LoadResult>,
        },
        Shutdown,
    }

    /// Background thread that reads and parses model files from disk.
    pub struct ThreadFetcher {
        request_tx: mpsc::Sender<LoadRequest>,
        thread: Option<std::thread::JoinHandle<()>>,
    }

    impl std::fmt::Debug for ThreadFetcher {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ThreadFetcher").finish_non_exhaustive()
        }
    }

    impl ThreadFetcher {
        /// Spawn the loader thread.
        ///
        /// # Errors
        ///
        /// Returns [`StorefrontError::Io`] if the thread fails to spawn.
        pub fn new() -> Result<Self, StorefrontError> {
            let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
            let thread = std::thread::Builder::new()
                .name("asset-loader".into())
                .spawn(move || Self::thread_loop(&request_rx))?;
            Ok(Self {
                request_tx,
                thread: Some(thread),
            })
        }

        fn thread_loop(request_rx: &mpsc::Receiver<LoadRequest>) {
            while let Ok(request) = request_rx.recv() {
                match request {
                    LoadRequest::Shutdown => break,
                    LoadRequest::Load { path, done } => {
                        let result = ModelTemplate::load(Path::new(&path));
                        let _ = done.send((path, result));
                    }
                }
            }
        }

        /// Stop the loader thread after in-flight requests and wait for it.
        pub fn shutdown(&mut self) {
            let _ = self.request_tx.send(LoadRequest::Shutdown);
            if let Some(handle) = self.thread.take() {
                let _ = handle.join();
            }
        }
    }

    impl AssetFetcher for ThreadFetcher {
        fn fetch(&self, path: &str, done: mpsc::Sender<LoadResult>) {
            let request = LoadRequest::Load {
                path: path.to_owned(),
                done,
            };
            if let Err(mpsc::SendError(LoadRequest::Load { path, done })) =
                self.request_tx.send(request)
            {
                let _ = done.send((
                    path.clone(),
                    Err(StorefrontError::asset_load(path, "loader thread stopped")),
                ));
            }
        }
    }

    impl Drop for ThreadFetcher {
        fn drop(&mut self) {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::template::tests::sample_glb;

    fn cache() -> AssetCache {
        AssetCache::new(Box::new(
            MemoryFetcher::new().with_asset("store.glb", sample_glb()),
        ))
    }

    #[test]
    fn request_is_loading_until_polled() {
        let mut c = cache();
        assert!(matches!(c.request("store.glb"), AssetState::Loading));
        assert_eq!(c.poll(), vec!["store.glb".to_owned()]);
        assert!(matches!(c.request("store.glb"), AssetState::Ready(_)));
    }

    #[test]
    fn repeated_requests_fetch_once() {
        let mut c = cache();
        let _ = c.request("store.glb");
        let _ = c.request("store.glb");
        assert_eq!(c.poll().len(), 1);
        let (AssetState::Ready(a), AssetState::Ready(b)) =
            (c.request("store.glb"), c.request("store.glb"))
        else {
            panic!("template not ready");
        };
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failures_are_recorded() {
        let mut c = cache();
        let _ = c.request("missing.glb");
        let _ = c.poll();
        match c.get("missing.glb") {
            Some(AssetState::Failed(msg)) => assert!(msg.contains("missing.glb")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn thread_fetcher_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.glb");
        std::fs::write(&path, sample_glb()).unwrap();
        let path = path.display().to_string();

        let mut c = AssetCache::new(Box::new(ThreadFetcher::new().unwrap()));
        let _ = c.request(&path);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while c.poll().is_empty() {
            assert!(std::time::Instant::now() < deadline, "loader timed out");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(matches!(c.get(&path), Some(AssetState::Ready(_))));
    }
}
