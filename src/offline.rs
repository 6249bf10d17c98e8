//! Offline availability for the hosted build of the timer.
//!
//! [`OfflineCache`] sits between the timer's front end and the network and
//! picks one of three policies per request: network-first for page
//! navigations (falling back to the cached shell), cache-first for the app's
//! own static assets, and stale-while-revalidate for everything else.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use strum_macros::{Display, EnumIs};
use thiserror::Error;

const CACHE_PREFIX: &str = "exam-timer";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("{0} is not cached and the network is unavailable")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("could not fetch static asset: {0}")]
    Fetch(#[from] FetchError),
    #[error("static asset {url} answered with status {status}")]
    BadStatus { url: String, status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum RequestMode {
    /// Top-level page load
    Navigate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ResponseKind {
    Basic,
    Cors,
    /// Cross-origin response whose status and body are hidden
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Basic,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            kind: ResponseKind::Basic,
            body: Vec::new(),
        }
    }

    /// Only complete, readable responses are worth keeping
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind != ResponseKind::Opaque
    }
}

pub trait Network: Send + Sync + 'static {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Named response caches. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: Arc<Mutex<BTreeMap<String, BTreeMap<String, Response>>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, BTreeMap<String, Response>>> {
        self.caches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn has(&self, cache: &str) -> bool {
        self.lock().contains_key(cache)
    }

    pub fn delete(&self, cache: &str) -> bool {
        self.lock().remove(cache).is_some()
    }

    pub fn get(&self, cache: &str, url: &str) -> Option<Response> {
        self.lock().get(cache).and_then(|c| c.get(url)).cloned()
    }

    pub fn put(&self, cache: &str, url: &str, response: Response) {
        self.lock()
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    fn put_all(&self, cache: &str, entries: Vec<(String, Response)>) {
        self.lock()
            .entry(cache.to_string())
            .or_default()
            .extend(entries);
    }
}

/// Where and under which version the app is hosted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Scheme and host, e.g. `https://centre.example.org`
    pub origin: String,
    /// Path prefix of the app, with leading and trailing slash
    pub base: String,
    pub version: String,
    /// Paths cached on install
    pub static_assets: Vec<String>,
}

impl CacheConfig {
    /// Config with the app shell, manifest and icons as static assets
    pub fn new(origin: &str, base: &str, version: &str) -> Self {
        let static_assets = ["", "index.html", "manifest.webmanifest", "icon-192.png", "icon-512.png"]
            .iter()
            .map(|file| format!("{}{}", base, file))
            .collect();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            base: base.to_string(),
            version: version.to_string(),
            static_assets,
        }
    }

    pub fn static_cache_name(&self) -> String {
        format!("{}-static-{}", CACHE_PREFIX, self.version)
    }

    pub fn runtime_cache_name(&self) -> String {
        format!("{}-runtime-{}", CACHE_PREFIX, self.version)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Document served for navigations while offline
    pub fn shell_url(&self) -> String {
        self.url_for(&format!("{}index.html", self.base))
    }

    fn is_own_asset(&self, url: &str) -> bool {
        url.strip_prefix(&self.origin)
            .is_some_and(|path| path.starts_with(&self.base))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    StaleWhileRevalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum WorkerState {
    Registered,
    Installed,
    Activated,
}

/// A response plus how it was produced
#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub from_cache: bool,
    /// Background refresh started for a stale-while-revalidate hit
    pub revalidation: Option<JoinHandle<()>>,
}

impl Served {
    fn network(response: Response) -> Self {
        Self {
            response,
            from_cache: false,
            revalidation: None,
        }
    }

    fn cached(response: Response) -> Self {
        Self {
            response,
            from_cache: true,
            revalidation: None,
        }
    }
}

pub struct OfflineCache {
    config: CacheConfig,
    storage: CacheStorage,
    network: Arc<dyn Network>,
    state: WorkerState,
    controls_clients: bool,
}

impl OfflineCache {
    pub fn new(config: CacheConfig, storage: CacheStorage, network: Arc<dyn Network>) -> Self {
        Self {
            config,
            storage,
            network,
            state: WorkerState::Registered,
            controls_clients: false,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Already-open sessions are served by this worker
    pub fn controls_clients(&self) -> bool {
        self.controls_clients
    }

    /// Fetches every static asset and stores them together. One failure
    /// leaves the static cache untouched.
    pub fn install(&mut self) -> Result<(), CacheError> {
        let mut entries = Vec::with_capacity(self.config.static_assets.len());
        for path in &self.config.static_assets {
            let url = self.config.url_for(path);
            let response = self.network.fetch(&Request::get(url.clone()))?;
            if !(200..300).contains(&response.status) {
                return Err(CacheError::BadStatus {
                    url,
                    status: response.status,
                });
            }
            entries.push((url, response));
        }

        let cache = self.config.static_cache_name();
        info!("installed {} static assets into {}", entries.len(), cache);
        self.storage.put_all(&cache, entries);
        self.state = WorkerState::Installed;
        Ok(())
    }

    /// Drops caches from other versions and takes over open sessions.
    /// Returns the names of the deleted caches.
    pub fn activate(&mut self) -> Vec<String> {
        let keep = [self.config.static_cache_name(), self.config.runtime_cache_name()];
        let stale: Vec<String> = self
            .storage
            .keys()
            .into_iter()
            .filter(|name| !keep.contains(name))
            .collect();
        for name in &stale {
            self.storage.delete(name);
            info!("deleted outdated cache {}", name);
        }
        self.state = WorkerState::Activated;
        self.controls_clients = true;
        stale
    }

    pub fn classify(&self, request: &Request) -> Strategy {
        if request.mode.is_navigate() {
            Strategy::NetworkFirst
        } else if self.config.is_own_asset(&request.url) {
            Strategy::CacheFirst
        } else {
            Strategy::StaleWhileRevalidate
        }
    }

    pub fn handle(&self, request: &Request) -> Result<Served, FetchError> {
        let strategy = self.classify(request);
        debug!("{} via {}", request.url, strategy);
        match strategy {
            Strategy::NetworkFirst => self.network_first(request),
            Strategy::CacheFirst => self.cache_first(request),
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request),
        }
    }

    fn network_first(&self, request: &Request) -> Result<Served, FetchError> {
        match self.network.fetch(request) {
            Ok(response) => Ok(Served::network(response)),
            Err(e) => {
                warn!("navigation offline, serving shell: {}", e);
                self.storage
                    .get(&self.config.static_cache_name(), &self.config.shell_url())
                    .map(Served::cached)
                    .ok_or_else(|| FetchError::Unavailable(request.url.clone()))
            }
        }
    }

    fn cache_first(&self, request: &Request) -> Result<Served, FetchError> {
        let cache = self.config.static_cache_name();
        if let Some(hit) = self.storage.get(&cache, &request.url) {
            return Ok(Served::cached(hit));
        }

        let response = self.network.fetch(request)?;
        if response.is_cacheable() {
            self.storage.put(&cache, &request.url, response.clone());
        }
        Ok(Served::network(response))
    }

    fn stale_while_revalidate(&self, request: &Request) -> Result<Served, FetchError> {
        let cache = self.config.runtime_cache_name();

        let Some(stale) = self.storage.get(&cache, &request.url) else {
            let response = self.network.fetch(request).map_err(|e| {
                debug!("no cached copy of {}: {}", request.url, e);
                FetchError::Unavailable(request.url.clone())
            })?;
            if response.is_cacheable() {
                self.storage.put(&cache, &request.url, response.clone());
            }
            return Ok(Served::network(response));
        };

        let network = Arc::clone(&self.network);
        let storage = self.storage.clone();
        let request = request.clone();
        let revalidation = thread::spawn(move || match network.fetch(&request) {
            Ok(fresh) if fresh.is_cacheable() => storage.put(&cache, &request.url, fresh),
            Ok(fresh) => debug!("not caching {} (status {})", request.url, fresh.status),
            Err(e) => debug!("keeping stale {}: {}", request.url, e),
        });

        Ok(Served {
            response: stale,
            from_cache: true,
            revalidation: Some(revalidation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_names_carry_version() {
        let config = CacheConfig::new("https://centre.example.org/", "/LVExamtimer/", "v1.0.0");
        assert_eq!(config.origin, "https://centre.example.org");
        assert_eq!(config.static_cache_name(), "exam-timer-static-v1.0.0");
        assert_eq!(config.runtime_cache_name(), "exam-timer-runtime-v1.0.0");
        assert_eq!(
            config.shell_url(),
            "https://centre.example.org/LVExamtimer/index.html"
        );
        assert_eq!(config.static_assets[0], "/LVExamtimer/");
        assert_eq!(config.static_assets.len(), 5);
    }

    #[test]
    fn own_assets_need_origin_and_base() {
        let config = CacheConfig::new("https://a.example", "/app/", "v1");
        assert!(config.is_own_asset("https://a.example/app/style.css"));
        assert!(!config.is_own_asset("https://a.example/other/style.css"));
        assert!(!config.is_own_asset("https://a.example.evil/app/style.css"));
        assert!(!config.is_own_asset("https://cdn.example/app/style.css"));
    }

    #[test]
    fn only_ok_readable_responses_are_cacheable() {
        assert!(Response::ok("x").is_cacheable());
        assert!(!Response::with_status(404).is_cacheable());
        let opaque = Response {
            kind: ResponseKind::Opaque,
            ..Response::ok("x")
        };
        assert!(!opaque.is_cacheable());
    }

    #[test]
    fn storage_clones_share_entries() {
        let storage = CacheStorage::new();
        let other = storage.clone();
        storage.put("a", "u", Response::ok("1"));
        assert_eq!(other.get("a", "u"), Some(Response::ok("1")));
        assert!(other.delete("a"));
        assert!(!storage.has("a"));
    }
}
