//! Engine cache for front-ends that reuse pipelines across requests.
//!
//! An explicit cache keyed by configuration (backend variant plus optional
//! document path) with explicit invalidation; there is no implicit
//! process-wide singleton. Cached coordinators are mutex-guarded because a
//! coordinator instance does not support concurrent runs.

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;

use entigraph_core::{AppConfig, BackendKind, Result};

use crate::PipelineCoordinator;

/// Cache key: the configuration that distinguishes one engine from another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub backend: BackendKind,
    /// Document preloaded into the engine, if any
    pub document_path: Option<String>,
}

impl EngineKey {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            document_path: None,
        }
    }

    pub fn with_document(mut self, path: impl Into<String>) -> Self {
        self.document_path = Some(path.into());
        self
    }
}

/// Keyed cache of ready-to-run pipeline coordinators.
#[derive(Clone)]
pub struct EngineCache {
    cache: Cache<EngineKey, Arc<Mutex<PipelineCoordinator>>>,
    config: AppConfig,
}

impl EngineCache {
    /// Create a cache that builds engines from the given base
    /// configuration (the key's backend kind overrides the configured one)
    pub fn new(config: AppConfig) -> Self {
        Self::with_capacity(config, 16)
    }

    /// Create a cache bounded to `capacity` engines
    pub fn with_capacity(config: AppConfig, capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
            config,
        }
    }

    /// Fetch the engine for a key, constructing and caching it on miss.
    ///
    /// Construction errors (model artifacts, unreadable documents)
    /// propagate and nothing is cached.
    pub async fn get_or_build(&self, key: &EngineKey) -> Result<Arc<Mutex<PipelineCoordinator>>> {
        if let Some(engine) = self.cache.get(key).await {
            return Ok(engine);
        }

        let mut config = self.config.clone();
        config.backend.kind = key.backend;

        let mut coordinator = PipelineCoordinator::from_config(&config)?;
        if let Some(path) = &key.document_path {
            coordinator.load_file(path)?;
        }

        tracing::info!(backend = %key.backend, document = ?key.document_path, "constructed pipeline engine");
        let engine = Arc::new(Mutex::new(coordinator));
        self.cache.insert(key.clone(), engine.clone()).await;
        Ok(engine)
    }

    /// Drop one cached engine
    pub async fn invalidate(&self, key: &EngineKey) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached engine
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of cached engines
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
