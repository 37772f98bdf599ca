use crate::rebuild::RebuildJob;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use simrec_core::{CatalogSchema, Engine, EngineConfig, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::info;

/// Where an engine is built from
#[derive(Debug, Clone)]
pub struct EngineSource {
    pub path: PathBuf,
    pub schema: CatalogSchema,
    pub config: EngineConfig,
}

impl EngineSource {
    pub fn new<P: AsRef<Path>>(path: P, config: EngineConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            schema: CatalogSchema::default(),
            config,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: CatalogSchema) -> Self {
        self.schema = schema;
        self
    }
}

pub(crate) enum EngineState {
    Initializing,
    Ready {
        engine: Arc<Engine>,
        generation: u64,
        ready_since: DateTime<Utc>,
    },
    Failed(String),
}

/// Point-in-time view of the manager, for health reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineStatus {
    Initializing,
    Ready {
        items: usize,
        generation: u64,
        ready_since: DateTime<Utc>,
    },
    Failed {
        reason: String,
    },
}

impl EngineStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineStatus::Ready { .. })
    }
}

/// Owns the serving engine and its lifecycle.
///
/// Queries clone the current `Arc<Engine>` under a short read lock and run
/// without holding it; rebuilds swap a fully built engine in one write.
pub struct EngineManager {
    source: Arc<EngineSource>,
    state: Arc<RwLock<EngineState>>,
    rebuilding: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl EngineManager {
    /// A manager with no engine yet; queries fail with `EngineNotReady` until a build completes
    pub fn new(source: EngineSource) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(RwLock::new(EngineState::Initializing)),
            rebuilding: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A manager serving an already built engine
    pub fn with_engine(source: EngineSource, engine: Engine) -> Self {
        let manager = Self::new(source);
        manager.generation.store(1, Ordering::Release);
        *manager.state.write() = EngineState::Ready {
            engine: Arc::new(engine),
            generation: 1,
            ready_since: Utc::now(),
        };
        manager
    }

    pub fn source(&self) -> &EngineSource {
        &self.source
    }

    fn job(&self) -> Result<RebuildJob> {
        if self.rebuilding.swap(true, Ordering::AcqRel) {
            return Err(Error::EngineNotReady("a rebuild is already in progress".to_string()));
        }
        Ok(RebuildJob::new(
            self.source.clone(),
            self.state.clone(),
            self.rebuilding.clone(),
            self.generation.clone(),
        ))
    }

    /// Build on the calling thread
    pub fn build(&self) -> Result<()> {
        info!("Building engine from {}", self.source.path.display());
        self.job()?.execute()
    }

    /// Build on a background worker thread
    pub fn spawn_build(&self) -> Result<JoinHandle<Result<()>>> {
        info!("Building engine from {} in background", self.source.path.display());
        let job = self.job()?;
        job.spawn().map_err(|e| {
            self.rebuilding.store(false, Ordering::Release);
            Error::Io(e)
        })
    }

    /// Rebuild from the source and swap atomically; the current engine keeps serving on failure
    pub fn reload(&self) -> Result<()> {
        info!("Reloading engine from {}", self.source.path.display());
        self.job()?.execute()
    }

    /// The serving engine
    pub fn engine(&self) -> Result<Arc<Engine>> {
        match &*self.state.read() {
            EngineState::Ready { engine, .. } => Ok(engine.clone()),
            EngineState::Initializing => {
                Err(Error::EngineNotReady("engine is still initializing".to_string()))
            }
            EngineState::Failed(reason) => {
                Err(Error::EngineNotReady(format!("initialization failed: {}", reason)))
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        match &*self.state.read() {
            EngineState::Initializing => EngineStatus::Initializing,
            EngineState::Ready {
                engine,
                generation,
                ready_since,
            } => EngineStatus::Ready {
                items: engine.len(),
                generation: *generation,
                ready_since: *ready_since,
            },
            EngineState::Failed(reason) => EngineStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.read(), EngineState::Ready { .. })
    }

    #[inline]
    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("movies.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const CATALOG: &str = "id,title,tags\n1,Toy Story,Animation|Comedy\n2,Heat,Action|Crime\n";

    #[test]
    fn test_not_ready_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), CATALOG);
        let manager = EngineManager::new(EngineSource::new(path, EngineConfig::default()));

        assert!(matches!(manager.engine(), Err(Error::EngineNotReady(_))));
        assert_eq!(manager.status(), EngineStatus::Initializing);

        manager.build().unwrap();
        assert!(manager.is_ready());
        assert_eq!(manager.engine().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let manager = EngineManager::new(EngineSource::new(
            dir.path().join("missing.csv"),
            EngineConfig::default(),
        ));

        assert!(matches!(manager.build(), Err(Error::DataLoad(_))));
        assert!(matches!(manager.status(), EngineStatus::Failed { .. }));
        assert!(matches!(manager.engine(), Err(Error::EngineNotReady(_))));
        assert!(!manager.is_rebuilding());
    }

    #[test]
    fn test_spawn_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), CATALOG);
        let manager = EngineManager::new(EngineSource::new(path, EngineConfig::default()));

        let handle = manager.spawn_build().unwrap();
        handle.join().unwrap().unwrap();
        assert!(matches!(manager.status(), EngineStatus::Ready { items: 2, generation: 1, .. }));
    }

    #[test]
    fn test_reload_swaps_and_keeps_old_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), CATALOG);
        let manager = EngineManager::new(EngineSource::new(&path, EngineConfig::default()));
        manager.build().unwrap();
        let old = manager.engine().unwrap();

        write_catalog(dir.path(), "id,title,tags\n1,Toy Story,Animation\n2,Heat,Action\n3,Up,Animation\n");
        manager.reload().unwrap();
        let new = manager.engine().unwrap();
        assert_eq!(new.len(), 3);
        // a query holding the old context still sees it intact
        assert_eq!(old.len(), 2);

        write_catalog(dir.path(), "id,name\n1,broken\n");
        assert!(manager.reload().is_err());
        assert_eq!(manager.engine().unwrap().len(), 3);
        assert!(matches!(manager.status(), EngineStatus::Ready { generation: 2, .. }));
    }
}
