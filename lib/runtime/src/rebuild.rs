// Engine build jobs
// The new engine is built entirely off-lock; only the final swap takes the write lock.

use crate::manager::{EngineSource, EngineState};
use chrono::Utc;
use parking_lot::RwLock;
use simrec_core::{Engine, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Build an engine from its source and swap it into the shared state
pub(crate) struct RebuildJob {
    source: Arc<EngineSource>,
    state: Arc<RwLock<EngineState>>,
    rebuilding_flag: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl RebuildJob {
    pub(crate) fn new(
        source: Arc<EngineSource>,
        state: Arc<RwLock<EngineState>>,
        rebuilding_flag: Arc<AtomicBool>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            source,
            state,
            rebuilding_flag,
            generation,
        }
    }

    /// Run the build. On failure a serving engine is kept; otherwise the state becomes `Failed`.
    pub(crate) fn execute(self) -> Result<()> {
        let result = Engine::load(&self.source.path, &self.source.schema, self.source.config.clone());

        let outcome = match result {
            Ok(engine) => {
                let items = engine.len();
                let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                *self.state.write() = EngineState::Ready {
                    engine: Arc::new(engine),
                    generation,
                    ready_since: Utc::now(),
                };
                info!("Engine generation {} ready with {} items", generation, items);
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.write();
                if matches!(*state, EngineState::Ready { .. }) {
                    warn!("Rebuild failed, keeping current engine: {}", e);
                } else {
                    error!("Engine initialization failed: {}", e);
                    *state = EngineState::Failed(e.to_string());
                }
                Err(e)
            }
        };

        self.rebuilding_flag.store(false, Ordering::Release);
        outcome
    }

    /// Run the build on a dedicated worker thread
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<Result<()>>> {
        thread::Builder::new()
            .name("engine-build".to_string())
            .spawn(move || self.execute())
    }
}
