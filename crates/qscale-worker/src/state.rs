use std::sync::Arc;

use qscale_calc::engine::CalculationEngine;
use qscale_eval::dispatcher::MessageDispatcher;
use qscale_eval::handlers::{Collaborators, build_dispatcher};
use qscale_store::FsStore;

use crate::config::WorkerConfig;

/// Everything the intake loop needs, built once at startup.
pub struct WorkerState {
    pub config: WorkerConfig,
    pub store: Arc<FsStore>,
    pub dispatcher: MessageDispatcher,
}

impl WorkerState {
    pub fn build(config: WorkerConfig) -> Self {
        Self::with_engine(config, CalculationEngine::with_builtins())
    }

    /// Custom strategies are registered on `engine` before it is passed in;
    /// the registry is shared read-only from here on.
    pub fn with_engine(config: WorkerConfig, engine: CalculationEngine) -> Self {
        let store = Arc::new(FsStore::new(&config.data_dir));
        let strategies = engine.list_strategies();
        let dispatcher = build_dispatcher(
            Collaborators::from_store(store.clone()),
            engine,
            config.pipeline_options(),
        );
        tracing::info!(
            data_dir = %config.data_dir.display(),
            topic = %config.topic,
            ?strategies,
            message_types = ?dispatcher.message_types(),
            answer_concurrency = config.concurrency.answers,
            factor_concurrency = config.concurrency.factors,
            call_timeout_secs = config.call_timeout_secs,
            "worker state built"
        );

        Self {
            config,
            store,
            dispatcher,
        }
    }
}
