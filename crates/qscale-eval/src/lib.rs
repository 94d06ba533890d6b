//! qscale-eval
//!
//! The scoring pipeline: concurrent answer scoring, two-pass factor
//! aggregation, interpretation content, and the event dispatcher that
//! drives them through a handler chain.

pub mod dispatcher;
pub mod error;
pub mod factors;
pub mod handlers;
pub mod interpret;
pub mod pool;
pub mod scorer;

pub use crate::dispatcher::{DispatchOutcome, EventState, MessageDispatcher, MessageProcessor};
pub use crate::error::EvalError;
pub use crate::factors::FactorAggregator;
pub use crate::handlers::{
    AnswersheetSavedProcessor, CalcAnswerSheetScoreHandler, Collaborators,
    GenerateInterpretReportHandler, HandlerChain, PipelineOptions, build_dispatcher,
};
pub use crate::interpret::ContentGenerator;
pub use crate::pool::WorkerPool;
pub use crate::scorer::AnswerScorer;
