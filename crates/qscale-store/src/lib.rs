//! qscale-store
//!
//! Collaborator interfaces the scoring pipeline depends on (questionnaires,
//! answer sheets, medical scales, interpretation reports), plus an
//! in-memory implementation and a JSON-directory implementation.

pub mod error;
pub mod fs;
pub mod memory;
pub mod provider;

pub use crate::error::StoreError;
pub use crate::fs::FsStore;
pub use crate::memory::MemoryStore;
pub use crate::provider::{
    AnswerSheetStore, BoxFuture, InterpretReportStore, MedicalScaleProvider,
    QuestionnaireProvider,
};
