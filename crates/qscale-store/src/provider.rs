use std::future::Future;
use std::pin::Pin;

use qscale_core::models::answer_sheet::{Answer, AnswerSheet};
use qscale_core::models::medical_scale::MedicalScale;
use qscale_core::models::questionnaire::Questionnaire;
use qscale_core::models::report::InterpretReport;

use crate::error::StoreError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to questionnaire definitions.
pub trait QuestionnaireProvider: Send + Sync {
    /// An empty `version` asks for the current version.
    fn get_questionnaire<'a>(
        &'a self,
        code: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Questionnaire, StoreError>>;
}

/// Answer sheets: load one, persist its computed scores.
pub trait AnswerSheetStore: Send + Sync {
    fn get_answer_sheet(&self, id: u64) -> BoxFuture<'_, Result<AnswerSheet, StoreError>>;

    fn save_answer_sheet_scores<'a>(
        &'a self,
        id: u64,
        total_score: f64,
        answers: &'a [Answer],
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// Read access to medical-scale definitions.
pub trait MedicalScaleProvider: Send + Sync {
    fn get_medical_scale_by_questionnaire_code<'a>(
        &'a self,
        questionnaire_code: &'a str,
    ) -> BoxFuture<'a, Result<MedicalScale, StoreError>>;
}

/// Interpretation reports. Saving returns the stored report's id; saving
/// the same report again replaces it.
pub trait InterpretReportStore: Send + Sync {
    fn save_interpret_report<'a>(
        &'a self,
        report: &'a InterpretReport,
    ) -> BoxFuture<'a, Result<u64, StoreError>>;
}
