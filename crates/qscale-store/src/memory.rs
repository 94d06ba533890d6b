//! In-memory store, used by tests and dry runs.

use std::collections::HashMap;

use tokio::sync::RwLock;

use qscale_core::models::answer_sheet::{Answer, AnswerSheet};
use qscale_core::models::medical_scale::MedicalScale;
use qscale_core::models::questionnaire::Questionnaire;
use qscale_core::models::report::InterpretReport;

use crate::error::StoreError;
use crate::provider::{
    AnswerSheetStore, BoxFuture, InterpretReportStore, MedicalScaleProvider,
    QuestionnaireProvider,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Keyed by code; each entry holds every inserted version, latest last.
    questionnaires: RwLock<HashMap<String, Vec<Questionnaire>>>,
    answer_sheets: RwLock<HashMap<u64, AnswerSheet>>,
    medical_scales: RwLock<HashMap<String, MedicalScale>>,
    reports: RwLock<HashMap<u64, InterpretReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_questionnaire(&self, questionnaire: Questionnaire) {
        let mut map = self.questionnaires.write().await;
        let versions = map.entry(questionnaire.code.clone()).or_default();
        versions.retain(|q| q.version != questionnaire.version);
        versions.push(questionnaire);
    }

    pub async fn insert_answer_sheet(&self, sheet: AnswerSheet) {
        self.answer_sheets.write().await.insert(sheet.id, sheet);
    }

    pub async fn insert_medical_scale(&self, scale: MedicalScale) {
        self.medical_scales
            .write()
            .await
            .insert(scale.questionnaire_code.clone(), scale);
    }

    pub async fn answer_sheet(&self, id: u64) -> Option<AnswerSheet> {
        self.answer_sheets.read().await.get(&id).cloned()
    }

    pub async fn report(&self, id: u64) -> Option<InterpretReport> {
        self.reports.read().await.get(&id).cloned()
    }

    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }
}

impl QuestionnaireProvider for MemoryStore {
    fn get_questionnaire<'a>(
        &'a self,
        code: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Questionnaire, StoreError>> {
        Box::pin(async move {
            let map = self.questionnaires.read().await;
            let versions = map.get(code).ok_or_else(|| StoreError::NotFound {
                kind: "questionnaire",
                key: code.to_string(),
            })?;
            versions
                .iter()
                .find(|q| !version.is_empty() && q.version == version)
                .or_else(|| versions.last())
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    kind: "questionnaire",
                    key: code.to_string(),
                })
        })
    }
}

impl AnswerSheetStore for MemoryStore {
    fn get_answer_sheet(&self, id: u64) -> BoxFuture<'_, Result<AnswerSheet, StoreError>> {
        Box::pin(async move {
            self.answer_sheets
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    kind: "answer sheet",
                    key: id.to_string(),
                })
        })
    }

    fn save_answer_sheet_scores<'a>(
        &'a self,
        id: u64,
        total_score: f64,
        answers: &'a [Answer],
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut map = self.answer_sheets.write().await;
            let sheet = map.get_mut(&id).ok_or_else(|| StoreError::NotFound {
                kind: "answer sheet",
                key: id.to_string(),
            })?;
            sheet.apply_scores(total_score, answers);
            Ok(())
        })
    }
}

impl MedicalScaleProvider for MemoryStore {
    fn get_medical_scale_by_questionnaire_code<'a>(
        &'a self,
        questionnaire_code: &'a str,
    ) -> BoxFuture<'a, Result<MedicalScale, StoreError>> {
        Box::pin(async move {
            self.medical_scales
                .read()
                .await
                .get(questionnaire_code)
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    kind: "medical scale",
                    key: questionnaire_code.to_string(),
                })
        })
    }
}

impl InterpretReportStore for MemoryStore {
    fn save_interpret_report<'a>(
        &'a self,
        report: &'a InterpretReport,
    ) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            self.reports.write().await.insert(report.id, report.clone());
            Ok(report.id)
        })
    }
}
