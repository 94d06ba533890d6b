//! JSON-directory store.
//!
//! Each record lives in its own file under `root`, keyed by the paths in
//! [`qscale_core::store_keys`]. Writes go to a `.tmp` sibling first and are
//! renamed into place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use qscale_core::models::answer_sheet::{Answer, AnswerSheet};
use qscale_core::models::medical_scale::MedicalScale;
use qscale_core::models::questionnaire::Questionnaire;
use qscale_core::models::report::InterpretReport;
use qscale_core::store_keys;

use crate::error::StoreError;
use crate::provider::{
    AnswerSheetStore, BoxFuture, InterpretReportStore, MedicalScaleProvider,
    QuestionnaireProvider,
};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn load<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        key: &str,
    ) -> Result<T, StoreError> {
        let path = self.path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    kind,
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        debug!(key, bytes = json.len(), "record written");
        Ok(())
    }

    pub async fn put_questionnaire(&self, questionnaire: &Questionnaire) -> Result<(), StoreError> {
        let code = checked(&questionnaire.code)?;
        if !questionnaire.version.is_empty() {
            let version = checked(&questionnaire.version)?;
            self.save(&store_keys::questionnaire_version(code, version), questionnaire)
                .await?;
        }
        self.save(&store_keys::questionnaire(code), questionnaire).await
    }

    pub async fn put_answer_sheet(&self, sheet: &AnswerSheet) -> Result<(), StoreError> {
        self.save(&store_keys::answer_sheet(sheet.id), sheet).await
    }

    pub async fn put_medical_scale(&self, scale: &MedicalScale) -> Result<(), StoreError> {
        let code = checked(&scale.questionnaire_code)?;
        self.save(&store_keys::medical_scale_by_questionnaire(code), scale)
            .await
    }

    pub async fn load_report(&self, id: u64) -> Result<InterpretReport, StoreError> {
        self.load("interpret report", &store_keys::interpret_report(id))
            .await
    }
}

fn checked(segment: &str) -> Result<&str, StoreError> {
    if store_keys::is_safe_segment(segment) {
        Ok(segment)
    } else {
        Err(StoreError::InvalidKey(segment.to_string()))
    }
}

impl QuestionnaireProvider for FsStore {
    fn get_questionnaire<'a>(
        &'a self,
        code: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Questionnaire, StoreError>> {
        Box::pin(async move {
            let code = checked(code)?;
            if !version.is_empty() {
                let version = checked(version)?;
                match self
                    .load("questionnaire", &store_keys::questionnaire_version(code, version))
                    .await
                {
                    Err(e) if e.is_not_found() => {
                        debug!(code, version, "versioned questionnaire missing, using latest");
                    }
                    other => return other,
                }
            }
            self.load("questionnaire", &store_keys::questionnaire(code))
                .await
        })
    }
}

impl AnswerSheetStore for FsStore {
    fn get_answer_sheet(&self, id: u64) -> BoxFuture<'_, Result<AnswerSheet, StoreError>> {
        Box::pin(async move {
            self.load("answer sheet", &store_keys::answer_sheet(id))
                .await
        })
    }

    fn save_answer_sheet_scores<'a>(
        &'a self,
        id: u64,
        total_score: f64,
        answers: &'a [Answer],
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let key = store_keys::answer_sheet(id);
            let mut sheet: AnswerSheet = self.load("answer sheet", &key).await?;
            sheet.apply_scores(total_score, answers);
            self.save(&key, &sheet).await
        })
    }
}

impl MedicalScaleProvider for FsStore {
    fn get_medical_scale_by_questionnaire_code<'a>(
        &'a self,
        questionnaire_code: &'a str,
    ) -> BoxFuture<'a, Result<MedicalScale, StoreError>> {
        Box::pin(async move {
            let code = checked(questionnaire_code)?;
            self.load(
                "medical scale",
                &store_keys::medical_scale_by_questionnaire(code),
            )
            .await
        })
    }
}

impl InterpretReportStore for FsStore {
    fn save_interpret_report<'a>(
        &'a self,
        report: &'a InterpretReport,
    ) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            self.save(&store_keys::interpret_report(report.id), report)
                .await?;
            Ok(report.id)
        })
    }
}
