use serde::{Deserialize, Serialize};

use super::medical_scale::MedicalScale;
use crate::error::CoreError;

/// The interpretation of one answer sheet against one medical scale.
/// Built once per scoring cycle and persisted once fully populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretReport {
    pub id: u64,
    pub answer_sheet_id: u64,
    pub medical_scale_code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<InterpretItem>,
    /// The factor flagged `is_total_score`, if the scale has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_factor_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: jiff::Timestamp,
}

impl InterpretReport {
    /// An unscored report with one empty item per factor, in scale order.
    pub fn for_scale(answer_sheet_id: u64, scale: &MedicalScale) -> Self {
        Self {
            id: answer_sheet_id,
            answer_sheet_id,
            medical_scale_code: scale.code.clone(),
            title: scale.title.clone(),
            description: scale.description.clone(),
            items: scale
                .factors
                .iter()
                .map(|f| InterpretItem::empty(&f.code, &f.title))
                .collect(),
            total_factor_code: scale
                .factors
                .iter()
                .find(|f| f.is_total_score)
                .map(|f| f.code.clone()),
            summary: None,
            created_at: jiff::Timestamp::now(),
        }
    }

    pub fn item(&self, factor_code: &str) -> Option<&InterpretItem> {
        self.items.iter().find(|i| i.factor_code == factor_code)
    }

    /// The total factor's score when the scale flags one, otherwise the
    /// sum over all items.
    pub fn total_score(&self) -> f64 {
        match self.total_factor_code.as_deref().and_then(|code| self.item(code)) {
            Some(item) => item.score_or_zero(),
            None => self.items.iter().map(InterpretItem::score_or_zero).sum(),
        }
    }

    pub fn item_mut(&mut self, factor_code: &str) -> Option<&mut InterpretItem> {
        self.items.iter_mut().find(|i| i.factor_code == factor_code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretItem {
    pub factor_code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl InterpretItem {
    pub fn empty(factor_code: &str, title: &str) -> Self {
        Self {
            factor_code: factor_code.to_string(),
            title: title.to_string(),
            score: None,
            content: None,
        }
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = Some(score);
    }

    /// Content is only meaningful for a scored item.
    pub fn set_content(&mut self, content: String) -> Result<(), CoreError> {
        if self.score.is_none() {
            return Err(CoreError::ContentBeforeScore {
                factor_code: self.factor_code.clone(),
            });
        }
        self.content = Some(content);
        Ok(())
    }

    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}
