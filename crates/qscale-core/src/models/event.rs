//! Message envelope and payloads exchanged over the event bus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

pub const MESSAGE_TYPE_ANSWERSHEET_SAVED: &str = "answersheet.saved";
pub const MESSAGE_TYPE_ANSWERSHEET_SUBMITTED: &str = "answersheet.submitted";
pub const MESSAGE_TYPE_EVALUATION_COMPLETED: &str = "evaluation.completed";
pub const MESSAGE_TYPE_REPORT_GENERATED: &str = "report.generated";

pub const SOURCE_COLLECTION_SERVER: &str = "collection-server";
pub const SOURCE_API_SERVER: &str = "api-server";
pub const SOURCE_EVALUATION_SERVER: &str = "evaluation-server";

/// The typed outer shape of every message: type tag, source, opaque data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Some publishers put the payload beside `data` instead of inside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answersheet_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<jiff::Timestamp>,
}

impl MessageEnvelope {
    pub fn new(message_type: &str, source: &str, data: serde_json::Value) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            message_type: message_type.to_string(),
            source: source.to_string(),
            data,
            answersheet_data: None,
            timestamp: Some(jiff::Timestamp::now()),
        }
    }

    pub fn parse(payload: &[u8]) -> Result<Self, CoreError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswersheetSavedData {
    pub answer_sheet_id: u64,
    #[serde(default)]
    pub questionnaire_code: String,
    #[serde(default)]
    pub questionnaire_version: String,
}

impl AnswersheetSavedData {
    /// Extract the payload from an envelope.
    ///
    /// Looked up, in order: top-level `answersheet_data`,
    /// `data.answersheet_data`, then `data` itself. `answer_sheet_id` and a
    /// non-empty `questionnaire_code` are required.
    pub fn from_envelope(envelope: &MessageEnvelope) -> Result<Self, CoreError> {
        let candidate = envelope
            .answersheet_data
            .as_ref()
            .filter(|v| v.is_object())
            .or_else(|| envelope.data.get("answersheet_data").filter(|v| v.is_object()))
            .unwrap_or(&envelope.data);

        let obj = candidate
            .as_object()
            .ok_or_else(|| CoreError::InvalidField {
                field: "data".to_string(),
                message: "expected a JSON object".to_string(),
            })?;

        let answer_sheet_id = match obj.get("answer_sheet_id") {
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
                .ok_or_else(|| CoreError::InvalidField {
                    field: "answer_sheet_id".to_string(),
                    message: format!("{n} is not a non-negative integer"),
                })?,
            Some(serde_json::Value::String(s)) => {
                s.trim().parse().map_err(|_| CoreError::InvalidField {
                    field: "answer_sheet_id".to_string(),
                    message: format!("'{s}' is not a non-negative integer"),
                })?
            }
            Some(other) => {
                return Err(CoreError::InvalidField {
                    field: "answer_sheet_id".to_string(),
                    message: format!("unexpected value {other}"),
                });
            }
            None => return Err(CoreError::MissingField("answer_sheet_id".to_string())),
        };

        let text = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        // Both handlers look up by questionnaire code.
        let questionnaire_code = text("questionnaire_code").trim().to_string();
        if questionnaire_code.is_empty() {
            return Err(CoreError::MissingField("questionnaire_code".to_string()));
        }

        Ok(Self {
            answer_sheet_id,
            questionnaire_code,
            questionnaire_version: text("questionnaire_version"),
        })
    }
}
