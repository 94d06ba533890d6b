use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A raw answer value, decoded once when the answer sheet is read.
///
/// Upstream services store values as strings that may themselves be JSON
/// (`"\"A\""`, `"3"`, `"[\"A\",\"B\"]"`). Deserialization normalizes all of
/// these into one of the variants below so scoring never re-sniffs types.
/// Numbers keep the text they arrived as, since option codes are compared
/// against that text exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnswerValue {
    Text(String),
    Number { value: f64, raw: String },
    Choices(Vec<String>),
    #[default]
    Empty,
}

impl AnswerValue {
    /// Decode a raw, possibly JSON-encoded answer string.
    pub fn decode(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            // A JSON string is unwrapped exactly once.
            Ok(serde_json::Value::String(inner)) => {
                if inner.trim().is_empty() {
                    Self::Empty
                } else {
                    Self::Text(inner)
                }
            }
            Ok(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(value) => Self::Number {
                    value,
                    raw: trimmed.to_string(),
                },
                None => Self::Text(trimmed.to_string()),
            },
            Ok(serde_json::Value::Object(_)) | Err(_) => Self::Text(raw.to_string()),
            Ok(other) => Self::from_json(other),
        }
    }

    /// Normalize an already-parsed JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::String(s) => Self::decode(&s),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(value) => Self::Number {
                    value,
                    raw: n.to_string(),
                },
                None => Self::Text(n.to_string()),
            },
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            serde_json::Value::Array(items) => Self::Choices(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            obj @ serde_json::Value::Object(_) => Self::Text(obj.to_string()),
        }
    }

    /// Option codes selected by this value, in selection order.
    pub fn selected_codes(&self) -> Vec<&str> {
        match self {
            Self::Text(s) => vec![s.as_str()],
            Self::Number { raw, .. } => vec![raw.as_str()],
            Self::Choices(items) => items.iter().map(String::as_str).collect(),
            Self::Empty => Vec::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Written back in the encoded form it is read from: numbers as their
/// original text, so a reload decodes to the same value.
impl Serialize for AnswerValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number { raw, .. } => serializer.serialize_str(raw),
            Self::Choices(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_code: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub value: AnswerValue,
    /// Unset until the scorer writes it; questions without a scoring rule
    /// stay unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub id: u64,
    #[serde(default)]
    pub questionnaire_code: String,
    #[serde(default)]
    pub questionnaire_version: String,
    #[serde(default)]
    pub title: String,
    /// Derived: the sum of answer scores. See [`AnswerSheet::recompute_total`].
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl AnswerSheet {
    /// Sum of the scores present. Unscored answers contribute zero.
    pub fn total_score(&self) -> f64 {
        self.answers.iter().filter_map(|a| a.score).sum()
    }

    pub fn recompute_total(&mut self) -> f64 {
        self.score = self.total_score();
        self.score
    }

    /// Copy persisted scores onto this sheet, matching answers by question
    /// code. Answers absent from `scored` keep their current score.
    pub fn apply_scores(&mut self, total_score: f64, scored: &[Answer]) {
        for answer in &mut self.answers {
            if let Some(src) = scored.iter().find(|s| s.question_code == answer.question_code) {
                answer.score = src.score;
            }
        }
        self.score = total_score;
    }

    pub fn answer(&self, question_code: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_code == question_code)
    }
}
