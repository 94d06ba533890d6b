use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub code: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn question(&self, code: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.code == code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_rule: Option<QuestionCalculationRule>,
}

impl Question {
    /// The formula tag, if this question is scored at all.
    /// A rule with an empty tag counts as no rule.
    pub fn formula_type(&self) -> Option<&str> {
        self.calculation_rule
            .as_ref()
            .map(|r| r.formula_type.trim())
            .filter(|t| !t.is_empty())
    }

    pub fn option(&self, code: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.code == code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub code: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCalculationRule {
    pub formula_type: String,
}
