//! Interpretation text for scored reports.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::{debug, info, warn};

use qscale_core::models::medical_scale::{Factor, InterpretationRule, MedicalScale};
use qscale_core::models::report::InterpretReport;

use crate::error::EvalError;

/// Fixed score bands used when no interpretation rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// `None` for NaN or infinite scores.
    pub fn classify(score: f64) -> Option<Self> {
        if !score.is_finite() {
            return None;
        }
        Some(if score == 0.0 {
            Self::Normal
        } else if score < 5.0 {
            Self::Mild
        } else if score < 10.0 {
            Self::Moderate
        } else {
            Self::Severe
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentGenerator;

impl ContentGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Fill in `content` for every scored item of `report`.
    ///
    /// Items whose factor is missing from the scale keep no content; the
    /// caller decides whether that is acceptable via
    /// [`ContentGenerator::validate_content`].
    pub fn generate_content(&self, report: &mut InterpretReport, scale: &MedicalScale) {
        let factors: HashMap<&str, &Factor> =
            scale.factors.iter().map(|f| (f.code.as_str(), f)).collect();

        let mut generated = 0usize;
        for item in &mut report.items {
            let Some(factor) = factors.get(item.factor_code.as_str()) else {
                warn!(factor_code = %item.factor_code, "factor not found in scale, no content");
                continue;
            };
            let content = self.factor_content(factor, item.score_or_zero());
            debug!(factor_code = %item.factor_code, %content, "interpretation content generated");
            if item.score.is_none() {
                item.set_score(0.0);
            }
            match item.set_content(content) {
                Ok(()) => generated += 1,
                Err(e) => warn!(factor_code = %item.factor_code, error = %e, "content not set"),
            }
        }

        report.summary = Some(self.summary(report));
        info!(
            report_id = report.id,
            items = report.items.len(),
            generated,
            "interpretation content generated"
        );
    }

    /// The text of the first rule whose range contains `score`, or the
    /// band default when none does.
    pub fn factor_content(&self, factor: &Factor, score: f64) -> String {
        if factor.interpretation_rules.is_empty() {
            debug!(factor_code = %factor.code, "factor has no interpretation rules, using default");
            return self.default_content(factor, score);
        }
        match matching_rule(&factor.interpretation_rules, score) {
            Some(rule) => rule.content.clone(),
            None => {
                warn!(factor_code = %factor.code, score, "no interpretation rule matches, using default");
                self.default_content(factor, score)
            }
        }
    }

    pub fn default_content(&self, factor: &Factor, score: f64) -> String {
        let head = format!("Factor {} ({}) result", factor.title, factor.code);
        match Severity::classify(score) {
            None => format!("{head}: invalid score"),
            Some(Severity::Normal) => format!("{head}: score 0, within the normal range"),
            Some(Severity::Mild) => format!("{head}: score {score:.2}, mildly abnormal"),
            Some(Severity::Moderate) => format!(
                "{head}: score {score:.2}, moderately abnormal, attention recommended"
            ),
            Some(Severity::Severe) => format!(
                "{head}: score {score:.2}, severely abnormal, timely intervention recommended"
            ),
        }
    }

    /// Band tallies over all items plus a closing recommendation driven by
    /// the most severe band present.
    pub fn summary(&self, report: &InterpretReport) -> String {
        if report.items.is_empty() {
            return "No interpretation content.".to_string();
        }

        let mut counts: HashMap<Severity, usize> = HashMap::new();
        let total = report.total_score();
        for item in &report.items {
            let score = item.score_or_zero();
            // Non-finite scores fall into the top band.
            let band = Severity::classify(score).unwrap_or(Severity::Severe);
            *counts.entry(band).or_default() += 1;
        }
        let count = |band: Severity| counts.get(&band).copied().unwrap_or(0);

        let mut text = format!(
            "This assessment covers {} factors with a total score of {total:.2}.",
            report.items.len()
        );
        let bands = [
            (Severity::Normal, "within the normal range"),
            (Severity::Mild, "mildly abnormal"),
            (Severity::Moderate, "moderately abnormal"),
            (Severity::Severe, "severely abnormal"),
        ];
        for (band, label) in bands {
            let n = count(band);
            if n > 0 {
                let _ = write!(text, " {n} {label}.");
            }
        }

        let advice = if count(Severity::Severe) > 0 {
            "Seeking help from a medical professional promptly is recommended."
        } else if count(Severity::Moderate) > 0 {
            "Periodic reassessment and watching how symptoms develop is recommended."
        } else if count(Severity::Mild) > 0 {
            "Some attention and a healthy lifestyle are recommended."
        } else {
            "The overall result is good; keep it up."
        };
        text.push(' ');
        text.push_str(advice);
        text
    }

    /// Every item must carry non-empty content.
    pub fn validate_content(&self, report: &InterpretReport) -> Result<(), EvalError> {
        match report
            .items
            .iter()
            .find(|i| i.content.as_deref().is_none_or(str::is_empty))
        {
            Some(item) => Err(EvalError::MissingContent {
                factor_code: item.factor_code.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// First rule whose half-open `[min, max)` range contains `score`. Rules
/// without a range never match.
pub fn matching_rule(rules: &[InterpretationRule], score: f64) -> Option<&InterpretationRule> {
    rules
        .iter()
        .find(|r| r.score_range.is_some_and(|range| range.contains(score)))
}
