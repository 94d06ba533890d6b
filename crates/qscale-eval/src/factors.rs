//! Two-pass factor aggregation.
//!
//! Pass 1 computes primary factors from answer scores. Pass 2 computes
//! multilevel factors from the primary scores, and only starts once every
//! primary factor has a score. Scales only have these two tiers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use qscale_calc::engine::CalculationEngine;
use qscale_calc::error::CalcError;
use qscale_calc::formula;
use qscale_calc::rule::CalculationRule;
use qscale_core::models::answer_sheet::AnswerSheet;
use qscale_core::models::medical_scale::{Factor, FactorType, MedicalScale};
use qscale_core::models::report::InterpretReport;

use crate::pool::WorkerPool;

/// How one factor's score was reached.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorStatus {
    Computed,
    /// No source resolved to a score; the factor scores zero.
    NoOperands,
    /// Configuration or operand error; the factor scores zero.
    Failed(CalcError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorOutcome {
    pub factor_code: String,
    pub score: f64,
    pub status: FactorStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactorSummary {
    pub primary: usize,
    pub multilevel: usize,
    pub zeroed: usize,
    pub unknown: usize,
}

#[derive(Clone)]
pub struct FactorAggregator {
    engine: CalculationEngine,
    pool: WorkerPool,
}

impl FactorAggregator {
    pub fn new(engine: CalculationEngine, pool: WorkerPool) -> Self {
        Self { engine, pool }
    }

    /// Score every item of `report`. Never fails: factors that cannot be
    /// computed score zero and are logged.
    pub async fn compute_factor_scores(
        &self,
        report: &mut InterpretReport,
        sheet: &AnswerSheet,
        scale: &MedicalScale,
    ) -> FactorSummary {
        let started = Instant::now();
        let factors: HashMap<&str, &Factor> =
            scale.factors.iter().map(|f| (f.code.as_str(), f)).collect();

        let mut primary = Vec::new();
        let mut multilevel = Vec::new();
        let mut summary = FactorSummary::default();
        for item in &mut report.items {
            match factors.get(item.factor_code.as_str()) {
                Some(f) if f.factor_type == FactorType::Primary => primary.push((*f).clone()),
                Some(f) if f.factor_type == FactorType::Multilevel => {
                    multilevel.push((*f).clone())
                }
                Some(_) | None => {
                    warn!(factor_code = %item.factor_code, "factor missing or of unknown type, scoring zero");
                    item.set_score(0.0);
                    summary.unknown += 1;
                }
            }
        }

        // Unscored answers contribute zero.
        let answer_scores: Arc<HashMap<String, f64>> = Arc::new(
            sheet
                .answers
                .iter()
                .map(|a| (a.question_code.clone(), a.score.unwrap_or(0.0)))
                .collect(),
        );

        summary.primary = primary.len();
        let primary_outcomes = self.run_pass(primary, answer_scores, "question").await;
        let mut primary_scores = HashMap::with_capacity(primary_outcomes.len());
        for outcome in primary_outcomes {
            summary.zeroed += usize::from(outcome.status != FactorStatus::Computed);
            primary_scores.insert(outcome.factor_code.clone(), outcome.score);
            record(report, &outcome);
        }
        debug!(primary = summary.primary, "primary factor pass complete");

        summary.multilevel = multilevel.len();
        let multilevel_outcomes = self
            .run_pass(multilevel, Arc::new(primary_scores), "primary factor")
            .await;
        for outcome in multilevel_outcomes {
            summary.zeroed += usize::from(outcome.status != FactorStatus::Computed);
            record(report, &outcome);
        }

        info!(
            answer_sheet_id = sheet.id,
            primary = summary.primary,
            multilevel = summary.multilevel,
            zeroed = summary.zeroed,
            unknown = summary.unknown,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "factor scores computed"
        );
        summary
    }

    async fn run_pass(
        &self,
        factors: Vec<Factor>,
        sources: Arc<HashMap<String, f64>>,
        source_kind: &'static str,
    ) -> Vec<FactorOutcome> {
        let engine = self.engine.clone();
        self.pool
            .run_all(factors, move |factor| {
                compute_factor(&engine, &factor, &sources, source_kind)
            })
            .await
    }
}

fn record(report: &mut InterpretReport, outcome: &FactorOutcome) {
    if let Some(item) = report.item_mut(&outcome.factor_code) {
        item.set_score(outcome.score);
    }
}

/// Compute one factor from the scores its source codes resolve to. Sources
/// absent from `sources` are logged and skipped.
pub fn compute_factor(
    engine: &CalculationEngine,
    factor: &Factor,
    sources: &HashMap<String, f64>,
    source_kind: &str,
) -> FactorOutcome {
    let zero = |status: FactorStatus| FactorOutcome {
        factor_code: factor.code.clone(),
        score: 0.0,
        status,
    };

    let Some(calc) = factor.calculation_rule.as_ref() else {
        warn!(factor_code = %factor.code, "factor has no calculation rule, scoring zero");
        return zero(FactorStatus::Failed(CalcError::MissingRule));
    };

    let mut rule = match formula::rule_for_formula(&calc.formula_type, engine.registry()) {
        Ok(rule) => rule,
        Err(e) => {
            warn!(factor_code = %factor.code, error = %e, "invalid factor formula, scoring zero");
            return zero(FactorStatus::Failed(e));
        }
    };
    rule = apply_factor_rule(rule, &calc.weights, calc.precision);

    let mut operands = Vec::with_capacity(calc.source_codes.len());
    for code in &calc.source_codes {
        match sources.get(code) {
            Some(score) => operands.push(*score),
            None => warn!(
                factor_code = %factor.code,
                source_code = %code,
                source_kind,
                "factor source not found, skipping"
            ),
        }
    }

    if operands.is_empty() {
        warn!(factor_code = %factor.code, "factor has no operands, scoring zero");
        return zero(FactorStatus::NoOperands);
    }

    match engine.calculate(&operands, Some(&rule)) {
        Ok(result) => FactorOutcome {
            factor_code: factor.code.clone(),
            score: result.value,
            status: FactorStatus::Computed,
        },
        Err(e) => {
            warn!(factor_code = %factor.code, error = %e, "factor calculation failed, scoring zero");
            zero(FactorStatus::Failed(e))
        }
    }
}

fn apply_factor_rule(rule: CalculationRule, weights: &[f64], precision: Option<u32>) -> CalculationRule {
    let rule = if weights.is_empty() {
        rule
    } else {
        rule.with_weights(weights.to_vec())
    };
    match precision {
        Some(p) => rule.with_precision(p),
        None => rule,
    }
}
