//! Per-answer scoring.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use qscale_calc::engine::CalculationEngine;
use qscale_calc::error::CalcError;
use qscale_calc::formula;
use qscale_core::models::answer_sheet::{Answer, AnswerSheet};
use qscale_core::models::questionnaire::Questionnaire;

use crate::pool::WorkerPool;

/// What happened to one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Scored(f64),
    /// The question carries no scoring rule, or is not in the questionnaire.
    Unscored,
    Failed(CalcError),
}

/// Counts from one [`AnswerScorer::score_answers`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringSummary {
    pub scored: usize,
    pub unscored: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AnswerScorer {
    engine: CalculationEngine,
    pool: WorkerPool,
}

impl AnswerScorer {
    pub fn new(engine: CalculationEngine, pool: WorkerPool) -> Self {
        Self { engine, pool }
    }

    /// Score every answer on the sheet against its question, writing
    /// `Answer::score` in place. Unscored and failed answers are cleared so
    /// a score loaded from an earlier run never survives. Per-answer
    /// failures never fail the sheet.
    pub async fn score_answers(
        &self,
        sheet: &mut AnswerSheet,
        questionnaire: Arc<Questionnaire>,
    ) -> ScoringSummary {
        let started = Instant::now();
        let tasks: Vec<(usize, Answer)> = sheet.answers.iter().cloned().enumerate().collect();

        let engine = self.engine.clone();
        let results = self
            .pool
            .run_all(tasks, move |(index, answer)| {
                (index, score_answer(&engine, &questionnaire, &answer))
            })
            .await;

        let mut summary = ScoringSummary::default();
        for (index, outcome) in results {
            let Some(answer) = sheet.answers.get_mut(index) else {
                continue;
            };
            match outcome {
                AnswerOutcome::Scored(score) => {
                    debug!(question_code = %answer.question_code, score, "answer scored");
                    answer.score = Some(score);
                    summary.scored += 1;
                }
                AnswerOutcome::Unscored => {
                    answer.score = None;
                    summary.unscored += 1;
                }
                AnswerOutcome::Failed(e) => {
                    answer.score = None;
                    warn!(
                        answer_sheet_id = sheet.id,
                        question_code = %answer.question_code,
                        error = %e,
                        "answer score calculation failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            answer_sheet_id = sheet.id,
            scored = summary.scored,
            unscored = summary.unscored,
            failed = summary.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answers scored"
        );
        summary
    }

    /// Set the sheet score to the sum of the answer scores present.
    pub fn score_total(&self, sheet: &mut AnswerSheet) -> f64 {
        let total = sheet.recompute_total();
        debug!(answer_sheet_id = sheet.id, total, "answer sheet total computed");
        total
    }
}

/// Score one answer. The selected option codes are matched exactly against
/// the question's options and their point values become the operands.
pub fn score_answer(
    engine: &CalculationEngine,
    questionnaire: &Questionnaire,
    answer: &Answer,
) -> AnswerOutcome {
    let Some(question) = questionnaire.question(&answer.question_code) else {
        warn!(question_code = %answer.question_code, "question not found in questionnaire");
        return AnswerOutcome::Unscored;
    };
    let Some(formula_type) = question.formula_type() else {
        return AnswerOutcome::Unscored;
    };

    let rule = match formula::rule_for_formula(formula_type, engine.registry()) {
        Ok(rule) => rule,
        Err(e) => return AnswerOutcome::Failed(e),
    };

    let mut operands = Vec::new();
    for code in answer.value.selected_codes() {
        match question.option(code) {
            Some(option) => operands.push(option.score),
            None => warn!(
                question_code = %question.code,
                option_code = %code,
                "selected option not found"
            ),
        }
    }

    match engine.calculate(&operands, Some(&rule)) {
        Ok(result) => AnswerOutcome::Scored(result.value),
        Err(e) => AnswerOutcome::Failed(e),
    }
}
