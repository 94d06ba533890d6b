use qscale_calc::engine::CalculationEngine;
use qscale_calc::error::CalcError;
use qscale_core::models::answer_sheet::AnswerSheet;
use qscale_core::models::medical_scale::MedicalScale;
use qscale_core::models::report::InterpretReport;
use qscale_eval::factors::{FactorAggregator, FactorStatus, compute_factor};
use qscale_eval::pool::WorkerPool;

fn scored_sheet() -> AnswerSheet {
    serde_json::from_value(serde_json::json!({
        "id": 7,
        "questionnaire_code": "SCL",
        "score": 7.0,
        "answers": [
            { "question_code": "Q1", "value": "A", "score": 3.0 },
            { "question_code": "Q2", "value": "B", "score": 4.0 },
            { "question_code": "Q3", "value": "free text" }
        ]
    }))
    .unwrap()
}

fn scale(factors: serde_json::Value) -> MedicalScale {
    serde_json::from_value(serde_json::json!({
        "code": "SCL",
        "questionnaire_code": "SCL",
        "title": "Checklist",
        "factors": factors
    }))
    .unwrap()
}

fn aggregator() -> FactorAggregator {
    FactorAggregator::new(CalculationEngine::with_builtins(), WorkerPool::new("factors", 2))
}

async fn run(scale: &MedicalScale) -> InterpretReport {
    let sheet = scored_sheet();
    let mut report = InterpretReport::for_scale(sheet.id, scale);
    aggregator().compute_factor_scores(&mut report, &sheet, scale).await;
    report
}

#[tokio::test]
async fn primary_then_multilevel() {
    let scale = scale(serde_json::json!([
        {
            "code": "F1", "title": "Somatic", "factor_type": "primary",
            "calculation_rule": { "formula_type": "sum", "source_codes": ["Q1", "Q2"] }
        },
        {
            "code": "F2", "title": "Overall", "factor_type": "multilevel",
            "calculation_rule": { "formula_type": "average", "source_codes": ["F1"] }
        }
    ]));

    let report = run(&scale).await;
    assert_eq!(report.item("F1").unwrap().score, Some(7.0));
    assert_eq!(report.item("F2").unwrap().score, Some(7.0));
}

#[tokio::test]
async fn multilevel_listed_first_still_sees_primary_scores() {
    let scale = scale(serde_json::json!([
        {
            "code": "TOTAL", "title": "Total", "factor_type": "second_grade",
            "calculation_rule": { "formula_type": "sum", "source_codes": ["A", "B"] }
        },
        {
            "code": "A", "title": "A", "factor_type": "first_grade",
            "calculation_rule": { "formula_type": "max", "source_codes": ["Q1", "Q2"] }
        },
        {
            "code": "B", "title": "B", "factor_type": "first_grade",
            "calculation_rule": { "formula_type": "min", "source_codes": ["Q1", "Q2"] }
        }
    ]));

    let report = run(&scale).await;
    assert_eq!(report.item("A").unwrap().score, Some(4.0));
    assert_eq!(report.item("B").unwrap().score, Some(3.0));
    assert_eq!(report.item("TOTAL").unwrap().score, Some(7.0));
}

#[tokio::test]
async fn missing_sources_are_skipped_and_empty_factors_score_zero() {
    let scale = scale(serde_json::json!([
        {
            "code": "F1", "title": "Somatic", "factor_type": "primary",
            "calculation_rule": { "formula_type": "sum", "source_codes": ["Q1", "Q404"] }
        },
        {
            "code": "F2", "title": "Partial", "factor_type": "multilevel",
            "calculation_rule": { "formula_type": "avg", "source_codes": ["F1", "F404"] }
        },
        {
            "code": "F3", "title": "Withheld", "factor_type": "multilevel",
            "calculation_rule": { "formula_type": "sum", "source_codes": ["F404"] }
        }
    ]));

    let report = run(&scale).await;
    assert_eq!(report.item("F1").unwrap().score, Some(3.0));
    assert_eq!(report.item("F2").unwrap().score, Some(3.0));
    assert_eq!(report.item("F3").unwrap().score, Some(0.0));
}

#[tokio::test]
async fn configuration_problems_score_zero() {
    let scale = scale(serde_json::json!([
        { "code": "NORULE", "title": "No rule", "factor_type": "primary" },
        {
            "code": "EMPTY", "title": "Empty type", "factor_type": "primary",
            "calculation_rule": { "formula_type": "", "source_codes": ["Q1"] }
        },
        {
            "code": "OPT", "title": "Option over two", "factor_type": "primary",
            "calculation_rule": { "formula_type": "option", "source_codes": ["Q1", "Q2"] }
        },
        {
            "code": "ODD", "title": "Third tier", "factor_type": "third_grade",
            "calculation_rule": { "formula_type": "sum", "source_codes": ["Q1"] }
        }
    ]));

    let report = run(&scale).await;
    for code in ["NORULE", "EMPTY", "OPT", "ODD"] {
        assert_eq!(report.item(code).unwrap().score, Some(0.0), "{code}");
    }
}

#[tokio::test]
async fn unscored_answers_contribute_zero() {
    let scale = scale(serde_json::json!([
        {
            "code": "F1", "title": "Mixed", "factor_type": "primary",
            "calculation_rule": { "formula_type": "average", "source_codes": ["Q1", "Q3"] }
        }
    ]));

    let report = run(&scale).await;
    assert_eq!(report.item("F1").unwrap().score, Some(1.5));
}

#[test]
fn weights_and_precision_come_from_the_factor() {
    let scale = scale(serde_json::json!([
        {
            "code": "W", "title": "Weighted", "factor_type": "primary",
            "calculation_rule": {
                "formula_type": "weighted",
                "source_codes": ["Q1", "Q2"],
                "weights": [1.0, 2.0],
                "precision": 1
            }
        }
    ]));
    let sources = [("Q1".to_string(), 3.0), ("Q2".to_string(), 4.0)].into_iter().collect();

    let outcome = compute_factor(
        &CalculationEngine::with_builtins(),
        &scale.factors[0],
        &sources,
        "question",
    );
    // (3 + 8) / 3 = 3.666..
    assert_eq!(outcome.score, 3.7);
    assert_eq!(outcome.status, FactorStatus::Computed);
}

#[test]
fn missing_rule_reports_configuration_error() {
    let scale = scale(serde_json::json!([
        { "code": "NORULE", "title": "No rule", "factor_type": "primary" }
    ]));
    let outcome = compute_factor(
        &CalculationEngine::with_builtins(),
        &scale.factors[0],
        &Default::default(),
        "question",
    );
    assert_eq!(outcome.score, 0.0);
    assert_eq!(outcome.status, FactorStatus::Failed(CalcError::MissingRule));
}
