use qscale_core::models::medical_scale::{Factor, MedicalScale};
use qscale_core::models::report::InterpretReport;
use qscale_eval::error::EvalError;
use qscale_eval::interpret::{ContentGenerator, Severity};

fn factor(rules: serde_json::Value) -> Factor {
    serde_json::from_value(serde_json::json!({
        "code": "F1",
        "title": "Anxiety",
        "factor_type": "primary",
        "interpretation_rules": rules
    }))
    .unwrap()
}

#[test]
fn range_upper_bound_belongs_to_next_rule() {
    let factor = factor(serde_json::json!([
        { "score_range": { "min": 0, "max": 5 }, "content": "low" },
        { "score_range": { "min": 5, "max": 10 }, "content": "high" }
    ]));
    let generator = ContentGenerator::new();

    assert_eq!(generator.factor_content(&factor, 4.99), "low");
    assert_eq!(generator.factor_content(&factor, 5.0), "high");
}

#[test]
fn normal_and_abnormal_ranges() {
    let factor = factor(serde_json::json!([
        { "score_range": { "min_score": 0, "max_score": 1 }, "content": "normal" },
        { "score_range": { "min_score": 1, "max_score": 100 }, "content": "abnormal" }
    ]));
    let generator = ContentGenerator::new();

    assert_eq!(generator.factor_content(&factor, 0.0), "normal");
    assert_eq!(generator.factor_content(&factor, 0.5), "normal");
    assert_eq!(generator.factor_content(&factor, 1.0), "abnormal");
}

#[test]
fn first_matching_rule_wins_and_rangeless_rules_are_skipped() {
    let factor = factor(serde_json::json!([
        { "content": "no range" },
        { "score_range": { "min": 0, "max": 10 }, "content": "wide" },
        { "score_range": { "min": 2, "max": 3 }, "content": "narrow" }
    ]));
    assert_eq!(ContentGenerator::new().factor_content(&factor, 2.5), "wide");
}

#[test]
fn default_bands() {
    let factor = factor(serde_json::json!([]));
    let generator = ContentGenerator::new();

    let normal = generator.factor_content(&factor, 0.0);
    assert!(normal.contains("Anxiety") && normal.contains("F1"));
    assert!(normal.contains("normal range"));
    assert!(generator.factor_content(&factor, 3.0).contains("score 3.00, mildly"));
    assert!(generator.factor_content(&factor, 7.5).contains("score 7.50, moderately"));
    assert!(generator.factor_content(&factor, 12.0).contains("severely"));
    assert!(generator.factor_content(&factor, f64::NAN).ends_with("invalid score"));
    assert!(generator.factor_content(&factor, f64::INFINITY).ends_with("invalid score"));
}

#[test]
fn unmatched_score_falls_back_to_default() {
    let factor = factor(serde_json::json!([
        { "score_range": { "min": 0, "max": 5 }, "content": "low" }
    ]));
    assert!(ContentGenerator::new().factor_content(&factor, 50.0).contains("severely"));
}

#[test]
fn severity_bands() {
    assert_eq!(Severity::classify(0.0), Some(Severity::Normal));
    assert_eq!(Severity::classify(4.99), Some(Severity::Mild));
    assert_eq!(Severity::classify(5.0), Some(Severity::Moderate));
    assert_eq!(Severity::classify(10.0), Some(Severity::Severe));
    assert_eq!(Severity::classify(f64::NAN), None);
}

fn scale() -> MedicalScale {
    serde_json::from_value(serde_json::json!({
        "code": "SCL",
        "title": "Checklist",
        "factors": [
            { "code": "F1", "title": "Somatic", "factor_type": "primary" },
            { "code": "F2", "title": "Anxiety", "factor_type": "primary" },
            { "code": "F3", "title": "Overall", "factor_type": "multilevel" }
        ]
    }))
    .unwrap()
}

#[test]
fn generate_fills_every_item_and_summary() {
    let scale = scale();
    let mut report = InterpretReport::for_scale(3, &scale);
    report.item_mut("F1").unwrap().set_score(0.0);
    report.item_mut("F2").unwrap().set_score(6.0);
    report.item_mut("F3").unwrap().set_score(3.0);

    let generator = ContentGenerator::new();
    generator.generate_content(&mut report, &scale);

    assert!(report.items.iter().all(|i| i.content.is_some()));
    generator.validate_content(&report).unwrap();

    let summary = report.summary.as_deref().unwrap();
    assert!(summary.starts_with("This assessment covers 3 factors with a total score of 9.00."));
    assert!(summary.contains("1 within the normal range."));
    assert!(summary.contains("1 mildly abnormal."));
    assert!(summary.contains("1 moderately abnormal."));
    assert!(summary.ends_with("watching how symptoms develop is recommended."));
}

#[test]
fn summary_total_uses_the_total_factor() {
    let scale: MedicalScale = serde_json::from_value(serde_json::json!({
        "code": "SCL",
        "title": "Checklist",
        "factors": [
            { "code": "F1", "title": "Somatic", "factor_type": "primary" },
            { "code": "T", "title": "Total", "factor_type": "multilevel", "is_total_score": true }
        ]
    }))
    .unwrap();
    let mut report = InterpretReport::for_scale(3, &scale);
    report.item_mut("F1").unwrap().set_score(2.0);
    report.item_mut("T").unwrap().set_score(2.0);

    let summary = ContentGenerator::new().summary(&report);
    assert!(summary.starts_with("This assessment covers 2 factors with a total score of 2.00."));
}

#[test]
fn summary_recommendation_follows_most_severe_band() {
    let scale = scale();
    let generator = ContentGenerator::new();
    let mut report = InterpretReport::for_scale(3, &scale);
    for item in &mut report.items {
        item.set_score(0.0);
    }
    assert!(generator.summary(&report).ends_with("keep it up."));

    report.item_mut("F1").unwrap().set_score(2.0);
    assert!(generator.summary(&report).ends_with("healthy lifestyle are recommended."));

    report.item_mut("F2").unwrap().set_score(15.0);
    assert!(generator.summary(&report).contains("medical professional"));

    report.items.clear();
    assert_eq!(generator.summary(&report), "No interpretation content.");
}

#[test]
fn validation_rejects_items_without_content() {
    let scale = scale();
    let report = InterpretReport::for_scale(3, &scale);
    let err = ContentGenerator::new().validate_content(&report).unwrap_err();
    assert!(matches!(err, EvalError::MissingContent { factor_code } if factor_code == "F1"));
}
