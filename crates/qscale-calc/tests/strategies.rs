use qscale_calc::engine::CalculationEngine;
use qscale_calc::error::CalcError;
use qscale_calc::rule::CalculationRule;

fn engine() -> CalculationEngine {
    CalculationEngine::with_builtins()
}

const SAMPLES: &[&[f64]] = &[
    &[1.0],
    &[3.0, 4.0],
    &[0.5, 1.25, 2.0, 7.75],
    &[-2.0, 4.0, 4.0, -2.0, 1.0],
    &[10.0, 0.0, 3.3, 3.3, 9.9, 0.1],
];

fn close(a: f64, b: f64, precision: u32) -> bool {
    (a - b).abs() <= 0.5 * 10f64.powi(-(precision as i32)) + 1e-12
}

#[test]
fn sum_is_arithmetic_total() {
    for operands in SAMPLES {
        let result = engine()
            .calculate(operands, Some(&CalculationRule::sum()))
            .unwrap();
        let expected: f64 = operands.iter().sum();
        assert!(close(result.value, expected, 2), "{operands:?}");
        assert_eq!(result.strategy, "sum");
        assert_eq!(result.operands.len(), operands.len());
    }
}

#[test]
fn average_is_sum_over_count() {
    for operands in SAMPLES {
        let result = engine()
            .calculate(operands, Some(&CalculationRule::average()))
            .unwrap();
        let expected = operands.iter().sum::<f64>() / operands.len() as f64;
        assert!(close(result.value, expected, 2), "{operands:?}");
    }
}

#[test]
fn average_rounds_to_precision() {
    let result = engine()
        .calculate(&[1.0, 2.0, 2.0], Some(&CalculationRule::average()))
        .unwrap();
    assert_eq!(result.value, 1.67);
    assert_eq!(result.metadata_f64("raw_average"), Some(5.0 / 3.0));
}

#[test]
fn max_and_min_return_input_values() {
    for operands in SAMPLES {
        let max = engine()
            .calculate(operands, Some(&CalculationRule::max()))
            .unwrap();
        let min = engine()
            .calculate(operands, Some(&CalculationRule::min()))
            .unwrap();
        assert!(operands.contains(&max.value), "{operands:?}");
        assert!(operands.contains(&min.value), "{operands:?}");
        assert!(operands.iter().all(|v| *v <= max.value && *v >= min.value));
    }
}

#[test]
fn extremum_ties_resolve_to_earliest_index() {
    let operands = [-2.0, 4.0, 4.0, -2.0, 1.0];
    let max = engine()
        .calculate(&operands, Some(&CalculationRule::max()))
        .unwrap();
    let min = engine()
        .calculate(&operands, Some(&CalculationRule::min()))
        .unwrap();
    assert_eq!(max.metadata_u64("max_index"), Some(1));
    assert_eq!(min.metadata_u64("min_index"), Some(0));
}

#[test]
fn option_passes_single_operand_through() {
    let result = engine()
        .calculate(&[0.125], Some(&CalculationRule::option()))
        .unwrap();
    assert_eq!(result.value, 0.125);
}

#[test]
fn option_rejects_zero_or_many_operands() {
    for operands in [&[][..], &[1.0, 2.0][..]] {
        let err = engine()
            .calculate(operands, Some(&CalculationRule::new("option")))
            .unwrap_err();
        assert!(
            matches!(err, CalcError::OperandCount { min: 1, max: Some(1), .. }),
            "{err:?}"
        );
        assert!(!err.is_configuration());
    }
}

#[test]
fn option_with_max_allows_more_operands() {
    let result = engine()
        .calculate(&[2.0, 5.0], Some(&CalculationRule::option_with_max(2)))
        .unwrap();
    assert_eq!(result.value, 2.0);
}

#[test]
fn empty_operands_fail_for_every_builtin() {
    for rule in [
        CalculationRule::sum(),
        CalculationRule::average(),
        CalculationRule::max(),
        CalculationRule::min(),
        CalculationRule::weighted(vec![]),
    ] {
        let err = engine().calculate(&[], Some(&rule)).unwrap_err();
        assert!(matches!(err, CalcError::OperandCount { actual: 0, .. }), "{err:?}");
    }
}

#[test]
fn weighted_defaults_to_uniform_average() {
    let result = engine()
        .calculate(&[2.0, 4.0, 9.0], Some(&CalculationRule::weighted(vec![])))
        .unwrap();
    assert_eq!(result.value, 5.0);
    assert!(result.operands.iter().all(|t| t.weight == 1.0));
}

#[test]
fn weighted_average_and_sum() {
    let avg = engine()
        .calculate(
            &[1.0, 3.0],
            Some(&CalculationRule::weighted_average(vec![1.0, 3.0])),
        )
        .unwrap();
    assert_eq!(avg.value, 2.5);

    let sum = engine()
        .calculate(&[1.0, 3.0], Some(&CalculationRule::weighted_sum(vec![1.0, 3.0])))
        .unwrap();
    assert_eq!(sum.value, 10.0);
    assert_eq!(sum.operands[1].weight, 3.0);
    assert_eq!(sum.operands[1].index, 1);
}

#[test]
fn weighted_rejects_mismatched_weights() {
    let err = engine()
        .calculate(&[1.0, 2.0, 3.0], Some(&CalculationRule::weighted(vec![1.0, 2.0])))
        .unwrap_err();
    assert_eq!(
        err,
        CalcError::WeightCount {
            strategy: "weighted".to_string(),
            weights: 2,
            operands: 3,
        }
    );
}

#[test]
fn weighted_rejects_non_positive_weights() {
    for bad in [0.0, -1.0] {
        let err = engine()
            .calculate(&[1.0, 2.0], Some(&CalculationRule::weighted(vec![1.0, bad])))
            .unwrap_err();
        assert!(
            matches!(err, CalcError::NonPositiveWeight { index: 1, .. }),
            "{err:?}"
        );
    }
}

#[test]
fn explicit_operand_limits_are_enforced() {
    let rule = CalculationRule::sum().with_operand_limits(2, 3);
    assert!(engine().calculate(&[1.0], Some(&rule)).is_err());
    assert!(engine().calculate(&[1.0, 2.0], Some(&rule)).is_ok());
    assert!(engine().calculate(&[1.0; 4], Some(&rule)).is_err());
}

#[test]
fn non_finite_operands_are_rejected() {
    let err = engine()
        .calculate(&[1.0, f64::NAN], Some(&CalculationRule::sum()))
        .unwrap_err();
    assert!(matches!(err, CalcError::NonFiniteOperand { index: 1, .. }));
}
