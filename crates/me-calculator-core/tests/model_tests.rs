use me_calculator_core::config::{Compounding, ModelConfig};
use me_calculator_core::model::MortgageModel;
use proptest::prelude::*;

fn escrow_model(compounding: Compounding) -> MortgageModel {
    MortgageModel::new(ModelConfig {
        escrow_rate: Some(0.02),
        compounding,
        ..ModelConfig::default()
    })
    .unwrap()
}

fn compounding_strategy() -> impl Strategy<Value = Compounding> {
    prop_oneof![Just(Compounding::Discrete), Just(Compounding::Continuous)]
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_property_value_reference() {
    let model = escrow_model(Compounding::Discrete);
    let value = model.property_value(0.1, 900_000.0, 0.1, 10.0).unwrap();
    assert!(
        (value - 2_593_742.46).abs() < 0.005,
        "Expected ~2,593,742.46, got {value}"
    );
}

#[test]
fn test_rate_recovered_from_escrow_scenario() {
    // Payment 80k, escrow 25k on a 1.25M home, 26.5 years: 3%.
    let model = escrow_model(Compounding::Discrete);
    let rate = model
        .mortgage_interest_rate(0.2, 80_000.0, 26.5, 1_000_000.0)
        .unwrap();
    assert!((rate - 0.03).abs() < 1e-9, "Expected 3%, got {rate}");
}

#[test]
fn test_principal_bisection_reference() {
    // Largest principal that 80k/year retires in 30 years at 3% with 2% escrow,
    // found by bisecting a year-by-year simulation.
    let model = escrow_model(Compounding::Discrete);
    let (mut lo, mut hi) = (0.0_f64, 3_000_000.0_f64);
    while hi - lo > 0.01 {
        let mid = (lo + hi) / 2.0;
        let home_price = mid / 0.8;
        let mut residual = mid;
        for _ in 0..30 {
            residual -= 80_000.0 - residual * 0.03 - home_price * 0.02;
        }
        if residual > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let principal = model.mortgage_principal(0.2, 80_000.0, 30.0, 0.03).unwrap();
    assert!(
        (principal - lo).abs() < 1.0,
        "Expected ~{lo}, got {principal}"
    );
}

#[test]
fn test_monthly_rate_without_escrow() {
    let model = MortgageModel::new(ModelConfig::default()).unwrap();
    let payment = model
        .mortgage_payment(0.2, 360.0, 1_000_000.0, 0.004)
        .unwrap();
    let rate = model
        .mortgage_interest_rate(0.2, payment, 360.0, 1_000_000.0)
        .unwrap();
    assert!(
        (0.004 - 1e-9..=0.005 + 1e-9).contains(&rate),
        "Expected one step at or above 0.4%, got {rate}"
    );

    let continuous = MortgageModel::new(ModelConfig {
        compounding: Compounding::Continuous,
        ..ModelConfig::default()
    })
    .unwrap();
    let payment = continuous
        .mortgage_payment(0.2, 40.0, 1_000_000.0, 0.05)
        .unwrap();
    let rate = continuous
        .mortgage_interest_rate(0.2, payment, 40.0, 1_000_000.0)
        .unwrap();
    assert!(
        (0.05 - 1e-9..=0.051 + 1e-9).contains(&rate),
        "Expected one step at or above 5%, got {rate}"
    );
}

#[test]
fn test_residual_at_duration_is_zero_and_beyond_fails() {
    let model = escrow_model(Compounding::Discrete);
    let duration = model
        .mortgage_duration(0.2, 80_000.0, 1_000_000.0, 0.03)
        .unwrap();
    let residual = model
        .mortgage_principal_residual(0.2, 80_000.0, 1_000_000.0, 0.03, duration)
        .unwrap();
    assert!(residual.abs() < 1e-3, "residual at payoff {residual}");

    for output_time in [duration * (1.0 + 1e-9), duration + 0.5] {
        let err = model
            .mortgage_principal_residual(0.2, 80_000.0, 1_000_000.0, 0.03, output_time)
            .unwrap_err();
        assert!(err.is_domain_error(), "unexpected {err}");
        let err = model
            .total_cost_paid(0.2, 80_000.0, 1_000_000.0, 0.03, output_time)
            .unwrap_err();
        assert!(err.is_domain_error(), "unexpected {err}");
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_principal_inverts_payment(
        compounding in compounding_strategy(),
        downpayment in 0.0..0.5f64,
        duration in 1.0..30.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.001..0.2f64,
    ) {
        let model = escrow_model(compounding);
        let payment = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let recovered = model.mortgage_principal(downpayment, payment, duration, rate).unwrap();
        prop_assert!((recovered - principal).abs() <= principal * 1e-8);
    }

    #[test]
    fn prop_duration_inverts_payment(
        compounding in compounding_strategy(),
        downpayment in 0.0..0.5f64,
        duration in 1.0..30.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.001..0.2f64,
    ) {
        let model = escrow_model(compounding);
        let payment = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let recovered = model.mortgage_duration(downpayment, payment, principal, rate).unwrap();
        prop_assert!((recovered - duration).abs() <= 1e-6);
    }

    #[test]
    fn prop_payment_increases_with_rate(
        downpayment in 0.0..0.5f64,
        duration in 1.0..30.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.001..0.19f64,
        bump in 0.0001..0.01f64,
    ) {
        let model = escrow_model(Compounding::Discrete);
        let low = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let high = model.mortgage_payment(downpayment, duration, principal, rate + bump).unwrap();
        prop_assert!(high > low);
    }

    #[test]
    fn prop_rate_search_inverts_payment_to_step(
        compounding in compounding_strategy(),
        downpayment in 0.0..0.5f64,
        duration in 1.0..30.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.002..0.19f64,
    ) {
        let model = escrow_model(compounding);
        let payment = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let found = model
            .mortgage_interest_rate(downpayment, payment, duration, principal)
            .unwrap();
        prop_assert!(found >= rate - 1e-9, "found {} below {}", found, rate);
        prop_assert!(found <= rate + 0.001 + 1e-9, "found {} too far above {}", found, rate);
    }

    #[test]
    fn prop_rate_search_handles_long_schedules(
        compounding in compounding_strategy(),
        downpayment in 0.0..0.5f64,
        duration in 30.0..400.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.002..0.19f64,
    ) {
        let model = escrow_model(compounding);
        let payment = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let found = model
            .mortgage_interest_rate(downpayment, payment, duration, principal)
            .unwrap();
        prop_assert!(found >= rate - 1e-9, "found {} below {}", found, rate);
        prop_assert!(found <= rate + 0.001 + 1e-9, "found {} too far above {}", found, rate);
    }

    #[test]
    fn prop_principal_paid_plus_residual_is_principal(
        downpayment in 0.0..0.5f64,
        duration in 1.0..30.0f64,
        principal in 100_000.0..1_500_000.0f64,
        rate in 0.001..0.2f64,
        fraction in 0.0..0.999f64,
    ) {
        let model = escrow_model(Compounding::Discrete);
        let payment = model.mortgage_payment(downpayment, duration, principal, rate).unwrap();
        let time = duration * fraction;
        let paid = model
            .mortgage_principal_paid(downpayment, payment, principal, rate, time)
            .unwrap();
        let residual = model
            .mortgage_principal_residual(downpayment, payment, principal, rate, time)
            .unwrap();
        prop_assert!((paid + residual - principal).abs() <= principal * 1e-12);
    }
}
