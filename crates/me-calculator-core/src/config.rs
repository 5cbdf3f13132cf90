//! Configuration for a calculator session.
//!
//! Three layers, all `serde`-deserialisable with every field defaulted:
//! [`ModelConfig`] holds the constants the formulary never sweeps,
//! [`DomainConfig`] the half-open sweep range of every parameter, and
//! [`ScenarioValues`] the current value of every parameter.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MortgageError;
use crate::registry::Parameter;
use crate::types::{Money, Rate, Years};
use crate::MortgageResult;

/// Compounding convention used by the loan formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    /// Annual compounding, `(1 + r)^t`.
    #[default]
    Discrete,
    /// Continuous compounding, `e^(r t)`.
    Continuous,
}

/// Non-varying configuration of a financial model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Upfront cost of one point, as a fraction of principal.
    pub cost_per_point: Rate,
    /// Interest rate reduction bought by one point.
    pub discount_per_point: Rate,
    /// Closing costs as a fraction of the financed amount.
    pub closing_costs_rate: Rate,
    /// Yearly escrow as a fraction of home price. `None` disables escrow.
    pub escrow_rate: Option<Rate>,
    /// Yearly appreciation used by the return comparisons.
    pub property_value_growth_rate: Rate,
    pub pmi_rate: Rate,
    /// Home price divided by yearly rent.
    pub price_to_rent_ratio: f64,
    /// Yearly return of the alternative investment.
    pub market_rate_of_return: Rate,
    pub compounding: Compounding,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cost_per_point: 0.01,
            discount_per_point: 0.0025,
            closing_costs_rate: 0.06,
            escrow_rate: None,
            property_value_growth_rate: 0.0,
            pmi_rate: 0.000075,
            price_to_rent_ratio: 20.0,
            market_rate_of_return: 0.07,
            compounding: Compounding::Discrete,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> MortgageResult<()> {
        let rates = [
            ("cost_per_point", self.cost_per_point),
            ("discount_per_point", self.discount_per_point),
            ("closing_costs_rate", self.closing_costs_rate),
            ("property_value_growth_rate", self.property_value_growth_rate),
            ("pmi_rate", self.pmi_rate),
            ("market_rate_of_return", self.market_rate_of_return),
        ];
        for (field, value) in rates {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }
        if let Some(escrow) = self.escrow_rate {
            if !escrow.is_finite() || escrow < 0.0 {
                return Err(invalid("escrow_rate", "must be a non-negative finite number"));
            }
        }
        if !(self.price_to_rent_ratio.is_finite() && self.price_to_rent_ratio > 0.0) {
            return Err(invalid("price_to_rent_ratio", "must be positive"));
        }
        if self.closing_costs_rate < 0.0 {
            return Err(invalid("closing_costs_rate", "cannot be negative"));
        }
        Ok(())
    }
}

/// Half-open sweep range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub min: f64,
    pub max: f64,
}

impl DomainBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Sweep ranges for every declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub points: DomainBounds,
    pub downpayment: DomainBounds,
    pub mortgage_payment: DomainBounds,
    pub mortgage_duration: DomainBounds,
    pub mortgage_principal: DomainBounds,
    pub mortgage_interest_rate: DomainBounds,
    pub property_value_growth_rate: DomainBounds,
    pub pmi_insurance: DomainBounds,
    pub time: DomainBounds,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            points: DomainBounds::new(0.0, 12.0),
            downpayment: DomainBounds::new(0.0, 0.5),
            mortgage_payment: DomainBounds::new(30_000.0, 100_000.0),
            mortgage_duration: DomainBounds::new(1.0, 30.0),
            mortgage_principal: DomainBounds::new(100_000.0, 1_500_000.0),
            mortgage_interest_rate: DomainBounds::new(0.0, 0.2),
            property_value_growth_rate: DomainBounds::new(0.0, 0.2),
            pmi_insurance: DomainBounds::new(0.0, 0.0001),
            time: DomainBounds::new(0.0, 30.0),
        }
    }
}

impl DomainConfig {
    pub fn bounds(&self, parameter: Parameter) -> DomainBounds {
        match parameter {
            Parameter::Points => self.points,
            Parameter::Downpayment => self.downpayment,
            Parameter::MortgagePayment => self.mortgage_payment,
            Parameter::MortgageDuration => self.mortgage_duration,
            Parameter::MortgagePrincipal => self.mortgage_principal,
            Parameter::MortgageInterestRate => self.mortgage_interest_rate,
            Parameter::PropertyValueGrowthRate => self.property_value_growth_rate,
            Parameter::PmiInsurance => self.pmi_insurance,
            Parameter::Time => self.time,
        }
    }

    pub fn validate(&self) -> MortgageResult<()> {
        for parameter in Parameter::ALL {
            let bounds = self.bounds(parameter);
            if !(bounds.min.is_finite() && bounds.max.is_finite()) {
                return Err(invalid(parameter.name(), "domain bounds must be finite"));
            }
            if bounds.min >= bounds.max {
                return Err(invalid(parameter.name(), "domain min must be < max"));
            }
        }
        if self.mortgage_duration.min <= 0.0 {
            return Err(invalid(
                "mortgage_duration",
                "sweeps must not probe non-positive durations",
            ));
        }
        if self.downpayment.max > 1.0 {
            return Err(invalid("downpayment", "domain cannot reach a 100% downpayment"));
        }
        Ok(())
    }
}

/// Current value of every declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioValues {
    pub points: f64,
    pub downpayment: Rate,
    pub mortgage_payment: Money,
    pub mortgage_duration: Years,
    pub mortgage_principal: Money,
    pub mortgage_interest_rate: Rate,
    pub property_value_growth_rate: Rate,
    pub pmi_insurance: Rate,
    pub time: Years,
}

impl Default for ScenarioValues {
    fn default() -> Self {
        Self {
            points: 0.0,
            downpayment: 0.2,
            mortgage_payment: 76_000.0,
            mortgage_duration: 30.0,
            mortgage_principal: 1_200_000.0,
            mortgage_interest_rate: 0.03,
            property_value_growth_rate: 0.07,
            pmi_insurance: 0.000075,
            time: 0.0,
        }
    }
}

impl ScenarioValues {
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Points => self.points,
            Parameter::Downpayment => self.downpayment,
            Parameter::MortgagePayment => self.mortgage_payment,
            Parameter::MortgageDuration => self.mortgage_duration,
            Parameter::MortgagePrincipal => self.mortgage_principal,
            Parameter::MortgageInterestRate => self.mortgage_interest_rate,
            Parameter::PropertyValueGrowthRate => self.property_value_growth_rate,
            Parameter::PmiInsurance => self.pmi_insurance,
            Parameter::Time => self.time,
        }
    }

    pub fn validate(&self) -> MortgageResult<()> {
        for parameter in Parameter::ALL {
            if !self.value(parameter).is_finite() {
                return Err(invalid(parameter.name(), "must be a finite number"));
            }
        }
        if !(0.0..1.0).contains(&self.downpayment) {
            return Err(invalid("downpayment", "must satisfy 0 <= downpayment < 1"));
        }
        Ok(())
    }
}

/// Full configuration of a [`crate::calculator::Calculator`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub model: ModelConfig,
    pub domain: DomainConfig,
    pub scenario: ScenarioValues,
}

impl CalculatorConfig {
    pub fn validate(&self) -> MortgageResult<()> {
        self.model.validate()?;
        self.domain.validate()?;
        self.scenario.validate()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> MortgageResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MortgageResult<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> MortgageResult<T> {
    if !path.is_file() {
        return Err(MortgageError::Io(format!("Not a file: {}", path.display())));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| MortgageError::Io(format!("Failed to read '{}': {}", path.display(), e)))?;
    serde_json::from_str(&contents).map_err(|e| {
        MortgageError::SerializationError(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

fn invalid(field: &str, reason: &str) -> MortgageError {
    MortgageError::InvalidInput {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CalculatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CalculatorConfig::from_json_str(
            r#"{ "model": { "escrow_rate": 0.02 }, "scenario": { "time": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.model.escrow_rate, Some(0.02));
        assert_eq!(config.model.closing_costs_rate, 0.06);
        assert_eq!(config.scenario.time, 5.0);
        assert_eq!(config.scenario.mortgage_principal, 1_200_000.0);
        assert_eq!(config.domain, DomainConfig::default());
    }

    #[test]
    fn test_continuous_compounding_parses() {
        let config =
            CalculatorConfig::from_json_str(r#"{ "model": { "compounding": "continuous" } }"#)
                .unwrap();
        assert_eq!(config.model.compounding, Compounding::Continuous);
    }

    #[test]
    fn test_inverted_domain_rejected() {
        let mut config = CalculatorConfig::default();
        config.domain.time = DomainBounds::new(30.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(MortgageError::InvalidInput { field, .. }) if field == "time"
        ));
    }

    #[test]
    fn test_full_downpayment_rejected() {
        let mut config = CalculatorConfig::default();
        config.scenario.downpayment = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_duration_domain_rejected() {
        let mut config = CalculatorConfig::default();
        config.domain.mortgage_duration = DomainBounds::new(0.0, 30.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            CalculatorConfig::from_json_str("{ not json"),
            Err(MortgageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            CalculatorConfig::from_json_file("/nonexistent/me-calculator.json"),
            Err(MortgageError::Io(_))
        ));
    }

    #[test]
    fn test_bounds_half_open() {
        let bounds = DomainBounds::new(1.0, 2.0);
        assert!(bounds.contains(1.0));
        assert!(!bounds.contains(2.0));
        assert_eq!(bounds.width(), 1.0);
    }
}
