//! Domain registry: the settable parameters and the derivable outputs.
//!
//! Every output carries the ordered list of parameters its formula consumes.
//! The list comes from a static table ([`Output::dependencies`]) and is
//! copied onto the [`OutputSpec`] once, at registration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{DomainBounds, DomainConfig, ScenarioValues};
use crate::error::MortgageError;
use crate::MortgageResult;

const DOLLARS: &str = "[$]";
const YEARS: &str = "[years]";
const FRACTION_OF_PRINCIPAL: &str = "[fraction of principal]";
const FRACTION_OF_HOME_PRICE: &str = "[fraction of home price]";

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Points,
    Downpayment,
    MortgagePayment,
    MortgageDuration,
    MortgagePrincipal,
    MortgageInterestRate,
    PropertyValueGrowthRate,
    PmiInsurance,
    Time,
}

impl Parameter {
    pub const ALL: [Parameter; 9] = [
        Parameter::Points,
        Parameter::Downpayment,
        Parameter::MortgagePayment,
        Parameter::MortgageDuration,
        Parameter::MortgagePrincipal,
        Parameter::MortgageInterestRate,
        Parameter::PropertyValueGrowthRate,
        Parameter::PmiInsurance,
        Parameter::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Points => "points",
            Parameter::Downpayment => "downpayment",
            Parameter::MortgagePayment => "mortgage_payment",
            Parameter::MortgageDuration => "mortgage_duration",
            Parameter::MortgagePrincipal => "mortgage_principal",
            Parameter::MortgageInterestRate => "mortgage_interest_rate",
            Parameter::PropertyValueGrowthRate => "property_value_growth_rate",
            Parameter::PmiInsurance => "pmi_insurance",
            Parameter::Time => "time",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Points => "[number]",
            Parameter::Downpayment
            | Parameter::PropertyValueGrowthRate
            | Parameter::PmiInsurance => FRACTION_OF_HOME_PRICE,
            Parameter::MortgagePayment | Parameter::MortgagePrincipal => DOLLARS,
            Parameter::MortgageDuration | Parameter::Time => YEARS,
            Parameter::MortgageInterestRate => FRACTION_OF_PRINCIPAL,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| MortgageError::UnknownParameter(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    MortgagePayment,
    MortgageDuration,
    MortgagePrincipal,
    MortgageInterestRate,
    MortgageInterest,
    MortgageEscrow,
    Mortgage,
    PropertyValue,
    MortgagePrincipalResidual,
    MortgagePrincipalPaid,
    MortgageInterestResidual,
    MortgageInterestPaid,
    MortgageEscrowResidual,
    MortgageEscrowPaid,
    MortgageResidual,
    MortgagePaid,
    TotalCost,
    TotalCostResidual,
    TotalCostPaid,
    AccruedCosts,
    HomePurchaseTotalReturn,
    HomePurchaseNetReturn,
    NoHomePurchaseTotalReturn,
}

use Parameter::{
    Downpayment as DP, MortgageDuration as N, MortgageInterestRate as R, MortgagePayment as PMT,
    MortgagePrincipal as P, PropertyValueGrowthRate as G, Time as T,
};

const PAYMENT_INPUTS: &[Parameter] = &[DP, N, P, R];
const PRINCIPAL_INPUTS: &[Parameter] = &[DP, PMT, N, R];
const RATE_INPUTS: &[Parameter] = &[DP, PMT, N, P];
const SCHEDULE_INPUTS: &[Parameter] = &[DP, PMT, P, R];
const PROPERTY_INPUTS: &[Parameter] = &[DP, P, G, T];
const AS_OF_TIME_INPUTS: &[Parameter] = &[DP, PMT, P, R, T];

impl Output {
    pub const ALL: [Output; 23] = [
        Output::MortgagePayment,
        Output::MortgageDuration,
        Output::MortgagePrincipal,
        Output::MortgageInterestRate,
        Output::MortgageInterest,
        Output::MortgageEscrow,
        Output::Mortgage,
        Output::PropertyValue,
        Output::MortgagePrincipalResidual,
        Output::MortgagePrincipalPaid,
        Output::MortgageInterestResidual,
        Output::MortgageInterestPaid,
        Output::MortgageEscrowResidual,
        Output::MortgageEscrowPaid,
        Output::MortgageResidual,
        Output::MortgagePaid,
        Output::TotalCost,
        Output::TotalCostResidual,
        Output::TotalCostPaid,
        Output::AccruedCosts,
        Output::HomePurchaseTotalReturn,
        Output::HomePurchaseNetReturn,
        Output::NoHomePurchaseTotalReturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Output::MortgagePayment => "mortgage_payment",
            Output::MortgageDuration => "mortgage_duration",
            Output::MortgagePrincipal => "mortgage_principal",
            Output::MortgageInterestRate => "mortgage_interest_rate",
            Output::MortgageInterest => "mortgage_interest",
            Output::MortgageEscrow => "mortgage_escrow",
            Output::Mortgage => "mortgage",
            Output::PropertyValue => "property_value",
            Output::MortgagePrincipalResidual => "mortgage_principal_residual",
            Output::MortgagePrincipalPaid => "mortgage_principal_paid",
            Output::MortgageInterestResidual => "mortgage_interest_residual",
            Output::MortgageInterestPaid => "mortgage_interest_paid",
            Output::MortgageEscrowResidual => "mortgage_escrow_residual",
            Output::MortgageEscrowPaid => "mortgage_escrow_paid",
            Output::MortgageResidual => "mortgage_residual",
            Output::MortgagePaid => "mortgage_paid",
            Output::TotalCost => "total_cost",
            Output::TotalCostResidual => "total_cost_residual",
            Output::TotalCostPaid => "total_cost_paid",
            Output::AccruedCosts => "accrued_costs",
            Output::HomePurchaseTotalReturn => "home_purchase_total_return",
            Output::HomePurchaseNetReturn => "home_purchase_net_return",
            Output::NoHomePurchaseTotalReturn => "no_home_purchase_total_return",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Output::MortgageDuration => YEARS,
            Output::MortgageInterestRate => FRACTION_OF_PRINCIPAL,
            _ => DOLLARS,
        }
    }

    /// Formal inputs of the output's formula, in argument order.
    pub fn dependencies(self) -> &'static [Parameter] {
        match self {
            Output::MortgagePayment => PAYMENT_INPUTS,
            Output::MortgagePrincipal => PRINCIPAL_INPUTS,
            Output::MortgageInterestRate => RATE_INPUTS,
            Output::MortgageDuration
            | Output::MortgageInterest
            | Output::MortgageEscrow
            | Output::Mortgage
            | Output::TotalCost => SCHEDULE_INPUTS,
            Output::PropertyValue => PROPERTY_INPUTS,
            Output::MortgagePrincipalResidual
            | Output::MortgagePrincipalPaid
            | Output::MortgageInterestResidual
            | Output::MortgageInterestPaid
            | Output::MortgageEscrowResidual
            | Output::MortgageEscrowPaid
            | Output::MortgageResidual
            | Output::MortgagePaid
            | Output::TotalCostResidual
            | Output::TotalCostPaid
            | Output::AccruedCosts
            | Output::HomePurchaseTotalReturn
            | Output::HomePurchaseNetReturn
            | Output::NoHomePurchaseTotalReturn => AS_OF_TIME_INPUTS,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Output {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Output::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or_else(|| MortgageError::UnknownOutput(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Registry records
// ---------------------------------------------------------------------------

/// A registered parameter with its current value and sweep domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub parameter: Parameter,
    pub value: f64,
    pub bounds: DomainBounds,
    pub unit: String,
}

impl ParameterSpec {
    pub fn name(&self) -> &'static str {
        self.parameter.name()
    }

    /// Axis label for charting, e.g. `mortgage_principal [$]`.
    pub fn label(&self) -> String {
        format!("{} {}", self.name(), self.unit)
    }
}

/// A registered output with its cached dependency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub output: Output,
    pub unit: String,
    pub dependencies: Vec<Parameter>,
}

impl OutputSpec {
    pub fn name(&self) -> &'static str {
        self.output.name()
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.name(), self.unit)
    }

    pub fn depends_on(&self, parameter: Parameter) -> bool {
        self.dependencies.contains(&parameter)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainRegistry {
    parameters: Vec<ParameterSpec>,
    outputs: Vec<OutputSpec>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every parameter and every output, taking current values from
    /// `scenario` and sweep ranges from `domain`.
    pub fn from_config(scenario: &ScenarioValues, domain: &DomainConfig) -> MortgageResult<Self> {
        let mut registry = Self::new();
        for parameter in Parameter::ALL {
            let bounds = domain.bounds(parameter);
            registry.register_parameter(
                parameter.name(),
                scenario.value(parameter),
                bounds.min,
                bounds.max,
                parameter.unit(),
            )?;
        }
        for output in Output::ALL {
            registry.register_output(output.name(), output.unit())?;
        }
        Ok(registry)
    }

    pub fn register_parameter(
        &mut self,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
        unit: &str,
    ) -> MortgageResult<&ParameterSpec> {
        let parameter: Parameter = name.parse()?;
        if self.parameters.iter().any(|p| p.parameter == parameter) {
            return Err(MortgageError::InvalidInput {
                field: name.to_string(),
                reason: "Parameter is already registered".into(),
            });
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(MortgageError::InvalidInput {
                field: name.to_string(),
                reason: format!("Domain [{min}, {max}) is empty or not finite"),
            });
        }
        self.parameters.push(ParameterSpec {
            parameter,
            value,
            bounds: DomainBounds::new(min, max),
            unit: unit.to_string(),
        });
        Ok(&self.parameters[self.parameters.len() - 1])
    }

    /// Register an output; its dependencies are resolved from the formula table.
    pub fn register_output(&mut self, name: &str, unit: &str) -> MortgageResult<&OutputSpec> {
        let output: Output = name.parse()?;
        if self.outputs.iter().any(|o| o.output == output) {
            return Err(MortgageError::InvalidInput {
                field: name.to_string(),
                reason: "Output is already registered".into(),
            });
        }
        self.outputs.push(OutputSpec {
            output,
            unit: unit.to_string(),
            dependencies: output.dependencies().to_vec(),
        });
        Ok(&self.outputs[self.outputs.len() - 1])
    }

    pub fn parameter(&self, name: &str) -> MortgageResult<&ParameterSpec> {
        self.parameters
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| MortgageError::UnknownParameter(name.to_string()))
    }

    pub fn output(&self, name: &str) -> MortgageResult<&OutputSpec> {
        self.outputs
            .iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| MortgageError::UnknownOutput(name.to_string()))
    }

    pub fn parameter_spec(&self, parameter: Parameter) -> MortgageResult<&ParameterSpec> {
        self.parameter(parameter.name())
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }
}
