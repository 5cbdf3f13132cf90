//! Request validation, run before any sweep evaluates a single point.

use crate::error::MortgageError;
use crate::registry::{DomainRegistry, OutputSpec, ParameterSpec};
use crate::MortgageResult;

pub fn validate_parameter<'r>(
    registry: &'r DomainRegistry,
    name: &str,
) -> MortgageResult<&'r ParameterSpec> {
    registry.parameter(name)
}

pub fn validate_output<'r>(
    registry: &'r DomainRegistry,
    name: &str,
) -> MortgageResult<&'r OutputSpec> {
    registry.output(name)
}

/// Fails with `ParameterNotRelevant` unless `output_name` consumes `parameter_name`.
pub fn validate_compatible(
    registry: &DomainRegistry,
    parameter_name: &str,
    output_name: &str,
) -> MortgageResult<()> {
    let parameter = validate_parameter(registry, parameter_name)?;
    let output = validate_output(registry, output_name)?;
    if output.depends_on(parameter.parameter) {
        Ok(())
    } else {
        Err(MortgageError::ParameterNotRelevant {
            parameter: parameter_name.to_string(),
            output: output_name.to_string(),
        })
    }
}

/// One independent parameter shared by several outputs. Fails on the first
/// incompatible pair; nothing is evaluated unless every pair is valid.
pub fn validate_1d(
    registry: &DomainRegistry,
    x_parameter: &str,
    outputs: &[&str],
) -> MortgageResult<()> {
    validate_parameter(registry, x_parameter)?;
    if outputs.is_empty() {
        return Err(MortgageError::InvalidInput {
            field: "outputs".into(),
            reason: "At least one output is required".into(),
        });
    }
    for output in outputs {
        validate_compatible(registry, x_parameter, output)?;
    }
    Ok(())
}

/// Two independent parameters, each of which the output must consume.
pub fn validate_2d(
    registry: &DomainRegistry,
    x_parameter: &str,
    y_parameter: &str,
    output: &str,
) -> MortgageResult<()> {
    validate_parameter(registry, x_parameter)?;
    validate_parameter(registry, y_parameter)?;
    if x_parameter == y_parameter {
        return Err(MortgageError::InvalidInput {
            field: y_parameter.to_string(),
            reason: "The two swept parameters must differ".into(),
        });
    }
    validate_compatible(registry, x_parameter, output)?;
    validate_compatible(registry, y_parameter, output)
}
