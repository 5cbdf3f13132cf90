//! Dependency resolution between outputs and parameters.

use crate::error::MortgageError;
use crate::registry::{DomainRegistry, OutputSpec, Parameter};
use crate::MortgageResult;

/// Ordered formal inputs of a registered output.
pub fn dependencies_of<'r>(
    registry: &'r DomainRegistry,
    output_name: &str,
) -> MortgageResult<&'r [Parameter]> {
    Ok(&registry.output(output_name)?.dependencies)
}

/// Slot of `parameter` in the argument vector of `output`.
pub fn position_of(output: &OutputSpec, parameter: Parameter) -> MortgageResult<usize> {
    output
        .dependencies
        .iter()
        .position(|p| *p == parameter)
        .ok_or_else(|| MortgageError::ParameterNotRelevant {
            parameter: parameter.name().to_string(),
            output: output.name().to_string(),
        })
}

/// Argument vector of `output` filled with the current parameter values.
pub fn current_arguments(
    registry: &DomainRegistry,
    output: &OutputSpec,
) -> MortgageResult<Vec<f64>> {
    output
        .dependencies
        .iter()
        .map(|p| registry.parameter_spec(*p).map(|spec| spec.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainConfig, ScenarioValues};
    use pretty_assertions::assert_eq;

    fn registry() -> DomainRegistry {
        DomainRegistry::from_config(&ScenarioValues::default(), &DomainConfig::default()).unwrap()
    }

    #[test]
    fn test_dependencies_of_as_of_time_output() {
        let registry = registry();
        let deps = dependencies_of(&registry, "mortgage_interest_paid").unwrap();
        assert_eq!(
            deps,
            &[
                Parameter::Downpayment,
                Parameter::MortgagePayment,
                Parameter::MortgagePrincipal,
                Parameter::MortgageInterestRate,
                Parameter::Time,
            ]
        );
    }

    #[test]
    fn test_position_of() {
        let registry = registry();
        let payment = registry.output("mortgage_payment").unwrap();
        assert_eq!(position_of(payment, Parameter::MortgageDuration).unwrap(), 1);
        assert!(matches!(
            position_of(payment, Parameter::Time),
            Err(MortgageError::ParameterNotRelevant { .. })
        ));
    }

    #[test]
    fn test_current_arguments_follow_dependency_order() {
        let registry = registry();
        let value = registry.output("property_value").unwrap();
        assert_eq!(
            current_arguments(&registry, value).unwrap(),
            vec![0.2, 1_200_000.0, 0.07, 0.0]
        );
    }

    #[test]
    fn test_current_arguments_need_registered_parameters() {
        let mut registry = DomainRegistry::new();
        registry.register_output("property_value", "[$]").unwrap();
        let output = registry.output("property_value").unwrap().clone();
        assert!(matches!(
            current_arguments(&registry, &output),
            Err(MortgageError::UnknownParameter(_))
        ));
    }
}
