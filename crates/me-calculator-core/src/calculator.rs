//! Session façade: registry, model, sweeps and charting behind string ids.

use crate::charting::ChartSink;
use crate::config::CalculatorConfig;
use crate::model::MortgageModel;
use crate::registry::DomainRegistry;
use crate::resolver::current_arguments;
use crate::sweep::{Grid, Series, SweepEngine, SweepOptions};
use crate::types::ComputationOutput;
use crate::MortgageResult;

#[derive(Debug, Clone)]
pub struct Calculator {
    registry: DomainRegistry,
    model: MortgageModel,
    resolution: usize,
}

impl Calculator {
    pub fn new(config: &CalculatorConfig) -> MortgageResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: DomainRegistry::from_config(&config.scenario, &config.domain)?,
            model: MortgageModel::new(config.model.clone())?,
            resolution: crate::sweep::DEFAULT_RESOLUTION,
        })
    }

    /// Sweep resolution used by the `data_*` and `plot_*` methods.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn model(&self) -> &MortgageModel {
        &self.model
    }

    fn engine(&self) -> SweepEngine<'_> {
        SweepEngine::new(&self.registry, &self.model)
    }

    /// Single evaluation at the current parameter values. Domain errors
    /// reach the caller.
    pub fn evaluate(&self, output: &str) -> MortgageResult<f64> {
        let spec = self.registry.output(output)?;
        let args = current_arguments(&self.registry, spec)?;
        self.model.evaluate(spec.output, &args)
    }

    pub fn data_1d(
        &self,
        x_parameter: &str,
        outputs: &[&str],
    ) -> MortgageResult<ComputationOutput<Vec<Series>>> {
        self.engine().sweep_1d_many(
            x_parameter,
            outputs,
            SweepOptions::one_dimensional().with_resolution(self.resolution),
        )
    }

    pub fn data_2d(
        &self,
        x_parameter: &str,
        y_parameter: &str,
        output: &str,
    ) -> MortgageResult<ComputationOutput<Grid>> {
        self.engine().sweep_2d(
            x_parameter,
            y_parameter,
            output,
            SweepOptions::two_dimensional().with_resolution(self.resolution),
        )
    }

    /// Sweep every output against `x_parameter` and hand the lines to
    /// `sink`. The sweep validates every pair first, so nothing reaches the
    /// sink if any pair is invalid.
    pub fn plot_1d(
        &self,
        x_parameter: &str,
        outputs: &[&str],
        sink: &mut dyn ChartSink,
    ) -> MortgageResult<Vec<String>> {
        let data = self.data_1d(x_parameter, outputs)?;
        let x_spec = self.registry.parameter(x_parameter)?;
        sink.plot_1d(&data.result, x_spec.name(), &x_spec.unit)?;
        Ok(data.warnings)
    }

    pub fn plot_2d(
        &self,
        x_parameter: &str,
        y_parameter: &str,
        z_output: &str,
        sink: &mut dyn ChartSink,
    ) -> MortgageResult<Vec<String>> {
        let data = self.data_2d(x_parameter, y_parameter, z_output)?;
        let x_label = self.registry.parameter(x_parameter)?.label();
        let y_label = self.registry.parameter(y_parameter)?.label();
        let z_label = self.registry.output(z_output)?.label();
        sink.plot_2d(&data.result, &x_label, &y_label, &z_label)?;
        Ok(data.warnings)
    }
}
