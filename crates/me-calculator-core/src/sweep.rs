//! One- and two-dimensional parameter sweeps.
//!
//! A sweep holds every argument of an output at its current value except the
//! swept one(s), which walk their domain `[min, max)` in `resolution` equal
//! steps. Each evaluation owns its argument vector, so points are independent
//! and, with the `parallel` feature, fanned out over the rayon pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::DomainBounds;
use crate::error::MortgageError;
use crate::model::MortgageModel;
use crate::registry::{DomainRegistry, Output};
use crate::resolver::{current_arguments, position_of};
use crate::types::{with_metadata, ComputationOutput};
use crate::validation::{validate_1d, validate_2d};
use crate::MortgageResult;

pub const DEFAULT_RESOLUTION: usize = 1000;

/// What a sweep does with a point whose evaluation fails a domain check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDomainError {
    /// Drop the point (1D); leave a `NaN` gap in the cell (2D).
    Omit,
    /// Record zero.
    ZeroFill,
    /// Abort the sweep with the first failure.
    Propagate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepOptions {
    pub resolution: usize,
    pub policy: OnDomainError,
}

impl SweepOptions {
    /// 1000 steps, failed points omitted.
    pub fn one_dimensional() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            policy: OnDomainError::Omit,
        }
    }

    /// 1000 x 1000 cells, failed cells zero-filled.
    pub fn two_dimensional() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            policy: OnDomainError::ZeroFill,
        }
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_policy(mut self, policy: OnDomainError) -> Self {
        self.policy = policy;
        self
    }
}

/// A labelled sequence of `(x, y)` points for line charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub unit: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(x, _)| *x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, y)| *y)
    }
}

/// Surface data; `z[i][j]` is the output at `(x[j], y[i])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

/// Evenly spaced values `min + k * (max - min) / resolution`, `k < resolution`.
pub fn sweep_values(bounds: DomainBounds, resolution: usize) -> MortgageResult<Vec<f64>> {
    if resolution == 0 {
        return Err(MortgageError::InvalidInput {
            field: "resolution".into(),
            reason: "Resolution must be positive".into(),
        });
    }
    let step = bounds.width() / resolution as f64;
    Ok((0..resolution)
        .map(|k| bounds.min + k as f64 * step)
        .collect())
}

#[derive(Debug, Default)]
struct FailureTally {
    count: usize,
    first: Option<String>,
}

impl FailureTally {
    fn record(&mut self, error: &MortgageError) {
        self.count += 1;
        if self.first.is_none() {
            self.first = Some(error.to_string());
        }
    }

    fn warning(&self, total: usize, label: &str, policy: OnDomainError) -> Option<String> {
        if self.count == 0 {
            return None;
        }
        let action = match policy {
            OnDomainError::Omit => "omitted",
            OnDomainError::ZeroFill => "set to zero",
            OnDomainError::Propagate => "propagated",
        };
        Some(format!(
            "{label}: {} of {total} points failed a domain check and were {action} (first: {})",
            self.count,
            self.first.as_deref().unwrap_or_default()
        ))
    }
}

#[cfg(feature = "parallel")]
fn map_points<T, F>(values: &[f64], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(f64) -> T + Sync + Send,
{
    values.par_iter().map(|v| f(*v)).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_points<T, F>(values: &[f64], f: F) -> Vec<T>
where
    F: Fn(f64) -> T,
{
    values.iter().map(|v| f(*v)).collect()
}

pub struct SweepEngine<'a> {
    registry: &'a DomainRegistry,
    model: &'a MortgageModel,
}

impl<'a> SweepEngine<'a> {
    pub fn new(registry: &'a DomainRegistry, model: &'a MortgageModel) -> Self {
        Self { registry, model }
    }

    fn evaluate_with(
        &self,
        output: Output,
        base: &[f64],
        overrides: &[(usize, f64)],
    ) -> MortgageResult<f64> {
        let mut args = base.to_vec();
        for &(slot, value) in overrides {
            args[slot] = value;
        }
        self.model.evaluate(output, &args)
    }

    /// Sweep one output against `x_parameter`.
    pub fn sweep_1d(
        &self,
        x_parameter: &str,
        output: &str,
        options: SweepOptions,
    ) -> MortgageResult<ComputationOutput<Series>> {
        let start = Instant::now();
        validate_1d(self.registry, x_parameter, &[output])?;
        let (series, warnings) = self.run_1d(x_parameter, output, options)?;

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "One-Dimensional Parameter Sweep",
            &self.assumptions_1d(x_parameter, &[output], options),
            warnings,
            elapsed,
            series,
        ))
    }

    /// Sweep several outputs against the same parameter. Every pair is
    /// validated before any evaluation; surviving lengths may differ.
    pub fn sweep_1d_many(
        &self,
        x_parameter: &str,
        outputs: &[&str],
        options: SweepOptions,
    ) -> MortgageResult<ComputationOutput<Vec<Series>>> {
        let start = Instant::now();
        validate_1d(self.registry, x_parameter, outputs)?;

        let mut all_series = Vec::with_capacity(outputs.len());
        let mut warnings = Vec::new();
        for output in outputs {
            let (series, mut w) = self.run_1d(x_parameter, output, options)?;
            all_series.push(series);
            warnings.append(&mut w);
        }

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "One-Dimensional Parameter Sweep",
            &self.assumptions_1d(x_parameter, outputs, options),
            warnings,
            elapsed,
            all_series,
        ))
    }

    fn run_1d(
        &self,
        x_parameter: &str,
        output: &str,
        options: SweepOptions,
    ) -> MortgageResult<(Series, Vec<String>)> {
        let x_spec = self.registry.parameter(x_parameter)?;
        let output_spec = self.registry.output(output)?;
        let slot = position_of(output_spec, x_spec.parameter)?;
        let base = current_arguments(self.registry, output_spec)?;
        let xs = sweep_values(x_spec.bounds, options.resolution)?;

        tracing::debug!(
            x_parameter,
            output,
            resolution = options.resolution,
            policy = ?options.policy,
            "starting 1D sweep"
        );

        let outcomes = map_points(&xs, |x| {
            self.evaluate_with(output_spec.output, &base, &[(slot, x)])
        });

        let mut points = Vec::with_capacity(xs.len());
        let mut failures = FailureTally::default();
        for (x, outcome) in xs.iter().zip(outcomes) {
            match outcome {
                Ok(y) => points.push((*x, y)),
                Err(e) if e.is_domain_error() => {
                    failures.record(&e);
                    match options.policy {
                        OnDomainError::Omit => {}
                        OnDomainError::ZeroFill => points.push((*x, 0.0)),
                        OnDomainError::Propagate => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            output,
            evaluated = xs.len(),
            failed = failures.count,
            "finished 1D sweep"
        );
        if points.is_empty() {
            tracing::warn!(x_parameter, output, "sweep produced no points");
        }

        let warnings = failures
            .warning(xs.len(), output, options.policy)
            .into_iter()
            .collect();
        Ok((
            Series {
                label: output_spec.name().to_string(),
                unit: output_spec.unit.clone(),
                points,
            },
            warnings,
        ))
    }

    /// Sweep one output over the Cartesian grid of two parameters.
    pub fn sweep_2d(
        &self,
        x_parameter: &str,
        y_parameter: &str,
        output: &str,
        options: SweepOptions,
    ) -> MortgageResult<ComputationOutput<Grid>> {
        let start = Instant::now();
        validate_2d(self.registry, x_parameter, y_parameter, output)?;

        let x_spec = self.registry.parameter(x_parameter)?;
        let y_spec = self.registry.parameter(y_parameter)?;
        let output_spec = self.registry.output(output)?;
        let x_slot = position_of(output_spec, x_spec.parameter)?;
        let y_slot = position_of(output_spec, y_spec.parameter)?;
        let base = current_arguments(self.registry, output_spec)?;
        let xs = sweep_values(x_spec.bounds, options.resolution)?;
        let ys = sweep_values(y_spec.bounds, options.resolution)?;

        tracing::debug!(
            x_parameter,
            y_parameter,
            output,
            resolution = options.resolution,
            policy = ?options.policy,
            "starting 2D sweep"
        );

        let rows = map_points(&ys, |y| {
            xs.iter()
                .map(|x| {
                    self.evaluate_with(output_spec.output, &base, &[(x_slot, *x), (y_slot, y)])
                })
                .collect::<Vec<_>>()
        });

        let mut z = Vec::with_capacity(ys.len());
        let mut failures = FailureTally::default();
        for row in rows {
            let mut z_row = Vec::with_capacity(xs.len());
            for outcome in row {
                match outcome {
                    Ok(value) => z_row.push(value),
                    Err(e) if e.is_domain_error() => {
                        failures.record(&e);
                        match options.policy {
                            OnDomainError::Omit => z_row.push(f64::NAN),
                            OnDomainError::ZeroFill => z_row.push(0.0),
                            OnDomainError::Propagate => return Err(e),
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            z.push(z_row);
        }

        let cells = xs.len() * ys.len();
        tracing::debug!(output, evaluated = cells, failed = failures.count, "finished 2D sweep");
        if failures.count == cells {
            tracing::warn!(x_parameter, y_parameter, output, "every grid cell failed");
        }

        let warnings = failures
            .warning(cells, output, options.policy)
            .into_iter()
            .collect();
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Two-Dimensional Parameter Sweep",
            &serde_json::json!({
                "x_parameter": x_parameter,
                "y_parameter": y_parameter,
                "output": output,
                "resolution": options.resolution,
                "policy": options.policy,
                "compounding": self.model.compounding(),
            }),
            warnings,
            elapsed,
            Grid { x: xs, y: ys, z },
        ))
    }

    fn assumptions_1d(
        &self,
        x_parameter: &str,
        outputs: &[&str],
        options: SweepOptions,
    ) -> serde_json::Value {
        serde_json::json!({
            "x_parameter": x_parameter,
            "outputs": outputs,
            "resolution": options.resolution,
            "policy": options.policy,
            "compounding": self.model.compounding(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DomainConfig, ModelConfig, ScenarioValues};
    use pretty_assertions::assert_eq;

    fn fixture() -> (DomainRegistry, MortgageModel) {
        let registry =
            DomainRegistry::from_config(&ScenarioValues::default(), &DomainConfig::default())
                .unwrap();
        let model = MortgageModel::new(ModelConfig {
            escrow_rate: Some(0.02),
            ..ModelConfig::default()
        })
        .unwrap();
        (registry, model)
    }

    #[test]
    fn test_sweep_values() {
        let values = sweep_values(DomainBounds::new(0.0, 1.0), 4).unwrap();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_sweep_values_zero_resolution() {
        assert!(sweep_values(DomainBounds::new(0.0, 1.0), 0).is_err());
    }

    #[test]
    fn test_1d_omits_failed_points() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        // Escrow is 30_000 on a 1.5M home and the first year's interest is
        // 36_000, so only payments above 66_000 amortise.
        let out = engine
            .sweep_1d(
                "mortgage_payment",
                "mortgage_duration",
                SweepOptions::one_dimensional(),
            )
            .unwrap();
        let series = &out.result;
        assert_eq!(series.points.len(), 485);
        assert!(series.xs().all(|x| x > 66_000.0 && x < 100_000.0));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("515 of 1000"));
    }

    #[test]
    fn test_1d_zero_fill_keeps_every_point() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::one_dimensional().with_policy(OnDomainError::ZeroFill);
        let out = engine
            .sweep_1d("mortgage_payment", "mortgage_duration", options)
            .unwrap();
        assert_eq!(out.result.points.len(), DEFAULT_RESOLUTION);
        assert_eq!(out.result.points[0], (30_000.0, 0.0));
    }

    #[test]
    fn test_1d_propagate_surfaces_domain_error() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::one_dimensional().with_policy(OnDomainError::Propagate);
        let err = engine
            .sweep_1d("mortgage_payment", "mortgage_duration", options)
            .unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_1d_rejects_irrelevant_parameter_before_evaluating() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let err = engine
            .sweep_1d("time", "mortgage_interest_rate", SweepOptions::one_dimensional())
            .unwrap_err();
        assert!(matches!(err, MortgageError::ParameterNotRelevant { .. }));
    }

    #[test]
    fn test_1d_many_lengths_are_independent() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::one_dimensional().with_resolution(100);
        let out = engine
            .sweep_1d_many(
                "mortgage_payment",
                &["mortgage_duration", "accrued_costs"],
                options,
            )
            .unwrap();
        assert_eq!(out.result.len(), 2);
        assert!(out.result[0].points.len() < 100);
        assert_eq!(out.result[1].points.len(), 100);
        assert_eq!(out.result[1].label, "accrued_costs");
    }

    #[test]
    fn test_2d_zero_fills_failed_cells() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::two_dimensional().with_resolution(20);
        let out = engine
            .sweep_2d("mortgage_principal", "time", "mortgage_principal_residual", options)
            .unwrap();
        let grid = &out.result;
        assert_eq!(grid.x.len(), 20);
        assert_eq!(grid.y.len(), 20);
        assert_eq!(grid.z.len(), 20);
        assert!(grid.z.iter().all(|row| row.len() == 20));
        // At time zero the residual is the principal itself.
        for (j, x) in grid.x.iter().enumerate().filter(|(_, x)| **x < 1_300_000.0) {
            assert!((grid.z[0][j] - x).abs() < 1e-6);
        }
        // Above ~1.38M the 76_000 payment cannot amortise the principal.
        assert_eq!(*grid.z[5].last().unwrap(), 0.0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_2d_omit_leaves_nan_gaps() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::two_dimensional()
            .with_resolution(20)
            .with_policy(OnDomainError::Omit);
        let out = engine
            .sweep_2d("mortgage_principal", "time", "mortgage_principal_residual", options)
            .unwrap();
        assert!(out.result.z[5].last().unwrap().is_nan());
    }

    #[test]
    fn test_envelope_echoes_request() {
        let (registry, model) = fixture();
        let engine = SweepEngine::new(&registry, &model);
        let options = SweepOptions::two_dimensional().with_resolution(5);
        let out = engine
            .sweep_2d("mortgage_payment", "time", "mortgage_paid", options)
            .unwrap();
        assert_eq!(out.assumptions["x_parameter"], "mortgage_payment");
        assert_eq!(out.assumptions["resolution"], 5);
        assert_eq!(out.assumptions["policy"], "zero_fill");
        assert_eq!(out.assumptions["compounding"], "discrete");
        assert_eq!(out.metadata.precision, "f64");
    }

    #[test]
    fn test_sweeps_leave_registry_untouched() {
        let (registry, model) = fixture();
        let before = registry.parameters().to_vec();
        let engine = SweepEngine::new(&registry, &model);
        engine
            .sweep_1d("time", "mortgage_paid", SweepOptions::one_dimensional().with_resolution(50))
            .unwrap();
        engine
            .sweep_2d(
                "mortgage_payment",
                "time",
                "mortgage_paid",
                SweepOptions::two_dimensional().with_resolution(10),
            )
            .unwrap();
        assert_eq!(registry.parameters(), before.as_slice());
    }
}
