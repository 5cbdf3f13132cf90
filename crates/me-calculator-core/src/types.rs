use serde::{Deserialize, Serialize};

/// Monetary amounts in dollars.
pub type Money = f64;

/// Rates expressed as fractions (0.05 = 5%). Never as percentages.
pub type Rate = f64;

/// Year counts. Fractional values are legal throughout the formulary.
pub type Years = f64;

/// What every sweep returns: the data, how it was produced, and the
/// per-output failure summaries.
///
/// `assumptions` echoes the request (parameters, resolution, failure policy,
/// compounding) so a chart can be reproduced from its envelope alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Crate version and wall-clock time of the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap sweep data with its request echo and warnings.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64".to_string(),
        },
    }
}
