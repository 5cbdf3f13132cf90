//! Closed-form and semi-numeric relationships among mortgage variables,
//! and the parameter sweeps that turn them into chartable data.

pub mod calculator;
pub mod charting;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod sweep;
pub mod types;
pub mod validation;

pub use calculator::Calculator;
pub use error::MortgageError;
pub use types::*;

/// Standard result type for all calculator operations
pub type MortgageResult<T> = Result<T, MortgageError>;
