//! Error types for model construction, sampling and generation.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, MarkovError>;

/// Failures surfaced by the core.
///
/// A dead end reached while walking the chain is not an error: generation
/// simply stops and returns what it has.
#[derive(Error, Debug)]
pub enum MarkovError {
	/// Context width must be at least 1.
	#[error("Invalid order: {0} (must be >= 1)")]
	InvalidOrder(usize),

	/// The model has no transitions (too few tokens, or nothing to start from).
	#[error("Empty model: no transitions available")]
	EmptyModel,

	/// Sampling was requested from a histogram without any observation.
	#[error("Empty histogram: nothing to sample from")]
	EmptyHistogram,

	/// An explicit start context is not a key of the model.
	#[error("Unknown context: {0:?}")]
	UnknownContext(Vec<String>),

	/// A serialized model is structurally invalid.
	#[error("Invalid snapshot: {0}")]
	InvalidSnapshot(String),

	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
