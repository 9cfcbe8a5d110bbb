//! Word-level Markov text generation library.
//!
//! This crate provides:
//! - Histograms with unbiased weighted sampling
//! - Order-parametrized Markov transition models
//! - Bounded random walks producing sentences, with an injectable RNG
//! - Corpus tokenization and JSON model snapshots

/// Error type shared by every fallible operation.
pub mod error;

/// Core models and generation logic.
pub mod model;

/// Corpus reading and tokenization helpers.
pub mod io;

pub use error::{MarkovError, Result};
pub use model::generate_input::{GenerateInput, StartContext};
pub use model::generator::{SentenceGenerator, format_sentence, random_sentence};
pub use model::histogram::Histogram;
pub use model::markov_model::{Context, MarkovModel};
