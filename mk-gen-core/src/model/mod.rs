//! Top-level module for the Markov generation system.
//!
//! This module provides:
//! - Token frequency counting and weighted sampling (`Histogram`)
//! - Fixed-order word transition models (`MarkovModel`)
//! - JSON snapshots of built models
//! - Generation configuration (`GenerateInput`)
//! - The random walk itself (`SentenceGenerator`)

/// Random walk over a `MarkovModel` and sentence formatting.
pub mod generator;

/// Generation parameters and start context strategy.
pub mod generate_input;

/// Frequency counter with uniform and weighted sampling.
pub mod histogram;

/// Fixed-order (`order >= 1`) word transition model.
///
/// Built in one forward pass over a token stream, read-only afterwards.
pub mod markov_model;

/// JSON (de)serialization of `MarkovModel`.
mod snapshot;
