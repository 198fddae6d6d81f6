//! Top-level module for the n-gram language modeling system.
//!
//! This module provides a multi-order token language model, including:
//! - Per-order n-gram counting (`NGramCounts`)
//! - Discounted probability estimation (`ProbabilityTable`)
//! - The combined backoff model (`LanguageModel`)
//! - Perplexity evaluation (`evaluation`)
//! - Ranked next-token completion (`prediction`)
//! - Model configuration (`ModelOptions`)

/// Per-order n-gram counting over token sequences.
///
/// Handles sliding-window ingestion, context bookkeeping,
/// and additive merging of partial count tables.
pub mod counts;

/// Discounted probability estimation for one n-gram order.
///
/// Converts raw counts into an immutable probability table using
/// absolute discounting with a continuation-count correction.
pub mod smoothing;

/// Multi-order language model composed of per-order probability tables.
///
/// Supports parallel construction from a corpus, order backoff with a
/// uniform fallback, and binary persistence.
pub mod language_model;

/// Perplexity evaluation of a held-out corpus against a built model.
pub mod evaluation;

/// Ranked next-token completion and evaluation-corpus context sampling.
pub mod prediction;

/// Model configuration (maximum order, discount, prediction sizes).
///
/// Constrained fields are validated through setters.
pub mod options;

/// A single token. Opaque string atom; equality is exact string equality.
pub type Token = String;

/// One tokenized method body, ordered. Immutable once loaded.
pub type Sequence = Vec<Token>;
