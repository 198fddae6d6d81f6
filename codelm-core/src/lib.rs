//! N-gram language modeling library for tokenized source code.
//!
//! This crate provides a classical n-gram language model including:
//! - Multi-order n-gram counting over token sequences
//! - Absolute-discounting probability estimation
//! - Order backoff with a uniform out-of-vocabulary fallback
//! - Perplexity evaluation over held-out corpora
//! - Ranked next-token completion
//!
//! The model is built once from a training corpus and is immutable
//! afterward; evaluation and prediction are read-only consumers.

/// Core counting, smoothing, backoff, evaluation and prediction logic.
pub mod model;

/// I/O utilities (corpus loading, cache path helpers).
pub mod io;
