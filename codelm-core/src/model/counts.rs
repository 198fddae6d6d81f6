use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Token;

/// Represents one observed context in an n-gram count table.
///
/// A `ContextState` corresponds to a fixed (n-1)-token prefix (`key`) and
/// stores all observed transitions from this prefix to the next token,
/// together with the total number of times the context occurred.
///
/// # Responsibilities
/// - Accumulate transition occurrences during counting
/// - Expose the context count and the continuation count used by smoothing
/// - Merge with another state having the same key (parallel counting support)
///
/// # Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - `count` equals the sum of all transition occurrence counts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContextState {
	/// Identifier of the state (n-1 token prefix; empty for unigrams).
	key: Vec<Token>,
	/// Total occurrences of this context.
	count: u64,
	/// Outgoing transitions indexed by the next token.
	/// The value represents how many times this transition was observed.
	/// Example: { "(" => 42, ";" => 3 }
	transitions: HashMap<Token, u64>,
}

impl ContextState {
	/// Creates a new empty state for the given prefix.
	pub fn new(key: &[Token]) -> Self {
		Self {
			key: key.to_vec(),
			count: 0,
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `next_token`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	///
	/// The context count is increased alongside, preserving the invariant
	/// `count == sum(transitions)`.
	pub fn add_transition(&mut self, next_token: Token) {
		*self.transitions.entry(next_token).or_insert(0) += 1;
		self.count += 1;
	}

	/// Total occurrences of this context.
	pub fn count(&self) -> u64 {
		self.count
	}

	/// Number of distinct tokens observed to follow this context.
	pub fn continuation_count(&self) -> usize {
		self.transitions.len()
	}

	/// Iterates over `(next_token, occurrence count)` pairs.
	pub fn transitions(&self) -> impl Iterator<Item = (&Token, u64)> {
		self.transitions.iter().map(|(token, count)| (token, *count))
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same prefix (`key`).
	/// Transition occurrence counts and the context count are summed.
	///
	/// This method is intended for parallel counting, where multiple
	/// partial count tables are combined into a single one.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err("Key mismatch".to_owned());
		}

		for (next_token, occurrence) in &other.transitions {
			*self.transitions.entry(next_token.clone()).or_insert(0) += *occurrence;
		}
		self.count += other.count;

		Ok(())
	}
}

/// Count tables for a single n-gram order.
///
/// The `NGramCounts` stores one `ContextState` per observed (n-1)-token
/// prefix, built by sliding a width-n window with stride 1 across every
/// sequence of the training corpus.
///
/// # Responsibilities
/// - Count every contiguous token window of length `n`
/// - Maintain the context count alongside the n-gram counts
/// - Merge with another count table of the same order `n`
///
/// # Invariants
/// - `n` is always >= 1 (for n = 1 the context is the empty prefix)
/// - A sequence of length `L` contributes exactly `max(0, L - n + 1)` n-grams
/// - All stored contexts have a count >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramCounts {
	/// The order of the table (number of tokens in the n-gram)
	n: usize, // must be >= 1

	/// Mapping from a prefix (length n-1) to its corresponding state
	contexts: HashMap<Vec<Token>, ContextState>,
}

impl NGramCounts {
	/// Creates a new empty count table of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new(n: usize) -> Result<Self, String> {
		if n < 1 {
			return Err("n must be >= 1".to_owned());
		}
		Ok(Self { n, contexts: HashMap::new() })
	}

	/// Returns the order of this table.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Counts all n-grams of one token sequence.
	///
	/// Slides a window of width `n` with stride 1 across the sequence;
	/// each window increments its own count and its context's count by 1.
	///
	/// # Notes
	/// - Sequences shorter than `n` contribute no n-grams.
	pub fn add_sequence(&mut self, sequence: &[Token]) {
		if sequence.len() < self.n {
			// Sequence too short, no n-grams to count
			return;
		}

		for window in sequence.windows(self.n) {
			let (context, next) = window.split_at(self.n - 1);
			let state = self
				.contexts
				.entry(context.to_vec())
				.or_insert_with(|| ContextState::new(context));
			state.add_transition(next[0].clone());
		}
	}

	/// Occurrence count of a full n-gram (0 if never observed).
	///
	/// The n-gram must have length `n`; anything else counts as unobserved.
	pub fn ngram_count(&self, ngram: &[Token]) -> u64 {
		if ngram.len() != self.n {
			return 0;
		}
		let (context, next) = ngram.split_at(self.n - 1);
		self.contexts
			.get(context)
			.and_then(|state| state.transitions.get(&next[0]).copied())
			.unwrap_or(0)
	}

	/// Occurrence count of a context prefix (0 if never observed).
	pub fn context_count(&self, context: &[Token]) -> u64 {
		self.contexts.get(context).map_or(0, ContextState::count)
	}

	/// Number of distinct tokens observed to follow a context.
	pub fn continuation_count(&self, context: &[Token]) -> usize {
		self.contexts
			.get(context)
			.map_or(0, ContextState::continuation_count)
	}

	/// Iterates over all observed contexts and their states.
	pub fn contexts(&self) -> impl Iterator<Item = (&Vec<Token>, &ContextState)> {
		self.contexts.iter()
	}

	/// Merges another count table into this one.
	///
	/// # Notes
	/// - Both tables must have the same order `n`.
	/// - Occurrence counts for matching contexts and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the table orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.n != other.n {
			return Err("N mismatch".to_owned());
		}

		for (key, state) in &other.contexts {
			if let Some(existing) = self.contexts.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.contexts.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}
