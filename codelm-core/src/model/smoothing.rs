use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Token;
use super::counts::NGramCounts;

/// Discounted probability estimates for a single n-gram order.
///
/// A `ProbabilityTable` maps every observed n-gram of order `n` to its
/// absolute-discounting estimate. Tables are built once from a finished
/// count table and are immutable afterward.
///
/// # Responsibilities
/// - Convert raw counts into probabilities using a fixed discount
/// - Redistribute the discounted mass via the continuation-count correction
/// - Serve point lookups for the backoff resolver
///
/// # Invariants
/// - Every stored probability is in (0, 1]
/// - Only n-grams observed at least once are present
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
	/// The order of the table (number of tokens in the n-gram)
	n: usize,

	/// Mapping from an observed n-gram to its discounted estimate
	probabilities: HashMap<Vec<Token>, f64>,
}

impl ProbabilityTable {
	/// Builds the probability table for one order.
	///
	/// For every observed n-gram with context `c` and count `count`:
	///
	/// ```text
	/// P = max(count - d, 0) / count(c)
	///   + d * continuation_count(c) / count(c) * (1 / vocab_size)
	/// ```
	///
	/// The residual mass is redistributed with a flat `1 / vocab_size`
	/// term, not the lower-order continuation distribution. Order descent
	/// is handled by the backoff resolver, not inside the estimate.
	///
	/// # Notes
	/// - Every context in the count table has a count >= 1, so the
	///   divisions are well defined.
	///
	/// # Errors
	/// Returns an error if `vocab_size` is 0 or the discount is outside
	/// (0, 1].
	pub fn from_counts(
		counts: &NGramCounts,
		vocab_size: usize,
		discount: f64,
	) -> Result<Self, String> {
		if vocab_size == 0 {
			return Err("Vocabulary is empty".to_owned());
		}
		if !(discount > 0.0 && discount <= 1.0) {
			return Err(format!("Discount must be in (0.0, 1.0], got {}", discount));
		}

		let uniform = 1.0 / vocab_size as f64;
		let mut probabilities = HashMap::new();

		for (context, state) in counts.contexts() {
			let context_count = state.count() as f64;
			let continuation = state.continuation_count() as f64;
			let reserved = discount * continuation / context_count * uniform;

			for (next_token, count) in state.transitions() {
				let seen = (count as f64 - discount).max(0.0) / context_count;

				let mut ngram = context.clone();
				ngram.push(next_token.clone());
				probabilities.insert(ngram, seen + reserved);
			}
		}

		Ok(Self { n: counts.order(), probabilities })
	}

	/// Returns the order of this table.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Looks up the estimate for an n-gram of length `n`.
	///
	/// Returns `None` for n-grams never observed at this order.
	pub fn get(&self, ngram: &[Token]) -> Option<f64> {
		self.probabilities.get(ngram).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn seq(tokens: &[&str]) -> Vec<Token> {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	fn repeated_pair_bigrams() -> NGramCounts {
		let mut counts = NGramCounts::new(2).unwrap();
		counts.add_sequence(&seq(&["a", "b", "a", "b"]));
		counts
	}

	#[test]
	fn discounted_bigram_estimates() {
		// d = 0.75, vocab = {a, b}:
		//   P((a,b)) = (2 - 0.75)/2 + 0.75 * 1/2 * 1/2 = 0.8125
		//   P((b,a)) = (1 - 0.75)/1 + 0.75 * 1/1 * 1/2 = 0.625
		let table = ProbabilityTable::from_counts(&repeated_pair_bigrams(), 2, 0.75).unwrap();

		assert!((table.get(&seq(&["a", "b"])).unwrap() - 0.8125).abs() < 1e-12);
		assert!((table.get(&seq(&["b", "a"])).unwrap() - 0.625).abs() < 1e-12);
		assert_eq!(table.get(&seq(&["b", "b"])), None);
	}

	#[test]
	fn estimates_stay_in_unit_interval() {
		let mut counts = NGramCounts::new(2).unwrap();
		counts.add_sequence(&seq(&["a", "b", "a", "b", "c", "a", "a"]));
		let table = ProbabilityTable::from_counts(&counts, 3, 0.75).unwrap();

		for (ngram, _) in counts.contexts().flat_map(|(context, state)| {
			state.transitions().map(move |(token, count)| {
				let mut ngram = context.clone();
				ngram.push(token.clone());
				(ngram, count)
			})
		}) {
			let p = table.get(&ngram).unwrap();
			assert!(p > 0.0 && p <= 1.0, "P({ngram:?}) = {p}");
		}
	}

	#[test]
	fn unigram_estimates_sum_to_one() {
		// With the empty context, the discounted mass plus the flat
		// residual redistributes exactly over the observed vocabulary.
		let mut counts = NGramCounts::new(1).unwrap();
		counts.add_sequence(&seq(&["a", "b", "a", "b"]));
		let table = ProbabilityTable::from_counts(&counts, 2, 0.75).unwrap();

		let sum = table.get(&seq(&["a"])).unwrap() + table.get(&seq(&["b"])).unwrap();
		assert!((sum - 1.0).abs() < 1e-12);
	}

	#[test]
	fn rejects_empty_vocabulary_and_bad_discounts() {
		let counts = repeated_pair_bigrams();
		assert!(ProbabilityTable::from_counts(&counts, 0, 0.75).is_err());
		assert!(ProbabilityTable::from_counts(&counts, 2, 0.0).is_err());
		assert!(ProbabilityTable::from_counts(&counts, 2, 1.5).is_err());
	}

	#[test]
	fn rebuilding_yields_identical_tables() {
		let first = ProbabilityTable::from_counts(&repeated_pair_bigrams(), 2, 0.75).unwrap();
		let second = ProbabilityTable::from_counts(&repeated_pair_bigrams(), 2, 0.75).unwrap();
		assert_eq!(first, second);
	}
}
