use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::io::{build_output_path, read_corpus};
use super::counts::NGramCounts;
use super::options::ModelOptions;
use super::smoothing::ProbabilityTable;
use super::{Sequence, Token};

/// The top-level language model combining all n-gram orders.
///
/// This struct manages:
/// - `tables`: a map from n-gram order to its `ProbabilityTable`.
/// - `vocab`: the set of distinct tokens observed in the training corpus,
///   frozen at training time. Stored sorted so every iteration over
///   candidates is deterministic.
/// - `max_n` and `discount`: the parameters the model was built with.
///
/// Once built, the model is read-only: probability lookups, evaluation and
/// prediction never mutate it, so it may be shared freely across threads.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LanguageModel {
	max_n: usize,
	discount: f64,
	vocab: BTreeSet<Token>,
	tables: HashMap<usize, ProbabilityTable>,
}

impl LanguageModel {
	/// Builds a model from a training corpus.
	///
	/// # Behavior
	/// - Freezes the vocabulary from the corpus tokens. Tokens unseen here
	///   are permanently out-of-vocabulary for prediction purposes.
	/// - Counts every order from 1 to `max_n` across the whole corpus,
	///   splitting the corpus into chunks counted by worker threads and
	///   merging the partial tables by addition.
	/// - Derives one probability table per order from the merged counts.
	///
	/// # Errors
	/// Returns an error if the corpus contains no tokens (the model cannot
	/// be built without a vocabulary).
	///
	/// # Notes
	/// - Uses MPSC channels to collect partial counts from threads.
	/// - `unwrap()` is safe because `NGramCounts::new(n)` always succeeds
	///   for n >= 1.
	pub fn train(corpus: &[Sequence], options: &ModelOptions) -> Result<Self, String> {
		let vocab: BTreeSet<Token> = corpus
			.iter()
			.flat_map(|sequence| sequence.iter().cloned())
			.collect();
		if vocab.is_empty() {
			return Err("Training corpus is empty, cannot build a vocabulary".to_owned());
		}

		let max_n = options.max_n();
		let counts = Self::count_corpus(corpus, max_n)?;

		let mut tables = HashMap::new();
		for order_counts in &counts {
			let table = ProbabilityTable::from_counts(order_counts, vocab.len(), options.discount())?;
			tables.insert(order_counts.order(), table);
		}

		Ok(Self {
			max_n,
			discount: options.discount(),
			vocab,
			tables,
		})
	}

	/// Splits the corpus into chunks, counts partial tables for every order
	/// in parallel, and merges all partial tables into the final ones.
	///
	/// # Behavior
	/// - Splits input sequences into chunks (based on CPU cores * factor).
	/// - Spawns threads counting orders 1..=max_n for each chunk.
	/// - Merges all partial tables sequentially; merging is plain addition,
	///   so the result is independent of arrival order.
	fn count_corpus(corpus: &[Sequence], max_n: usize) -> Result<Vec<NGramCounts>, String> {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = (corpus.len() + chunks - 1) / chunks;

		let (tx, rx) = mpsc::channel();
		for chunk in corpus.chunks(chunk_size.max(1)) {
			let tx = tx.clone();
			let chunk: Vec<Sequence> = chunk.to_vec();

			thread::spawn(move || {
				// Impossible to panic, orders are initialized >= 1
				let mut partial: Vec<NGramCounts> =
					(1..=max_n).map(|n| NGramCounts::new(n).unwrap()).collect();
				for sequence in &chunk {
					for order_counts in &mut partial {
						order_counts.add_sequence(sequence);
					}
				}
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut merged: Vec<NGramCounts> =
			(1..=max_n).map(|n| NGramCounts::new(n).unwrap()).collect();
		for partial in rx.iter() {
			for (total, part) in merged.iter_mut().zip(partial.iter()) {
				total.merge(part)?;
			}
		}

		Ok(merged)
	}

	/// Resolves the probability of an n-gram by order backoff.
	///
	/// Walks orders from `min(len, max_n)` down to 1, looking up the
	/// n-gram's trailing `k` tokens in the order-`k` table, and returns the
	/// first hit. Falls back to the uniform probability `1 / vocab_size`
	/// when no order has an estimate.
	///
	/// The result is always strictly positive while the vocabulary is
	/// non-empty, which `train` guarantees.
	pub fn probability(&self, ngram: &[Token]) -> f64 {
		for k in (1..=ngram.len().min(self.max_n)).rev() {
			let suffix = &ngram[ngram.len() - k..];
			if let Some(table) = self.tables.get(&k) {
				if let Some(p) = table.get(suffix) {
					return p;
				}
			}
		}
		1.0 / self.vocab.len() as f64
	}

	/// Returns the maximum n-gram order the model was built with.
	pub fn max_n(&self) -> usize {
		self.max_n
	}

	/// Returns the discount the model was built with.
	pub fn discount(&self) -> f64 {
		self.discount
	}

	/// Returns the frozen training vocabulary, sorted.
	pub fn vocab(&self) -> &BTreeSet<Token> {
		&self.vocab
	}

	/// Returns the number of distinct tokens seen at training time.
	pub fn vocab_size(&self) -> usize {
		self.vocab.len()
	}

	/// Loads a model for a corpus file if a binary cache exists, otherwise
	/// trains from the text corpus and writes the cache.
	///
	/// - `filepath` is the input corpus file (one sequence per line).
	/// - Checks if a sibling `.bin` file exists for fast loading.
	/// - Uses `postcard` for compact serialization/deserialization.
	///
	/// The cache is keyed by the corpus path only; rebuild with different
	/// options requires removing the `.bin` file first.
	pub fn from_corpus_file<P: AsRef<Path>>(
		filepath: P,
		options: &ModelOptions,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_path = build_output_path(&filepath, "bin")?;
		if binary_path.exists() {
			let bytes = std::fs::read(binary_path)?;
			return Ok(postcard::from_bytes(&bytes)?);
		}

		let corpus = read_corpus(&filepath)?;
		let model = Self::train(&corpus, options)?;

		let bytes = postcard::to_stdvec(&model)?;
		std::fs::write(binary_path, bytes)?;

		Ok(model)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn seq(tokens: &[&str]) -> Sequence {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	fn options(max_n: usize) -> ModelOptions {
		let mut options = ModelOptions::default();
		options.set_max_n(max_n).unwrap();
		options
	}

	#[test]
	fn refuses_an_empty_training_corpus() {
		assert!(LanguageModel::train(&[], &options(2)).is_err());
		assert!(LanguageModel::train(&[vec![]], &options(2)).is_err());
	}

	#[test]
	fn highest_order_estimate_wins() {
		let model = LanguageModel::train(&[seq(&["a", "b", "a", "b"])], &options(2)).unwrap();
		// Seen bigram resolves at order 2, not below.
		assert!((model.probability(&seq(&["a", "b"])) - 0.8125).abs() < 1e-12);
	}

	#[test]
	fn backs_off_to_lower_orders_before_the_uniform_fallback() {
		// vocab = {a, b, c}, size 3.
		let model = LanguageModel::train(&[seq(&["a", "b", "a", "b", "c"])], &options(2)).unwrap();

		// ("x", "a"): unknown bigram, but "a" has a unigram estimate:
		//   P(a) = (2 - 0.75)/5 + 0.75 * 3/5 * 1/3 = 0.4
		let backed_off = model.probability(&seq(&["x", "a"]));
		assert!((backed_off - 0.4).abs() < 1e-12);

		// ("x", "y"): unseen at every order, uniform fallback 1/3.
		let uniform = model.probability(&seq(&["x", "y"]));
		assert!((uniform - 1.0 / 3.0).abs() < 1e-12);
		assert!((backed_off - uniform).abs() > 1e-9);
	}

	#[test]
	fn probabilities_are_strictly_positive() {
		let model = LanguageModel::train(&[seq(&["a", "b", "a", "b", "c"])], &options(3)).unwrap();
		for ngram in [
			seq(&["a", "b", "c"]),
			seq(&["c", "c", "c"]),
			seq(&["x", "y", "z"]),
			seq(&["b"]),
		] {
			let p = model.probability(&ngram);
			assert!(p > 0.0 && p <= 1.0, "P({ngram:?}) = {p}");
		}
	}

	#[test]
	fn contexts_longer_than_the_trained_order_use_the_trailing_tokens() {
		let model = LanguageModel::train(&[seq(&["a", "b", "a", "b"])], &options(2)).unwrap();
		// Only the trailing two tokens can resolve; the prefix is ignored.
		let long = model.probability(&seq(&["z", "z", "a", "b"]));
		assert!((long - 0.8125).abs() < 1e-12);
	}

	#[test]
	fn training_twice_yields_an_identical_model() {
		let corpus = vec![
			seq(&["a", "b", "a", "b"]),
			seq(&["b", "c", "a"]),
			seq(&["c"]),
		];
		let first = LanguageModel::train(&corpus, &options(3)).unwrap();
		let second = LanguageModel::train(&corpus, &options(3)).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn survives_a_postcard_round_trip() {
		let model = LanguageModel::train(&[seq(&["a", "b", "a", "b"])], &options(2)).unwrap();
		let bytes = postcard::to_stdvec(&model).unwrap();
		let restored: LanguageModel = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(model, restored);
	}
}
