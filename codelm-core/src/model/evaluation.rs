use super::Sequence;
use super::language_model::LanguageModel;

/// Computes the perplexity of a held-out corpus under a built model.
///
/// Every sequence is windowed at the model's maximum order; each window's
/// probability comes from the backoff resolution, and the final score is
/// `exp(-mean(ln P))` over all windows. Lower is better.
///
/// # Errors
/// - Returns an error if no sequence is long enough to form a single
///   n-gram at the model's order (the mean would divide by zero).
/// - Returns an error if a window resolves to a non-positive probability.
///   This cannot happen while the vocabulary is non-empty; the guard keeps
///   a degenerate model from silently producing NaN.
pub fn perplexity(model: &LanguageModel, corpus: &[Sequence]) -> Result<f64, String> {
	let n = model.max_n();
	let mut total_log_prob = 0.0;
	let mut total_ngrams = 0u64;

	for sequence in corpus {
		if sequence.len() < n {
			continue;
		}
		for window in sequence.windows(n) {
			let prob = model.probability(window);
			if prob <= 0.0 {
				return Err(format!("Degenerate probability {} for {:?}", prob, window));
			}
			total_log_prob += prob.ln();
			total_ngrams += 1;
		}
	}

	if total_ngrams == 0 {
		return Err(format!(
			"Evaluation corpus contains no sequence of length >= {}",
			n
		));
	}

	Ok((-total_log_prob / total_ngrams as f64).exp())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::options::ModelOptions;

	fn seq(tokens: &[&str]) -> Sequence {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	fn bigram_model() -> LanguageModel {
		let mut options = ModelOptions::default();
		options.set_max_n(2).unwrap();
		LanguageModel::train(&[seq(&["a", "b", "a", "b"])], &options).unwrap()
	}

	#[test]
	fn empty_corpus_is_a_reported_error() {
		let model = bigram_model();
		assert!(perplexity(&model, &[]).is_err());
	}

	#[test]
	fn too_short_sequences_are_a_reported_error() {
		let model = bigram_model();
		// Every sequence is below the model order, so nothing is scored.
		assert!(perplexity(&model, &[seq(&["a"]), seq(&["b"])]).is_err());
	}

	#[test]
	fn uniform_fallback_everywhere_scores_exactly_vocab_size() {
		// vocab = {a, b}; a corpus of out-of-vocabulary tokens resolves
		// every window to 1/2, so perplexity must equal the vocabulary size.
		let model = bigram_model();
		let score = perplexity(&model, &[seq(&["x", "y", "z"])]).unwrap();
		assert!((score - model.vocab_size() as f64).abs() < 1e-9);
	}

	#[test]
	fn training_data_scores_below_the_uniform_baseline() {
		let model = bigram_model();
		let seen = perplexity(&model, &[seq(&["a", "b", "a", "b"])]).unwrap();
		assert!(seen < model.vocab_size() as f64);
	}
}
