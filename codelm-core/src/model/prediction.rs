use rand::Rng;
use rand::prelude::IndexedRandom;

use super::language_model::LanguageModel;
use super::{Sequence, Token};

/// Ranks the vocabulary as completions for a context.
///
/// For every candidate token, scores `context + (candidate,)` through the
/// model's backoff resolution and returns the `top_k` highest-scoring
/// `(token, probability)` pairs.
///
/// # Notes
/// - Call sites typically pass a context of length `max_n - 1`; longer
///   contexts resolve through their trailing tokens.
/// - Ordering is deterministic: probability descending, ties broken by
///   ascending token order.
pub fn predict_next(
	model: &LanguageModel,
	context: &[Token],
	top_k: usize,
) -> Vec<(Token, f64)> {
	let mut candidates: Vec<(Token, f64)> = model
		.vocab()
		.iter()
		.map(|token| {
			let mut ngram = context.to_vec();
			ngram.push(token.clone());
			(token.clone(), model.probability(&ngram))
		})
		.collect();

	candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	candidates.truncate(top_k);
	candidates
}

/// Samples a length `n - 1` context from an evaluation corpus.
///
/// Picks a random sequence of length >= `n` and a random window start
/// within it, and returns the window's context slice.
///
/// Returns `None` if no sequence is long enough.
pub fn sample_context<'a, R: Rng>(
	corpus: &'a [Sequence],
	n: usize,
	rng: &mut R,
) -> Option<&'a [Token]> {
	let candidates: Vec<&Sequence> = corpus
		.iter()
		.filter(|sequence| sequence.len() >= n)
		.collect();

	let sequence = candidates.choose(rng).copied()?;
	let start = rng.random_range(0..=sequence.len() - n);
	Some(&sequence[start..start + n - 1])
}
