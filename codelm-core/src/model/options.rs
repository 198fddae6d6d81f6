/// Configuration for building and querying a language model.
///
/// `ModelOptions` contains both **model parameters** (maximum order,
/// discount) and **presentation parameters** (number of ranked completions,
/// number of sampled contexts printed by the batch driver).
///
/// # Responsibilities
/// - Carry the recognized options with their defaults
/// - Validate constrained fields (`max_n`, `discount`) through setters
///
/// # Invariants
/// - `max_n` is always >= 1
/// - `discount` is always in (0.0, 1.0]
#[derive(Clone, Debug)]
pub struct ModelOptions {
	/// Maximum n-gram order. Counting and smoothing run once per order
	/// from 1 to this value.
	max_n: usize,

	/// Fixed absolute discount subtracted from every raw count.
	discount: f64,

	/// Number of ranked completions returned per context.
	pub top_k: usize,

	/// Number of sampled contexts printed by the batch driver.
	pub nb_samples: usize,
}

impl Default for ModelOptions {
	fn default() -> Self {
		Self {
			max_n: 6,
			discount: 0.75,
			top_k: 5,
			nb_samples: 10,
		}
	}
}

impl ModelOptions {
	/// Returns the maximum n-gram order.
	pub fn max_n(&self) -> usize {
		self.max_n
	}

	/// Returns the discount.
	pub fn discount(&self) -> f64 {
		self.discount
	}

	/// Sets the maximum n-gram order.
	///
	/// # Errors
	/// Returns an error if `max_n < 1`.
	pub fn set_max_n(&mut self, max_n: usize) -> Result<(), String> {
		if max_n < 1 {
			return Err("max_n must be >= 1".to_owned());
		}
		self.max_n = max_n;
		Ok(())
	}

	/// Sets the discount (must be in (0.0, 1.0]).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_discount(&mut self, discount: f64) -> Result<(), String> {
		if !(discount > 0.0 && discount <= 1.0) {
			return Err("Discount must be between 0.0 (exclusive) and 1.0".to_owned());
		}
		self.discount = discount;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let options = ModelOptions::default();
		assert_eq!(options.max_n(), 6);
		assert_eq!(options.discount(), 0.75);
		assert_eq!(options.top_k, 5);
		assert_eq!(options.nb_samples, 10);
	}

	#[test]
	fn rejects_out_of_range_values() {
		let mut options = ModelOptions::default();
		assert!(options.set_max_n(0).is_err());
		assert!(options.set_discount(0.0).is_err());
		assert!(options.set_discount(1.5).is_err());
		assert!(options.set_discount(-0.5).is_err());

		assert!(options.set_max_n(3).is_ok());
		assert!(options.set_discount(1.0).is_ok());
		assert_eq!(options.max_n(), 3);
		assert_eq!(options.discount(), 1.0);
	}
}
