use std::ops::RangeInclusive;

use log::debug;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use super::generate_input::GenerateInput;
use super::histogram::Histogram;
use super::markov_model::MarkovModel;
use crate::error::{MarkovError, Result};

/// Random walk over a `MarkovModel`.
///
/// # Responsibilities
/// - Pick the starting context (random or given)
/// - Draw successors with weighted sampling until the requested length is
///   reached or the walk enters a context without successors
/// - Format the result as a sentence
///
/// The generator only borrows the model, so any number of generators can
/// walk the same model at once as long as each owns its RNG.
#[derive(Debug)]
pub struct SentenceGenerator<'m, R: Rng> {
	model: &'m MarkovModel,
	rng: R,
}

impl<'m> SentenceGenerator<'m, ThreadRng> {
	/// Creates a generator drawing from the thread-local RNG.
	pub fn from_thread_rng(model: &'m MarkovModel) -> Self {
		Self::new(model, rand::rng())
	}
}

impl<'m> SentenceGenerator<'m, StdRng> {
	/// Creates a reproducible generator: the same seed yields the same walks.
	pub fn seeded(model: &'m MarkovModel, seed: u64) -> Self {
		Self::new(model, StdRng::seed_from_u64(seed))
	}
}

impl<'m, R: Rng> SentenceGenerator<'m, R> {
	pub fn new(model: &'m MarkovModel, rng: R) -> Self {
		Self { model, rng }
	}

	/// Walks the model and returns the emitted tokens.
	///
	/// # Parameters
	/// - `length`: maximum number of tokens returned, start token included.
	/// - `start`: starting context, or `None` for a uniformly random one.
	///
	/// # Behavior
	/// - The output starts with the last token of the start context, so an
	///   order-1 walk starts with its context token and an order-2 walk with
	///   the second token of its pair.
	/// - Each step draws a successor of the current context, appends it, and
	///   slides the context window by one token.
	/// - Reaching a context without successors ends the walk early; this is
	///   not an error.
	///
	/// # Errors
	/// - `UnknownContext` if `start` is not a key of the model (including a
	///   context of the wrong width).
	/// - `EmptyModel` if `start` is `None` and the model has no context.
	pub fn generate(&mut self, length: usize, start: Option<&[String]>) -> Result<Vec<String>> {
		let mut context: Vec<String> = match start {
			Some(start) => {
				if self.model.histogram(start).is_none() {
					return Err(MarkovError::UnknownContext(start.to_vec()));
				}
				start.to_vec()
			}
			None => self.model.random_context(&mut self.rng)?.to_vec(),
		};

		// `length` is only an upper bound, a dead end may stop the walk first.
		let mut output = Vec::new();
		if length == 0 {
			return Ok(output);
		}

		// Non-empty: every context holds `order >= 1` tokens.
		if let Some(last) = context.last() {
			output.push(last.clone());
		}

		while output.len() < length {
			let Some(histogram) = self.model.histogram(&context) else {
				debug!("Dead end at {:?} after {} tokens", context, output.len());
				break;
			};
			let next = histogram.sample_weighted(&mut self.rng)?.clone();

			context.rotate_left(1);
			if let Some(slot) = context.last_mut() {
				slot.clone_from(&next);
			}
			output.push(next);
		}

		Ok(output)
	}

	/// Walks the model as configured by `input` and formats the result.
	///
	/// Returns an empty string when the walk produced no token.
	pub fn generate_sentence(&mut self, input: &GenerateInput) -> Result<String> {
		let tokens = self.generate(input.length, input.custom_context())?;
		Ok(format_sentence(&tokens, &input.separator, input.terminal))
	}
}

/// Builds a sentence out of independent weighted draws from `histogram`.
///
/// The sentence length is drawn uniformly from `lengths`; an empty range
/// yields an empty sentence.
///
/// # Errors
/// Returns `EmptyHistogram` if `histogram` holds no token.
pub fn random_sentence<R: Rng>(
	histogram: &Histogram<String>,
	lengths: RangeInclusive<usize>,
	input: &GenerateInput,
	rng: &mut R,
) -> Result<String> {
	if histogram.is_empty() {
		return Err(MarkovError::EmptyHistogram);
	}
	if lengths.is_empty() {
		return Ok(String::new());
	}

	let length = rng.random_range(lengths);
	let tokens = (0..length)
		.map(|_| histogram.sample_weighted(&mut *rng).cloned())
		.collect::<Result<Vec<String>>>()?;
	Ok(format_sentence(&tokens, &input.separator, input.terminal))
}

/// Capitalizes the first token, joins all tokens with `separator` and
/// appends `terminal`.
///
/// Example:
/// `["one", "fish"]`, `" "`, `'.'` → `"One fish."`
pub fn format_sentence(tokens: &[String], separator: &str, terminal: char) -> String {
	let Some((first, rest)) = tokens.split_first() else {
		return String::new();
	};

	let mut sentence = capitalize(first);
	for token in rest {
		sentence.push_str(separator);
		sentence.push_str(token);
	}
	sentence.push(terminal);
	sentence
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::io::tokenize;

	const FISH: &str = "one fish two fish red fish blue fish";

	fn ctx(text: &str) -> Vec<String> {
		tokenize(text)
	}

	#[test]
	fn cyclic_walk_is_fully_determined() {
		let model = MarkovModel::build(&["a", "b", "a", "b", "a", "b"], 2).unwrap();
		for seed in 0..20 {
			let mut generator = SentenceGenerator::seeded(&model, seed);
			let output = generator.generate(10, Some(&ctx("a b"))).unwrap();
			assert_eq!(output.join(" "), "b a b a b a b a b a");
		}
	}

	#[test]
	fn first_order_walk_starts_with_context_token() {
		let model = MarkovModel::from_text(FISH, 1).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 5);
		let output = generator.generate(6, Some(&ctx("one"))).unwrap();
		assert_eq!(output.len(), 6);
		assert_eq!(output[0], "one");
		assert_eq!(output[1], "fish");
	}

	#[test]
	fn dead_end_truncates_output() {
		let model = MarkovModel::from_text("a b c", 1).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 1);
		assert_eq!(generator.generate(10, Some(&ctx("b"))).unwrap(), vec!["b", "c"]);

		let model = MarkovModel::from_text(FISH, 2).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 1);
		assert_eq!(generator.generate(10, Some(&ctx("red fish"))).unwrap(), vec!["fish", "blue", "fish"]);
	}

	#[test]
	fn unbounded_length_stops_at_dead_end() {
		let model = MarkovModel::from_text("a b c", 1).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 1);
		assert_eq!(generator.generate(usize::MAX, Some(&ctx("b"))).unwrap(), vec!["b", "c"]);
	}

	#[test]
	fn zero_length_is_empty() {
		let model = MarkovModel::from_text(FISH, 1).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 1);
		assert!(generator.generate(0, None).unwrap().is_empty());
		assert_eq!(generator.generate(1, Some(&ctx("two"))).unwrap(), vec!["two"]);
	}

	#[test]
	fn unknown_or_misshaped_context_fails() {
		let model = MarkovModel::from_text(FISH, 2).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 1);
		assert!(matches!(
			generator.generate(5, Some(&ctx("green fish"))),
			Err(MarkovError::UnknownContext(c)) if c == ctx("green fish")
		));
		assert!(matches!(generator.generate(5, Some(&ctx("fish"))), Err(MarkovError::UnknownContext(_))));
		// A context seen only as the stream tail is not a key either.
		assert!(matches!(generator.generate(5, Some(&ctx("blue fish"))), Err(MarkovError::UnknownContext(_))));
	}

	#[test]
	fn same_seed_same_walk() {
		let model = MarkovModel::from_text(FISH, 1).unwrap();
		let first = SentenceGenerator::seeded(&model, 99).generate(20, None).unwrap();
		let second = SentenceGenerator::seeded(&model, 99).generate(20, None).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn sentence_is_formatted() {
		let model = MarkovModel::build(&["a", "b", "a", "b"], 1).unwrap();
		let mut generator = SentenceGenerator::seeded(&model, 3);
		let mut input = GenerateInput::new(4);
		input.set_start_context("a");
		assert_eq!(generator.generate_sentence(&input).unwrap(), "A b a b.");

		input.separator = "-".to_owned();
		input.terminal = '!';
		assert_eq!(generator.generate_sentence(&input).unwrap(), "A-b-a-b!");
	}

	#[test]
	fn format_edge_cases() {
		assert_eq!(format_sentence(&[], " ", '.'), "");
		assert_eq!(format_sentence(&ctx("élan vital"), " ", '?'), "Élan vital?");
	}

	#[test]
	fn unigram_sentence_length_in_range() {
		let histogram: Histogram = ctx(FISH).into_iter().collect();
		let input = GenerateInput::default();
		let mut rng = StdRng::seed_from_u64(8);
		for _ in 0..50 {
			let sentence = random_sentence(&histogram, 5..=15, &input, &mut rng).unwrap();
			let words = sentence.split(' ').count();
			assert!((5..=15).contains(&words), "{sentence}");
			assert!(sentence.ends_with('.'));
		}
		assert_eq!(random_sentence(&histogram, 3..=2, &input, &mut rng).unwrap(), "");
		assert!(matches!(
			random_sentence(&Histogram::new(), 5..=15, &input, &mut rng),
			Err(MarkovError::EmptyHistogram)
		));
	}
}
