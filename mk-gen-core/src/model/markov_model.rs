use std::collections::HashMap;

use log::debug;
use rand::Rng;

use super::histogram::Histogram;
use crate::error::{MarkovError, Result};
use crate::io;

/// Ordered run of exactly `order` tokens used as a lookup key.
pub type Context = Vec<String>;

/// Represents a word-level Markov model of a fixed order.
///
/// The `MarkovModel` maps every context (the `order` tokens preceding a
/// position) to the histogram of tokens observed right after it.
///
/// # Responsibilities
/// - Build the transition table from a token stream in one forward pass
/// - Look up the successors of a context
/// - Pick a random starting context
///
/// # Invariants
/// - `order` is always >= 1
/// - Every context key has exactly `order` tokens
/// - Every stored histogram holds at least one token
/// - Contexts and histogram entries keep first-seen order, so two builds
///   over the same input are identical
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkovModel {
	/// Context width
	order: usize,

	/// Contexts with their successor histogram, in first-seen order
	transitions: Vec<(Context, Histogram<String>)>,

	/// Position of each context inside `transitions`
	index: HashMap<Context, usize>,
}

impl MarkovModel {
	/// Builds a model of order `order` from a token sequence.
	///
	/// For every window of `order + 1` consecutive tokens, the first `order`
	/// form the context and the last one is recorded in its histogram.
	/// The last `order` tokens of the stream have no successor and only
	/// appear as the tail of a context.
	///
	/// # Errors
	/// - `InvalidOrder` if `order < 1`.
	/// - `EmptyModel` if `tokens.len() <= order` (no complete window).
	pub fn build<S: AsRef<str>>(tokens: &[S], order: usize) -> Result<Self> {
		if order < 1 {
			return Err(MarkovError::InvalidOrder(order));
		}
		if tokens.len() <= order {
			return Err(MarkovError::EmptyModel);
		}

		let mut model = Self { order, transitions: Vec::new(), index: HashMap::new() };
		for window in tokens.windows(order + 1) {
			let (context, next) = window.split_at(order);
			let context: Context = context.iter().map(|t| t.as_ref().to_owned()).collect();
			model.histogram_entry(context).update(next[0].as_ref().to_owned());
		}

		debug!(
			"Built order-{} model: {} contexts from {} tokens",
			order,
			model.transitions.len(),
			tokens.len()
		);
		Ok(model)
	}

	/// Tokenizes `text` (see [`io::tokenize`]) and builds a model from it.
	pub fn from_text(text: &str, order: usize) -> Result<Self> {
		Self::build(&io::tokenize(text), order)
	}

	/// Get or create the histogram of `context`.
	fn histogram_entry(&mut self, context: Context) -> &mut Histogram<String> {
		let position = match self.index.get(&context) {
			Some(&position) => position,
			None => {
				let position = self.transitions.len();
				self.index.insert(context.clone(), position);
				self.transitions.push((context, Histogram::new()));
				position
			}
		};
		&mut self.transitions[position].1
	}

	/// Assembles a model from already validated parts.
	///
	/// Used when restoring a snapshot; the caller guarantees the invariants.
	pub(crate) fn from_parts(order: usize, transitions: Vec<(Context, Histogram<String>)>) -> Self {
		let index = transitions
			.iter()
			.enumerate()
			.map(|(position, (context, _))| (context.clone(), position))
			.collect();
		Self { order, transitions, index }
	}

	/// Context width.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates over the contexts in first-seen order.
	pub fn contexts(&self) -> impl Iterator<Item = &[String]> {
		self.transitions.iter().map(|(context, _)| context.as_slice())
	}

	/// Iterates over `(context, successors)` pairs in first-seen order.
	pub fn transitions(&self) -> impl Iterator<Item = (&[String], &Histogram<String>)> {
		self.transitions.iter().map(|(context, histogram)| (context.as_slice(), histogram))
	}

	/// Returns the successors of `context`, or `None` if it was never seen
	/// followed by anything.
	pub fn histogram(&self, context: &[String]) -> Option<&Histogram<String>> {
		self.index.get(context).map(|&position| &self.transitions[position].1)
	}

	/// Returns a context chosen uniformly among the model's keys.
	///
	/// # Errors
	/// Returns `EmptyModel` if the model has no context.
	pub fn random_context<R: Rng>(&self, rng: &mut R) -> Result<&[String]> {
		if self.transitions.is_empty() {
			return Err(MarkovError::EmptyModel);
		}
		let position = rng.random_range(0..self.transitions.len());
		Ok(&self.transitions[position].0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn ctx(tokens: &[&str]) -> Context {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	#[test]
	fn first_order_fish() {
		let model = MarkovModel::from_text("one fish two fish red fish blue fish", 1).unwrap();
		assert_eq!(model.order(), 1);
		assert_eq!(model.len(), 5);

		let fish = model.histogram(&ctx(&["fish"])).unwrap();
		assert_eq!(fish.count("two"), 1);
		assert_eq!(fish.count("red"), 1);
		assert_eq!(fish.count("blue"), 1);
		assert_eq!(fish.types(), 3);
		assert_eq!(fish.tokens(), 3);

		assert_eq!(model.histogram(&ctx(&["blue"])).unwrap().count("fish"), 1);
	}

	#[test]
	fn second_order_cycle() {
		let tokens = ["a", "b", "a", "b", "a", "b"];
		let model = MarkovModel::build(&tokens, 2).unwrap();
		assert_eq!(model.len(), 2);

		let ab = model.histogram(&ctx(&["a", "b"])).unwrap();
		assert_eq!(ab.types(), 1);
		assert_eq!(ab.count("a"), 2);

		let ba = model.histogram(&ctx(&["b", "a"])).unwrap();
		assert_eq!(ba.types(), 1);
		assert_eq!(ba.count("b"), 2);
	}

	#[test]
	fn trailing_context_has_no_entry() {
		let model = MarkovModel::from_text("one fish two fish red fish blue fish", 2).unwrap();
		assert!(model.histogram(&ctx(&["blue", "fish"])).is_none());
		assert!(model.histogram(&ctx(&["red", "fish"])).is_some());
	}

	#[test]
	fn contexts_keep_first_seen_order() {
		let model = MarkovModel::from_text("one fish two fish red fish blue fish", 1).unwrap();
		let contexts: Vec<&str> = model.contexts().map(|c| c[0].as_str()).collect();
		assert_eq!(contexts, vec!["one", "fish", "two", "red", "blue"]);
		assert!(model.contexts().all(|c| c.len() == model.order()));
	}

	#[test]
	fn builds_are_deterministic() {
		let text = "the cat sat on the mat and the cat ran off the mat";
		let first = MarkovModel::from_text(text, 2).unwrap();
		let second = MarkovModel::from_text(text, 2).unwrap();
		assert_eq!(first, second);
		assert!(first.transitions().eq(second.transitions()));
	}

	#[test]
	fn rejects_invalid_input() {
		let empty: [&str; 0] = [];
		assert!(matches!(MarkovModel::build(&empty, 1), Err(MarkovError::EmptyModel)));
		assert!(matches!(MarkovModel::build(&["x"], 1), Err(MarkovError::EmptyModel)));
		assert!(matches!(MarkovModel::build(&["x", "y"], 2), Err(MarkovError::EmptyModel)));
		assert!(matches!(MarkovModel::build(&["x", "y"], 0), Err(MarkovError::InvalidOrder(0))));
	}

	#[test]
	fn random_context_is_a_key() {
		let model = MarkovModel::from_text("one fish two fish red fish blue fish", 2).unwrap();
		let mut rng = StdRng::seed_from_u64(11);
		for _ in 0..50 {
			let context = model.random_context(&mut rng).unwrap();
			assert!(model.histogram(context).is_some());
		}
	}
}
