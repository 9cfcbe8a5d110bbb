use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MarkovError, Result};

/// Frequency counter over discrete tokens.
///
/// A `Histogram` records how many times each distinct token was observed and
/// supports both uniform and frequency-weighted random sampling.
///
/// Conceptually, when stored inside a `MarkovModel`, it is the set of
/// outgoing edges of one context, weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate token occurrences (`update`)
/// - Report per-token counts and the `types` / `tokens` aggregates
/// - Draw tokens uniformly or proportionally to their frequency
///
/// ## Invariants
/// - `tokens() == sum of all counts`
/// - `types() == number of distinct tokens`
/// - Each stored count is strictly positive
/// - Iteration follows first-seen (insertion) order, so sampling is
///   reproducible for a given build order and RNG stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram<T: Eq + Hash = String> {
	/// Tokens with their occurrence count, in first-seen order.
	entries: Vec<(T, usize)>,
	/// Position of each token inside `entries`.
	index: HashMap<T, usize>,
	/// Total number of observed occurrences.
	tokens: usize,
}

impl<T: Eq + Hash> Default for Histogram<T> {
	fn default() -> Self {
		Self { entries: Vec::new(), index: HashMap::new(), tokens: 0 }
	}
}

impl<T: Eq + Hash + Clone> Histogram<T> {
	/// Creates a new empty histogram.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a histogram and records every token of `tokens`.
	pub fn from_tokens<I: IntoIterator<Item = T>>(tokens: I) -> Self {
		tokens.into_iter().collect()
	}

	/// Records one occurrence of `token`.
	///
	/// - If the token is already known, its count is increased.
	/// - Otherwise, it is appended with an initial count of 1.
	pub fn update(&mut self, token: T) {
		match self.index.get(&token) {
			Some(&position) => self.entries[position].1 += 1,
			None => {
				self.index.insert(token.clone(), self.entries.len());
				self.entries.push((token, 1));
			}
		}
		self.tokens += 1;
	}

	/// Returns the count of `token`, or 0 if it was never observed.
	pub fn count<Q>(&self, token: &Q) -> usize
	where
		T: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.index.get(token).map_or(0, |&position| self.entries[position].1)
	}

	/// Number of distinct tokens.
	pub fn types(&self) -> usize {
		self.entries.len()
	}

	/// Total number of observed occurrences.
	pub fn tokens(&self) -> usize {
		self.tokens
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(token, count)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
		self.entries.iter().map(|(token, count)| (token, *count))
	}

	/// Picks a distinct token with equal probability, regardless of its count.
	///
	/// # Errors
	/// Returns `EmptyHistogram` if no token was ever recorded.
	pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Result<&T> {
		if self.entries.is_empty() {
			return Err(MarkovError::EmptyHistogram);
		}
		let position = rng.random_range(0..self.entries.len());
		Ok(&self.entries[position].0)
	}

	/// Picks a token with probability proportional to its count.
	///
	/// Draws `r` uniformly from `[0, tokens)` then scans the entries in
	/// insertion order, returning the first one whose cumulative count is
	/// strictly greater than `r`. Every value of `[0, tokens)` therefore maps
	/// to exactly one token, and a token with count `c` owns `c` of them.
	///
	/// This method performs an O(types) scan.
	///
	/// # Errors
	/// Returns `EmptyHistogram` if no token was ever recorded.
	pub fn sample_weighted<R: Rng>(&self, rng: &mut R) -> Result<&T> {
		if self.tokens == 0 {
			return Err(MarkovError::EmptyHistogram);
		}

		let r = rng.random_range(0..self.tokens);
		let mut cumulative = 0;
		for (token, count) in &self.entries {
			cumulative += count;
			if cumulative > r {
				return Ok(token);
			}
		}

		// Unreachable while `tokens` equals the sum of counts.
		Err(MarkovError::EmptyHistogram)
	}
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Histogram<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut histogram = Self::new();
		histogram.extend(iter);
		histogram
	}
}

impl<T: Eq + Hash + Clone> Extend<T> for Histogram<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for token in iter {
			self.update(token);
		}
	}
}

impl<T: Eq + Hash + Clone> TryFrom<Vec<(T, usize)>> for Histogram<T> {
	type Error = String;

	/// Rebuilds a histogram from `(token, count)` pairs, keeping their order.
	///
	/// # Errors
	/// Rejects zero counts and repeated tokens.
	fn try_from(pairs: Vec<(T, usize)>) -> std::result::Result<Self, Self::Error> {
		let mut histogram = Self::new();
		for (token, count) in pairs {
			if count == 0 {
				return Err("histogram counts must be >= 1".to_owned());
			}
			if histogram.index.contains_key(&token) {
				return Err("duplicate token in histogram".to_owned());
			}
			histogram.index.insert(token.clone(), histogram.entries.len());
			histogram.entries.push((token, count));
			histogram.tokens += count;
		}
		Ok(histogram)
	}
}

/// Serialized as an ordered list of `[token, count]` pairs.
impl<T: Eq + Hash + Serialize> Serialize for Histogram<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
		for entry in &self.entries {
			seq.serialize_element(entry)?;
		}
		seq.end()
	}
}

impl<'de, T> Deserialize<'de> for Histogram<T>
where
	T: Eq + Hash + Clone + Deserialize<'de>,
{
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let pairs = Vec::<(T, usize)>::deserialize(deserializer)?;
		Histogram::try_from(pairs).map_err(D::Error::custom)
	}
}
