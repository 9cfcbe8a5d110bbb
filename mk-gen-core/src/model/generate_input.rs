use crate::io::tokenize;

/// Strategy used to select the starting context of a walk.
///
/// # Variants
/// - `Random`: pick a context uniformly among the model's keys.
/// - `Custom(tokens)`: start from the given context; it must be a key of
///   the model and hold exactly `order` tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartContext {
	Random,
	Custom(Vec<String>),
}

/// Input parameters for generating a sentence.
///
/// `GenerateInput` carries both the **walk parameters** (length, start
/// context) and the **presentation parameters** (separator, terminal mark)
/// applied once the walk is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateInput {
	/// Maximum number of tokens in the output, start token included.
	pub length: usize,

	/// How the walk picks its first context.
	pub start_context: StartContext,

	/// String placed between tokens.
	pub separator: String,

	/// Punctuation mark appended to a non-empty sentence.
	pub terminal: char,
}

impl Default for GenerateInput {
	fn default() -> Self {
		Self {
			length: 10,
			start_context: StartContext::Random,
			separator: " ".to_owned(),
			terminal: '.',
		}
	}
}

impl GenerateInput {
	/// Creates an input of the given length with default settings.
	pub fn new(length: usize) -> Self {
		Self { length, ..Self::default() }
	}

	/// Sets the start context from free text.
	///
	/// The text is normalized like a corpus (see [`tokenize`]); when it holds
	/// no word at all, the start context falls back to `Random`.
	pub fn set_start_context(&mut self, text: &str) {
		let tokens = tokenize(text);
		self.start_context = if tokens.is_empty() {
			StartContext::Random
		} else {
			StartContext::Custom(tokens)
		};
	}

	/// Returns the explicit start context, if any.
	pub fn custom_context(&self) -> Option<&[String]> {
		match &self.start_context {
			StartContext::Random => None,
			StartContext::Custom(tokens) => Some(tokens),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn start_context_is_normalized() {
		let mut input = GenerateInput::new(5);
		input.set_start_context("  Red FISH ");
		assert_eq!(input.start_context, StartContext::Custom(vec!["red".to_owned(), "fish".to_owned()]));
		assert_eq!(input.custom_context().map(<[String]>::len), Some(2));

		input.set_start_context("   ");
		assert_eq!(input.start_context, StartContext::Random);
		assert!(input.custom_context().is_none());
	}

	#[test]
	fn defaults() {
		let input = GenerateInput::default();
		assert_eq!(input.length, 10);
		assert_eq!(input.separator, " ");
		assert_eq!(input.terminal, '.');
	}
}
