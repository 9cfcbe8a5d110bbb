//! JSON snapshot of a `MarkovModel`.
//!
//! Layout:
//! ```json
//! { "order": 2, "transitions": { "one fish": [["two", 1]], "fish two": [["fish", 1]] } }
//! ```
//! Contexts are joined with a single space. Map and list order follow the
//! model's first-seen order, so a round trip rebuilds an identical model.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::{Error as _, SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::histogram::Histogram;
use super::markov_model::{Context, MarkovModel};
use crate::error::{MarkovError, Result};

const CONTEXT_SEPARATOR: &str = " ";

impl Serialize for MarkovModel {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("MarkovModel", 2)?;
		state.serialize_field("order", &self.order())?;
		state.serialize_field("transitions", &TransitionsRef(self))?;
		state.end()
	}
}

/// Serializes the transition table as an ordered map.
struct TransitionsRef<'a>(&'a MarkovModel);

impl Serialize for TransitionsRef<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (context, histogram) in self.0.transitions() {
			// Such a key could not be split back into the same context.
			if let Some(token) = context.iter().find(|t| t.is_empty() || t.contains(CONTEXT_SEPARATOR)) {
				return Err(S::Error::custom(format!("token {token:?} cannot be written in a context key")));
			}
			map.serialize_entry(&context.join(CONTEXT_SEPARATOR), histogram)?;
		}
		map.end()
	}
}

/// Unvalidated snapshot contents.
#[derive(Deserialize)]
struct RawModel {
	order: usize,
	transitions: OrderedEntries,
}

/// Map entries kept in document order.
struct OrderedEntries(Vec<(String, Histogram<String>)>);

impl<'de> Deserialize<'de> for OrderedEntries {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		struct EntriesVisitor;

		impl<'de> Visitor<'de> for EntriesVisitor {
			type Value = OrderedEntries;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a map from context to histogram")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
				let mut entries = Vec::new();
				while let Some(entry) = access.next_entry()? {
					entries.push(entry);
				}
				Ok(OrderedEntries(entries))
			}
		}

		deserializer.deserialize_map(EntriesVisitor)
	}
}

impl RawModel {
	/// Checks every model invariant and assembles the model.
	fn validate(self) -> Result<MarkovModel> {
		let invalid = |message: String| MarkovError::InvalidSnapshot(message);

		if self.order < 1 {
			return Err(invalid(format!("order must be >= 1, got {}", self.order)));
		}
		if self.transitions.0.is_empty() {
			return Err(invalid("no transitions".to_owned()));
		}

		let mut seen: HashSet<Context> = HashSet::with_capacity(self.transitions.0.len());
		let mut transitions = Vec::with_capacity(self.transitions.0.len());
		for (key, histogram) in self.transitions.0 {
			let context: Context = key.split(CONTEXT_SEPARATOR).map(str::to_owned).collect();
			if context.len() != self.order || context.iter().any(String::is_empty) {
				return Err(invalid(format!("context {key:?} does not hold {} tokens", self.order)));
			}
			if histogram.is_empty() {
				return Err(invalid(format!("context {key:?} has no successor")));
			}
			if !seen.insert(context.clone()) {
				return Err(invalid(format!("duplicate context {key:?}")));
			}
			transitions.push((context, histogram));
		}

		Ok(MarkovModel::from_parts(self.order, transitions))
	}
}

impl<'de> Deserialize<'de> for MarkovModel {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let raw = RawModel::deserialize(deserializer)?;
		raw.validate().map_err(D::Error::custom)
	}
}

impl MarkovModel {
	/// Serializes the model to a JSON string.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Restores a model from a JSON string.
	///
	/// # Errors
	/// - `Json` if the text is not a snapshot document.
	/// - `InvalidSnapshot` if it breaks a model invariant.
	pub fn from_json(json: &str) -> Result<Self> {
		let raw: RawModel = serde_json::from_str(json)?;
		raw.validate()
	}

	/// Writes a pretty-printed snapshot to `path`.
	pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let mut writer = BufWriter::new(File::create(&path)?);
		serde_json::to_writer_pretty(&mut writer, self)?;
		writer.flush()?;
		debug!("Saved order-{} model ({} contexts) to {}", self.order(), self.len(), path.as_ref().display());
		Ok(())
	}

	/// Reads a snapshot written by [`MarkovModel::save_json`].
	pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
		let model = Self::from_json(&fs::read_to_string(&path)?)?;
		debug!("Loaded order-{} model ({} contexts) from {}", model.order(), model.len(), path.as_ref().display());
		Ok(model)
	}
}
