use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::{env, io};

use log::warn;
use regex::Regex;

/// A word: letters, digits or underscores, with inner apostrophes allowed.
static WORD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\w+(?:'\w+)*").expect("word pattern is valid"));

/// Splits a text into normalized tokens.
///
/// - Lower-cases the whole text
/// - Keeps only word-like runs, dropping punctuation
///
/// Example:
/// `"One fish, Two fish!"` → `["one", "fish", "two", "fish"]`
pub fn tokenize(text: &str) -> Vec<String> {
	let lowered = text.to_lowercase();
	WORD.find_iter(&lowered).map(|m| m.as_str().to_owned()).collect()
}

/// Reads a text file and returns its normalized tokens.
///
/// - Reads the entire file into memory
/// - Tokenizes with [`tokenize`]
pub fn read_words<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let contents = fs::read_to_string(&filename)?;
	let words = tokenize(&contents);
	if words.is_empty() {
		warn!("No tokens found in {}", filename.as_ref().display());
	}
	Ok(words)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_normalizes_case_and_punctuation() {
		assert_eq!(tokenize("One fish, Two fish!"), vec!["one", "fish", "two", "fish"]);
		assert_eq!(tokenize("It's   Holmes'\n\tcase"), vec!["it's", "holmes", "case"]);
		assert!(tokenize(" ... ").is_empty());
	}

	#[test]
	fn reads_and_lists_corpora() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("fish.txt"), "One fish two fish\nred fish blue fish").unwrap();
		fs::write(dir.path().join("cat.txt"), "").unwrap();
		fs::write(dir.path().join("notes.md"), "ignored").unwrap();

		assert_eq!(list_files(dir.path(), "txt").unwrap(), vec!["cat.txt", "fish.txt"]);
		assert_eq!(read_words(dir.path().join("fish.txt")).unwrap().len(), 8);
		assert!(read_words(dir.path().join("cat.txt")).unwrap().is_empty());
		assert!(read_words(dir.path().join("missing.txt")).is_err());
	}

	#[test]
	fn dot_folder_is_current_dir() {
		assert_eq!(normalize_folder("data"), PathBuf::from("data"));
		assert!(normalize_folder(".").is_absolute());
	}
}
