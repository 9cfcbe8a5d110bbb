use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use mk_gen_core::io::{read_words, tokenize};
use mk_gen_core::{GenerateInput, Histogram, MarkovError, MarkovModel, SentenceGenerator, random_sentence};

/// Walkthrough of the histogram, model and generator APIs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Corpus text file; a built-in sentence is used when absent
	corpus: Option<PathBuf>,

	/// Order of the second model (the first one is always order 1)
	#[arg(long, default_value_t = 2)]
	order: usize,

	/// Maximum number of words per sentence
	#[arg(long, default_value_t = 10)]
	length: usize,

	/// Number of sentences per model
	#[arg(long, default_value_t = 3)]
	count: usize,

	/// RNG seed, for reproducible output
	#[arg(long)]
	seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	// Load the corpus (or fall back on the classic fish sentence)
	let words = match &args.corpus {
		Some(path) => read_words(path)?,
		None => tokenize("one fish two fish red fish blue fish"),
	};
	info!("{} tokens loaded", words.len());

	// Same seed, same sentences
	let seed = args.seed.unwrap_or_else(rand::random);
	let mut rng = StdRng::seed_from_u64(seed);
	println!("Seed: {seed}");

	// Word frequencies, in first-seen order
	let histogram: Histogram = words.iter().cloned().collect();
	println!("{} distinct words over {} tokens", histogram.types(), histogram.tokens());
	for (word, count) in histogram.iter().take(10) {
		println!("  {word}: {count}");
	}

	// A sentence of independent weighted draws (no context at all)
	let input = GenerateInput::new(args.length);
	println!("Unigram: {}", random_sentence(&histogram, 5..=15, &input, &mut rng)?);

	for order in [1, args.order] {
		let model = match MarkovModel::build(&words, order) {
			Ok(model) => model,
			// Not enough words for this order, keep going with the next one
			Err(MarkovError::EmptyModel) => {
				println!("Order {order}: corpus too short");
				continue;
			}
			Err(e) => return Err(e.into()),
		};
		println!("Order {order}: {} contexts", model.len());

		let mut generator = SentenceGenerator::new(&model, &mut rng);
		for i in 0..args.count {
			println!("  Generated sentence {}: {}", i + 1, generator.generate_sentence(&input)?);
		}

		// Starting from an explicit context, which must exist in the model
		let mut custom = input.clone();
		custom.set_start_context("red fish");
		match generator.generate_sentence(&custom) {
			Ok(sentence) => println!("  From 'red fish': {sentence}"),
			Err(e) => println!("  From 'red fish': {e}"),
		}
	}

	Ok(())
}
