use std::path::{Path, PathBuf};
use std::sync::RwLock;

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{error, info};

use serde::Deserialize;
use mk_gen_core::io::{list_files, normalize_folder, read_words};
use mk_gen_core::{GenerateInput, Histogram, MarkovError, MarkovModel, SentenceGenerator, random_sentence};

/// Longest sentence a request may ask for.
const MAX_LENGTH: usize = 1000;

/// Serves sentences generated from a word-level Markov model.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Config {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Folder holding the `.txt` corpora
	#[arg(long, default_value = "./data")]
	data_dir: String,

	/// Corpus to load at start-up (file name without extension)
	#[arg(long)]
	corpus: Option<String>,

	/// Default model order
	#[arg(long, default_value_t = 1)]
	order: usize,

	/// Default sentence length (at most 1000)
	#[arg(long, default_value_t = 10)]
	length: usize,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	length: Option<usize>,
	start: Option<String>, // whitespace-separated context, random if absent
}

/// Query parameters for the `/v1/unigram` endpoint
#[derive(Deserialize)]
struct UnigramParams {
	min: Option<usize>,
	max: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
	order: Option<usize>,
}

/// A corpus with the models built from it.
struct Corpus {
	name: String,
	model: MarkovModel,
	unigram: Histogram,
}

impl Corpus {
	/// Reads `<data_dir>/<name>.txt` and builds its models.
	fn load(data_dir: &Path, name: &str, order: usize) -> Result<Self, MarkovError> {
		let words = read_words(data_dir.join(format!("{name}.txt")))?;
		let model = MarkovModel::build(&words, order)?;
		let unigram: Histogram = words.into_iter().collect();
		info!(
			"Loaded corpus '{}': {} tokens, {} types, order-{} model with {} contexts",
			name,
			unigram.tokens(),
			unigram.types(),
			order,
			model.len()
		);
		Ok(Self { name: name.to_owned(), model, unigram })
	}
}

struct SharedData {
	data_dir: PathBuf,
	order: usize,
	length: usize,
	corpus: Option<Corpus>,
}

impl SharedData {
	fn new(config: &Config) -> Self {
		Self {
			data_dir: normalize_folder(&config.data_dir),
			order: config.order,
			length: config.length,
			corpus: None,
		}
	}
}

/// Maps a core error to an HTTP response.
fn error_response(e: &MarkovError) -> HttpResponse {
	match e {
		MarkovError::UnknownContext(_) | MarkovError::InvalidOrder(_) | MarkovError::EmptyModel => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		MarkovError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
			HttpResponse::NotFound().body(e.to_string())
		}
		_ => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// Runs one walk over the loaded model.
fn generate(shared: &SharedData, input: &GenerateInput) -> HttpResponse {
	let Some(corpus) = &shared.corpus else {
		return HttpResponse::ServiceUnavailable().body("No model loaded");
	};
	match SentenceGenerator::from_thread_rng(&corpus.model).generate_sentence(input) {
		Ok(sentence) => HttpResponse::Ok().body(sentence),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/`
///
/// Returns one sentence of the default length from a random start.
#[get("/")]
async fn index(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared = match data.read() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	generate(&shared, &GenerateInput::new(shared.length))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sentence based on query parameters.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared = match data.read() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let length = query.length.unwrap_or(shared.length);
	if length > MAX_LENGTH {
		return HttpResponse::BadRequest().body(format!("length must be <= {MAX_LENGTH}"));
	}

	let mut input = GenerateInput::new(length);
	if let Some(start) = &query.start {
		input.set_start_context(start);
	}
	generate(&shared, &input)
}

/// HTTP GET endpoint `/v1/unigram`
///
/// Sentence of independent weighted draws over the whole corpus.
#[get("/v1/unigram")]
async fn get_unigram(data: web::Data<RwLock<SharedData>>, query: web::Query<UnigramParams>) -> impl Responder {
	let shared = match data.read() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(corpus) = &shared.corpus else {
		return HttpResponse::ServiceUnavailable().body("No model loaded");
	};

	let (min, max) = (query.min.unwrap_or(5), query.max.unwrap_or(15));
	if min > max || max > MAX_LENGTH {
		return HttpResponse::BadRequest().body(format!("expected min <= max <= {MAX_LENGTH}"));
	}
	let lengths = min..=max;
	match random_sentence(&corpus.unigram, lengths, &GenerateInput::default(), &mut rand::rng()) {
		Ok(sentence) => HttpResponse::Ok().body(sentence),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/models")]
async fn get_models(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let data_dir = match data.read() {
		Ok(s) => s.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared = match data.read() {
		Ok(s) => s,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared.corpus {
		Some(corpus) => HttpResponse::Ok().body(format!("{} (order {})", corpus.name, corpus.model.order())),
		None => HttpResponse::Ok().body(""),
	}
}

#[put("/v1/load_model")]
async fn put_model(data: web::Data<RwLock<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};
	if name.contains(['/', '\\']) || name.starts_with('.') {
		return HttpResponse::BadRequest().body("Invalid model name");
	}

	let (data_dir, order) = match data.read() {
		Ok(s) => (s.data_dir.clone(), query.order.unwrap_or(s.order)),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	// Build outside the lock, readers keep the previous model meanwhile.
	let corpus = match Corpus::load(&data_dir, name, order) {
		Ok(c) => c,
		Err(e) => {
			error!("Failed to load model '{}': {}", name, e);
			return error_response(&e);
		}
	};

	match data.write() {
		Ok(mut shared) => {
			shared.corpus = Some(corpus);
			HttpResponse::Ok().body("Model loaded successfully")
		}
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

/// Main entry point for the server.
///
/// Optionally loads a corpus, wraps the shared state in a `RwLock`, and
/// starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let config = Config::parse();
	if config.length > MAX_LENGTH {
		return Err(std::io::Error::other(format!("--length must be <= {MAX_LENGTH}")));
	}

	let mut shared_data = SharedData::new(&config);
	if let Some(name) = &config.corpus {
		let corpus = Corpus::load(&shared_data.data_dir, name, config.order).map_err(std::io::Error::other)?;
		shared_data.corpus = Some(corpus);
	}
	let shared_data = web::Data::new(RwLock::new(shared_data));

	info!("Listening on {}:{}", config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.service(index)
			.service(get_generated)
			.service(get_unigram)
			.service(get_models)
			.service(get_loaded_model)
			.service(put_model)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
