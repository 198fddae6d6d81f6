use std::sync::Mutex;

use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};

use log::info;
use serde::Deserialize;
use codelm_core::io::parse_corpus;
use codelm_core::model::evaluation::perplexity;
use codelm_core::model::language_model::LanguageModel;
use codelm_core::model::options::ModelOptions;
use codelm_core::model::prediction::predict_next;

/// Struct representing query parameters for the `/v1/complete` endpoint
#[derive(Deserialize)]
struct CompleteParams {
	context: String,
	top: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	name: Option<String>,
}

struct SharedData {
	model: Option<LanguageModel>,
	options: ModelOptions,
}

/// HTTP GET endpoint `/v1/complete`
///
/// Ranks next-token completions for a whitespace-separated context using
/// the loaded model. Returns one `token probability` pair per line.
#[get("/v1/complete")]
async fn get_completions(data: web::Data<Mutex<SharedData>>, query: web::Query<CompleteParams>) -> impl Responder {
	let context: Vec<String> = query.context.split_whitespace().map(str::to_owned).collect();
	if context.is_empty() {
		return HttpResponse::BadRequest().body("Missing or empty context");
	}

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::Conflict().body("No corpus loaded"),
	};

	let top = query.top.unwrap_or(shared_data.options.top_k);
	let lines: Vec<String> = predict_next(model, &context, top)
		.into_iter()
		.map(|(token, prob)| format!("{token} {prob}"))
		.collect();

	HttpResponse::Ok().body(lines.join("\n"))
}

/// HTTP POST endpoint `/v1/perplexity`
///
/// Scores the posted corpus (one token sequence per line) under the loaded
/// model and returns its perplexity.
#[post("/v1/perplexity")]
async fn post_perplexity(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let corpus = parse_corpus(&body);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::Conflict().body("No corpus loaded"),
	};

	match perplexity(model, &corpus) {
		Ok(score) => HttpResponse::Ok().body(score.to_string()),
		Err(e) => HttpResponse::BadRequest().body(e),
	}
}

#[get("/v1/info")]
async fn get_info(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(format!(
			"vocab_size: {}\nmax_n: {}\ndiscount: {}",
			model.vocab_size(),
			model.max_n(),
			model.discount()
		)),
		None => HttpResponse::Ok().body("No corpus loaded"),
	}
}

/// HTTP PUT endpoint `/v1/load_corpus`
///
/// (Re)builds the model from `./data/<name>.txt`. A sibling `.bin` cache is
/// reused when present and written after a fresh build.
#[put("/v1/load_corpus")]
async fn put_corpus(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let corpus_path = format!("./data/{}.txt", name);
	let model = match LanguageModel::from_corpus_file(&corpus_path, &shared_data.options) {
		Ok(m) => m,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
	};

	info!("Loaded corpus {} (vocabulary {})", corpus_path, model.vocab_size());
	shared_data.model = Some(model);

	HttpResponse::Ok().body("Corpus loaded successfully")
}

/// Main entry point for the server.
///
/// Starts with no model loaded; `/v1/load_corpus` builds one from a corpus
/// under `./data`. The model is wrapped in a `Mutex` so reloads and scoring
/// requests do not race.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		model: None,
		options: ModelOptions::default(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_completions)
			.service(post_perplexity)
			.service(get_info)
			.service(put_corpus)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
