use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use simrec_core::{Engine, Error};
use simrec_runtime::{EngineManager, EngineStatus};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct RecommendQuery {
    top_n: Option<i64>,
}

#[derive(Serialize)]
struct RecommendResponse {
    movie: String,
    recommendations: Vec<String>,
    similarity_scores: Vec<f64>,
}

#[derive(Serialize)]
struct MoviesResponse {
    total_movies: usize,
    movies: Vec<String>,
}

#[derive(Serialize)]
struct MovieInfo {
    #[serde(rename = "movieId")]
    movie_id: i64,
    title: String,
    genres: String,
}

/// Translate an engine error into a status code and JSON body
pub fn error_response(err: &Error, engine: Option<&Engine>) -> HttpResponse {
    match err {
        Error::InvalidQuery(_) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": err.to_string()
        })),
        Error::ItemNotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": err.to_string(),
            "available_movies": engine.map(Engine::titles).unwrap_or_default(),
        })),
        Error::EngineNotReady(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": err.to_string()
        })),
        _ => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Internal server error",
            "message": err.to_string()
        })),
    }
}

/// The recommender service
pub struct RestApi;

impl RestApi {
    pub async fn start(manager: Arc<EngineManager>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(manager.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register the recommender routes; expects `web::Data<Arc<EngineManager>>`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .route("/movies", web::get().to(list_movies))
            .route("/movie/{name}", web::get().to(get_movie))
            .route("/recommend/{name}", web::get().to(recommend));
    }
}

async fn index(manager: web::Data<Arc<EngineManager>>) -> ActixResult<HttpResponse> {
    let total = manager.engine().map(|e| e.len()).unwrap_or(0);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "Recommender Service - Content-Based Recommendations",
        "version": env!("CARGO_PKG_VERSION"),
        "ml_method": "TF-IDF + Cosine Similarity",
        "total_movies": total,
        "endpoints": {
            "/": "API documentation",
            "/recommend/<movie_name>": "Get movie recommendations (optional ?top_n=K)",
            "/movies": "List all available movies",
            "/movie/<movie_name>": "Get movie details",
            "/health": "Health check"
        },
        "example": "GET /recommend/Toy%20Story"
    })))
}

async fn health(manager: web::Data<Arc<EngineManager>>) -> ActixResult<HttpResponse> {
    let status = manager.status();
    match status {
        EngineStatus::Ready { items, generation, ready_since } => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "status": "healthy",
                "service": "Recommender Service",
                "total_movies": items,
                "generation": generation,
                "ready_since": ready_since,
            })))
        }
        EngineStatus::Initializing => Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "initializing",
            "service": "Recommender Service",
        }))),
        EngineStatus::Failed { reason } => Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "failed",
            "service": "Recommender Service",
            "error": reason,
        }))),
    }
}

async fn list_movies(manager: web::Data<Arc<EngineManager>>) -> ActixResult<HttpResponse> {
    let engine = match manager.engine() {
        Ok(engine) => engine,
        Err(e) => return Ok(error_response(&e, None)),
    };

    let movies = engine.titles();
    Ok(HttpResponse::Ok().json(MoviesResponse {
        total_movies: movies.len(),
        movies,
    }))
}

async fn get_movie(
    manager: web::Data<Arc<EngineManager>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    let engine = match manager.engine() {
        Ok(engine) => engine,
        Err(e) => return Ok(error_response(&e, None)),
    };

    match engine.item(&name) {
        Ok(item) => Ok(HttpResponse::Ok().json(MovieInfo {
            movie_id: item.id,
            title: item.title.clone(),
            genres: item.raw_tags.clone(),
        })),
        Err(e) => Ok(error_response(&e, Some(engine.as_ref()))),
    }
}

async fn recommend(
    manager: web::Data<Arc<EngineManager>>,
    path: web::Path<String>,
    query: web::Query<RecommendQuery>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    debug!("Processing recommendation request for: {}", name);

    let engine = match manager.engine() {
        Ok(engine) => engine,
        Err(e) => {
            warn!("Rejecting request for '{}': {}", name, e);
            return Ok(error_response(&e, None));
        }
    };

    let top_n = match query.top_n {
        None => engine.config().default_top_n,
        Some(k) if k > 0 => k as usize,
        Some(k) => {
            let err = Error::InvalidQuery(format!("top_n must be positive, got {}", k));
            return Ok(error_response(&err, Some(engine.as_ref())));
        }
    };

    match engine.recommend(&name, top_n) {
        Ok(result) => {
            debug!("Generated {} recommendations for '{}'", result.items.len(), name);
            Ok(HttpResponse::Ok().json(RecommendResponse {
                recommendations: result.titles().into_iter().map(str::to_string).collect(),
                similarity_scores: result.scores(),
                movie: result.query,
            }))
        }
        Err(e) => {
            debug!("Recommendation for '{}' failed: {}", name, e);
            Ok(error_response(&e, Some(engine.as_ref())))
        }
    }
}
