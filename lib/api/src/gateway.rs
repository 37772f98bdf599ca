//! Front-facing gateway
//!
//! Accepts recommendation requests from users and forwards them to the
//! recommender service over HTTP. Upstream 200/400/404/503 responses are
//! passed through with their body; a refused connection maps to 503, a
//! timeout to 504 and anything else to 500.

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use reqwest::Url;
use simrec_core::{Error, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Default budget for one upstream call
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared gateway state: an HTTP client and the recommender base URL
#[derive(Clone)]
pub struct GatewayState {
    client: reqwest::Client,
    upstream: Url,
}

impl GatewayState {
    pub fn new(upstream: &str, timeout: Duration) -> Result<Self> {
        let upstream = Url::parse(upstream)
            .map_err(|e| Error::InvalidConfig(format!("invalid upstream URL '{}': {}", upstream, e)))?;
        if upstream.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "upstream URL '{}' cannot be used as a base",
                upstream
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// `{upstream}/recommend/{name}` with the name percent-encoded as one segment
    fn recommend_url(&self, name: &str, query: &str) -> Url {
        let mut url = self.upstream.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("recommend").push(name);
        }
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        url
    }
}

pub struct GatewayApi;

impl GatewayApi {
    pub async fn start(state: GatewayState, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register the gateway routes; expects `web::Data<GatewayState>`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .route("/recommend/{name}", web::get().to(recommend));
    }
}

async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "User Service - Movie Recommendation Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/": "API documentation",
            "/recommend/<movie_name>": "Get movie recommendations",
            "/health": "Health check"
        },
        "example": "GET /recommend/Toy%20Story"
    })))
}

async fn health(state: web::Data<GatewayState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "User Service",
        "upstream": state.upstream().as_str(),
    })))
}

async fn recommend(
    state: web::Data<GatewayState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    let url = state.recommend_url(&name, req.query_string());
    debug!("Forwarding recommendation request for '{}' to {}", name, url);

    let response = match state.client.get(url).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            warn!("Request to recommender timed out: {}", e);
            return Ok(HttpResponse::GatewayTimeout().json(serde_json::json!({
                "error": "Request timeout",
                "message": "The recommender service took too long to respond"
            })));
        }
        Err(e) if e.is_connect() => {
            warn!("Cannot connect to recommender: {}", e);
            return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "Recommender service is currently unavailable",
                "message": format!("Please ensure the recommender service is running at {}", state.upstream())
            })));
        }
        Err(e) => {
            warn!("Recommender request failed: {}", e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
                "message": e.to_string()
            })));
        }
    };

    let code = response.status().as_u16();
    match code {
        200 | 400 | 404 | 503 => {
            let body = match response.json::<serde_json::Value>().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => {
                    return Ok(HttpResponse::GatewayTimeout().json(serde_json::json!({
                        "error": "Request timeout",
                        "message": "The recommender service took too long to respond"
                    })));
                }
                Err(e) => {
                    warn!("Malformed response from recommender: {}", e);
                    return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                        "error": "Error from recommender service",
                        "status_code": code
                    })));
                }
            };
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Ok(HttpResponse::build(status).json(body))
        }
        other => {
            warn!("Recommender service error: {}", other);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Error from recommender service",
                "status_code": other
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::RestApi;
    use actix_web::test;
    use simrec_core::{Catalog, Engine, EngineConfig, Item};
    use simrec_runtime::{EngineManager, EngineSource};
    use std::net::{SocketAddr, TcpListener};
    use std::sync::Arc;

    fn manager() -> Arc<EngineManager> {
        let catalog = Catalog::from_items(vec![
            Item::new(1, "Toy Story", "Animation|Comedy", '|'),
            Item::new(2, "Monsters, Inc.", "Animation|Comedy", '|'),
            Item::new(3, "Heat", "Action|Crime", '|'),
        ]);
        let engine = Engine::build(catalog, EngineConfig::default()).unwrap();
        Arc::new(EngineManager::with_engine(
            EngineSource::new("movies.csv", EngineConfig::default()),
            engine,
        ))
    }

    /// Start a recommender on an ephemeral port and return its address
    fn spawn_recommender(manager: Arc<EngineManager>) -> SocketAddr {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(manager.clone()))
                .configure(RestApi::configure)
                .route(
                    "/slow/recommend/{name}",
                    web::get().to(|| async {
                        actix_web::rt::time::sleep(Duration::from_secs(3)).await;
                        HttpResponse::Ok().finish()
                    }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        addr
    }

    #[actix_web::test]
    async fn test_recommend_url_encodes_name() {
        let state = GatewayState::new("http://127.0.0.1:5001", DEFAULT_UPSTREAM_TIMEOUT).unwrap();
        let url = state.recommend_url("Monsters, Inc./2", "top_n=3");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5001/recommend/Monsters,%20Inc.%2F2?top_n=3"
        );
        assert!(GatewayState::new("not a url", DEFAULT_UPSTREAM_TIMEOUT).is_err());
    }

    #[actix_web::test]
    async fn test_forwards_success_and_not_found() {
        let addr = spawn_recommender(manager());
        let state = GatewayState::new(&format!("http://{}", addr), DEFAULT_UPSTREAM_TIMEOUT).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(GatewayApi::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/recommend/Toy%20Story?top_n=1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["recommendations"], serde_json::json!(["Monsters, Inc."]));

        let req = test::TestRequest::get().uri("/recommend/Nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["available_movies"].is_array());
    }

    #[actix_web::test]
    async fn test_unreachable_upstream() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let state = GatewayState::new(&format!("http://127.0.0.1:{}", port), DEFAULT_UPSTREAM_TIMEOUT).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(GatewayApi::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/recommend/Heat").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_upstream_timeout() {
        let addr = spawn_recommender(manager());
        let state = GatewayState::new(&format!("http://{}/slow", addr), Duration::from_millis(200)).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(GatewayApi::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/recommend/Heat").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
