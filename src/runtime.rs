use crate::{
    auth::api_key_auth,
    classify::classify,
    engine::events::ExecutionEvent,
    engine::ExecutionResult,
    explain::DiagnosticReport,
    install::install_package,
    language::ExecutionRequest,
    runner::Services,
};

use axum::debug_handler;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Span;

pub const API_KEY_ENV: &str = "CODEROUTE_API_KEY";

pub struct AppState {
    pub services: Services,
    pub api_key: Option<String>,
}

/* ---------------- server ---------------- */

pub async fn serve(addr: &str, services: Services) -> anyhow::Result<()> {
    let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        tracing::warn!("{} is not set; protected routes will refuse requests", API_KEY_ENV);
    }

    let app = app(Arc::new(AppState { services, api_key }));

    let socket: SocketAddr = addr.parse()?;
    let listener = TcpListener::bind(socket).await?;

    tracing::info!("coderoute listening on http://{}", socket);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/execute", post(execute))
        .route("/classify", post(classify_source))
        .route("/explain", post(explain))
        .route("/install", post(install))
        .layer(middleware::from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                    )
                })
                .on_response(|res: &Response, latency: Duration, _span: &Span| {
                    tracing::info!(
                        status = res.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "request completed"
                    );
                }),
        )
}

/* ---------------- request models ---------------- */

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    language: String,
    source: String,
    #[serde(default)]
    entrypoint: Option<String>,
    #[serde(default)]
    arguments: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExecuteResponse {
    result: ExecutionResult,
    events: Vec<ExecutionEvent>,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    language: String,
    source: String,
}

#[derive(Debug, Deserialize)]
struct ExplainRequest {
    diagnostic: String,
}

#[derive(Debug, Deserialize)]
struct InstallRequest {
    package: String,
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "ok": false,
            "error": message,
        })),
    )
        .into_response()
}

/* ---------------- endpoints ---------------- */

async fn health() -> &'static str {
    "ok"
}

#[debug_handler]
async fn execute(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> Response {
    let language = match req.language.parse::<crate::language::Language>() {
        Ok(l) => l,
        Err(e) => return bad_request(e.to_string()),
    };
    let entrypoint = req
        .entrypoint
        .unwrap_or_else(|| language.default_entrypoint().to_string());

    let request = match ExecutionRequest::new(language, req.source, &entrypoint, req.arguments) {
        Ok(r) => r,
        Err(e) => return bad_request(e.to_string()),
    };

    let (result, sink) = state.services.router.route_with_events(&request).await;

    (
        StatusCode::OK,
        Json(ExecuteResponse {
            result,
            events: sink.into_events(),
        }),
    )
        .into_response()
}

#[debug_handler]
async fn classify_source(Json(req): Json<ClassifyRequest>) -> Response {
    match classify(&req.language, &req.source) {
        Ok(risk) => (StatusCode::OK, Json(risk)).into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

#[debug_handler]
async fn explain(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> Json<DiagnosticReport> {
    Json(state.services.explainer.explain(&req.diagnostic).await)
}

#[debug_handler]
async fn install(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InstallRequest>,
) -> Json<serde_json::Value> {
    let cfg = &state.services.config;
    let message = install_package(&cfg.runtime.pip, &req.package, &cfg.limits).await;
    Json(serde_json::json!({ "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::header::AUTHORIZATION;
    use tower::ServiceExt;

    fn state(api_key: Option<&str>) -> Arc<AppState> {
        let mut cfg = Config::default();
        cfg.model.api_key_env = "CODEROUTE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        Arc::new(AppState {
            services: Services::from_config(cfg),
            api_key: api_key.map(str::to_string),
        })
    }

    fn post_json(uri: &str, key: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(k) = key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", k));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let res = app(state(None))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_need_a_configured_key() {
        let body = serde_json::json!({"language": "python", "source": "open('x')"});
        let res = app(state(None))
            .oneshot(post_json("/classify", Some("anything"), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let body = serde_json::json!({"language": "python", "source": "open('x')"});
        let res = app(state(Some("secret")))
            .oneshot(post_json("/classify", Some("guess"), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn classify_over_http() {
        let body = serde_json::json!({"language": "Java", "source": "new Scanner(System.in)"});
        let res = app(state(Some("secret")))
            .oneshot(post_json("/classify", Some("secret"), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert_eq!(v["has_blocking_io"], true);
        assert_eq!(v["matched"], serde_json::json!(["Scanner(", "System.in"]));
    }

    #[tokio::test]
    async fn unsupported_language_is_a_bad_request() {
        let body = serde_json::json!({"language": "perl", "source": "print 1"});
        let res = app(state(Some("secret")))
            .oneshot(post_json("/execute", Some("secret"), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].as_str().unwrap().contains("perl"));
    }

    #[tokio::test]
    async fn io_request_is_simulated_with_events() {
        let body = serde_json::json!({"language": "python", "source": "x = input()"});
        let res = app(state(Some("secret")))
            .oneshot(post_json("/execute", Some("secret"), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let v = body_json(res).await;
        assert_eq!(v["result"]["path"], "simulated");
        assert_eq!(v["result"]["stderr"], "I/O detected; using simulated output.");
        // no key configured for the model, so the narrative is a placeholder
        assert!(v["result"]["stdout"].as_str().unwrap().contains("CODEROUTE_TEST_KEY_THAT_IS_NEVER_SET"));
        assert_eq!(v["events"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn blank_explain_returns_empty_explanation() {
        let body = serde_json::json!({"diagnostic": ""});
        let res = app(state(Some("secret")))
            .oneshot(post_json("/explain", Some("secret"), body))
            .await
            .unwrap();
        assert_eq!(body_json(res).await["explanation"], "");
    }
}
