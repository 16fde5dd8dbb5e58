//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy route
//! - Wire up middleware (gate auth, tracing, timeout)
//! - Bind the server to a listener
//! - Drive the pipeline and convert failures into redirects

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::params::ProxyParams;
use crate::proxy::transcode::ImageTranscoder;
use crate::proxy::{respond, Pipeline};
use crate::security::gate_middleware;

const BANNER: &str = "imgpress: bandwidth-saving image proxy\n\
                      usage: /?url=<origin-url>[&jpeg=1][&bw=0][&l=quality][&raw=1]\n";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub pipeline: Arc<Pipeline>,
}

/// HTTP server for the image proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let config = Arc::new(config);
        let pipeline = Pipeline::new(config.clone(), Arc::new(ImageTranscoder))?;
        let state = AppState {
            config: config.clone(),
            pipeline: Arc::new(pipeline),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(proxy_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                gate_middleware,
            ))
            .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gate_auth = self.config.gate.enabled(),
            allowed_domains = ?self.config.origin.allowed_domains,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: parse parameters, run the pipeline, fall back
/// to a redirect on any pipeline error.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = Uuid::new_v4();
    let query = request.uri().query().unwrap_or("");

    let Some(params) = ProxyParams::from_query(query, &state.config.transcode) else {
        return (StatusCode::OK, BANNER).into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        url = %params.url,
        output = ?params.output,
        "proxying image request"
    );

    let client_ip = addr.ip().to_string();
    match state
        .pipeline
        .run(&params, request.headers(), Some(&client_ip))
        .await
    {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(
                request_id = %request_id,
                url = %params.url,
                error = %error,
                "pipeline failed, redirecting client to origin"
            );
            respond::redirect(&params.url)
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
