use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    TrackerError, api,
    config::ServerConfig,
    dashboard::{Dashboard, FetchReport, Session},
    page::PageRenderer,
};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    fn page(&self, status: StatusCode, session: &Session, notice: Option<&str>) -> Response {
        match self.pages.render(session, notice) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render dashboard page: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.user_message()).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherForm {
    #[serde(default)]
    pub cities: String,
}

/// Posted by the "Ask the AI" form. `report` is the JSON of the earlier fetch.
#[derive(Debug, Deserialize)]
pub struct InsightForm {
    #[serde(default)]
    pub cities: String,
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub question: String,
}

/// Build the application router. Fails only if the page template does not compile.
pub fn router(dashboard: Arc<Dashboard>) -> Result<Router, TrackerError> {
    let pages = Arc::new(PageRenderer::new()?);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/", get(index))
        .route("/weather", post(fetch_weather))
        .route("/insight", post(request_insight))
        .route("/health", get(health))
        .nest("/api", api::router())
        .with_state(AppState { dashboard, pages })
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn index(State(state): State<AppState>) -> Response {
    state.page(StatusCode::OK, &Session::default(), None)
}

async fn fetch_weather(State(state): State<AppState>, Form(form): Form<WeatherForm>) -> Response {
    let session = state.dashboard.start_session(&form.cities).await;
    state.page(StatusCode::OK, &session, None)
}

async fn request_insight(State(state): State<AppState>, Form(form): Form<InsightForm>) -> Response {
    let report = if form.report.trim().is_empty() {
        FetchReport::default()
    } else {
        match serde_json::from_str::<FetchReport>(&form.report) {
            Ok(report) => report,
            Err(err) => {
                warn!("Discarding unreadable fetch report: {}", err);
                let session = Session {
                    cities_input: form.cities,
                    ..Session::default()
                };
                return state.page(
                    StatusCode::BAD_REQUEST,
                    &session,
                    Some("The earlier weather results could not be read. Please fetch the weather again."),
                );
            }
        }
    };

    let mut session = state.dashboard.resume_session(&form.cities, report);
    state
        .dashboard
        .submit_insight(&mut session, &form.city, &form.question)
        .await;
    state.page(StatusCode::OK, &session, None)
}

async fn health() -> &'static str {
    "ok"
}

/// Serve the dashboard until Ctrl+C or SIGTERM
pub async fn run(config: &ServerConfig, dashboard: Arc<Dashboard>) -> anyhow::Result<()> {
    let app = router(dashboard)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
