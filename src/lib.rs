//! Hayya: menstrual cycle prediction over HTTP, with a companion chat.
//!
//! The prediction core in [`prediction`] is pure and synchronous; everything
//! else is transport glue around it.

pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod prediction;

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub use chat::{ChatService, TextGenerator};
pub use config::AppConfig;
pub use error::{AppError, PredictionError, ValidationError};
pub use prediction::{predict, predict_from_strings, Prediction};

/// Shared per-request state. Only the chat collaborator lives here; the
/// predictor needs none.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ChatService::from_config(&config.gemini))
    }
}

/// Front-end pages, served from the pages directory.
const PAGES: [(&str, &str); 5] = [
    ("/index", "index.html"),
    ("/luna", "luna-cycle.html"),
    ("/dark-luna", "dark-luna.html"),
    ("/chat-page", "chat.html"),
    ("/privacy-policy", "privacy-policy.html"),
];

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .route("/get-initial-message", get(handlers::initial_message))
        .route("/chat", post(handlers::chat));

    with_pages(router, &config.pages_dir)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(cors_layer(config.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn with_pages(mut router: Router<AppState>, pages_dir: &Path) -> Router<AppState> {
    for (route, file) in PAGES {
        router = router.route_service(route, ServeFile::new(pages_dir.join(file)));
    }
    router
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let allow_origin = match origins {
        None => AllowOrigin::from(Any),
        Some(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
