use axum::http::HeaderValue;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_url_handler, delete_url_handler, get_url_handler, health_handler, list_urls_handler,
    redirect_handler, update_url_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Builds the HTTP router. Every route answers with and without a
    /// trailing slash.
    pub fn router(state: AppState, cors: CorsLayer) -> Router {
        fn collection() -> MethodRouter<AppState> {
            post(create_url_handler).get(list_urls_handler)
        }
        fn member() -> MethodRouter<AppState> {
            get(get_url_handler)
                .put(update_url_handler)
                .delete(delete_url_handler)
        }

        Router::new()
            .route("/health", get(health_handler))
            .route("/urls", collection())
            .route("/urls/", collection())
            .route("/urls/{short_code}", member())
            .route("/urls/{short_code}/", member())
            .route("/{short_code}", get(redirect_handler))
            .route("/{short_code}/", get(redirect_handler))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// CORS policy: any origin when `origins` is empty, otherwise only the
/// listed ones.
pub fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods(Any)
        .allow_headers(Any)
}
