pub mod posts;
pub mod users;

use axum::http::Uri;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Build the full application: route table, 404 fallback, tracing, and
/// trailing-slash trimming ahead of routing.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(users::router())
        .merge(posts::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Unmatched path, or a known path with an unsupported method.
pub(crate) async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
