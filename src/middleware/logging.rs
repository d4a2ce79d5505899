//! Request tracing layer.

use axum::Router;
use tower_http::trace::TraceLayer;

pub fn add_tracing(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}
