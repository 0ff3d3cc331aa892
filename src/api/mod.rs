//! Development server for the graph resource.
//!
//! Serves `api/graph` from an in-memory [`GraphStore`] with the REST mapping
//! graph collections expect.

mod handlers;
mod middleware;
mod store;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::SecurityConfig;
pub use store::GraphStore;

pub fn create_router(store: GraphStore, security: SecurityConfig) -> Router {
    let api = Router::new()
        .route(
            "/graph",
            get(handlers::list_graphs).post(handlers::create_graph),
        )
        .route(
            "/graph/{id}",
            get(handlers::get_graph)
                .put(handlers::update_graph)
                .patch(handlers::patch_graph)
                .delete(handlers::delete_graph),
        )
        .route_layer(from_fn_with_state(security, middleware::auth_middleware));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
