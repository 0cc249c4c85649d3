//! Route table. axum's `Router` (backed by `matchit`) resolves literal
//! segments before wildcard ones on its own — registration order here
//! doesn't need to be literal-before-wildcard the way a hand-rolled
//! trie-walking router would.

use super::handlers::{assistants, crons, runs, store, system, threads};
use super::middleware::request_id_middleware;
use crate::context::auth::{auth_middleware, AuthVerifier};
use crate::rpc::{a2a, mcp};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, verifier: Arc<dyn AuthVerifier>) -> Router {
    let public = Router::new()
        .route("/", get(system::root))
        .route("/ok", get(system::health))
        .route("/health", get(system::health))
        .route("/info", get(system::info))
        .route("/openapi.json", get(system::openapi))
        .route("/metrics", get(system::metrics_prometheus))
        .route("/metrics/json", get(system::metrics_json));

    let assistants_routes = Router::new()
        .route("/assistants", post(assistants::create))
        .route("/assistants/search", post(assistants::search))
        .route("/assistants/count", post(assistants::count))
        .route("/assistants/:assistant_id", get(assistants::get).patch(assistants::update).delete(assistants::delete))
        .route("/assistants/:assistant_id/graph", get(assistants::graph))
        .route("/assistants/:assistant_id/schemas", get(assistants::schemas))
        .route("/assistants/:assistant_id/latest", post(assistants::latest));

    let threads_routes = Router::new()
        .route("/threads", post(threads::create))
        .route("/threads/search", post(threads::search))
        .route("/threads/count", post(threads::count))
        .route("/threads/:thread_id", get(threads::get).patch(threads::update).delete(threads::delete))
        .route("/threads/:thread_id/copy", post(threads::copy))
        .route("/threads/:thread_id/state", get(threads::get_state).post(threads::post_state))
        .route("/threads/:thread_id/history", get(threads::get_history).post(threads::post_history));

    let runs_routes = Router::new()
        .route("/threads/:thread_id/runs", post(runs::create).get(runs::list))
        .route("/threads/:thread_id/runs/wait", post(runs::wait))
        .route("/threads/:thread_id/runs/stream", post(runs::stream))
        .route("/threads/:thread_id/runs/:run_id/stream", get(runs::get_stream))
        .route("/threads/:thread_id/runs/:run_id", get(runs::get).delete(runs::delete))
        .route("/threads/:thread_id/runs/:run_id/cancel", post(runs::cancel))
        .route("/threads/:thread_id/runs/:run_id/join", get(runs::join))
        .route("/runs/wait", post(runs::wait_stateless))
        .route("/runs/stream", post(runs::stream_stateless))
        .route("/runs/crons", post(crons::create))
        .route("/runs/crons/search", post(crons::search))
        .route("/runs/crons/count", post(crons::count))
        .route("/runs/crons/:cron_id", delete(crons::delete))
        .route("/runs", post(runs::create_stateless));

    let store_routes = Router::new()
        .route("/store/namespaces", get(store::list_namespaces))
        .route("/store/items", put(store::put).get(store::get).delete(store::delete))
        .route("/store/items/search", post(store::search));

    let rpc_routes = Router::new()
        .route("/mcp", post(mcp::post).get(mcp::get).delete(mcp::delete))
        .route("/a2a/:assistant_id", post(a2a::post));

    let protected = Router::new()
        .merge(assistants_routes)
        .merge(threads_routes)
        .merge(runs_routes)
        .merge(store_routes)
        .merge(rpc_routes)
        .layer(middleware::from_fn_with_state(verifier, auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
