//! Route table

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    catalog_variables, close_overlay, collection_variables, get_overlay, health_check,
    open_overlay, overlay_keydown, record_recent, redirect_home, reset_overlay, select_product,
    select_variant, sort_options, subscribe_newsletter,
};
use super::session::session_middleware;
use super::state::AppState;

/// Build all storefront routes
///
/// - GET  /collections/{handle}/variables - Variables for a collection page
/// - GET  /catalog/variables - Variables for the all-products page
/// - GET  /sort-options/{context} - Sort dropdown entries
/// - POST /newsletter - Newsletter subscription form
/// - POST /recent - Record a product view
/// - GET/DELETE /overlay, POST /overlay/{open,close,keydown}, PUT /overlay/{product,variant}
/// - GET  /health
pub fn build_routes(state: AppState, custom_routes: Vec<Router>) -> Router {
    let session_routes = Router::new()
        .route("/collections/{handle}/variables", get(collection_variables))
        .route("/catalog/variables", get(catalog_variables))
        .route("/newsletter", post(subscribe_newsletter).get(redirect_home))
        .route("/recent", post(record_recent).get(redirect_home))
        .route("/overlay", get(get_overlay).delete(reset_overlay))
        .route("/overlay/open", post(open_overlay))
        .route("/overlay/close", post(close_overlay))
        .route("/overlay/keydown", post(overlay_keydown))
        .route("/overlay/product", put(select_product))
        .route("/overlay/variant", put(select_variant))
        .route_layer(from_fn_with_state(state.clone(), session_middleware));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/sort-options/{context}", get(sort_options))
        .merge(session_routes)
        .with_state(state);

    for custom in custom_routes {
        app = app.merge(custom);
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
