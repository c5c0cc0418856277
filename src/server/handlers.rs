//! HTTP handlers
//!
//! Catalog handlers turn the page URL into the variables for the products
//! query. Form handlers mirror the storefront's `<form method="post">`
//! actions: `{..., error: null}` on success, `{...: null, error: {field,
//! message}}` with the matching status on failure. Overlay handlers are
//! the UI event surface for the page's side panels.

use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::state::AppState;
use crate::admin::{Customer, NewsletterForm};
use crate::catalog::{SortContext, SortOption, sort};
use crate::core::{ConfigError, FormError, PaginationVariables, QueryParams, StorefrontResult};
use crate::overlay::{OverlayCoordinator, OverlayKind, OverlayState, ProductRef, VariantRef};
use crate::session::{SessionData, SessionId};

fn listing_variables(
    state: &AppState,
    context: SortContext,
    query: Option<&str>,
) -> StorefrontResult<Value> {
    let params = QueryParams::parse(query.unwrap_or_default());
    let catalog = state.translator(context).translate(&params)?;
    let page_by = state.config.catalog.page_by(context);
    let pagination = PaginationVariables::from_params(&params, page_by);
    Ok(catalog.variables(&pagination))
}

/// `GET /collections/{handle}/variables`
pub async fn collection_variables(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    RawQuery(query): RawQuery,
) -> StorefrontResult<Json<Value>> {
    let mut vars = listing_variables(&state, SortContext::Collection, query.as_deref())?;
    vars["handle"] = json!(handle);
    Ok(Json(vars))
}

/// `GET /catalog/variables`
pub async fn catalog_variables(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> StorefrontResult<Json<Value>> {
    listing_variables(&state, SortContext::Product, query.as_deref()).map(Json)
}

/// `GET /sort-options/{context}`
pub async fn sort_options(Path(context): Path<String>) -> StorefrontResult<Json<Vec<SortOption>>> {
    let context: SortContext = context.parse()?;
    Ok(Json(sort::options(context).to_vec()))
}

/// Answer a form post: the success body, or the same shape carrying `error`
fn form_reply<T: Serialize>(
    result: StorefrontResult<T>,
    failed: impl FnOnce(FormError) -> T,
) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(code = err.error_code(), "{}", err);
            } else {
                tracing::warn!(code = err.error_code(), "form rejected: {}", err);
            }
            (status, Json(failed(err.to_form_error()))).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscriber: Option<Customer>,
    pub error: Option<FormError>,
}

impl SubscribeResponse {
    fn failed(error: FormError) -> Self {
        Self {
            subscriber: None,
            error: Some(error),
        }
    }
}

async fn subscribe(
    state: &AppState,
    session_id: &SessionId,
    form: NewsletterForm,
) -> StorefrontResult<SubscribeResponse> {
    let newsletter = state.newsletter.as_ref().ok_or_else(|| ConfigError::MissingValue {
        field: "shop.admin_access_token".to_string(),
    })?;

    let subscriber = newsletter.subscribe(form).await?;

    if let Some(marketing_state) = subscriber.as_ref().and_then(Customer::marketing_state) {
        state
            .sessions
            .update(
                session_id,
                Box::new(move |session: &mut SessionData| -> StorefrontResult<()> {
                    session.marketing_state = Some(marketing_state);
                    Ok(())
                }),
            )
            .await?;
    }

    Ok(SubscribeResponse {
        subscriber,
        error: None,
    })
}

/// `POST /newsletter`
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<NewsletterForm>,
) -> Response {
    form_reply(
        subscribe(&state, &session_id, form).await,
        SubscribeResponse::failed,
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentForm {
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResponse {
    pub recently_viewed_query: Option<String>,
    pub error: Option<FormError>,
}

impl RecentResponse {
    fn failed(error: FormError) -> Self {
        Self {
            recently_viewed_query: None,
            error: Some(error),
        }
    }
}

async fn record(
    state: &AppState,
    session_id: &SessionId,
    form: RecentForm,
) -> StorefrontResult<RecentResponse> {
    let title = form.title.unwrap_or_default();
    let capacity = state.config.session.recently_viewed_count;

    let session = state
        .sessions
        .update(
            session_id,
            Box::new(move |session: &mut SessionData| {
                session.recently_viewed.record(&title, capacity)
            }),
        )
        .await?;

    Ok(RecentResponse {
        recently_viewed_query: Some(session.recently_viewed.search_query()),
        error: None,
    })
}

/// `POST /recent`
pub async fn record_recent(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<RecentForm>,
) -> Response {
    form_reply(
        record(&state, &session_id, form).await,
        RecentResponse::failed,
    )
}

/// `GET /newsletter`, `GET /recent`: form endpoints only accept posts
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

async fn update_overlay<F>(
    state: &AppState,
    id: &SessionId,
    update: F,
) -> StorefrontResult<Json<OverlayState>>
where
    F: FnOnce(&mut OverlayCoordinator) + Send,
{
    let session = state
        .sessions
        .update(
            id,
            Box::new(move |session: &mut SessionData| -> StorefrontResult<()> {
                update(&mut session.overlay);
                Ok(())
            }),
        )
        .await?;
    Ok(Json(session.overlay.state().clone()))
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub kind: OverlayKind,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

/// `GET /overlay`
pub async fn get_overlay(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> StorefrontResult<Json<OverlayState>> {
    let session = state.sessions.load_or_default(&session_id).await?;
    Ok(Json(session.overlay.state().clone()))
}

/// `POST /overlay/open`
pub async fn open_overlay(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<OpenRequest>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, |overlay| {
        overlay.open(request.kind);
    })
    .await
}

/// `POST /overlay/close`
pub async fn close_overlay(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, |overlay| {
        overlay.close();
    })
    .await
}

/// `PUT /overlay/product`; a `null` body clears the selection
pub async fn select_product(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(product): Json<Option<ProductRef>>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, |overlay| {
        overlay.set_selected_product(product);
    })
    .await
}

/// `PUT /overlay/variant`; a `null` body clears the selection
pub async fn select_variant(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(variant): Json<Option<VariantRef>>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, |overlay| {
        overlay.set_selected_variant(variant);
    })
    .await
}

/// `POST /overlay/keydown`
pub async fn overlay_keydown(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<KeyRequest>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, |overlay| {
        overlay.handle_key(&request.key);
    })
    .await
}

/// `DELETE /overlay`: full page load
pub async fn reset_overlay(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> StorefrontResult<Json<OverlayState>> {
    update_overlay(&state, &session_id, OverlayCoordinator::reset).await
}

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "storefront-rs"
    }))
}
