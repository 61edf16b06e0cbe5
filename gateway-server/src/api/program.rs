//! Program API Handlers
//!
//! HTTP handlers for program endpoints. The same handlers serve every API
//! version; [`router`] binds them to one [`ProgramSerializer`].

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use gateway_core::dto::page::Page;
use gateway_core::dto::program::ProgramView;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::Caller;
use crate::serializer::{ProgramForm, ProgramSerializer};
use crate::service::program_service;
use crate::state::AppState;

/// Handler state: the shared application state plus the version's serializer
#[derive(Clone)]
pub struct ProgramApi {
    state: AppState,
    serializer: Arc<dyn ProgramSerializer>,
}

/// Mount the program endpoints under `/{version}/programs/`.
pub fn router(state: AppState, serializer: Arc<dyn ProgramSerializer>) -> Router {
    let base = format!("/{}/programs", serializer.version());

    Router::new()
        .route(&format!("{}/", base), get(list_programs).post(create_program))
        .route(&format!("{}/{{id}}/", base), get(get_program).delete(delete_program))
        .route(&format!("{}/{{id}}/artifact/", base), get(download_artifact))
        .with_state(ProgramApi { state, serializer })
}

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// GET /{version}/programs/
/// List programs, newest first
pub async fn list_programs(
    State(api): State<ProgramApi>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<ProgramView>>> {
    let page = match query.page.as_deref() {
        None | Some("") => 1,
        Some(raw) => raw.parse::<u64>().map_err(|_| ApiError::NotFound)?,
    };

    let pagination = api.state.pagination;
    let requested_size = query
        .page_size
        .as_deref()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|size| *size > 0);
    let page_size = requested_size
        .map(|size| size.min(pagination.max_page_size))
        .unwrap_or(pagination.page_size);

    tracing::debug!("Listing programs: page {} (size {})", page, page_size);
    let listing = program_service::list_programs(&api.state, page, page_size).await?;

    let link = |target: u64| {
        let mut url = format!("/{}/programs/?page={}", api.serializer.version(), target);
        if requested_size.is_some() {
            url.push_str(&format!("&page_size={}", page_size));
        }
        url
    };

    let next = listing.has_next().then(|| link(listing.page + 1));
    let previous = listing.has_previous().then(|| link(listing.page - 1));

    let page = Page {
        count: listing.count,
        next,
        previous,
        results: listing.programs,
    };

    Ok(Json(page.map(|program| api.serializer.represent(&program))))
}

/// GET /{version}/programs/{id}/
/// Get a single program
pub async fn get_program(
    State(api): State<ProgramApi>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgramView>> {
    let id = parse_id(&id)?;
    tracing::debug!("Retrieving program {}", id);
    let program = program_service::get_program(&api.state, id).await?;
    Ok(Json(api.serializer.represent(&program)))
}

/// POST /{version}/programs/
/// Create a program from a multipart form or a JSON object
///
/// Anonymous callers are refused before the body is looked at.
pub async fn create_program(
    State(api): State<ProgramApi>,
    Extension(caller): Extension<Caller>,
    form: Result<ProgramForm, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let principal = caller.require_principal()?;
    let form = form?;

    let new_program = api.serializer.validate(form).map_err(|errors| {
        tracing::debug!("Rejected program from {}: {}", principal.username, errors);
        ApiError::Validation(errors)
    })?;

    let program = program_service::create_program(&api.state, principal, new_program).await?;

    Ok((StatusCode::CREATED, Json(api.serializer.represent(&program))))
}

/// DELETE /{version}/programs/{id}/
/// Delete a program and its artifact
pub async fn delete_program(
    State(api): State<ProgramApi>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require_principal()?;
    let id = parse_id(&id)?;

    program_service::delete_program(&api.state, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /{version}/programs/{id}/artifact/
/// Download the stored archive
pub async fn download_artifact(
    State(api): State<ProgramApi>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (program, data) = program_service::get_artifact(&api.state, id).await?;

    let disposition = format!("attachment; filename=\"{}.tar\"", program.id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/x-tar".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

/// A path segment that is not a UUID cannot name a program.
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}
