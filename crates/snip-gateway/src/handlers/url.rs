use crate::error::Result;
use crate::model::{DecodeParams, EncodeRequest, ShortLinkResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortCode;
use snip_shortener::DecodeError;
use tracing::error;

pub async fn encode_handler(
    State(state): State<AppState>,
    Json(request): Json<EncodeRequest>,
) -> Result<Json<ShortLinkResponse>> {
    let raw_url = request.url.unwrap_or_default();
    let link = state.shortener().encode(&raw_url).await?;
    let short_url = state.short_url(&link.short_code);

    Ok(Json(ShortLinkResponse::new(link, short_url)))
}

pub async fn decode_handler(
    State(state): State<AppState>,
    Query(params): Query<DecodeParams>,
) -> Result<Json<ShortLinkResponse>> {
    let link = state.shortener().decode(&params.into_input()).await?;
    let short_url = state.short_url(&link.short_code);

    Ok(Json(ShortLinkResponse::new(link, short_url)))
}

/// Permanently redirects a short code to its original URL.
///
/// Only exact short codes are routed here; anything else is a plain 404.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Response {
    if !ShortCode::is_well_formed(&short_code) {
        return not_found();
    }

    match state.shortener().decode(&short_code).await {
        Ok(link) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, link.original_url)],
        )
            .into_response(),
        Err(DecodeError::NotFound) => not_found(),
        Err(DecodeError::Storage(err)) => {
            error!(error = %err, code = %short_code, "redirect lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "URL not found").into_response()
}
