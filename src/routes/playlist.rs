use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{PlaylistQuery, PlaylistRequest, ServiceKind};
use crate::services::{metrics, normalizer, renderer};
use crate::AppState;

fn playlist_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// GET /?service=<name>&region=<code>&start_chno=<n>&include=<ids>&exclude=<ids>
/// Renders the service's channel feed as an M3U8 playlist.
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PlaylistQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            metrics::record_request("unknown", "bad_request");
            return AppError::InvalidQuery(rejection.body_text()).into_response();
        }
    };

    let service_label = query
        .service_name()
        .map_or("unknown", |s| ServiceKind::from_name(s).as_str());

    match build_playlist(&state, query).await {
        Ok(body) => {
            metrics::record_request(service_label, "ok");
            playlist_response(body)
        }
        Err(e) => {
            metrics::record_request(service_label, e.outcome());
            e.into_response()
        }
    }
}

/// Fallback for every path but `/` when strict routing is enabled
pub async fn not_found() -> AppError {
    AppError::NotFound
}

async fn build_playlist(state: &AppState, query: PlaylistQuery) -> AppResult<String> {
    let epg_base = &state.config.epg_base_url;
    let service = query.service_name().ok_or(AppError::MissingService)?;

    // PBS and PBS Kids ignore every other parameter
    match ServiceKind::from_name(service) {
        ServiceKind::PbsKids => {
            info!(service, "PBS Kids playlist request");
            return pbs_kids_playlist(state).await;
        }
        ServiceKind::Pbs => {
            info!(service, "PBS playlist request");
            let doc = state
                .fetcher
                .fetch_feed(service)
                .await
                .map_err(AppError::Upstream)?;
            return Ok(renderer::render_pbs(&doc, epg_base)?);
        }
        _ => {}
    }

    let req = PlaylistRequest::from_query(query)?;
    info!(service = %req.service, region = %req.region, "Playlist request");

    let doc = state
        .fetcher
        .fetch_feed(&req.service)
        .await
        .map_err(AppError::Upstream)?;

    let catalog = if normalizer::needs_plex_catalog(&doc, &req) {
        state
            .fetcher
            .fetch_plex_catalog()
            .await
            .map_err(AppError::PlexCatalog)?
    } else {
        Vec::new()
    };

    let entries = normalizer::normalize(doc, &req, &catalog)?;
    Ok(renderer::render_playlist(entries, &req, epg_base))
}

async fn pbs_kids_playlist(state: &AppState) -> AppResult<String> {
    let result = match state.fetcher.fetch_pbs_kids().await {
        Ok(doc) => renderer::render_pbs_kids(&doc, &state.config.epg_base_url).map_err(AppError::from),
        Err(e) => Err(AppError::Upstream(e)),
    };

    match result {
        // Older clients expect the failure inside a 200 playlist body
        Err(e) if state.config.pbs_kids_legacy_errors => {
            let detail = match &e {
                AppError::Upstream(fetch) => fetch.to_string(),
                other => other.to_string(),
            };
            warn!("PBS Kids playlist failed: {}", detail);
            Ok(format!("Error fetching PBS Kids data: {}", detail))
        }
        other => other,
    }
}
