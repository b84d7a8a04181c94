// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only registry lookups. No session is required.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ApiError, ErrorBody},
    models::{ArtistTipsResponse, SongCidResponse, TotalArtistsResponse},
    stacks::{builder::parse_identifier, format_micro_stx, ReadOnlyQueryClient},
    state::AppState,
};

/// Lookups run as the signed-in address when there is one.
fn queries(state: &AppState) -> ReadOnlyQueryClient {
    match state.sessions.current_session().address {
        Some(address) => state.queries.clone().with_sender(address),
        None => state.queries.clone(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/registry/artists/total",
    tag = "Registry",
    responses(
        (status = 200, body = TotalArtistsResponse),
        (status = 502, description = "Unexpected ledger response", body = ErrorBody),
        (status = 503, description = "Ledger unreachable", body = ErrorBody)
    )
)]
pub async fn total_artists(
    State(state): State<AppState>,
) -> Result<Json<TotalArtistsResponse>, ApiError> {
    let total = queries(&state).total_artists().await?;
    Ok(Json(TotalArtistsResponse { total }))
}

#[utoipa::path(
    get,
    path = "/v1/registry/artists/{artist_id}/tips",
    params(
        ("artist_id" = String, Path, description = "Registry artist id")
    ),
    tag = "Registry",
    responses(
        (status = 200, body = ArtistTipsResponse),
        (status = 422, description = "Invalid artist id", body = ErrorBody)
    )
)]
pub async fn artist_tips(
    Path(artist_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ArtistTipsResponse>, ApiError> {
    let artist_id = parse_identifier("artist_id", &artist_id)?;
    let tips = queries(&state).artist_tips(artist_id).await?;
    Ok(Json(ArtistTipsResponse {
        artist_id,
        tips_stx: tips.as_u128().map(format_micro_stx),
        tips,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/registry/songs/{song_id}/ipfs-cid",
    params(
        ("song_id" = String, Path, description = "Registry song id")
    ),
    tag = "Registry",
    responses(
        (status = 200, body = SongCidResponse),
        (status = 422, description = "Invalid song id", body = ErrorBody)
    )
)]
pub async fn song_ipfs_cid(
    Path(song_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SongCidResponse>, ApiError> {
    let song_id = parse_identifier("song_id", &song_id)?;
    let ipfs_cid = queries(&state).song_ipfs_cid(song_id).await?;
    Ok(Json(SongCidResponse { song_id, ipfs_cid }))
}
