// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    classify::ErrorKind,
    error::ErrorBody,
    models::{
        ActionResponse, ArtistTipsResponse, BuyRequest, ListRequest, MintRequest, SongCidResponse,
        TipRequest, TotalArtistsResponse,
    },
    session::{Session, SessionStatus},
    state::AppState,
};

pub mod actions;
pub mod health;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/session/sign-in", post(session::sign_in))
        .route("/session/sign-out", post(session::sign_out))
        .route("/actions/tip", post(actions::tip_artist))
        .route("/actions/mint", post(actions::mint_nft))
        .route("/actions/list", post(actions::list_nft))
        .route("/actions/buy", post(actions::buy_nft))
        .route("/registry/artists/total", get(registry::total_artists))
        .route(
            "/registry/artists/{artist_id}/tips",
            get(registry::artist_tips),
        )
        .route(
            "/registry/songs/{song_id}/ipfs-cid",
            get(registry::song_ipfs_cid),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        session::get_session,
        session::sign_in,
        session::sign_out,
        actions::tip_artist,
        actions::mint_nft,
        actions::list_nft,
        actions::buy_nft,
        registry::total_artists,
        registry::artist_tips,
        registry::song_ipfs_cid
    ),
    components(
        schemas(
            Session,
            SessionStatus,
            TipRequest,
            MintRequest,
            ListRequest,
            BuyRequest,
            ActionResponse,
            TotalArtistsResponse,
            ArtistTipsResponse,
            SongCidResponse,
            ErrorBody,
            ErrorKind,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Session", description = "Wallet sign-in and sign-out"),
        (name = "Actions", description = "Contract calls approved in the wallet"),
        (name = "Registry", description = "Read-only artist registry lookups")
    )
)]
pub struct ApiDoc;
