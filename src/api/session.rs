// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, error::ErrorBody, session::Session, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = Session))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.sessions.current_session())
}

/// Open the wallet's connect dialog. A cancelled dialog returns the
/// unchanged signed-out session.
#[utoipa::path(
    post,
    path = "/v1/session/sign-in",
    tag = "Session",
    responses(
        (status = 200, body = Session),
        (status = 401, description = "Handshake rejected", body = ErrorBody),
        (status = 503, description = "No wallet available", body = ErrorBody)
    )
)]
pub async fn sign_in(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    let session = state.sessions.sign_in().await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/v1/session/sign-out",
    tag = "Session",
    responses((status = 200, body = Session))
)]
pub async fn sign_out(State(state): State<AppState>) -> Json<Session> {
    Json(state.sessions.sign_out().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{signed_out_state, state_with, ScriptedSigner, StaticLedger, ADDRESS};
    use crate::session::SessionStatus;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn session_starts_signed_out() {
        let state = signed_out_state().await;
        let Json(session) = get_session(State(state)).await;
        assert_eq!(session, Session::signed_out());
    }

    #[tokio::test]
    async fn sign_in_then_sign_out() {
        let state = state_with(
            Some(ScriptedSigner::broadcasting("0x01")),
            StaticLedger::new("0x09"),
        );
        state.sessions.initialize().await;

        let Json(session) = sign_in(State(state.clone())).await.expect("sign-in succeeds");
        assert_eq!(session.status, SessionStatus::SignedIn);
        assert_eq!(session.address.as_deref(), Some(ADDRESS));

        let Json(session) = sign_out(State(state.clone())).await;
        assert_eq!(session, Session::signed_out());
        let Json(current) = get_session(State(state)).await;
        assert_eq!(current.address, None);
    }

    #[tokio::test]
    async fn sign_in_without_wallet_is_unavailable() {
        let state = signed_out_state().await;
        let err = sign_in(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code, "wallet_unavailable");
    }
}
