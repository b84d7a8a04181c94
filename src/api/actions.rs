// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract actions. Each handler checks the session, builds the call from
//! raw input and hands it to the wallet for approval.

use axum::{extract::State, Json};

use crate::{
    error::{ApiError, ErrorBody},
    models::{ActionResponse, BuyRequest, ListRequest, MintRequest, TipRequest},
    stacks::CallDescriptor,
    state::AppState,
};

async fn submit(state: &AppState, descriptor: CallDescriptor) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.wallet.submit_call(descriptor).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/v1/actions/tip",
    request_body = TipRequest,
    tag = "Actions",
    responses(
        (status = 200, body = ActionResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 409, description = "Another call awaits approval", body = ErrorBody),
        (status = 422, description = "Invalid input", body = ErrorBody)
    )
)]
pub async fn tip_artist(
    State(state): State<AppState>,
    Json(request): Json<TipRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.sessions.require_signed_in()?;
    let descriptor = state.calls.tip(&request.artist_id, &request.amount)?;
    submit(&state, descriptor).await
}

#[utoipa::path(
    post,
    path = "/v1/actions/mint",
    request_body = MintRequest,
    tag = "Actions",
    responses(
        (status = 200, body = ActionResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 422, description = "Invalid input", body = ErrorBody)
    )
)]
pub async fn mint_nft(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.sessions.require_signed_in()?;
    let descriptor = state.calls.mint(&request.collection_id)?;
    submit(&state, descriptor).await
}

#[utoipa::path(
    post,
    path = "/v1/actions/list",
    request_body = ListRequest,
    tag = "Actions",
    responses(
        (status = 200, body = ActionResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 422, description = "Invalid input", body = ErrorBody)
    )
)]
pub async fn list_nft(
    State(state): State<AppState>,
    Json(request): Json<ListRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.sessions.require_signed_in()?;
    let descriptor = state
        .calls
        .list(&request.collection_id, &request.token_id, &request.price)?;
    submit(&state, descriptor).await
}

#[utoipa::path(
    post,
    path = "/v1/actions/buy",
    request_body = BuyRequest,
    tag = "Actions",
    responses(
        (status = 200, body = ActionResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 422, description = "Invalid input", body = ErrorBody)
    )
)]
pub async fn buy_nft(
    State(state): State<AppState>,
    Json(request): Json<BuyRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    state.sessions.require_signed_in()?;
    let descriptor = state.calls.buy(&request.collection_id, &request.token_id)?;
    submit(&state, descriptor).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{signed_in_state, signed_out_state, ScriptedSigner};
    use axum::http::StatusCode;

    fn tip(artist_id: &str, amount: &str) -> Json<TipRequest> {
        Json(TipRequest {
            artist_id: artist_id.to_string(),
            amount: amount.to_string(),
        })
    }

    #[tokio::test]
    async fn tip_broadcasts_and_links_explorer() {
        let signer = ScriptedSigner::broadcasting("0xfeed");
        let state = signed_in_state(signer.clone()).await;

        let Json(response) = tip_artist(State(state), tip("1", "500000"))
            .await
            .expect("tip succeeds");

        assert_eq!(
            response,
            ActionResponse::Broadcast {
                tx_id: "0xfeed".to_string(),
                explorer_url: "https://explorer.hiro.so/txid/0xfeed?chain=testnet".to_string(),
            }
        );
        assert_eq!(signer.submits(), 1);
        assert_eq!(
            signer.last_function.lock().unwrap().as_deref(),
            Some("tip-artist")
        );
    }

    #[tokio::test]
    async fn cancelled_approval_is_a_normal_response() {
        let signer = ScriptedSigner::cancelling();
        let state = signed_in_state(signer).await;

        let Json(response) = buy_nft(
            State(state),
            Json(BuyRequest {
                collection_id: "3".to_string(),
                token_id: "17".to_string(),
            }),
        )
        .await
        .expect("cancel is not an error");
        assert_eq!(response, ActionResponse::Cancelled);
    }

    #[tokio::test]
    async fn actions_require_sign_in() {
        let state = signed_out_state().await;
        let err = tip_artist(State(state), tip("1", "10")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "session_error");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_wallet() {
        let signer = ScriptedSigner::broadcasting("0x01");
        let state = signed_in_state(signer.clone()).await;

        let err = list_nft(
            State(state),
            Json(ListRequest {
                collection_id: "1".to_string(),
                token_id: "2".to_string(),
                price: "-5".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("price"));
        assert_eq!(signer.submits(), 0);
    }

    #[tokio::test]
    async fn mint_uses_marketplace() {
        let signer = ScriptedSigner::broadcasting("0x02");
        let state = signed_in_state(signer.clone()).await;

        mint_nft(
            State(state),
            Json(MintRequest {
                collection_id: "4".to_string(),
            }),
        )
        .await
        .expect("mint succeeds");
        assert_eq!(
            signer.last_function.lock().unwrap().as_deref(),
            Some("mint-nft")
        );
    }
}
