//! Staking session endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use gemstake_core::{parse_pubkey, Error, Pubkey};

use crate::dto::{
    ApiError, OpenSessionRequest, RefreshResponse, StakingSnapshot, ToggleRequest, ToggleResponse,
    TransferResponse, TxResponse,
};
use crate::session::StakingSession;
use crate::AppState;

type ApiFailure = (StatusCode, Json<ApiError>);

/// Create staking routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(open_session).delete(close_session))
        .route("/state", get(get_state))
        .route("/wallet/toggle", post(toggle_wallet))
        .route("/vault/toggle", post(toggle_vault))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/stake", post(stake))
        .route("/unstake", post(unstake))
        .route("/claim", post(claim))
        .route("/init-farmer", post(init_farmer))
        .route("/refresh-rewards", post(refresh_rewards))
}

fn failure(e: &Error) -> ApiFailure {
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ApiError::from(e)),
    )
}

fn parse_key(field: &str, value: &str) -> Result<Pubkey, ApiFailure> {
    parse_pubkey(field, value).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(e.to_string())),
        )
    })
}

async fn active_session(state: &AppState) -> Result<Arc<StakingSession>, ApiFailure> {
    state.session().await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found("No wallet connected")),
        )
    })
}

async fn snapshot_of(session: &StakingSession) -> StakingSnapshot {
    StakingSnapshot::new(
        session.wallet().to_string(),
        session.farm_id().await,
        session.snapshot().await,
    )
}

/// POST /staking/session - Connect a wallet and initialize its session
pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<StakingSnapshot>, ApiFailure> {
    let wallet = parse_key("wallet", &request.wallet)?;

    let (session, result) = state.open_session(wallet, request.farm_id).await;
    result.map_err(|e| failure(&e))?;

    Ok(Json(snapshot_of(&session).await))
}

/// DELETE /staking/session - Disconnect the wallet
pub async fn close_session(State(state): State<AppState>) -> StatusCode {
    state.close_session().await;
    StatusCode::NO_CONTENT
}

/// GET /staking/state - Current staking snapshot
pub async fn get_state(
    State(state): State<AppState>,
) -> Result<Json<StakingSnapshot>, ApiFailure> {
    let session = active_session(&state).await?;
    Ok(Json(snapshot_of(&session).await))
}

/// POST /staking/wallet/toggle - Toggle a wallet NFT for deposit
pub async fn toggle_wallet(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let mint = parse_key("mint", &request.mint)?;

    let selected = session
        .toggle_wallet_item(&mint)
        .await
        .map_err(|e| failure(&e))?;

    Ok(Json(ToggleResponse {
        selected,
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/vault/toggle - Toggle a vault NFT for withdrawal
pub async fn toggle_vault(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let mint = parse_key("mint", &request.mint)?;

    let selected = session
        .toggle_vault_item(&mint)
        .await
        .map_err(|e| failure(&e))?;

    Ok(Json(ToggleResponse {
        selected,
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/deposit - Deposit the wallet selection into the vault
pub async fn deposit(
    State(state): State<AppState>,
) -> Result<Json<TransferResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let outcome = session.deposit_selected().await.map_err(|e| failure(&e))?;
    Ok(Json(TransferResponse::new(outcome, snapshot_of(&session).await)))
}

/// POST /staking/withdraw - Withdraw the vault selection to the wallet
pub async fn withdraw(
    State(state): State<AppState>,
) -> Result<Json<TransferResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let outcome = session.withdraw_selected().await.map_err(|e| failure(&e))?;
    Ok(Json(TransferResponse::new(outcome, snapshot_of(&session).await)))
}

/// POST /staking/stake - Stake the vault
pub async fn stake(State(state): State<AppState>) -> Result<Json<TxResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let sig = session.stake().await.map_err(|e| failure(&e))?;
    Ok(Json(TxResponse {
        tx_sig: sig.to_string(),
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/unstake - Unstake or end the cooldown
pub async fn unstake(State(state): State<AppState>) -> Result<Json<TxResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let sig = session.unstake().await.map_err(|e| failure(&e))?;
    Ok(Json(TxResponse {
        tx_sig: sig.to_string(),
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/claim - Claim rewards
pub async fn claim(State(state): State<AppState>) -> Result<Json<TxResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let sig = session.claim().await.map_err(|e| failure(&e))?;
    Ok(Json(TxResponse {
        tx_sig: sig.to_string(),
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/init-farmer - Create the farmer account
pub async fn init_farmer(
    State(state): State<AppState>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let sig = session.init_farmer().await.map_err(|e| failure(&e))?;
    Ok(Json(TxResponse {
        tx_sig: sig.to_string(),
        snapshot: snapshot_of(&session).await,
    }))
}

/// POST /staking/refresh-rewards - Recompute accrued rewards
pub async fn refresh_rewards(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiFailure> {
    let session = active_session(&state).await?;
    let refreshed = session.refresh_rewards().await.map_err(|e| failure(&e))?;
    Ok(Json(RefreshResponse {
        refreshed,
        snapshot: snapshot_of(&session).await,
    }))
}
