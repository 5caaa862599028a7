//! Transfer API endpoints

use api_types::transfer::{TransferNew, TransferTxView, TransferView};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, views};

/// Check that account `id` exists and holds `currency`.
///
/// A missing account is answered with 404, a different currency with 400.
async fn validate_account(
    state: &ServerState,
    id: i64,
    currency: engine::Currency,
) -> Result<(), ServerError> {
    let account = state.store.account(id).await?;
    if account.currency != currency {
        return Err(ServerError::Generic(format!(
            "account [{id}] currency mismatch: {} vs {currency}",
            account.currency
        )));
    }
    Ok(())
}

/// Move money between two accounts of the same currency.
///
/// The engine checks existence and currency again under lock, so a request
/// racing with other writers still cannot break the ledger.
pub async fn transfer_new(
    State(state): State<ServerState>,
    payload: Result<Json<TransferNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferTxView>), ServerError> {
    let Json(payload) = payload?;
    if payload.amount <= 0 {
        return Err(ServerError::Generic("amount must be > 0".to_string()));
    }
    if payload.from_account_id == payload.to_account_id {
        return Err(ServerError::Generic(
            "from_account_id and to_account_id must differ".to_string(),
        ));
    }
    let currency = views::currency_to_engine(payload.currency);
    validate_account(&state, payload.from_account_id, currency).await?;
    validate_account(&state, payload.to_account_id, currency).await?;

    let res = state
        .store
        .transfer_tx(engine::TransferTxCmd::new(
            payload.from_account_id,
            payload.to_account_id,
            payload.amount,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(views::transfer_tx(res))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state.store.transfer(id).await?;
    Ok(Json(views::transfer(transfer)))
}
