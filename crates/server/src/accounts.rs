//! Account API endpoints

use api_types::{
    Page,
    account::{AccountList, AccountNew, AccountView, EntryView},
    transfer::TransferView,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, views};

const MIN_PAGE_SIZE: u64 = 5;
const MAX_PAGE_SIZE: u64 = 10;

/// Turn a 1-based page into `(limit, offset)`.
pub(crate) fn page_bounds(page_id: u64, page_size: u64) -> Result<(u64, u64), ServerError> {
    if page_id < 1 {
        return Err(ServerError::Generic("page_id must be >= 1".to_string()));
    }
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ServerError::Generic(format!(
            "page_size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
        )));
    }
    // offsets are bound as signed 64-bit integers by the database drivers
    let offset = (page_id - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| ServerError::Generic("page_id out of range".to_string()))?;
    Ok((page_size, offset))
}

/// Open an account with a zero balance.
pub async fn account_new(
    State(state): State<ServerState>,
    payload: Result<Json<AccountNew>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let Json(payload) = payload?;
    let account = state
        .store
        .create_account(engine::CreateAccountCmd::new(
            payload.owner,
            views::currency_to_engine(payload.currency),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(views::account(account))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.store.account(id).await?;
    Ok(Json(views::account(account)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let (limit, offset) = page_bounds(query.page_id, query.page_size)?;
    let accounts = state
        .store
        .list_accounts(engine::ListAccountsCmd {
            owner: query.owner,
            limit,
            offset,
        })
        .await?;

    Ok(Json(accounts.into_iter().map(views::account).collect()))
}

/// Entry log of one account, oldest first.
pub async fn entries(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<EntryView>>, ServerError> {
    let (limit, offset) = page_bounds(page.page_id, page.page_size)?;
    let entries = state.store.entries(id, limit, offset).await?;
    Ok(Json(entries.into_iter().map(views::entry).collect()))
}

pub async fn entry(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.store.entry(id).await?;
    Ok(Json(views::entry(entry)))
}

/// Transfers leaving or entering one account, oldest first.
pub async fn transfers(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let (limit, offset) = page_bounds(page.page_id, page.page_size)?;
    let transfers = state.store.account_transfers(id, limit, offset).await?;
    Ok(Json(transfers.into_iter().map(views::transfer).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert!(matches!(page_bounds(1, 5), Ok((5, 0))));
        assert!(matches!(page_bounds(3, 10), Ok((10, 20))));
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        assert!(page_bounds(0, 5).is_err());
        assert!(page_bounds(1, 4).is_err());
        assert!(page_bounds(1, 11).is_err());
        assert!(page_bounds(u64::MAX, 10).is_err());
        assert!(page_bounds(1_000_000_000_000_000_000, 10).is_err());
        assert!(matches!(
            page_bounds(922_337_203_685_477_581, 10),
            Ok((10, 9_223_372_036_854_775_800))
        ));
    }
}
