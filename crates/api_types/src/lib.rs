//! Request and response bodies of the HTTP API.
//!
//! Amounts are always integers in minor units of the account currency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cad,
    Eur,
    Gbp,
    Usd,
}

/// Query string shared by every paginated listing.
///
/// `page_id` starts at 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Page {
    pub page_id: u64,
    pub page_size: u64,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub full_name: String,
        pub email: String,
    }

    /// A user as returned by the API. The password hash never leaves the
    /// server.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub full_name: String,
        pub email: String,
        pub password_changed_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub owner: String,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub owner: Option<String>,
        pub page_id: u64,
        pub page_size: u64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i64,
        pub owner: String,
        pub balance: i64,
        pub currency: Currency,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: i64,
        pub account_id: i64,
        /// Signed delta applied to the account balance.
        pub amount: i64,
        pub transfer_id: Option<i64>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transfer {
    use super::*;
    use crate::account::{AccountView, EntryView};

    /// Body of `POST /transfers`.
    ///
    /// `currency` must be the currency of both accounts.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: i64,
        pub to_account_id: i64,
        pub amount: i64,
        pub currency: Currency,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: i64,
        pub from_account_id: i64,
        pub to_account_id: i64,
        pub amount: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Everything a committed transfer produced.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferTxView {
        pub transfer: TransferView,
        pub from_account: AccountView,
        pub to_account: AccountView,
        pub from_entry: EntryView,
        pub to_entry: EntryView,
    }
}
