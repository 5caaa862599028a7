//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use serde::{Deserialize, Serialize};

use crate::{Account, Currency, Entry, Transfer};

/// Whether a transfer may leave the source account below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overdraft {
    #[default]
    Deny,
    Allow,
}

/// Move `amount` minor units from one account to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferTxCmd {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub overdraft: Overdraft,
}

impl TransferTxCmd {
    #[must_use]
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            overdraft: Overdraft::Deny,
        }
    }

    #[must_use]
    pub fn allow_overdraft(mut self) -> Self {
        self.overdraft = Overdraft::Allow;
        self
    }
}

/// Everything a committed transfer produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    /// Source account after the transfer.
    pub from_account: Account,
    /// Destination account after the transfer.
    pub to_account: Account,
}

/// Open a new account with a zero balance.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub owner: String,
    pub currency: Currency,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(owner: impl Into<String>, currency: Currency) -> Self {
        Self {
            owner: owner.into(),
            currency,
        }
    }
}

/// Register a user; the password is hashed before it reaches the database.
#[derive(Clone, Debug)]
pub struct CreateUserCmd {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

/// Page through accounts, optionally restricted to one owner.
#[derive(Clone, Debug)]
pub struct ListAccountsCmd {
    pub owner: Option<String>,
    pub limit: u64,
    pub offset: u64,
}
