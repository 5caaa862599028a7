//! Ledger engine: accounts, an append-only entry log, transfer records and
//! the coordinator that moves money between two accounts in one database
//! transaction.

pub use accounts::{Account, lock_order};
pub use commands::{
    CreateAccountCmd, CreateUserCmd, ListAccountsCmd, Overdraft, TransferTxCmd, TransferTxResult,
};
pub use currency::Currency;
pub use entries::Entry;
pub use error::{ErrorKind, EngineError, is_serialization_failure};
pub use ops::{Engine, EngineBuilder, Reconciliation, TransferSettings, TxFuture};
pub use password::{check_password, hash_password};
pub use retry::RetryPolicy;
pub use store::Store;
pub use transfers::Transfer;
pub use users::User;

mod accounts;
mod commands;
mod currency;
mod entries;
mod error;
mod ops;
mod password;
mod retry;
mod store;
mod transfers;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
