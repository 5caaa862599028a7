use serde::{Deserialize, Serialize};

use crate::{
    Account, CreateAccountCmd, EngineError, Entry, ListAccountsCmd, ResultEngine,
    accounts, entries,
    util::normalize_required,
};

use super::Engine;

/// Balance of an account next to the sum of its entry log.
///
/// Accounts open at zero and every later change is recorded as an entry, so
/// the two values match for a consistent ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub account_id: i64,
    pub balance: i64,
    pub entries_total: i64,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.balance == self.entries_total
    }
}

impl Engine {
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let owner = normalize_required(&cmd.owner, "owner")?;
        let account = accounts::insert_account(&self.database, &owner, cmd.currency).await?;
        tracing::info!(
            "account {} opened for {} in {}",
            account.id,
            account.owner,
            account.currency
        );
        Ok(account)
    }

    pub async fn account(&self, id: i64) -> ResultEngine<Account> {
        accounts::get_account(&self.database, id).await
    }

    pub async fn list_accounts(&self, cmd: ListAccountsCmd) -> ResultEngine<Vec<Account>> {
        accounts::list_accounts(&self.database, cmd.owner.as_deref(), cmd.limit, cmd.offset).await
    }

    /// Apply a direct balance adjustment, recorded as an entry without a
    /// transfer. The balance may not end below zero.
    pub async fn add_account_balance(&self, id: i64, delta: i64) -> ResultEngine<Account> {
        if delta == 0 {
            return Err(EngineError::InvalidAmount(
                "delta must not be zero".to_string(),
            ));
        }
        self.settings
            .retry
            .run("balance adjustment", move |_| {
                self.run_in_transaction::<Account, _>(move |db_tx| {
                    Box::pin(async move {
                        let account = accounts::get_account_for_update(db_tx, id).await?;
                        match account.balance.checked_add(delta) {
                            Some(balance) if balance >= 0 => {}
                            Some(_) => {
                                return Err(EngineError::InsufficientFunds(format!(
                                    "account {id} has {}, adjustment is {delta}",
                                    account.balance
                                )));
                            }
                            None => {
                                return Err(EngineError::InvalidAmount(
                                    "balance would overflow".to_string(),
                                ));
                            }
                        }
                        entries::add_entry(db_tx, id, delta, None).await?;
                        accounts::update_balance(db_tx, id, delta).await
                    })
                })
            })
            .await
    }

    pub async fn entry(&self, id: i64) -> ResultEngine<Entry> {
        entries::get_entry(&self.database, id).await
    }

    /// Entries of an existing account, oldest first.
    pub async fn entries(&self, account_id: i64, limit: u64, offset: u64) -> ResultEngine<Vec<Entry>> {
        accounts::get_account(&self.database, account_id).await?;
        entries::list_entries(&self.database, account_id, limit, offset).await
    }

    /// Compare the stored balance with the entry log, read in one
    /// transaction so both values belong to the same snapshot.
    pub async fn reconcile(&self, account_id: i64) -> ResultEngine<Reconciliation> {
        self.run_in_transaction::<Reconciliation, _>(move |db_tx| {
            Box::pin(async move {
                let account = accounts::get_account(db_tx, account_id).await?;
                let entries_total = entries::entries_total(db_tx, account_id).await?;
                Ok(Reconciliation {
                    account_id,
                    balance: account.balance,
                    entries_total,
                })
            })
        })
        .await
    }
}
