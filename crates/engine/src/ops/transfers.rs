//! The transfer coordinator.
//!
//! One transfer is one database transaction:
//!
//! 1. lock both accounts, lower id first ([`lock_order`]);
//! 2. check funds on the locked source row;
//! 3. append the transfer and its two entries;
//! 4. apply both balance deltas, again lower id first;
//! 5. commit.
//!
//! Serialization conflicts re-run the whole transaction under the engine's
//! [`RetryPolicy`](crate::RetryPolicy). Any other failure rolls back and is
//! returned as is.

use sea_orm::DatabaseTransaction;

use crate::{
    Account, EngineError, Overdraft, ResultEngine, Transfer, TransferTxCmd, TransferTxResult,
    accounts::{self, lock_order},
    entries, transfers,
};

use super::Engine;

fn validate(cmd: &TransferTxCmd) -> ResultEngine<()> {
    if cmd.amount <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    if cmd.from_account_id == cmd.to_account_id {
        return Err(EngineError::InvalidAmount(
            "from_account_id and to_account_id must differ".to_string(),
        ));
    }
    Ok(())
}

fn check_funds(cmd: &TransferTxCmd, from: &Account, to: &Account) -> ResultEngine<()> {
    if from.currency != to.currency {
        return Err(EngineError::CurrencyMismatch(format!(
            "account {} is {}, account {} is {}",
            from.id, from.currency, to.id, to.currency
        )));
    }
    if cmd.overdraft == Overdraft::Deny && from.balance < cmd.amount {
        return Err(EngineError::InsufficientFunds(format!(
            "account {} has {}, needs {}",
            from.id, from.balance, cmd.amount
        )));
    }
    if to.balance.checked_add(cmd.amount).is_none()
        || from.balance.checked_sub(cmd.amount).is_none()
    {
        return Err(EngineError::InvalidAmount(
            "balance would overflow".to_string(),
        ));
    }
    Ok(())
}

/// Body of one transfer attempt. Runs entirely inside `db_tx`.
async fn transfer_in_tx(
    db_tx: &DatabaseTransaction,
    cmd: TransferTxCmd,
) -> ResultEngine<TransferTxResult> {
    let TransferTxCmd {
        from_account_id,
        to_account_id,
        amount,
        ..
    } = cmd;
    let [first_id, second_id] = lock_order(from_account_id, to_account_id);

    let first = accounts::get_account_for_update(db_tx, first_id).await?;
    let second = accounts::get_account_for_update(db_tx, second_id).await?;
    let (from, to) = if first.id == from_account_id {
        (&first, &second)
    } else {
        (&second, &first)
    };
    check_funds(&cmd, from, to)?;

    let transfer: Transfer =
        transfers::add_transfer(db_tx, from_account_id, to_account_id, amount).await?;
    let from_entry = entries::add_entry(db_tx, from_account_id, -amount, Some(transfer.id)).await?;
    let to_entry = entries::add_entry(db_tx, to_account_id, amount, Some(transfer.id)).await?;

    let delta = |id: i64| if id == from_account_id { -amount } else { amount };
    let first = accounts::update_balance(db_tx, first_id, delta(first_id)).await?;
    let second = accounts::update_balance(db_tx, second_id, delta(second_id)).await?;
    let (from_account, to_account) = if first.id == from_account_id {
        (first, second)
    } else {
        (second, first)
    };

    Ok(TransferTxResult {
        transfer,
        from_entry,
        to_entry,
        from_account,
        to_account,
    })
}

impl Engine {
    /// Atomically move `cmd.amount` from `cmd.from_account_id` to
    /// `cmd.to_account_id`.
    ///
    /// Errors:
    /// - `KeyNotFound` if either account is missing when locked;
    /// - `InsufficientFunds` if overdraft is denied and the source cannot
    ///   cover the amount;
    /// - `Conflict` once the retry budget is spent on serialization failures;
    /// - `Timeout` when the configured deadline elapses (the open
    ///   transaction is rolled back);
    /// - `Database` for anything else.
    ///
    /// Calling it twice with the same command performs two transfers.
    pub async fn transfer_tx(&self, cmd: TransferTxCmd) -> ResultEngine<TransferTxResult> {
        validate(&cmd)?;

        let attempts = self.settings.retry.run("transfer", move |_| {
            self.run_in_transaction::<TransferTxResult, _>(move |db_tx| {
                Box::pin(transfer_in_tx(db_tx, cmd))
            })
        });
        let result = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, attempts).await.map_err(|_| {
                EngineError::Timeout(format!(
                    "transfer {} -> {} not committed within {}ms",
                    cmd.from_account_id,
                    cmd.to_account_id,
                    limit.as_millis()
                ))
            })??,
            None => attempts.await?,
        };

        tracing::debug!(
            "transfer {} committed: {} -> {} ({})",
            result.transfer.id,
            cmd.from_account_id,
            cmd.to_account_id,
            cmd.amount
        );
        Ok(result)
    }

    pub async fn transfer(&self, id: i64) -> ResultEngine<Transfer> {
        transfers::get_transfer(&self.database, id).await
    }

    /// Transfers leaving `from_account_id` or entering `to_account_id`.
    pub async fn transfers(
        &self,
        from_account_id: i64,
        to_account_id: i64,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<Vec<Transfer>> {
        transfers::list_transfers(&self.database, from_account_id, to_account_id, limit, offset)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::Currency;

    fn account(id: i64, balance: i64, currency: Currency) -> Account {
        Account {
            id,
            owner: "alice".to_string(),
            balance,
            currency,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(matches!(
            validate(&TransferTxCmd::new(1, 2, 0)),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate(&TransferTxCmd::new(1, 2, -5)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_self_transfer() {
        assert!(matches!(
            validate(&TransferTxCmd::new(3, 3, 10)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn insufficient_funds_unless_overdraft_allowed() {
        let from = account(1, 5, Currency::Usd);
        let to = account(2, 0, Currency::Usd);
        let cmd = TransferTxCmd::new(1, 2, 10);
        assert_eq!(
            check_funds(&cmd, &from, &to),
            Err(EngineError::InsufficientFunds(
                "account 1 has 5, needs 10".to_string()
            ))
        );
        assert_eq!(check_funds(&cmd.allow_overdraft(), &from, &to), Ok(()));
    }

    #[test]
    fn exact_balance_is_enough() {
        let from = account(1, 10, Currency::Eur);
        let to = account(2, 0, Currency::Eur);
        assert_eq!(check_funds(&TransferTxCmd::new(1, 2, 10), &from, &to), Ok(()));
    }

    #[test]
    fn currency_mismatch_under_lock() {
        let from = account(1, 100, Currency::Usd);
        let to = account(2, 0, Currency::Gbp);
        assert!(matches!(
            check_funds(&TransferTxCmd::new(1, 2, 10), &from, &to),
            Err(EngineError::CurrencyMismatch(_))
        ));
    }

    #[test]
    fn overflowing_credit_is_rejected() {
        let from = account(1, 100, Currency::Usd);
        let to = account(2, i64::MAX, Currency::Usd);
        assert!(matches!(
            check_funds(&TransferTxCmd::new(1, 2, 10), &from, &to),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
