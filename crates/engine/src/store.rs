//! The `Store` facade.
//!
//! Transports depend on this trait instead of [`Engine`] so they can be
//! exercised against a test double.

use async_trait::async_trait;

use crate::{
    Account, CreateAccountCmd, CreateUserCmd, Engine, Entry, ListAccountsCmd, ResultEngine,
    Transfer, TransferTxCmd, TransferTxResult, User,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, cmd: CreateUserCmd) -> ResultEngine<User>;

    async fn user(&self, username: &str) -> ResultEngine<User>;

    async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account>;

    async fn account(&self, id: i64) -> ResultEngine<Account>;

    async fn list_accounts(&self, cmd: ListAccountsCmd) -> ResultEngine<Vec<Account>>;

    async fn entries(&self, account_id: i64, limit: u64, offset: u64) -> ResultEngine<Vec<Entry>>;

    async fn entry(&self, id: i64) -> ResultEngine<Entry>;

    async fn transfer(&self, id: i64) -> ResultEngine<Transfer>;

    /// Transfers leaving or entering `account_id`, oldest first.
    async fn account_transfers(
        &self,
        account_id: i64,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<Vec<Transfer>>;

    /// See [`Engine::transfer_tx`].
    async fn transfer_tx(&self, cmd: TransferTxCmd) -> ResultEngine<TransferTxResult>;
}

#[async_trait]
impl Store for Engine {
    async fn create_user(&self, cmd: CreateUserCmd) -> ResultEngine<User> {
        Engine::create_user(self, cmd).await
    }

    async fn user(&self, username: &str) -> ResultEngine<User> {
        Engine::user(self, username).await
    }

    async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        Engine::create_account(self, cmd).await
    }

    async fn account(&self, id: i64) -> ResultEngine<Account> {
        Engine::account(self, id).await
    }

    async fn list_accounts(&self, cmd: ListAccountsCmd) -> ResultEngine<Vec<Account>> {
        Engine::list_accounts(self, cmd).await
    }

    async fn entries(&self, account_id: i64, limit: u64, offset: u64) -> ResultEngine<Vec<Entry>> {
        Engine::entries(self, account_id, limit, offset).await
    }

    async fn entry(&self, id: i64) -> ResultEngine<Entry> {
        Engine::entry(self, id).await
    }

    async fn transfer(&self, id: i64) -> ResultEngine<Transfer> {
        Engine::transfer(self, id).await
    }

    async fn account_transfers(
        &self,
        account_id: i64,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<Vec<Transfer>> {
        Engine::account(self, account_id).await?;
        Engine::transfers(self, account_id, account_id, limit, offset).await
    }

    async fn transfer_tx(&self, cmd: TransferTxCmd) -> ResultEngine<TransferTxResult> {
        Engine::transfer_tx(self, cmd).await
    }
}
