use std::{future::Future, pin::Pin, time::Duration};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, IsolationLevel,
    TransactionTrait,
};

use crate::{ResultEngine, RetryPolicy};

mod accounts;
mod transfers;
mod users;

pub use accounts::Reconciliation;

/// Boxed future borrowing the open transaction, returned by the closures
/// handed to [`Engine::run_in_transaction`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

/// Knobs of the transfer coordinator.
#[derive(Clone, Debug)]
pub struct TransferSettings {
    /// Isolation level requested when a transaction begins. Ignored on
    /// SQLite, whose transactions are always serializable.
    pub isolation_level: IsolationLevel,
    pub retry: RetryPolicy,
    /// Deadline for a whole transfer, retries included.
    pub timeout: Option<Duration>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            isolation_level: IsolationLevel::Serializable,
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    settings: TransferSettings,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Run `body` inside one database transaction, committing on success and
    /// rolling back on error.
    ///
    /// If the returned future is dropped before completion the open
    /// transaction is dropped with it, which rolls it back.
    pub async fn run_in_transaction<T, F>(&self, body: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let isolation_level = match self.database.get_database_backend() {
            DbBackend::Sqlite => None,
            _ => Some(self.settings.isolation_level.clone()),
        };
        let db_tx = self
            .database
            .begin_with_config(isolation_level, None)
            .await?;
        // declared after `db_tx` so a cancelled body is dropped before the rollback
        let work = body(&db_tx);
        match work.await {
            Ok(value) => {
                db_tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::error!("rollback failed after \"{err}\": {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    settings: TransferSettings,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn settings(mut self, settings: TransferSettings) -> EngineBuilder {
        self.settings = settings;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> EngineBuilder {
        self.settings.retry = retry;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            settings: self.settings,
        })
    }
}
