//! The module contains `Account` and the account ledger primitives.
//!
//! Every balance mutation goes through [`update_balance`], which applies a
//! relative delta with a single `UPDATE … SET balance = balance + ?`
//! statement. Nothing in the engine writes a balance it computed in memory.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, DbBackend, QueryOrder, QuerySelect,
    entity::prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// An account holding money in a single currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    /// Balance in minor units of `currency`.
    pub balance: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Users,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            currency: Currency::try_from(model.currency.as_str())?,
            owner: model.owner,
            balance: model.balance,
            created_at: model.created_at,
        })
    }
}

/// Canonical lock order for a pair of accounts: lower id first.
///
/// Every operation that locks more than one account must acquire the locks
/// in this order, otherwise two transactions can wait on each other.
#[must_use]
pub fn lock_order(a: i64, b: i64) -> [i64; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

fn not_found(id: i64) -> EngineError {
    EngineError::KeyNotFound(format!("account {id}"))
}

/// Plain lookup, usable on a pooled connection or inside a transaction.
pub(crate) async fn get_account<C: ConnectionTrait>(db: &C, id: i64) -> ResultEngine<Account> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
}

/// Lookup that takes a row-level exclusive lock held until `db_tx` ends.
///
/// Emits `SELECT … FOR UPDATE` on Postgres. SQLite has no row locks: a no-op
/// write on the row takes the database write lock instead, so a concurrent
/// writer waits on the busy timeout rather than failing when it upgrades a
/// read lock later. Callers lock before reading anything else in `db_tx`.
pub(crate) async fn get_account_for_update(
    db_tx: &DatabaseTransaction,
    id: i64,
) -> ResultEngine<Account> {
    if db_tx.get_database_backend() == DbBackend::Sqlite {
        Entity::update_many()
            .col_expr(Column::Balance, Expr::col(Column::Balance).into())
            .filter(Column::Id.eq(id))
            .exec(db_tx)
            .await?;
    }
    Entity::find_by_id(id)
        .lock_exclusive()
        .one(db_tx)
        .await?
        .ok_or_else(|| not_found(id))?
        .try_into()
}

/// Add `delta` to the balance of `id` and return the row as seen by `db_tx`
/// after the update.
pub(crate) async fn update_balance(
    db_tx: &DatabaseTransaction,
    id: i64,
    delta: i64,
) -> ResultEngine<Account> {
    let res = Entity::update_many()
        .col_expr(Column::Balance, Expr::col(Column::Balance).add(delta))
        .filter(Column::Id.eq(id))
        .exec(db_tx)
        .await?;
    if res.rows_affected == 0 {
        return Err(not_found(id));
    }
    get_account(db_tx, id).await
}

pub(crate) async fn insert_account<C: ConnectionTrait>(
    db: &C,
    owner: &str,
    currency: Currency,
) -> ResultEngine<Account> {
    let model = ActiveModel {
        id: ActiveValue::NotSet,
        owner: ActiveValue::Set(owner.to_string()),
        balance: ActiveValue::Set(0),
        currency: ActiveValue::Set(currency.code().to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(|err| {
        EngineError::from_insert(err, &format!("{} account for {owner}", currency.code()))
    })?;
    model.try_into()
}

pub(crate) async fn list_accounts<C: ConnectionTrait>(
    db: &C,
    owner: Option<&str>,
    limit: u64,
    offset: u64,
) -> ResultEngine<Vec<Account>> {
    let mut query = Entity::find();
    if let Some(owner) = owner {
        query = query.filter(Column::Owner.eq(owner));
    }
    query
        .order_by_asc(Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_order_is_ascending_regardless_of_direction() {
        assert_eq!(lock_order(1, 2), [1, 2]);
        assert_eq!(lock_order(2, 1), [1, 2]);
        assert_eq!(lock_order(7, 7), [7, 7]);
    }

    #[test]
    fn model_with_unknown_currency_is_rejected() {
        let model = Model {
            id: 1,
            owner: "alice".to_string(),
            balance: 0,
            currency: "XYZ".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Account::try_from(model),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
