//! Entry log.
//!
//! An [`Entry`] is one signed balance adjustment applied to a single account:
//! negative for a debit, positive for a credit. Entries are append-only; the
//! engine never updates or deletes them.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryOrder, QuerySelect,
    entity::prelude::*,
    sea_query::{Alias, Expr},
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    /// Transfer that produced this entry, `None` for direct adjustments.
    pub transfer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub transfer_id: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::transfers::Entity",
        from = "Column::TransferId",
        to = "super::transfers::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Transfers,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::transfers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Entry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            amount: model.amount,
            transfer_id: model.transfer_id,
            created_at: model.created_at,
        }
    }
}

/// Append one entry. The account is expected to exist (callers lock it first).
pub(crate) async fn add_entry(
    db_tx: &DatabaseTransaction,
    account_id: i64,
    amount: i64,
    transfer_id: Option<i64>,
) -> ResultEngine<Entry> {
    let model = ActiveModel {
        id: ActiveValue::NotSet,
        account_id: ActiveValue::Set(account_id),
        amount: ActiveValue::Set(amount),
        transfer_id: ActiveValue::Set(transfer_id),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db_tx)
    .await?;
    Ok(model.into())
}

pub(crate) async fn get_entry<C: ConnectionTrait>(db: &C, id: i64) -> ResultEngine<Entry> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Entry::from)
        .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
}

pub(crate) async fn list_entries<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    limit: u64,
    offset: u64,
) -> ResultEngine<Vec<Entry>> {
    Ok(Entity::find()
        .filter(Column::AccountId.eq(account_id))
        .order_by_asc(Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?
        .into_iter()
        .map(Entry::from)
        .collect())
}

/// Sum of every entry recorded for `account_id`.
pub(crate) async fn entries_total<C: ConnectionTrait>(db: &C, account_id: i64) -> ResultEngine<i64> {
    let total: Option<Option<i64>> = Entity::find()
        .select_only()
        .column_as(
            Expr::expr(Column::Amount.sum()).cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(Column::AccountId.eq(account_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0))
}
