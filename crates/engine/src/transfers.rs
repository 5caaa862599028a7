//! Transfer records.
//!
//! A [`Transfer`] is the immutable record of one committed movement of a
//! positive amount between two accounts. Its two [`Entry`](crate::Entry)
//! rows reference it through `entries.transfer_id`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, DatabaseTransaction, QueryOrder, QuerySelect,
    entity::prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    ToAccount,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transfer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}

pub(crate) async fn add_transfer(
    db_tx: &DatabaseTransaction,
    from_account_id: i64,
    to_account_id: i64,
    amount: i64,
) -> ResultEngine<Transfer> {
    let model = ActiveModel {
        id: ActiveValue::NotSet,
        from_account_id: ActiveValue::Set(from_account_id),
        to_account_id: ActiveValue::Set(to_account_id),
        amount: ActiveValue::Set(amount),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db_tx)
    .await?;
    Ok(model.into())
}

pub(crate) async fn get_transfer<C: ConnectionTrait>(db: &C, id: i64) -> ResultEngine<Transfer> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Transfer::from)
        .ok_or_else(|| EngineError::KeyNotFound(format!("transfer {id}")))
}

/// Transfers touching either account, ordered by id.
pub(crate) async fn list_transfers<C: ConnectionTrait>(
    db: &C,
    from_account_id: i64,
    to_account_id: i64,
    limit: u64,
    offset: u64,
) -> ResultEngine<Vec<Transfer>> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::FromAccountId.eq(from_account_id))
                .add(Column::ToAccountId.eq(to_account_id)),
        )
        .order_by_asc(Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?
        .into_iter()
        .map(Transfer::from)
        .collect())
}
