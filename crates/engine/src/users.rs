//! Users table.
//!
//! Accounts are owned by a user through `accounts.owner = users.username`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// A user, without its password hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_changed_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            full_name: model.full_name,
            email: model.email,
            password_changed_at: model.password_changed_at,
            created_at: model.created_at,
        }
    }
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, username: &str) -> ResultEngine<Model> {
    Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))
}

pub(crate) async fn insert_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    hashed_password: String,
    full_name: &str,
    email: &str,
) -> ResultEngine<User> {
    let now = Utc::now();
    let model = ActiveModel {
        username: ActiveValue::Set(username.to_string()),
        hashed_password: ActiveValue::Set(hashed_password),
        full_name: ActiveValue::Set(full_name.to_string()),
        email: ActiveValue::Set(email.to_string()),
        password_changed_at: ActiveValue::Set(now),
        created_at: ActiveValue::Set(now),
    }
    .insert(db)
    .await
    .map_err(|err| EngineError::from_insert(err, &format!("user {username}")))?;
    Ok(model.into())
}
