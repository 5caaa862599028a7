//! User API endpoints

use api_types::user::{UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, views};

/// Register a user. The password is hashed by the engine.
pub async fn user_new(
    State(state): State<ServerState>,
    payload: Result<Json<UserNew>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let Json(payload) = payload?;
    let user = state
        .store
        .create_user(engine::CreateUserCmd {
            username: payload.username,
            password: payload.password,
            full_name: payload.full_name,
            email: payload.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.store.user(&username).await?;
    Ok(Json(views::user(user)))
}
