use crate::{
    CreateUserCmd, EngineError, ResultEngine, User,
    password::{check_password, hash_password},
    users,
    util::normalize_required,
};

use super::Engine;

const MIN_PASSWORD_LEN: usize = 6;

/// Argon2 is deliberately slow; keep it off the async workers.
async fn blocking<T, F>(f: F) -> ResultEngine<T>
where
    T: Send + 'static,
    F: FnOnce() -> ResultEngine<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| EngineError::Password(format!("hashing task failed: {err}")))?
}

impl Engine {
    pub async fn create_user(&self, cmd: CreateUserCmd) -> ResultEngine<User> {
        let username = normalize_required(&cmd.username, "username")?;
        let full_name = normalize_required(&cmd.full_name, "full name")?;
        let email = normalize_required(&cmd.email, "email")?;
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::Password(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password = cmd.password;
        let hashed = blocking(move || hash_password(&password)).await?;
        users::insert_user(&self.database, &username, hashed, &full_name, &email).await
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        users::find_user(&self.database, username)
            .await
            .map(User::from)
    }

    /// Check `password` against the stored hash of `username`.
    pub async fn verify_password(&self, username: &str, password: &str) -> ResultEngine<bool> {
        let model = users::find_user(&self.database, username).await?;
        let password = password.to_string();
        blocking(move || check_password(&password, &model.hashed_password)).await
    }
}
