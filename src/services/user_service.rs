//! User Service - registration, credentials and search

use unicode_normalization::UnicodeNormalization;

use crate::domain::{DomainError, NewUser, UpdateUserInput, User};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub photo: Option<String>,
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(DomainError::Validation(
            "Username must be 3 to 32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(DomainError::Validation(
            "Username may only contain letters, digits, '.', '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::Validation(format!(
            "'{}' is not a valid email",
            email
        ))),
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub async fn register(state: &AppState, input: RegisterInput) -> Result<User, DomainError> {
    let username = input.username.trim().to_string();
    let email = input.email.trim().to_lowercase();

    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&input.password)?;

    let password_hash = hash_password(&input.password).map_err(DomainError::Internal)?;

    let user = state
        .user_repo
        .create(NewUser {
            username,
            email,
            password_hash,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            region: input.region,
            photo: input.photo,
        })
        .await?;

    tracing::info!("Registered user {} (id {})", user.username, user.id);
    Ok(user)
}

/// Check credentials; `login` may be a username or an email
pub async fn authenticate(state: &AppState, login: &str, password: &str) -> Result<User, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let Some(credentials) = state.user_repo.find_by_login(login.trim()).await? else {
        tracing::warn!("Login attempt for unknown user: {}", login);
        return Err(invalid());
    };

    match verify_password(password, &credentials.password_hash) {
        Ok(true) => Ok(credentials.user),
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", login);
            Err(invalid())
        }
        Err(e) => {
            tracing::error!("Stored hash for {} is unreadable: {}", login, e);
            Err(invalid())
        }
    }
}

pub async fn change_password(
    state: &AppState,
    user_id: i32,
    current_password: &str,
    new_password: &str,
) -> Result<(), DomainError> {
    let user = get_user(state, user_id).await?;
    authenticate(state, &user.username, current_password).await?;
    validate_password(new_password)?;

    let hash = hash_password(new_password).map_err(DomainError::Internal)?;
    state.user_repo.set_password_hash(user_id, hash).await
}

pub async fn get_user(state: &AppState, user_id: i32) -> Result<User, DomainError> {
    state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn update_profile(
    state: &AppState,
    user_id: i32,
    input: UpdateUserInput,
) -> Result<User, DomainError> {
    state.user_repo.update_profile(user_id, input).await
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>, DomainError> {
    state.user_repo.find_all().await
}

/// Fold case and Unicode representation so "Олеся" matches "олеся"
fn normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// Users whose username contains `query`, excluding `exclude_id` (the caller)
pub async fn search_users(
    state: &AppState,
    query: &str,
    exclude_id: Option<i32>,
) -> Result<Vec<User>, DomainError> {
    let needle = normalize(query.trim());
    let users = state.user_repo.find_all().await?;

    Ok(users
        .into_iter()
        .filter(|u| Some(u.id) != exclude_id)
        .filter(|u| needle.is_empty() || normalize(&u.username).contains(&needle))
        .collect())
}

/// Delete an account along with the files of its posts
pub async fn delete_account(state: &AppState, user_id: i32) -> Result<(), DomainError> {
    let posts = state.post_repo.find_by_user(user_id).await?;
    state.user_repo.delete(user_id).await?;

    for path in posts.into_iter().filter_map(|p| p.photo_path) {
        state.photos.remove(&path).await;
    }
    tracing::info!("Deleted user {}", user_id);
    Ok(())
}
