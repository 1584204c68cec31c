//! Follow Service - the social graph between travellers

use std::collections::HashSet;

use crate::domain::{DomainError, User};
use crate::infrastructure::AppState;

async fn ensure_user_exists(state: &AppState, user_id: i32) -> Result<(), DomainError> {
    state
        .user_repo
        .find_by_id(user_id)
        .await?
        .map(|_| ())
        .ok_or(DomainError::NotFound)
}

async fn resolve_users(state: &AppState, ids: Vec<i32>) -> Result<Vec<User>, DomainError> {
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        // Edges pointing at deleted accounts are skipped
        if let Some(user) = state.user_repo.find_by_id(id).await? {
            users.push(user);
        }
    }
    Ok(users)
}

pub async fn follow(state: &AppState, follower_id: i32, followee_id: i32) -> Result<(), DomainError> {
    if follower_id == followee_id {
        return Err(DomainError::Validation("You cannot follow yourself".to_string()));
    }
    ensure_user_exists(state, followee_id).await?;

    state.follow_repo.follow(follower_id, followee_id).await?;
    tracing::debug!("User {} follows {}", follower_id, followee_id);
    Ok(())
}

pub async fn unfollow(state: &AppState, follower_id: i32, followee_id: i32) -> Result<(), DomainError> {
    state.follow_repo.unfollow(follower_id, followee_id).await?;
    tracing::debug!("User {} unfollowed {}", follower_id, followee_id);
    Ok(())
}

pub async fn following(state: &AppState, user_id: i32) -> Result<Vec<User>, DomainError> {
    ensure_user_exists(state, user_id).await?;
    let ids = state.follow_repo.following(user_id).await?;
    resolve_users(state, ids).await
}

pub async fn followers(state: &AppState, user_id: i32) -> Result<Vec<User>, DomainError> {
    ensure_user_exists(state, user_id).await?;
    let ids = state.follow_repo.followers(user_id).await?;
    resolve_users(state, ids).await
}

/// IDs of users with a follow edge in both directions
pub async fn friend_ids(state: &AppState, user_id: i32) -> Result<Vec<i32>, DomainError> {
    let followers: HashSet<i32> = state.follow_repo.followers(user_id).await?.into_iter().collect();
    let following = state.follow_repo.following(user_id).await?;

    Ok(following
        .into_iter()
        .filter(|id| followers.contains(id))
        .collect())
}

pub async fn friends(state: &AppState, user_id: i32) -> Result<Vec<User>, DomainError> {
    ensure_user_exists(state, user_id).await?;
    let ids = friend_ids(state, user_id).await?;
    resolve_users(state, ids).await
}
