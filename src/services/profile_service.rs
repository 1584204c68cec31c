//! Profile Service - statistics and the travel album

use chrono::{DateTime, Datelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::follow_service;
use crate::domain::{DomainError, Post, User};
use crate::infrastructure::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub visited_count: usize,
    pub friends_count: usize,
    pub following_count: usize,
    pub followers_count: usize,
    /// Share of all known places this user has visited, in percent
    pub explored_percent: f64,
    /// Whether the viewer follows this user; absent for anonymous viewers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumYear {
    pub year: i32,
    pub first_visit: String,
    pub last_visit: String,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumCity {
    pub city: String,
    pub years: Vec<AlbumYear>,
}

/// Percentage rounded to one decimal, 0 when there are no places at all
pub fn explored_percent(visited: usize, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = visited as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

pub async fn get_profile(
    state: &AppState,
    user_id: i32,
    viewer_id: Option<i32>,
) -> Result<Profile, DomainError> {
    let user = state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let posts = state.post_repo.find_by_user(user_id).await?;
    let visited_count = posts.iter().map(|p| p.place_id).collect::<HashSet<_>>().len();
    let total_places = state.place_repo.count().await?;

    let following_count = state.follow_repo.following(user_id).await?.len();
    let followers_count = state.follow_repo.followers(user_id).await?.len();
    let friends_count = follow_service::friend_ids(state, user_id).await?.len();

    let is_following = match viewer_id {
        Some(viewer) if viewer != user_id => {
            Some(state.follow_repo.is_following(viewer, user_id).await?)
        }
        _ => None,
    };

    Ok(Profile {
        user,
        visited_count,
        friends_count,
        following_count,
        followers_count,
        explored_percent: explored_percent(visited_count, total_places),
        is_following,
    })
}

pub async fn get_album(state: &AppState, user_id: i32) -> Result<Vec<AlbumCity>, DomainError> {
    if state.user_repo.find_by_id(user_id).await?.is_none() {
        return Err(DomainError::NotFound);
    }
    let posts = state.post_repo.find_by_user(user_id).await?;
    Ok(build_album(posts))
}

/// Group posts by city (alphabetical), then by year (most recent first)
pub fn build_album(posts: Vec<Post>) -> Vec<AlbumCity> {
    let mut cities: BTreeMap<String, BTreeMap<i32, Vec<Post>>> = BTreeMap::new();

    for post in posts {
        let Ok(created) = DateTime::parse_from_rfc3339(&post.created_at) else {
            tracing::warn!("Post {} has unreadable timestamp {}", post.id, post.created_at);
            continue;
        };
        let city = post.city.clone().unwrap_or_else(|| "Unknown".to_string());
        cities
            .entry(city)
            .or_default()
            .entry(created.year())
            .or_default()
            .push(post);
    }

    cities
        .into_iter()
        .map(|(city, years)| AlbumCity {
            city,
            years: years
                .into_iter()
                .rev()
                .map(|(year, mut posts)| {
                    // RFC 3339 timestamps in one offset sort lexicographically
                    posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                    let first_visit = posts.first().map(|p| date_part(&p.created_at)).unwrap_or_default();
                    let last_visit = posts.last().map(|p| date_part(&p.created_at)).unwrap_or_default();
                    AlbumYear {
                        year,
                        first_visit,
                        last_visit,
                        posts,
                    }
                })
                .collect(),
        })
        .collect()
}

fn date_part(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_string()
}
