use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::api::{ApiResult, StoryApi};
use crate::error::ApiError;
use crate::models::{AuthResponse, Story, UserRecord};

/// The logged-in user: identity, token and the user's own story lists.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    name: String,
    created_at: DateTime<Utc>,
    favorites: Vec<Story>,
    own_stories: Vec<Story>,
    token: String,
    // Stories with a favorite request still outstanding.
    pending_favorites: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

/// A favorite toggle that has been decided but not yet confirmed.
#[derive(Debug, Clone)]
pub struct FavoriteChange {
    pub story: Story,
    pub action: FavoriteAction,
}

impl FavoriteChange {
    pub fn send(&self, api: &dyn StoryApi, token: &str, username: &str) -> ApiResult<()> {
        match self.action {
            FavoriteAction::Add => api.add_favorite(token, username, &self.story.story_id),
            FavoriteAction::Remove => api.remove_favorite(token, username, &self.story.story_id),
        }
    }
}

/// Result of trying to log back in with remembered credentials.
#[derive(Debug)]
pub enum Restore {
    Active(Session),
    /// No session. `forget_credentials` is set when the service rejected the
    /// stored credentials, as opposed to being unreachable.
    Anonymous { forget_credentials: bool },
}

impl Session {
    pub fn from_record(user: UserRecord, token: String) -> Self {
        Self {
            username: user.username,
            name: user.name,
            created_at: user.created_at,
            favorites: user.favorites,
            own_stories: user.stories,
            token,
            pending_favorites: HashSet::new(),
        }
    }

    fn from_auth(response: AuthResponse) -> Self {
        Self::from_record(response.user, response.token)
    }

    pub fn sign_up(
        api: &dyn StoryApi,
        username: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<Self> {
        let session = Self::from_auth(api.sign_up(username, password, name)?);
        info!(username = %session.username, "signed up");
        Ok(session)
    }

    /// Log in with existing credentials. An unknown username is reported by
    /// the service as a missing user; it is still a bad login.
    pub fn authenticate(api: &dyn StoryApi, username: &str, password: &str) -> ApiResult<Self> {
        let response = api.log_in(username, password).map_err(|err| match err {
            ApiError::NotFound(msg) => ApiError::Auth(msg),
            other => other,
        })?;
        let session = Self::from_auth(response);
        info!(username = %session.username, "logged in");
        Ok(session)
    }

    /// Silent login from a stored token. Never fails; any error leaves the
    /// user anonymous.
    pub fn restore_from_persisted_credentials(
        api: &dyn StoryApi,
        token: &str,
        username: &str,
    ) -> Restore {
        match api.fetch_user(token, username) {
            Ok(user) => {
                info!(username, "restored session from stored credentials");
                Restore::Active(Self::from_record(user, token.to_string()))
            }
            Err(err) => {
                warn!(username, kind = err.kind(), error = %err, "could not restore session");
                Restore::Anonymous {
                    forget_credentials: matches!(err, ApiError::Auth(_) | ApiError::NotFound(_)),
                }
            }
        }
    }

    /// Flip the favorite state of `story` on the service, then locally.
    /// Returns whether the story is now a favorite. If a toggle for the same
    /// story is still outstanding this does nothing.
    pub fn toggle_favorite(&mut self, api: &dyn StoryApi, story: &Story) -> ApiResult<bool> {
        let Some(change) = self.begin_favorite_toggle(story) else {
            return Ok(self.is_favorite(story));
        };
        let result = change.send(api, &self.token, &self.username);
        self.finish_favorite_toggle(change, result)
    }

    /// Decide the direction of a toggle and mark the story in flight.
    pub fn begin_favorite_toggle(&mut self, story: &Story) -> Option<FavoriteChange> {
        if !self.pending_favorites.insert(story.story_id.clone()) {
            debug!(story_id = %story.story_id, "favorite toggle already in flight");
            return None;
        }
        let action = if self.is_favorite(story) {
            FavoriteAction::Remove
        } else {
            FavoriteAction::Add
        };
        Some(FavoriteChange { story: story.clone(), action })
    }

    /// Apply a toggle once the service has answered. Local state changes only
    /// on success.
    pub fn finish_favorite_toggle(
        &mut self,
        change: FavoriteChange,
        result: ApiResult<()>,
    ) -> ApiResult<bool> {
        self.pending_favorites.remove(&change.story.story_id);
        result?;

        let id = change.story.story_id.clone();
        match change.action {
            FavoriteAction::Add => {
                if !self.is_favorite(&change.story) {
                    self.favorites.push(change.story);
                }
            }
            FavoriteAction::Remove => self.favorites.retain(|s| s.story_id != id),
        }
        debug!(story_id = %id, action = ?change.action, "favorite updated");
        Ok(change.action == FavoriteAction::Add)
    }

    pub fn is_favorite(&self, story: &Story) -> bool {
        self.favorites.iter().any(|s| s.story_id == story.story_id)
    }

    pub fn is_favorite_pending(&self, story_id: &str) -> bool {
        self.pending_favorites.contains(story_id)
    }

    pub fn owns(&self, story: &Story) -> bool {
        self.own_stories.iter().any(|s| s.story_id == story.story_id)
    }

    pub(crate) fn insert_own_story(&mut self, story: Story) {
        self.own_stories.retain(|s| s.story_id != story.story_id);
        self.own_stories.insert(0, story);
    }

    pub(crate) fn forget_story(&mut self, story_id: &str) {
        self.own_stories.retain(|s| s.story_id != story_id);
        self.favorites.retain(|s| s.story_id != story_id);
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn favorites(&self) -> &[Story] {
        &self.favorites
    }

    pub fn own_stories(&self) -> &[Story] {
        &self.own_stories
    }

    /// Account creation date as shown on the profile page.
    pub fn joined_on(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}
