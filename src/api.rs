use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiSection;
use crate::error::ApiError;
use crate::models::{
    AuthResponse, NewStory, StoriesEnvelope, Story, StoryEnvelope, UserEnvelope, UserRecord,
};

pub type ApiResult<T> = Result<T, ApiError>;

/// Every call the client makes to the story service.
///
/// Implementations must be callable from worker threads.
pub trait StoryApi: Send + Sync {
    fn fetch_stories(&self) -> ApiResult<Vec<Story>>;
    fn create_story(&self, token: &str, story: &NewStory) -> ApiResult<Story>;
    fn delete_story(&self, token: &str, story_id: &str) -> ApiResult<()>;
    fn sign_up(&self, username: &str, password: &str, name: &str) -> ApiResult<AuthResponse>;
    fn log_in(&self, username: &str, password: &str) -> ApiResult<AuthResponse>;
    fn fetch_user(&self, token: &str, username: &str) -> ApiResult<UserRecord>;
    fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()>;
    fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()>;
}

pub struct HackOrSnoozeClient {
    client: Client,
    base_url: String,
}

impl HackOrSnoozeClient {
    pub fn new(settings: &ApiSection) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn favorite_endpoint(&self, username: &str, story_id: &str) -> String {
        self.endpoint(&format!(
            "/users/{}/favorites/{}",
            urlencoding::encode(username),
            urlencoding::encode(story_id)
        ))
    }

    // Sends the request and turns any non-success status into an ApiError.
    fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        debug!(status = status.as_u16(), "story service returned an error");
        Err(ApiError::from_status(status, &body))
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request)?;
        response
            .json::<T>()
            .map_err(|e| ApiError::Network(format!("malformed response: {}", e)))
    }
}

impl StoryApi for HackOrSnoozeClient {
    fn fetch_stories(&self) -> ApiResult<Vec<Story>> {
        let envelope: StoriesEnvelope = self.send_json(self.client.get(self.endpoint("/stories")))?;
        debug!(count = envelope.stories.len(), "fetched stories");
        Ok(envelope.stories)
    }

    fn create_story(&self, token: &str, story: &NewStory) -> ApiResult<Story> {
        let request = self
            .client
            .post(self.endpoint("/stories"))
            .json(&json!({ "token": token, "story": story }));
        let envelope: StoryEnvelope = self.send_json(request)?;
        Ok(envelope.story)
    }

    fn delete_story(&self, token: &str, story_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&format!("/stories/{}", urlencoding::encode(story_id)));
        self.send(self.client.delete(url).json(&json!({ "token": token })))?;
        Ok(())
    }

    fn sign_up(&self, username: &str, password: &str, name: &str) -> ApiResult<AuthResponse> {
        let body = json!({ "user": { "username": username, "password": password, "name": name } });
        self.send_json(self.client.post(self.endpoint("/signup")).json(&body))
    }

    fn log_in(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = json!({ "user": { "username": username, "password": password } });
        self.send_json(self.client.post(self.endpoint("/login")).json(&body))
    }

    fn fetch_user(&self, token: &str, username: &str) -> ApiResult<UserRecord> {
        let url = self.endpoint(&format!("/users/{}", urlencoding::encode(username)));
        let envelope: UserEnvelope =
            self.send_json(self.client.get(url).query(&[("token", token)]))?;
        Ok(envelope.user)
    }

    fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()> {
        let url = self.favorite_endpoint(username, story_id);
        self.send(self.client.post(url).json(&json!({ "token": token })))?;
        Ok(())
    }

    fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()> {
        let url = self.favorite_endpoint(username, story_id);
        self.send(self.client.delete(url).json(&json!({ "token": token })))?;
        Ok(())
    }
}

/// In-memory stand-in for the story service.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    struct Account {
        password: String,
        name: String,
        token: String,
        favorites: Vec<String>,
    }

    #[derive(Default)]
    struct State {
        stories: Vec<Story>,
        accounts: HashMap<String, Account>,
        next_id: u32,
        failure: Option<ApiError>,
        expired_tokens: HashSet<String>,
    }

    #[derive(Default)]
    pub struct FakeApi {
        state: Mutex<State>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_stories(stories: Vec<Story>) -> Self {
            let api = Self::new();
            api.state.lock().unwrap().stories = stories;
            api
        }

        /// Every following call fails with `error` until cleared.
        pub fn fail_with(&self, error: Option<ApiError>) {
            self.state.lock().unwrap().failure = error;
        }

        pub fn expire_token(&self, token: &str) {
            self.state.lock().unwrap().expired_tokens.insert(token.to_string());
        }

        pub fn server_favorites(&self, username: &str) -> Vec<String> {
            let state = self.state.lock().unwrap();
            state
                .accounts
                .get(username)
                .map(|a| a.favorites.clone())
                .unwrap_or_default()
        }

        pub fn story_count(&self) -> usize {
            self.state.lock().unwrap().stories.len()
        }

        fn check_failure(state: &State) -> ApiResult<()> {
            match &state.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn user_for_token(state: &State, token: &str) -> ApiResult<String> {
            if state.expired_tokens.contains(token) {
                return Err(ApiError::Auth("token expired".to_string()));
            }
            state
                .accounts
                .iter()
                .find(|(_, a)| a.token == token)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| ApiError::Auth("invalid token".to_string()))
        }

        fn record(state: &State, username: &str) -> UserRecord {
            let account = &state.accounts[username];
            let lookup = |id: &String| state.stories.iter().find(|s| &s.story_id == id).cloned();
            UserRecord {
                username: username.to_string(),
                name: account.name.clone(),
                created_at: Utc::now(),
                favorites: account.favorites.iter().filter_map(lookup).collect(),
                stories: state
                    .stories
                    .iter()
                    .filter(|s| s.username == username)
                    .cloned()
                    .collect(),
            }
        }
    }

    impl StoryApi for FakeApi {
        fn fetch_stories(&self) -> ApiResult<Vec<Story>> {
            let state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            Ok(state.stories.clone())
        }

        fn create_story(&self, token: &str, story: &NewStory) -> ApiResult<Story> {
            let mut state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            let username = Self::user_for_token(&state, token)?;
            if story.title.is_empty() || story.url.is_empty() {
                return Err(ApiError::Validation("title and url are required".to_string()));
            }
            state.next_id += 1;
            let created = Story {
                story_id: format!("story-{}", state.next_id),
                title: story.title.clone(),
                author: story.author.clone(),
                url: story.url.clone(),
                username,
                created_at: Utc::now(),
            };
            state.stories.insert(0, created.clone());
            Ok(created)
        }

        fn delete_story(&self, token: &str, story_id: &str) -> ApiResult<()> {
            let mut state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            Self::user_for_token(&state, token)?;
            let before = state.stories.len();
            state.stories.retain(|s| s.story_id != story_id);
            if state.stories.len() == before {
                return Err(ApiError::NotFound(format!("no story {}", story_id)));
            }
            for account in state.accounts.values_mut() {
                account.favorites.retain(|id| id != story_id);
            }
            Ok(())
        }

        fn sign_up(&self, username: &str, password: &str, name: &str) -> ApiResult<AuthResponse> {
            let mut state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            if state.accounts.contains_key(username) {
                return Err(ApiError::Validation(format!("username {} taken", username)));
            }
            let token = format!("token-{}", username);
            state.accounts.insert(
                username.to_string(),
                Account {
                    password: password.to_string(),
                    name: name.to_string(),
                    token: token.clone(),
                    favorites: Vec::new(),
                },
            );
            Ok(AuthResponse { token, user: Self::record(&state, username) })
        }

        fn log_in(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
            let state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            match state.accounts.get(username) {
                Some(account) if account.password == password => Ok(AuthResponse {
                    token: account.token.clone(),
                    user: Self::record(&state, username),
                }),
                Some(_) => Err(ApiError::Auth("Invalid password".to_string())),
                None => Err(ApiError::NotFound(format!(
                    "Could not find user with username of {}",
                    username
                ))),
            }
        }

        fn fetch_user(&self, token: &str, username: &str) -> ApiResult<UserRecord> {
            let state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            if !state.accounts.contains_key(username) {
                return Err(ApiError::NotFound(format!("no user {}", username)));
            }
            if Self::user_for_token(&state, token)? != username {
                return Err(ApiError::Auth("token does not match user".to_string()));
            }
            Ok(Self::record(&state, username))
        }

        fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()> {
            let mut state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            Self::user_for_token(&state, token)?;
            if !state.stories.iter().any(|s| s.story_id == story_id) {
                return Err(ApiError::NotFound(format!("no story {}", story_id)));
            }
            if let Some(account) = state.accounts.get_mut(username) {
                if !account.favorites.iter().any(|id| id == story_id) {
                    account.favorites.push(story_id.to_string());
                }
            }
            Ok(())
        }

        fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> ApiResult<()> {
            let mut state = self.state.lock().unwrap();
            Self::check_failure(&state)?;
            Self::user_for_token(&state, token)?;
            if let Some(account) = state.accounts.get_mut(username) {
                account.favorites.retain(|id| id != story_id);
            }
            Ok(())
        }
    }
}
