use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single submitted story as the service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Host component of the story URL, including an explicit port.
    /// `None` when the URL does not parse or has no host.
    pub fn hostname(&self) -> Option<String> {
        let parsed = Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

// Stories are the same story whenever the service id matches, no matter
// which list the copy came from.
impl PartialEq for Story {
    fn eq(&self, other: &Self) -> bool {
        self.story_id == other.story_id
    }
}

impl Eq for Story {}

/// Fields the user fills in when submitting a story.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewStory {
    pub title: String,
    pub author: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<Story>,
    #[serde(default)]
    pub stories: Vec<Story>,
}

/// Body returned by signup and login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoriesEnvelope {
    pub stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoryEnvelope {
    pub story: Story,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserRecord,
}

#[cfg(test)]
pub(crate) fn sample_story(id: &str, url: &str) -> Story {
    Story {
        story_id: id.to_string(),
        title: format!("Story {}", id),
        author: "Ada".to_string(),
        url: url.to_string(),
        username: "ada".to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_host_of_url() {
        let story = sample_story("1", "https://example.com/a");
        assert_eq!(story.hostname().as_deref(), Some("example.com"));

        let story = sample_story("2", "http://news.example.org:8080/path?q=1");
        assert_eq!(story.hostname().as_deref(), Some("news.example.org:8080"));
    }

    #[test]
    fn hostname_of_unparseable_url_is_none() {
        let story = sample_story("1", "not a url");
        assert_eq!(story.hostname(), None);
    }

    #[test]
    fn stories_compare_by_id() {
        let a = sample_story("abc", "https://one.example/");
        let mut b = sample_story("abc", "https://two.example/");
        b.title = "Different title".to_string();
        assert_eq!(a, b);
        assert_ne!(a, sample_story("xyz", "https://one.example/"));
    }

    #[test]
    fn decodes_service_records() {
        let json = r#"{
            "token": "tok",
            "user": {
                "username": "alice",
                "name": "Alice A",
                "createdAt": "2024-01-02T03:04:05.678Z",
                "updatedAt": "2024-01-02T03:04:05.678Z",
                "favorites": [],
                "stories": [{
                    "storyId": "s1",
                    "title": "Hello",
                    "author": "Alice",
                    "url": "https://example.com/hello",
                    "username": "alice",
                    "createdAt": "2024-01-03T00:00:00.000Z"
                }]
            }
        }"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.token, "tok");
        assert_eq!(auth.user.name, "Alice A");
        assert_eq!(auth.user.stories.len(), 1);
        assert_eq!(auth.user.stories[0].story_id, "s1");
    }
}
