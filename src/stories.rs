use tracing::{debug, info};

use crate::api::{ApiResult, StoryApi};
use crate::models::{NewStory, Story};
use crate::session::Session;

/// Every story on the service, newest submissions first.
///
/// Mutations are applied locally only after the service confirms them.
#[derive(Debug, Clone, Default)]
pub struct StoryCollection {
    stories: Vec<Story>,
}

impl StoryCollection {
    pub fn new(stories: Vec<Story>) -> Self {
        Self { stories }
    }

    pub fn fetch_all(api: &dyn StoryApi) -> ApiResult<Self> {
        let stories = api.fetch_stories()?;
        info!(count = stories.len(), "loaded story list");
        Ok(Self::new(stories))
    }

    pub fn add_story(
        &mut self,
        api: &dyn StoryApi,
        session: &mut Session,
        new_story: &NewStory,
    ) -> ApiResult<Story> {
        let story = api.create_story(session.token(), new_story)?;
        self.insert_created(session, story.clone());
        Ok(story)
    }

    /// Local half of `add_story`, for a story the service has already created.
    pub fn insert_created(&mut self, session: &mut Session, story: Story) {
        debug!(story_id = %story.story_id, "adding story");
        session.insert_own_story(story.clone());
        self.stories.retain(|s| s.story_id != story.story_id);
        self.stories.insert(0, story);
    }

    pub fn remove_story(
        &mut self,
        api: &dyn StoryApi,
        session: &mut Session,
        story_id: &str,
    ) -> ApiResult<()> {
        api.delete_story(session.token(), story_id)?;
        self.apply_removed(session, story_id);
        Ok(())
    }

    /// Local half of `remove_story`: drops the story everywhere it is held.
    pub fn apply_removed(&mut self, session: &mut Session, story_id: &str) {
        debug!(story_id, "removing story");
        self.stories.retain(|s| s.story_id != story_id);
        session.forget_story(story_id);
    }

    pub fn find(&self, story_id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.story_id == story_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Story> {
        self.stories.iter()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

impl<'a> IntoIterator for &'a StoryCollection {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.iter()
    }
}
