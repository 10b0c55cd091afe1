/// What the main window is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AllStories,
    SubmitStory,
    Favorites,
    MyStories,
    Login,
    Profile,
}

impl Page {
    pub fn requires_session(self) -> bool {
        !matches!(self, Page::AllStories | Page::Login)
    }

    /// The page actually shown when `self` is requested. Session-only pages
    /// send anonymous users to the login form; logged-in users have no use
    /// for the login form.
    pub fn resolve(self, logged_in: bool) -> Page {
        match self {
            page if page.requires_session() && !logged_in => Page::Login,
            Page::Login if logged_in => Page::AllStories,
            page => page,
        }
    }

    /// Nav bar entries, left to right.
    pub fn nav_links(logged_in: bool) -> &'static [Page] {
        if logged_in {
            &[Page::AllStories, Page::SubmitStory, Page::Favorites, Page::MyStories]
        } else {
            &[Page::AllStories]
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::AllStories => "all stories",
            Page::SubmitStory => "submit",
            Page::Favorites => "favorites",
            Page::MyStories => "my stories",
            Page::Login => "login/signup",
            Page::Profile => "profile",
        }
    }

    /// Message shown when a story list page has nothing in it.
    pub fn empty_message(self) -> &'static str {
        match self {
            Page::MyStories => "No stories added by user yet!",
            Page::Favorites => "No favorites added!",
            _ => "No stories yet.",
        }
    }

    /// Story rows on this page get a delete button.
    pub fn shows_delete(self) -> bool {
        self == Page::MyStories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_users_are_sent_to_login() {
        for page in [Page::SubmitStory, Page::Favorites, Page::MyStories, Page::Profile] {
            assert_eq!(page.resolve(false), Page::Login);
            assert_eq!(page.resolve(true), page);
        }
        assert_eq!(Page::AllStories.resolve(false), Page::AllStories);
    }

    #[test]
    fn login_page_is_skipped_when_logged_in() {
        assert_eq!(Page::Login.resolve(true), Page::AllStories);
        assert_eq!(Page::Login.resolve(false), Page::Login);
    }

    #[test]
    fn nav_links_depend_on_session() {
        assert_eq!(Page::nav_links(false), &[Page::AllStories]);
        assert!(Page::nav_links(true).contains(&Page::Favorites));
        assert!(Page::nav_links(true).iter().all(|p| p.resolve(true) == *p));
    }

    #[test]
    fn empty_states() {
        assert_eq!(Page::MyStories.empty_message(), "No stories added by user yet!");
        assert_eq!(Page::Favorites.empty_message(), "No favorites added!");
        assert!(Page::MyStories.shows_delete());
        assert!(!Page::Favorites.shows_delete());
    }
}
