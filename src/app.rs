use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

use crate::api::{ApiResult, StoryApi};
use crate::db::CredentialStore;
use crate::error::ApiError;
use crate::models::{NewStory, Story};
use crate::pages::Page;
use crate::session::{FavoriteChange, Restore, Session};
use crate::stories::StoryCollection;

pub struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    favorite: Color32,
    error: Color32,
}

impl AppTheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(170, 170, 170),
            highlight: Color32::from_rgb(255, 102, 0),
            separator: Color32::from_rgb(60, 60, 60),
            favorite: Color32::from_rgb(255, 193, 7),
            error: Color32::from_rgb(239, 83, 80),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(246, 246, 239),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            favorite: Color32::from_rgb(190, 130, 0),
            error: Color32::from_rgb(183, 28, 28),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);
        style.visuals.hyperlink_color = self.highlight;
        ctx.set_style(style);
    }
}

/// Results sent back from worker threads.
enum TaskResult {
    Started {
        restore: Option<Restore>,
        stories: ApiResult<StoryCollection>,
    },
    StoriesLoaded(ApiResult<StoryCollection>),
    LoggedIn(ApiResult<Session>),
    StoryCreated {
        username: String,
        result: ApiResult<Story>,
    },
    StoryDeleted {
        username: String,
        story_id: String,
        result: ApiResult<()>,
    },
    FavoriteToggled {
        username: String,
        change: FavoriteChange,
        result: ApiResult<()>,
    },
}

enum StoryAction {
    Open(String),
    CopyLink(String),
    ToggleFavorite(Story),
    Delete(String),
}

#[derive(Default)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Default)]
struct SignupForm {
    name: String,
    username: String,
    password: String,
}

struct Banner {
    text: String,
    is_error: bool,
}

pub struct HackOrSnoozeApp {
    api: Arc<dyn StoryApi>,
    credentials: Option<CredentialStore>,
    stories: StoryCollection,
    session: Option<Session>,
    page: Page,
    // Startup or a full reload is in progress
    loading: bool,
    // An explicit login/signup/submit/delete is in progress
    busy: bool,
    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,
    repaint: egui::Context,
    login_form: LoginForm,
    signup_form: SignupForm,
    submit_form: NewStory,
    banner: Option<Banner>,
    theme: AppTheme,
    is_dark_mode: bool,
}

impl HackOrSnoozeApp {
    pub fn new(
        ctx: egui::Context,
        api: Arc<dyn StoryApi>,
        credentials: Option<CredentialStore>,
        is_dark_mode: bool,
    ) -> Self {
        let (task_sender, task_receiver) = channel();
        let mut app = Self {
            api,
            credentials,
            stories: StoryCollection::default(),
            session: None,
            page: Page::AllStories,
            loading: false,
            busy: false,
            task_sender,
            task_receiver,
            repaint: ctx,
            login_form: LoginForm::default(),
            signup_form: SignupForm::default(),
            submit_form: NewStory::default(),
            banner: None,
            theme: if is_dark_mode { AppTheme::dark() } else { AppTheme::light() },
            is_dark_mode,
        };
        app.start();
        app
    }

    fn spawn_task<F>(&self, job: F)
    where
        F: FnOnce(&dyn StoryApi) -> TaskResult + Send + 'static,
    {
        let api = self.api.clone();
        let sender = self.task_sender.clone();
        let repaint = self.repaint.clone();
        thread::spawn(move || {
            let _ = sender.send(job(api.as_ref()));
            repaint.request_repaint();
        });
    }

    // Restore the remembered user first so the story list renders with their stars.
    fn start(&mut self) {
        debug!("start");
        let stored = match &self.credentials {
            Some(store) => store.load().unwrap_or_else(|e| {
                error!("Failed to read stored credentials: {}", e);
                None
            }),
            None => None,
        };

        self.loading = true;
        self.spawn_task(move |api| {
            let restore = stored.map(|c| {
                Session::restore_from_persisted_credentials(api, &c.token, &c.username)
            });
            let stories = StoryCollection::fetch_all(api);
            TaskResult::Started { restore, stories }
        });
    }

    fn reload_stories(&mut self) {
        if self.loading {
            return;
        }
        debug!("reload_stories");
        self.loading = true;
        self.spawn_task(|api| TaskResult::StoriesLoaded(StoryCollection::fetch_all(api)));
    }

    fn check_tasks(&mut self) {
        while let Ok(result) = self.task_receiver.try_recv() {
            self.handle_task(result);
        }
    }

    fn handle_task(&mut self, result: TaskResult) {
        match result {
            TaskResult::Started { restore, stories } => {
                match restore {
                    Some(Restore::Active(session)) => self.session = Some(session),
                    Some(Restore::Anonymous { forget_credentials: true }) => {
                        self.forget_credentials()
                    }
                    _ => {}
                }
                self.finish_loading(stories);
            }
            TaskResult::StoriesLoaded(stories) => self.finish_loading(stories),
            TaskResult::LoggedIn(result) => {
                self.busy = false;
                match result {
                    Ok(session) => self.on_login(session),
                    Err(err) => self.report("log in", &err),
                }
            }
            TaskResult::StoryCreated { username, result } => {
                self.busy = false;
                match result {
                    Ok(story) => {
                        if let Some(session) = session_of(&mut self.session, &username) {
                            self.stories.insert_created(session, story);
                        } else {
                            self.reload_stories();
                        }
                        self.submit_form = NewStory::default();
                        self.navigate(Page::AllStories);
                    }
                    Err(err) => self.report("submit the story", &err),
                }
            }
            TaskResult::StoryDeleted { username, story_id, result } => {
                self.busy = false;
                match result {
                    Ok(()) => {
                        if let Some(session) = session_of(&mut self.session, &username) {
                            self.stories.apply_removed(session, &story_id);
                        } else {
                            self.reload_stories();
                        }
                    }
                    Err(err) => self.report("delete the story", &err),
                }
            }
            TaskResult::FavoriteToggled { username, change, result } => {
                let Some(session) = session_of(&mut self.session, &username) else {
                    debug!("dropping favorite result for a session that has ended");
                    return;
                };
                if let Err(err) = session.finish_favorite_toggle(change, result) {
                    self.report("update favorites", &err);
                }
            }
        }
    }

    fn finish_loading(&mut self, stories: ApiResult<StoryCollection>) {
        self.loading = false;
        match stories {
            Ok(stories) => self.stories = stories,
            Err(err) => self.report("load stories", &err),
        }
    }

    fn report(&mut self, action: &str, err: &ApiError) {
        warn!(action, kind = err.kind(), error = %err, "action failed");
        self.banner = Some(Banner {
            text: format!("Could not {}. {}", action, err.user_message()),
            is_error: true,
        });
    }

    fn on_login(&mut self, session: Session) {
        if let Some(store) = &self.credentials {
            if let Err(e) = store.save(session.token(), session.username()) {
                error!("Failed to save credentials: {}", e);
            }
        }
        self.login_form = LoginForm::default();
        self.signup_form = SignupForm::default();
        self.banner = Some(Banner {
            text: format!("Welcome, {}!", session.name()),
            is_error: false,
        });
        self.session = Some(session);
        self.navigate(Page::AllStories);
    }

    fn forget_credentials(&self) {
        if let Some(store) = &self.credentials {
            if let Err(e) = store.clear() {
                error!("Failed to clear credentials: {}", e);
            }
        }
    }

    fn logout(&mut self) {
        debug!("logout");
        self.forget_credentials();
        if let Some(session) = self.session.take() {
            info!(username = session.username(), "logged out");
        }
        self.banner = None;
        self.navigate(Page::AllStories);
    }

    fn navigate(&mut self, page: Page) {
        let page = page.resolve(self.session.is_some());
        debug!(?page, "navigate");
        self.page = page;
    }

    fn submit_login(&mut self) {
        debug!("login");
        let username = self.login_form.username.trim().to_string();
        let password = self.login_form.password.clone();
        self.busy = true;
        self.spawn_task(move |api| {
            TaskResult::LoggedIn(Session::authenticate(api, &username, &password))
        });
    }

    fn submit_signup(&mut self) {
        debug!("signup");
        let name = self.signup_form.name.trim().to_string();
        let username = self.signup_form.username.trim().to_string();
        let password = self.signup_form.password.clone();
        self.busy = true;
        self.spawn_task(move |api| {
            TaskResult::LoggedIn(Session::sign_up(api, &username, &password, &name))
        });
    }

    fn submit_story(&mut self) {
        let Some(session) = &self.session else { return };
        debug!("submit_new_story");
        let token = session.token().to_string();
        let username = session.username().to_string();
        let new_story = NewStory {
            title: self.submit_form.title.trim().to_string(),
            author: self.submit_form.author.trim().to_string(),
            url: self.submit_form.url.trim().to_string(),
        };
        self.busy = true;
        self.spawn_task(move |api| TaskResult::StoryCreated {
            username,
            result: api.create_story(&token, &new_story),
        });
    }

    fn handle_story_action(&mut self, action: StoryAction) {
        match action {
            StoryAction::Open(url) => {
                if let Err(e) = open::that(&url) {
                    error!("Failed to open URL {}: {}", url, e);
                }
            }
            StoryAction::CopyLink(url) => {
                match arboard::Clipboard::new().and_then(|mut c| c.set_text(url)) {
                    Ok(()) => {
                        self.banner = Some(Banner {
                            text: "Link copied.".to_string(),
                            is_error: false,
                        })
                    }
                    Err(e) => error!("Failed to copy link: {}", e),
                }
            }
            StoryAction::ToggleFavorite(story) => {
                let Some(session) = self.session.as_mut() else { return };
                debug!(story_id = %story.story_id, "toggle_story_favorite");
                let Some(change) = session.begin_favorite_toggle(&story) else { return };
                let token = session.token().to_string();
                let username = session.username().to_string();
                self.spawn_task(move |api| {
                    let result = change.send(api, &token, &username);
                    TaskResult::FavoriteToggled { username, change, result }
                });
            }
            StoryAction::Delete(story_id) => {
                let Some(session) = &self.session else { return };
                debug!(story_id, "delete_story");
                let token = session.token().to_string();
                let username = session.username().to_string();
                self.busy = true;
                self.spawn_task(move |api| {
                    let result = api.delete_story(&token, &story_id);
                    TaskResult::StoryDeleted { username, story_id, result }
                });
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = if self.is_dark_mode { AppTheme::dark() } else { AppTheme::light() };
    }
}

// Results for a user who has since logged out are not applied to whoever is
// logged in now.
fn session_of<'a>(session: &'a mut Option<Session>, username: &str) -> Option<&'a mut Session> {
    session.as_mut().filter(|s| s.username() == username)
}

impl HackOrSnoozeApp {
    fn render_nav(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Hack or Snooze").color(self.theme.highlight).size(24.0));
            ui.add_space(16.0);

            let logged_in = self.session.is_some();
            for &page in Page::nav_links(logged_in) {
                let selected = self.page == page;
                let text = RichText::new(page.label())
                    .color(if selected { self.theme.highlight } else { self.theme.text });
                if ui.selectable_label(selected, text).clicked() {
                    self.navigate(page);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                if ui.button(theme_icon).on_hover_text("Toggle theme").clicked() {
                    self.toggle_theme();
                }

                let refresh = ui.add_enabled(!self.loading, egui::Button::new("↻"));
                if refresh.on_hover_text("Reload stories").clicked() {
                    self.reload_stories();
                }

                let username = self.session.as_ref().map(|s| s.username().to_string());
                match username {
                    Some(username) => {
                        if ui.button("log out").clicked() {
                            self.logout();
                        }
                        if ui.selectable_label(self.page == Page::Profile, username).clicked() {
                            self.navigate(Page::Profile);
                        }
                    }
                    None => {
                        let on_login = self.page == Page::Login;
                        if ui.selectable_label(on_login, Page::Login.label()).clicked() {
                            self.navigate(Page::Login);
                        }
                    }
                }
            });
        });
    }

    fn render_banner(&mut self, ui: &mut Ui) {
        let Some(banner) = &self.banner else { return };
        let color = if banner.is_error { self.theme.error } else { self.theme.highlight };
        let mut dismissed = false;
        egui::Frame::new()
            .fill(self.theme.card_background)
            .stroke(Stroke::new(1.0, color))
            .corner_radius(CornerRadius::same(6))
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&banner.text).color(color));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.small_button("✕").clicked();
                    });
                });
            });
        if dismissed {
            self.banner = None;
        }
    }

    fn render_page(&mut self, ui: &mut Ui) {
        if self.loading && self.stories.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label("Loading stories...");
            });
            return;
        }

        match self.page {
            Page::AllStories => {
                let stories: Vec<Story> = self.stories.iter().cloned().collect();
                self.render_story_list(ui, &stories);
            }
            Page::Favorites | Page::MyStories => {
                let stories = match (&self.session, self.page) {
                    (Some(session), Page::Favorites) => session.favorites().to_vec(),
                    (Some(session), _) => session.own_stories().to_vec(),
                    (None, _) => Vec::new(),
                };
                self.render_story_list(ui, &stories);
            }
            Page::SubmitStory => self.render_submit_form(ui),
            Page::Login => self.render_login_forms(ui),
            Page::Profile => self.render_profile(ui),
        }
    }

    fn render_story_list(&mut self, ui: &mut Ui, stories: &[Story]) {
        if stories.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(self.page.empty_message())
                        .color(self.theme.secondary_text)
                        .size(18.0)
                        .italics(),
                );
            });
            return;
        }

        let mut actions = Vec::new();
        ScrollArea::vertical()
            .id_salt("stories_scroll_area")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for story in stories {
                    self.render_story_row(ui, story, &mut actions);
                }
            });

        for action in actions {
            self.handle_story_action(action);
        }
    }

    fn render_story_row(&self, ui: &mut Ui, story: &Story, actions: &mut Vec<StoryAction>) {
        egui::Frame::new()
            .fill(self.theme.card_background)
            .corner_radius(CornerRadius::same(8))
            .stroke(Stroke::new(1.0, self.theme.separator))
            .inner_margin(12.0)
            .outer_margin(egui::vec2(8.0, 4.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if self.page.shows_delete() {
                        let delete = ui.add_enabled(!self.busy, egui::Button::new("🗑"));
                        if delete.on_hover_text("Delete story").clicked() {
                            actions.push(StoryAction::Delete(story.story_id.clone()));
                        }
                    }

                    if let Some(session) = &self.session {
                        if session.is_favorite_pending(&story.story_id) {
                            ui.spinner();
                        } else {
                            let (icon, color) = if session.is_favorite(story) {
                                ("★", self.theme.favorite)
                            } else {
                                ("☆", self.theme.secondary_text)
                            };
                            let star = ui.add(
                                egui::Button::new(RichText::new(icon).color(color).size(18.0))
                                    .frame(false),
                            );
                            if star.clicked() {
                                actions.push(StoryAction::ToggleFavorite(story.clone()));
                            }
                        }
                    }

                    let title = ui.add(
                        egui::Label::new(
                            RichText::new(&story.title)
                                .color(self.theme.text)
                                .size(16.0)
                                .strong(),
                        )
                        .sense(egui::Sense::click()),
                    );
                    if title.hovered() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }
                    if title.clicked() {
                        actions.push(StoryAction::Open(story.url.clone()));
                    }

                    let host = story.hostname().unwrap_or_else(|| story.url.clone());
                    ui.label(
                        RichText::new(format!("({})", host))
                            .color(self.theme.secondary_text)
                            .italics(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("copy link").clicked() {
                            actions.push(StoryAction::CopyLink(story.url.clone()));
                        }
                    });
                });

                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("by {}", story.author))
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("posted by {}", story.username))
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );
                });
            });
    }

    fn render_submit_form(&mut self, ui: &mut Ui) {
        ui.heading("Submit a story");
        ui.add_space(8.0);
        egui::Grid::new("submit_form").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("author");
            ui.text_edit_singleline(&mut self.submit_form.author);
            ui.end_row();
            ui.label("title");
            ui.text_edit_singleline(&mut self.submit_form.title);
            ui.end_row();
            ui.label("url");
            ui.text_edit_singleline(&mut self.submit_form.url);
            ui.end_row();
        });
        ui.add_space(8.0);
        if ui.add_enabled(!self.busy, egui::Button::new("submit")).clicked() {
            self.submit_story();
        }
    }

    fn render_login_forms(&mut self, ui: &mut Ui) {
        let mut login = false;
        let mut signup = false;

        ui.heading("Login");
        egui::Grid::new("login_form").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("username");
            ui.text_edit_singleline(&mut self.login_form.username);
            ui.end_row();
            ui.label("password");
            ui.add(egui::TextEdit::singleline(&mut self.login_form.password).password(true));
            ui.end_row();
        });
        if ui.add_enabled(!self.busy, egui::Button::new("login")).clicked() {
            login = true;
        }

        ui.add_space(16.0);
        ui.separator();

        ui.heading("Create Account");
        egui::Grid::new("signup_form").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("name");
            ui.text_edit_singleline(&mut self.signup_form.name);
            ui.end_row();
            ui.label("username");
            ui.text_edit_singleline(&mut self.signup_form.username);
            ui.end_row();
            ui.label("password");
            ui.add(egui::TextEdit::singleline(&mut self.signup_form.password).password(true));
            ui.end_row();
        });
        if ui.add_enabled(!self.busy, egui::Button::new("create account")).clicked() {
            signup = true;
        }

        if login {
            self.submit_login();
        } else if signup {
            self.submit_signup();
        }
    }

    fn render_profile(&self, ui: &mut Ui) {
        let Some(session) = &self.session else { return };
        ui.heading("User Profile Info");
        ui.add_space(8.0);
        egui::Grid::new("profile").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
            ui.label(RichText::new("Name:").color(self.theme.secondary_text));
            ui.label(session.name());
            ui.end_row();
            ui.label(RichText::new("Username:").color(self.theme.secondary_text));
            ui.label(session.username());
            ui.end_row();
            ui.label(RichText::new("Account Created:").color(self.theme.secondary_text));
            ui.label(session.joined_on());
            ui.end_row();
        });
    }
}

impl eframe::App for HackOrSnoozeApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.check_tasks();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.add_space(6.0);
            self.render_nav(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_banner(ui);
            ui.add_space(8.0);
            self.render_page(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::models::sample_story;
    use std::time::Duration;

    fn app_with(api: FakeApi, credentials: Option<CredentialStore>) -> HackOrSnoozeApp {
        HackOrSnoozeApp::new(egui::Context::default(), Arc::new(api), credentials, true)
    }

    // Pull the next worker result and apply it, as a frame would.
    fn pump(app: &mut HackOrSnoozeApp) {
        let result = app
            .task_receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("worker result");
        app.handle_task(result);
    }

    #[test]
    fn startup_restores_session_then_loads_stories() {
        let api = FakeApi::with_stories(vec![sample_story("s1", "https://example.com/")]);
        let session = Session::sign_up(&api, "alice", "pw123", "Alice A").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open_default(dir.path()).unwrap();
        store.save(session.token(), "alice").unwrap();

        let mut app = app_with(api, Some(store));
        assert!(app.loading);
        pump(&mut app);

        assert!(!app.loading);
        assert_eq!(app.stories.len(), 1);
        assert_eq!(app.session.as_ref().map(|s| s.username()), Some("alice"));
    }

    #[test]
    fn rejected_credentials_are_forgotten() {
        let api = FakeApi::new();
        let session = Session::sign_up(&api, "alice", "pw123", "Alice A").unwrap();
        api.expire_token(session.token());
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open_default(dir.path()).unwrap();
        store.save(session.token(), "alice").unwrap();

        let mut app = app_with(api, Some(store.clone()));
        pump(&mut app);

        assert!(app.session.is_none());
        assert!(app.banner.is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn login_saves_credentials_and_logout_clears_them() {
        let api = FakeApi::new();
        Session::sign_up(&api, "bob", "secret", "Bob").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open_default(dir.path()).unwrap();

        let mut app = app_with(api, Some(store.clone()));
        pump(&mut app);

        app.navigate(Page::Favorites);
        assert_eq!(app.page, Page::Login);

        app.login_form.username = "bob".into();
        app.login_form.password = "secret".into();
        app.submit_login();
        pump(&mut app);

        assert!(app.session.is_some());
        assert_eq!(app.page, Page::AllStories);
        assert!(app.login_form.password.is_empty());
        assert_eq!(store.load().unwrap().map(|c| c.username), Some("bob".to_string()));

        app.logout();
        assert!(app.session.is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn failed_login_shows_auth_message() {
        let mut app = app_with(FakeApi::new(), None);
        pump(&mut app);

        app.login_form.username = "nobody".into();
        app.login_form.password = "x".into();
        app.submit_login();
        pump(&mut app);

        assert!(app.session.is_none());
        let banner = app.banner.as_ref().unwrap();
        assert!(banner.is_error);
        assert!(banner.text.contains("not authorized"));
    }

    #[test]
    fn submit_favorite_and_delete_round_trip() {
        let mut app = app_with(FakeApi::new(), None);
        pump(&mut app);

        app.signup_form = SignupForm {
            name: "Alice A".into(),
            username: "alice".into(),
            password: "pw123".into(),
        };
        app.submit_signup();
        pump(&mut app);

        app.navigate(Page::SubmitStory);
        app.submit_form = NewStory {
            title: "Rust".into(),
            author: "Ferris".into(),
            url: "https://www.rust-lang.org/".into(),
        };
        app.submit_story();
        pump(&mut app);

        assert_eq!(app.page, Page::AllStories);
        assert!(app.submit_form.title.is_empty());
        let story = app.stories.iter().next().cloned().unwrap();
        assert_eq!(story.title, "Rust");

        app.handle_story_action(StoryAction::ToggleFavorite(story.clone()));
        assert!(app.session.as_ref().unwrap().is_favorite_pending(&story.story_id));
        pump(&mut app);
        assert!(app.session.as_ref().unwrap().is_favorite(&story));

        app.handle_story_action(StoryAction::Delete(story.story_id.clone()));
        pump(&mut app);
        let session = app.session.as_ref().unwrap();
        assert!(app.stories.is_empty());
        assert!(session.own_stories().is_empty());
        assert!(session.favorites().is_empty());
    }
}
