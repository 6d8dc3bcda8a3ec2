//! Application orchestration layer for Storydeck.
//!
//! Everything here is plain state plus the transitions the views apply to it;
//! no I/O happens in this crate. Loads are requested through [`StorySource`]
//! and come back as [`LoadEvent`]s.

mod catalog;
mod detail;
mod navigator;
mod quiz;
mod source;

pub use catalog::{
    Catalog, ListView, LoadState, PAGE_SIZE, StatusFilter, available_statuses, filtered,
    page_slice, total_pages,
};
pub use detail::{DetailView, Navigation, StoryState};
pub use navigator::{Navigator, Step};
pub use quiz::{AnswerSheet, OptionMark, Score};
pub use source::{BoxFuture, FetchError, LoadEvent, RequestToken, StorySource};

use storydeck_core::{Settings, Story};

/// Which screen is up.
#[derive(Debug, Clone)]
pub enum Screen {
    List,
    Detail(DetailView),
}

#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub catalog: Catalog,
    pub list: ListView,
    pub screen: Screen,
    /// Last story token handed out in this session, across detail views.
    story_token: RequestToken,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            catalog: Catalog::new(),
            list: ListView::new(),
            screen: Screen::List,
            story_token: RequestToken::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self.list.clamp(self.catalog.stories());
        self
    }

    pub fn detail(&self) -> Option<&DetailView> {
        match &self.screen {
            Screen::Detail(view) => Some(view),
            Screen::List => None,
        }
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailView> {
        match &mut self.screen {
            Screen::Detail(view) => Some(view),
            Screen::List => None,
        }
    }

    /// Opens the story under the list cursor. Returns what to fetch.
    pub fn open_selected(&mut self) -> Option<(RequestToken, String)> {
        let id = self.list.selected(self.catalog.stories())?.id.clone();
        self.sync_story_token();
        let (view, token) = DetailView::open(self.catalog.ids(), &id, self.story_token);
        self.story_token = token;
        self.screen = Screen::Detail(view);
        Some((token, id))
    }

    /// Leaves the detail view; the list keeps its filter and page.
    pub fn back_to_list(&mut self) {
        self.sync_story_token();
        self.screen = Screen::List;
    }

    fn sync_story_token(&mut self) {
        if let Some(token) = self.detail().map(DetailView::token) {
            self.story_token = self.story_token.max(token);
        }
    }

    pub fn apply_catalog(
        &mut self,
        token: RequestToken,
        result: Result<Vec<Story>, FetchError>,
    ) {
        if !self.catalog.apply(token, result) {
            return;
        }
        self.list.clamp(self.catalog.stories());
        let ids = self.catalog.ids();
        if let Some(view) = self.detail_mut() {
            view.refresh_ids(ids);
        }
    }

    pub fn apply_story(
        &mut self,
        token: RequestToken,
        result: Result<Story, FetchError>,
    ) {
        match self.detail_mut() {
            Some(view) => {
                view.apply_story(token, result);
            }
            None => tracing::debug!(?token, "story response after leaving detail view"),
        }
    }
}
