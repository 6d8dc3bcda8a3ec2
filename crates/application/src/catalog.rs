//! Catalog store plus the list view's filter and pagination engine.

use storydeck_core::{Progress, Story};

use crate::source::{FetchError, RequestToken};

/// Stories shown per list page (two rows of four cards).
pub const PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    pub fn matches(&self, story: &Story) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => story.status == *status,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status,
        }
    }
}

/// Distinct non-blank statuses, in the order they first appear.
pub fn available_statuses(catalog: &[Story]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for story in catalog {
        if story.status.trim().is_empty() {
            continue;
        }
        if !out.iter().any(|s| *s == story.status) {
            out.push(story.status.clone());
        }
    }
    out
}

pub fn filtered<'a>(catalog: &'a [Story], filter: &StatusFilter) -> Vec<&'a Story> {
    catalog.iter().filter(|story| filter.matches(story)).collect()
}

/// Items of the 1-based `page`; empty when the page lies past the end.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// The fetched collection. Replaced wholesale on every load, never patched.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stories: Vec<Story>,
    state: LoadState,
    token: RequestToken,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stories(stories: Vec<Story>) -> Self {
        Self {
            stories,
            state: LoadState::Loaded,
            token: RequestToken::default(),
        }
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn ids(&self) -> Vec<String> {
        self.stories.iter().map(|s| s.id.clone()).collect()
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.token = self.token.next();
        self.state = LoadState::Loading;
        self.token
    }

    /// Applies a catalog response. Returns `false` for a superseded request.
    pub fn apply(&mut self, token: RequestToken, result: Result<Vec<Story>, FetchError>) -> bool {
        if token != self.token {
            tracing::debug!(?token, latest = ?self.token, "dropping stale catalog response");
            return false;
        }
        match result {
            Ok(stories) => {
                tracing::info!(count = stories.len(), "catalog loaded");
                self.stories = stories;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog fetch failed");
                self.stories.clear();
                self.state = LoadState::Failed(err.to_string());
            }
        }
        true
    }
}

/// List view UI state: current page, status filter and a cursor on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    page: usize,
    filter: StatusFilter,
    cursor: usize,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            page: 1,
            filter: StatusFilter::All,
            cursor: 0,
        }
    }
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sets the filter and rewinds to page 1 in the same update.
    pub fn select_status(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.page = 1;
        self.cursor = 0;
    }

    /// Steps through `all` followed by the catalog's statuses.
    pub fn cycle_status(&mut self, catalog: &[Story], forward: bool) {
        let mut chips = vec![StatusFilter::All];
        chips.extend(available_statuses(catalog).into_iter().map(StatusFilter::Only));
        let len = chips.len();
        let pos = chips.iter().position(|f| *f == self.filter).unwrap_or(0);
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.select_status(chips[next].clone());
    }

    pub fn filtered<'a>(&self, catalog: &'a [Story]) -> Vec<&'a Story> {
        filtered(catalog, &self.filter)
    }

    pub fn total_pages(&self, catalog: &[Story]) -> usize {
        total_pages(self.filtered(catalog).len(), PAGE_SIZE)
    }

    pub fn visible<'a>(&self, catalog: &'a [Story]) -> Vec<&'a Story> {
        let matching = self.filtered(catalog);
        page_slice(&matching, self.page, PAGE_SIZE).to_vec()
    }

    pub fn next_page(&mut self, catalog: &[Story]) -> bool {
        if self.page < self.total_pages(catalog) {
            self.page += 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Re-establishes the page bound after the catalog changed underneath.
    pub fn clamp(&mut self, catalog: &[Story]) {
        if let StatusFilter::Only(status) = &self.filter
            && !catalog.iter().any(|s| s.status == *status)
        {
            self.select_status(StatusFilter::All);
        }
        let total = self.total_pages(catalog).max(1);
        self.page = self.page.clamp(1, total);
        let visible = self.visible(catalog).len();
        self.cursor = self.cursor.min(visible.saturating_sub(1));
    }

    pub fn cursor_down(&mut self, catalog: &[Story]) {
        let visible = self.visible(catalog).len();
        if self.cursor + 1 < visible {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn selected<'a>(&self, catalog: &'a [Story]) -> Option<&'a Story> {
        self.visible(catalog).get(self.cursor).copied()
    }

    pub fn progress(&self, catalog: &[Story]) -> Progress {
        let total = self.total_pages(catalog);
        Progress {
            current_page: u32::try_from(self.page.min(total)).unwrap_or(u32::MAX),
            total_pages: u32::try_from(total).unwrap_or(u32::MAX),
        }
    }
}
