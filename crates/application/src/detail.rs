//! Detail view state: the open story, its tab, the quiz sheet and navigation.

use storydeck_core::{Story, Tab};

use crate::navigator::{Navigator, Step};
use crate::quiz::{AnswerSheet, Score};
use crate::source::{FetchError, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryState {
    Loading,
    Ready(Story),
    NotFound(String),
}

/// Outcome of a prev/next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The view was reset; the caller fetches `id` and reports back with `token`.
    Load { token: RequestToken, id: String },
    Blocked,
}

#[derive(Debug, Clone)]
pub struct DetailView {
    navigator: Navigator,
    story: StoryState,
    requested_id: String,
    token: RequestToken,
    tab: Tab,
    answers: AnswerSheet,
    word_cursor: usize,
    question_cursor: usize,
    option_cursor: usize,
    scroll: u16,
    scroll_max: u16,
}

impl DetailView {
    /// Opens `id` by identifier. Tokens continue from `last`.
    pub fn open(ids: Vec<String>, id: &str, last: RequestToken) -> (Self, RequestToken) {
        let mut view = Self {
            navigator: Navigator::from_ids(ids, id),
            story: StoryState::Loading,
            requested_id: id.to_string(),
            token: last,
            tab: Tab::default(),
            answers: AnswerSheet::new(),
            word_cursor: 0,
            question_cursor: 0,
            option_cursor: 0,
            scroll: 0,
            scroll_max: 0,
        };
        let token = view.begin_load(id);
        (view, token)
    }

    /// Opens the story at `index` of an in-memory catalog; nothing to fetch.
    pub fn from_catalog(catalog: &[Story], index: usize) -> Self {
        let navigator = Navigator::from_catalog(catalog, index);
        let story = match catalog.get(navigator.position()) {
            Some(story) => StoryState::Ready(story.clone()),
            None => StoryState::NotFound("empty catalog".to_string()),
        };
        Self {
            requested_id: navigator.current_id().unwrap_or_default().to_string(),
            navigator,
            story,
            token: RequestToken::default(),
            tab: Tab::default(),
            answers: AnswerSheet::new(),
            word_cursor: 0,
            question_cursor: 0,
            option_cursor: 0,
            scroll: 0,
            scroll_max: 0,
        }
    }

    fn begin_load(&mut self, id: &str) -> RequestToken {
        self.token = self.token.next();
        self.requested_id = id.to_string();
        self.story = StoryState::Loading;
        self.token
    }

    /// Refetches the current story. Tab, cursors and answers stay put.
    pub fn reload(&mut self) -> (RequestToken, String) {
        let id = self.requested_id.clone();
        let token = self.begin_load(&id);
        (token, id)
    }

    /// Latest token handed out by this view.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Applies a story response. Superseded responses are dropped.
    pub fn apply_story(&mut self, token: RequestToken, result: Result<Story, FetchError>) -> bool {
        if token != self.token {
            tracing::debug!(?token, latest = ?self.token, "dropping stale story response");
            return false;
        }
        self.story = match result {
            Ok(story) => {
                tracing::info!(id = %story.id, title = %story.title, "story loaded");
                StoryState::Ready(story)
            }
            Err(err) => {
                tracing::warn!(id = %self.requested_id, error = %err, "story fetch failed");
                StoryState::NotFound(err.to_string())
            }
        };
        true
    }

    /// Takes a newly fetched id list without moving off the current story.
    pub fn refresh_ids(&mut self, ids: Vec<String>) {
        let current = self.requested_id.clone();
        self.navigator.relocate(ids, &current);
    }

    pub fn prev(&mut self) -> Navigation {
        let step = self.navigator.prev();
        self.follow(step)
    }

    pub fn next(&mut self) -> Navigation {
        let step = self.navigator.next();
        self.follow(step)
    }

    /// Index-mode stepping over an in-memory catalog.
    pub fn step_in(&mut self, catalog: &[Story], forward: bool) -> bool {
        let step = if forward {
            self.navigator.next()
        } else {
            self.navigator.prev()
        };
        let Step::Moved { index, id } = step else {
            return false;
        };
        self.reset();
        self.requested_id = id;
        self.story = match catalog.get(index) {
            Some(story) => StoryState::Ready(story.clone()),
            None => StoryState::NotFound(self.requested_id.clone()),
        };
        true
    }

    fn follow(&mut self, step: Step) -> Navigation {
        match step {
            Step::Moved { id, .. } => {
                self.reset();
                let token = self.begin_load(&id);
                Navigation::Load { token, id }
            }
            Step::Blocked => Navigation::Blocked,
        }
    }

    /// Back to the first tab with an empty, unrevealed answer sheet.
    pub fn reset(&mut self) {
        self.tab = Tab::default();
        self.answers.reset();
        self.word_cursor = 0;
        self.question_cursor = 0;
        self.option_cursor = 0;
        self.scroll = 0;
        self.scroll_max = 0;
    }

    pub fn state(&self) -> &StoryState {
        &self.story
    }

    pub fn story(&self) -> Option<&Story> {
        match &self.story {
            StoryState::Ready(story) => Some(story),
            _ => None,
        }
    }

    pub fn requested_id(&self) -> &str {
        &self.requested_id
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn word_cursor(&self) -> usize {
        self.word_cursor
    }

    pub fn question_cursor(&self) -> usize {
        self.question_cursor
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Bounds adventure scrolling to what the last draw could show.
    pub fn set_scroll_max(&mut self, max: u16) {
        self.scroll_max = max;
        self.scroll = self.scroll.min(max);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
    }

    pub fn move_down(&mut self) {
        let Some(story) = self.story() else {
            return;
        };
        match self.tab {
            Tab::WordExplorer => {
                if self.word_cursor + 1 < story.words.len() {
                    self.word_cursor += 1;
                }
            }
            Tab::StoryAdventure => {
                if self.scroll < self.scroll_max {
                    self.scroll += 1;
                }
            }
            Tab::BrainQuest => {
                if self.question_cursor + 1 < story.questions.len() {
                    self.question_cursor += 1;
                    self.sync_option_cursor();
                }
            }
        }
    }

    pub fn move_up(&mut self) {
        match self.tab {
            Tab::WordExplorer => self.word_cursor = self.word_cursor.saturating_sub(1),
            Tab::StoryAdventure => self.scroll = self.scroll.saturating_sub(1),
            Tab::BrainQuest => {
                if self.question_cursor > 0 {
                    self.question_cursor -= 1;
                    self.sync_option_cursor();
                }
            }
        }
    }

    pub fn option_next(&mut self) {
        let count = self.current_option_count();
        if self.option_cursor + 1 < count {
            self.option_cursor += 1;
        }
    }

    pub fn option_prev(&mut self) {
        self.option_cursor = self.option_cursor.saturating_sub(1);
    }

    fn current_option_count(&self) -> usize {
        self.story()
            .and_then(|s| s.questions.get(self.question_cursor))
            .map(|q| q.options.len())
            .unwrap_or(0)
    }

    // Land on the question's current choice, if any.
    fn sync_option_cursor(&mut self) {
        let Some(question) = self
            .story()
            .and_then(|s| s.questions.get(self.question_cursor))
        else {
            self.option_cursor = 0;
            return;
        };
        self.option_cursor = self
            .answers
            .selection(&question.id)
            .and_then(|sel| question.options.iter().position(|o| o == sel))
            .unwrap_or(0);
    }

    pub fn select_option(&mut self, question_id: &str, option: &str) -> bool {
        self.answers.select(question_id, option)
    }

    /// Selects the option under the cursor.
    pub fn choose(&mut self) -> bool {
        let Some((id, option)) = self
            .story()
            .and_then(|s| s.questions.get(self.question_cursor))
            .and_then(|q| {
                q.options
                    .get(self.option_cursor)
                    .map(|o| (q.id.clone(), o.clone()))
            })
        else {
            return false;
        };
        self.answers.select(&id, &option)
    }

    pub fn can_submit(&self) -> bool {
        self.story()
            .is_some_and(|s| self.answers.can_submit(&s.questions))
    }

    pub fn shows_submit(&self) -> bool {
        self.story()
            .is_some_and(|s| self.answers.shows_submit(&s.questions))
    }

    pub fn submit(&mut self) -> Option<Score> {
        let story = match &self.story {
            StoryState::Ready(story) => story,
            _ => return None,
        };
        if !self.answers.submit(&story.questions) {
            return None;
        }
        let score = self.answers.score(&story.questions);
        if let Some(score) = score {
            tracing::info!(
                id = %story.id,
                correct = score.correct,
                total = score.total,
                "quiz submitted"
            );
        }
        score
    }

    pub fn score(&self) -> Option<Score> {
        self.story().and_then(|s| self.answers.score(&s.questions))
    }

    /// Image fragment worth previewing for the active tab.
    pub fn preview_image(&self) -> Option<&str> {
        let story = self.story()?;
        match self.tab {
            Tab::WordExplorer => story
                .words
                .get(self.word_cursor)
                .and_then(|w| w.image())
                .or_else(|| story.cover_image()),
            Tab::StoryAdventure => story
                .adventure
                .sections
                .iter()
                .find_map(|s| s.image())
                .or_else(|| story.cover_image()),
            Tab::BrainQuest => story.cover_image(),
        }
    }
}
