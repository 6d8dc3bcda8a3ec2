//! Core domain types for Storydeck.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_API_URL: &str = "https://mxpertztestapi.onrender.com/api/sciencefiction";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://ik.imagekit.io/dev24";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub image_base_url: String,
    pub request_timeout_secs: u64,
    pub theme: Theme,
    pub show_images: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err("unknown theme"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            request_timeout_secs: 20,
            theme: Theme::Dark,
            show_images: true,
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 300);
        self.api_url = normalize_url(&self.api_url, DEFAULT_API_URL);
        self.image_base_url = normalize_url(&self.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }

    pub fn cycle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    pub fn toggle_images(&mut self) {
        self.show_images = !self.show_images;
    }

    /// Absolute URL for one image path fragment, or `None` for an empty fragment.
    pub fn image_url(&self, fragment: &str) -> Option<String> {
        resolve_image_url(&self.image_base_url, fragment)
    }
}

fn normalize_url(value: &str, fallback: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn resolve_image_url(base: &str, fragment: &str) -> Option<String> {
    let fragment = fragment.trim().trim_start_matches('/');
    if fragment.is_empty() {
        return None;
    }
    let base = base.trim().trim_end_matches('/');
    Some(format!("{base}/{fragment}"))
}

/// First non-blank entry of an image list.
pub fn first_image(images: &[String]) -> Option<&str> {
    images
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

// The API sends `null` for missing values as often as it omits them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "Status", default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "Image", default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(rename = "Wordexplore", default, deserialize_with = "null_as_default")]
    pub words: Vec<WordEntry>,
    #[serde(
        rename = "Storyadvenure",
        default,
        deserialize_with = "null_as_default"
    )]
    pub adventure: Adventure,
    #[serde(rename = "Brainquest", default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

impl Story {
    pub fn status_kind(&self) -> StatusKind {
        StatusKind::from_tag(&self.status)
    }

    pub fn cover_image(&self) -> Option<&str> {
        first_image(&self.images)
    }

    pub fn adventure_title(&self) -> &str {
        let title = self.adventure.title.trim();
        if title.is_empty() {
            self.title.as_str()
        } else {
            title
        }
    }

    /// Questions that can never be credited because their answer is not an option.
    pub fn unanswerable_questions(&self) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| !q.answer_in_options())
            .collect()
    }
}

/// One vocabulary card of the word explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(rename = "Storytitle", default, deserialize_with = "null_as_default")]
    pub word: String,
    #[serde(rename = "Storyttext", default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(rename = "Storyitext", default, deserialize_with = "null_as_default")]
    pub example: String,
    #[serde(rename = "Storyimage", default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl WordEntry {
    pub fn image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adventure {
    #[serde(rename = "Storytitle", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "content", default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "Storyimage", default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(rename = "Paragraph", default, deserialize_with = "null_as_default")]
    pub paragraph: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl Section {
    pub fn body(&self) -> &str {
        if self.paragraph.trim().is_empty() {
            self.text.as_str()
        } else {
            self.paragraph.as_str()
        }
    }

    pub fn image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "Question", default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(rename = "Option", default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(rename = "Answer", default, deserialize_with = "null_as_default")]
    pub answer: String,
}

impl Question {
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.answer
    }

    pub fn answer_in_options(&self) -> bool {
        self.options.iter().any(|o| *o == self.answer)
    }
}

/// Known status tags. Unknown tags still render, with the fallback attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    New,
    InProgress,
    Completed,
    Other,
}

impl StatusKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "new" => StatusKind::New,
            "in progress" => StatusKind::InProgress,
            "completed" => StatusKind::Completed,
            _ => StatusKind::Other,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StatusKind::New => "🅰️",
            StatusKind::InProgress => "🏆",
            StatusKind::Completed => "✅",
            StatusKind::Other => "",
        }
    }

    pub fn accent(&self) -> Accent {
        match self {
            StatusKind::New => Accent::Purple,
            StatusKind::InProgress => Accent::Yellow,
            StatusKind::Completed => Accent::Green,
            StatusKind::Other => Accent::Purple,
        }
    }
}

/// Palette keys; the UI maps them onto terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accent {
    Purple,
    Yellow,
    Green,
    Cyan,
    Pink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    WordExplorer,
    StoryAdventure,
    BrainQuest,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::WordExplorer, Tab::StoryAdventure, Tab::BrainQuest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::WordExplorer => "word-explorer",
            Tab::StoryAdventure => "story-adventure",
            Tab::BrainQuest => "brain-quest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::WordExplorer => "Word Explorer",
            Tab::StoryAdventure => "Story Adventure",
            Tab::BrainQuest => "Brain Quest",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tab::WordExplorer => "🔍",
            Tab::StoryAdventure => "📖",
            Tab::BrainQuest => "🧠",
        }
    }

    pub fn accent(&self) -> Accent {
        match self {
            Tab::WordExplorer => Accent::Cyan,
            Tab::StoryAdventure => Accent::Pink,
            Tab::BrainQuest => Accent::Purple,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::WordExplorer => Tab::StoryAdventure,
            Tab::StoryAdventure => Tab::BrainQuest,
            Tab::BrainQuest => Tab::WordExplorer,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Tab::WordExplorer => Tab::BrainQuest,
            Tab::StoryAdventure => Tab::WordExplorer,
            Tab::BrainQuest => Tab::StoryAdventure,
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tab {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "word-explorer" => Ok(Tab::WordExplorer),
            "story-adventure" => Ok(Tab::StoryAdventure),
            "brain-quest" => Ok(Tab::BrainQuest),
            _ => Err("unknown tab"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        if self.total_pages == 0 {
            0.0
        } else {
            (self.current_page as f32 / self.total_pages as f32) * 100.0
        }
    }
}
