//! Test helpers and fixtures.

use std::collections::HashMap;

use storydeck_application::{BoxFuture, FetchError, StorySource};
use storydeck_core::{Adventure, Question, Section, Story, WordEntry};

pub fn make_question(id: &str, options: &[&str], answer: &str) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {id}?"),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer: answer.to_string(),
    }
}

/// A story with two words, two adventure sections and `questions` quiz items
/// whose correct answer is always the first option.
pub fn make_story(id: &str, status: &str, questions: usize) -> Story {
    Story {
        id: id.to_string(),
        title: format!("Story {id}"),
        status: status.to_string(),
        images: vec![format!("covers/{id}.png")],
        words: vec![
            WordEntry {
                word: "Orbit".to_string(),
                text: "a curved path".to_string(),
                example: "The moon orbits the earth.".to_string(),
                images: vec![format!("words/{id}-orbit.png")],
            },
            WordEntry {
                word: "Gravity".to_string(),
                text: "a pulling force".to_string(),
                example: "Gravity keeps us grounded.".to_string(),
                images: Vec::new(),
            },
        ],
        adventure: Adventure {
            title: format!("Adventure {id}"),
            sections: vec![
                Section {
                    images: vec![format!("scenes/{id}-1.png")],
                    paragraph: "The rocket lifted off.".to_string(),
                    text: String::new(),
                },
                Section {
                    images: Vec::new(),
                    paragraph: String::new(),
                    text: "Stars filled the window.".to_string(),
                },
            ],
        },
        questions: (0..questions)
            .map(|i| {
                make_question(
                    &format!("{id}-q{i}"),
                    &["right", "wrong", "other"],
                    "right",
                )
            })
            .collect(),
    }
}

/// `n` stories cycling through `new`, `in progress`, `completed`.
pub fn make_catalog(n: usize) -> Vec<Story> {
    (0..n)
        .map(|i| {
            let status = match i % 3 {
                0 => "new",
                1 => "in progress",
                _ => "completed",
            };
            make_story(&format!("s{i}"), status, 3)
        })
        .collect()
}

pub fn catalog_json(stories: &[Story]) -> String {
    serde_json::to_string(stories).unwrap_or_else(|_| "[]".to_string())
}

/// In-memory [`StorySource`].
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    pub stories: Vec<Story>,
    pub images: HashMap<String, Vec<u8>>,
    pub catalog_error: Option<FetchError>,
}

impl FixtureSource {
    pub fn new(stories: Vec<Story>) -> Self {
        Self {
            stories,
            ..Self::default()
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            catalog_error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }
}

impl StorySource for FixtureSource {
    fn load_catalog(&self) -> BoxFuture<'_, Result<Vec<Story>, FetchError>> {
        Box::pin(async move {
            match &self.catalog_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.stories.clone()),
            }
        })
    }

    fn load_story<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Story, FetchError>> {
        Box::pin(async move {
            self.stories
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(format!("story {id}")))
        })
    }

    fn load_image<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(url.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_story() {
        let story = make_story("x", "new", 2);
        assert_eq!(story.questions.len(), 2);
        assert!(story.questions.iter().all(|q| q.answer_in_options()));
        assert_eq!(story.cover_image(), Some("covers/x.png"));
    }

    #[test]
    fn catalog_json_round_trips_through_wire_names() {
        let stories = make_catalog(2);
        let json = catalog_json(&stories);
        assert!(json.contains("\"_id\":\"s0\""));
        assert!(json.contains("\"Storyadvenure\""));
        let decoded = storydeck_remote::parse_catalog(json.as_bytes()).unwrap();
        assert_eq!(decoded, stories);
    }
}
