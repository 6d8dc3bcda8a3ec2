//! Brain quest scoring.

use std::collections::HashMap;

use storydeck_core::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

/// How one option renders. Before reveal only selection shows; after reveal
/// only the picked option is marked, right or wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Unselected,
    Selected,
    Correct,
    Incorrect,
}

/// Chosen option per question id, plus the results-revealed flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: HashMap<String, String>,
    revealed: bool,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice. The option is stored as given, even if the question
    /// does not list it. Returns `false` once results are revealed.
    pub fn select(&mut self, question_id: &str, option: &str) -> bool {
        if self.revealed {
            return false;
        }
        self.selections
            .insert(question_id.to_string(), option.to_string());
        true
    }

    pub fn selection(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    pub fn answered(&self) -> usize {
        self.selections.len()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// True once every question has a selection. Vacuously true for none.
    pub fn can_submit(&self, questions: &[Question]) -> bool {
        questions
            .iter()
            .all(|q| self.selections.contains_key(&q.id))
    }

    /// Whether a submit control exists at all.
    pub fn shows_submit(&self, questions: &[Question]) -> bool {
        !questions.is_empty() && !self.revealed
    }

    pub fn submit(&mut self, questions: &[Question]) -> bool {
        if !self.shows_submit(questions) || !self.can_submit(questions) {
            return false;
        }
        self.revealed = true;
        true
    }

    /// `None` until results are revealed.
    pub fn score(&self, questions: &[Question]) -> Option<Score> {
        if !self.revealed {
            return None;
        }
        let correct = questions
            .iter()
            .filter(|q| self.selection(&q.id).is_some_and(|s| q.is_correct(s)))
            .count();
        Some(Score {
            correct,
            total: questions.len(),
        })
    }

    pub fn mark(&self, question: &Question, option: &str) -> OptionMark {
        let selected = self.selection(&question.id) == Some(option);
        match (selected, self.revealed) {
            (false, _) => OptionMark::Unselected,
            (true, false) => OptionMark::Selected,
            (true, true) if question.is_correct(option) => OptionMark::Correct,
            (true, true) => OptionMark::Incorrect,
        }
    }

    pub fn reset(&mut self) {
        self.selections.clear();
        self.revealed = false;
    }
}
