use storydeck_core::Story;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Moved { index: usize, id: String },
    Blocked,
}

/// Sequential position over an ordered list of story ids.
///
/// Index addressing builds the list straight from an in-memory catalog;
/// identifier addressing receives the list separately and looks the current
/// id up in it. Both step the same way and block at either end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    ids: Vec<String>,
    position: usize,
}

impl Navigator {
    /// Unknown ids fall back to position 0.
    pub fn from_ids(ids: Vec<String>, current: &str) -> Self {
        let position = ids.iter().position(|id| id == current).unwrap_or(0);
        Self { ids, position }
    }

    pub fn from_catalog(catalog: &[Story], index: usize) -> Self {
        let ids: Vec<String> = catalog.iter().map(|s| s.id.clone()).collect();
        let position = index.min(ids.len().saturating_sub(1));
        Self { ids, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.ids.get(self.position).map(String::as_str)
    }

    pub fn can_prev(&self) -> bool {
        self.position > 0
    }

    pub fn can_next(&self) -> bool {
        self.position + 1 < self.ids.len()
    }

    pub fn prev(&mut self) -> Step {
        if !self.can_prev() {
            return Step::Blocked;
        }
        self.position -= 1;
        self.moved()
    }

    pub fn next(&mut self) -> Step {
        if !self.can_next() {
            return Step::Blocked;
        }
        self.position += 1;
        self.moved()
    }

    /// Swaps in a freshly fetched id list, keeping `current` if it is still there.
    pub fn relocate(&mut self, ids: Vec<String>, current: &str) {
        *self = Self::from_ids(ids, current);
    }

    fn moved(&self) -> Step {
        Step::Moved {
            index: self.position,
            id: self.ids[self.position].clone(),
        }
    }
}
