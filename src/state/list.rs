// Generic list state.
// Loading state for cached data and keyboard selection over a loaded list.

use ratatui::widgets::ListState;

/// Loading state for data that arrives from a refresh.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// State for a selectable list with keyboard navigation.
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    pub data: LoadingState<Vec<T>>,
    pub list_state: ListState,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            data: LoadingState::Idle,
            list_state: ListState::default(),
        }
    }
}

impl<T> SelectableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        self.data.data().map_or(0, Vec::len)
    }

    /// Select the next item, staying on the last one.
    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item, staying on the first one.
    pub fn select_prev(&mut self) {
        if self.len() == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Replace the items, keeping the selection in range.
    pub fn set_loaded(&mut self, items: Vec<T>) {
        let len = items.len();
        self.data = LoadingState::Loaded(items);
        let selected = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut list = SelectableList::new();
        list.select_next();
        assert_eq!(list.list_state.selected(), None);

        list.set_loaded(vec!["a", "b"]);
        assert_eq!(list.list_state.selected(), Some(0));
        list.select_next();
        list.select_next();
        assert_eq!(list.list_state.selected(), Some(1));
        list.select_prev();
        list.select_prev();
        assert_eq!(list.list_state.selected(), Some(0));
    }

    #[test]
    fn test_reload_clamps_selection() {
        let mut list = SelectableList::new();
        list.set_loaded(vec![1, 2, 3]);
        list.select_next();
        list.select_next();

        list.set_loaded(vec![1]);
        assert_eq!(list.list_state.selected(), Some(0));

        list.set_loaded(Vec::new());
        assert_eq!(list.list_state.selected(), None);
        assert!(list.data.is_loaded());
    }
}
