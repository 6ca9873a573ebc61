use crate::core::catalog::{ModelCatalog, SelectableModel};

/// Selection and filter state of the model picker overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelPicker {
    selected: usize,
    filter: String,
}

impl ModelPicker {
    /// Fresh picker with the cursor on `active_model` when it is listed.
    pub fn open(catalog: &ModelCatalog, active_model: &str) -> Self {
        let selected = catalog
            .iter()
            .position(|m| m.identifier == active_model)
            .unwrap_or(0);
        Self {
            selected,
            filter: String::new(),
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn entries<'a>(&self, catalog: &'a ModelCatalog) -> Vec<&'a SelectableModel> {
        catalog.filter(&self.filter)
    }

    pub fn selected_model<'a>(&self, catalog: &'a ModelCatalog) -> Option<&'a SelectableModel> {
        self.entries(catalog).get(self.selected).copied()
    }

    pub fn move_up(&mut self, catalog: &ModelCatalog) {
        let len = self.entries(catalog).len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn move_down(&mut self, catalog: &ModelCatalog) {
        let len = self.entries(catalog).len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    pub fn push_filter(&mut self, ch: char) {
        self.filter.push(ch);
        self.selected = 0;
    }

    pub fn pop_filter(&mut self) {
        if self.filter.pop().is_some() {
            self.selected = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_on_active_model() {
        let catalog = ModelCatalog::builtin();
        let active = catalog.lookup(3).unwrap().identifier;
        let picker = ModelPicker::open(&catalog, active);
        assert_eq!(picker.selected_model(&catalog).map(|m| m.ordinal), Some(3));
    }

    #[test]
    fn movement_wraps_around() {
        let catalog = ModelCatalog::builtin();
        let mut picker = ModelPicker::open(&catalog, "unknown");
        picker.move_up(&catalog);
        assert_eq!(picker.selected(), catalog.len() - 1);
        picker.move_down(&catalog);
        assert_eq!(picker.selected(), 0);
    }

    #[test]
    fn filtering_narrows_entries_and_resets_cursor() {
        let catalog = ModelCatalog::builtin();
        let mut picker = ModelPicker::open(&catalog, catalog.lookup(5).unwrap().identifier);
        for ch in "qwen".chars() {
            picker.push_filter(ch);
        }
        // "Qwen" alias plus the DeepSeek distill identifier both match.
        assert_eq!(picker.entries(&catalog).len(), 2);
        assert_eq!(picker.selected(), 0);

        picker.push_filter('x');
        assert!(picker.selected_model(&catalog).is_none());
        picker.move_down(&catalog);
        assert_eq!(picker.selected(), 0);

        picker.pop_filter();
        assert_eq!(picker.filter(), "qwen");
    }
}
