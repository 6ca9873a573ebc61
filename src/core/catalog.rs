//! The fixed set of selectable Workers AI text-generation models.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableModel {
    /// 1-based position in the catalog, as shown to the user.
    pub ordinal: usize,
    pub identifier: &'static str,
    pub display_alias: &'static str,
}

const MODELS: &[(&str, &str)] = &[
    ("@cf/meta/llama-3.1-8b-instruct-fast", "Llama 3.1"),
    ("@cf/meta/llama-3.3-70b-instruct-fp8-fast", "Llama 3.3"),
    ("@cf/google/gemma-3-12b-it", "Google Gemma"),
    ("@cf/qwen/qwq-32b", "Qwen"),
    ("@cf/deepseek-ai/deepseek-r1-distill-qwen-32b", "DeepSeek"),
    ("@cf/mistralai/mistral-small-3.1-24b-instruct", "Mistral"),
];

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<SelectableModel>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        let models = MODELS
            .iter()
            .enumerate()
            .map(|(idx, (identifier, display_alias))| SelectableModel {
                ordinal: idx + 1,
                identifier,
                display_alias,
            })
            .collect();
        Self { models }
    }

    pub fn lookup(&self, ordinal: usize) -> Option<&SelectableModel> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| self.models.get(idx))
    }

    /// The first catalog entry; used when nothing else is configured.
    pub fn default_model(&self) -> &SelectableModel {
        &self.models[0]
    }

    pub fn find(&self, identifier: &str) -> Option<&SelectableModel> {
        self.models.iter().find(|m| m.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// Resolve user input given as an identifier, a display alias
    /// (case-insensitive) or an ordinal.
    pub fn resolve(&self, query: &str) -> Option<&SelectableModel> {
        let query = query.trim();
        if let Some(model) = self.find(query) {
            return Some(model);
        }
        if let Ok(ordinal) = query.parse::<usize>() {
            return self.lookup(ordinal);
        }
        self.models
            .iter()
            .find(|m| m.display_alias.eq_ignore_ascii_case(query))
    }

    /// Entries whose alias or identifier contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&SelectableModel> {
        let needle = query.trim().to_lowercase();
        self.models
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || m.display_alias.to_lowercase().contains(&needle)
                    || m.identifier.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectableModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
