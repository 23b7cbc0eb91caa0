use std::fmt;

/// A selectable item. Identity is the text: two options with the same text
/// are the same option.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SelectOption {
    text: String,
}

impl SelectOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SelectOption {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn contains(options: &[SelectOption], option: &SelectOption) -> bool {
    options.iter().any(|candidate| candidate == option)
}

pub fn contains_text(options: &[SelectOption], text: &str) -> bool {
    options.iter().any(|candidate| candidate.text() == text)
}

pub fn from_texts(texts: impl IntoIterator<Item = impl Into<String>>) -> Vec<SelectOption> {
    texts.into_iter().map(SelectOption::new).collect()
}
