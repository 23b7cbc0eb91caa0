use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::measure::TextMeasure;
use crate::theme::ComboboxTokens;

use super::select_option::SelectOption;
use super::tag_layout::TagArrangement;

pub const ROW_SEPARATOR: &str = "\r\n";

/// Where one tag was written inside the shadow text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagSpan {
    pub option: SelectOption,
    pub range: Range<usize>,
    pub truncated: bool,
}

/// How a single edit of the shadow text should be interpreted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditKind {
    /// Bulk rewrite by the widget itself; accepted as-is.
    Programmatic,
    Insert,
    /// Second backspace on an armed tag. `free_text` is what the user had
    /// typed before the deletion and must survive the re-serialization.
    DeleteHighlighted {
        option: SelectOption,
        free_text: String,
    },
    /// First backspace that reached the last tag.
    Highlight(SelectOption),
    Unchanged,
}

/// Text driven into the editing surface so that it reserves room for the
/// tags, together with the offsets of every tag written into it.
///
/// Tags are located by offset, never by searching for their text, so tag
/// text may contain any characters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShadowBuffer {
    text: String,
    tag_prefix: String,
    spans: Vec<TagSpan>,
}

impl ShadowBuffer {
    pub fn format(
        arrangement: &TagArrangement,
        free_text: &str,
        container_width: f32,
        tokens: &ComboboxTokens,
        measure: &dyn TextMeasure,
    ) -> Self {
        let available = tokens.available_tag_width(container_width);
        let spacer = tokens.tag_spacer();
        let mut text = String::new();
        let mut spans = Vec::new();

        for (row_index, row) in arrangement.rows().iter().enumerate() {
            if row_index > 0 {
                text.push_str(ROW_SEPARATOR);
            }

            if let [only] = row.as_slice()
                && measure.overflows(only.text(), available)
            {
                let start = text.len();
                text.push_str(&overflow_form(only.text(), available, tokens, measure));
                spans.push(TagSpan {
                    option: only.clone(),
                    range: start..text.len(),
                    truncated: true,
                });
                continue;
            }

            for (column, option) in row.iter().enumerate() {
                if column > 0 {
                    text.push_str(&spacer);
                }
                let start = text.len();
                text.push_str(option.text());
                spans.push(TagSpan {
                    option: option.clone(),
                    range: start..text.len(),
                    truncated: false,
                });
            }
        }

        let tag_prefix = text.clone();
        text.push_str(&tokens.row_gap());
        text.push_str(free_text);

        Self {
            text,
            tag_prefix,
            spans,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[TagSpan] {
        &self.spans
    }

    pub fn last_span(&self) -> Option<&TagSpan> {
        self.spans.last()
    }

    /// Byte offset where the tag portion ends and the row gap begins.
    pub fn tags_end(&self) -> usize {
        self.tag_prefix.len()
    }

    /// Replace the live text after an edit. Offsets keep describing the text
    /// as it was last formatted.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn free_text(&self) -> String {
        self.free_text_of(&self.text)
    }

    /// Free text carried by `text`: whatever follows the untouched tag
    /// portion. Empty once an edit has reached into the tags.
    pub fn free_text_of(&self, text: &str) -> String {
        text.strip_prefix(self.tag_prefix.as_str())
            .map(|rest| rest.trim().to_string())
            .unwrap_or_default()
    }

    pub fn classify(&self, old: &str, new: &str, highlighted: Option<&SelectOption>) -> EditKind {
        if old == new {
            return EditKind::Unchanged;
        }

        let old_len = old.graphemes(true).count();
        let new_len = new.graphemes(true).count();
        if old_len.abs_diff(new_len) > 1 {
            return EditKind::Programmatic;
        }
        if new_len >= old_len {
            return EditKind::Insert;
        }

        if let Some(option) = highlighted {
            return EditKind::DeleteHighlighted {
                option: option.clone(),
                free_text: self.free_text_of(old),
            };
        }

        let Some(last) = self.spans.last() else {
            return EditKind::Unchanged;
        };

        let cursor = new.len();
        let tags_end = self.tags_end();
        let compared = cursor.min(tags_end);
        if new.get(..compared) != self.tag_prefix.get(..compared) {
            return EditKind::Unchanged;
        }

        // The cursor is past the first gap column: still spacing or free text.
        if cursor > tags_end + 1 || cursor <= last.range.start {
            return EditKind::Unchanged;
        }
        EditKind::Highlight(last.option.clone())
    }
}

/// Truncated form written for a tag too wide for its own row.
pub fn overflow_form(
    text: &str,
    available_width: f32,
    tokens: &ComboboxTokens,
    measure: &dyn TextMeasure,
) -> String {
    let budget = available_width - tokens.gap_column_width - measure.width(tokens.ellipsis);
    format!("{}{}", measure.prefix_that_fits(text, budget), tokens.ellipsis)
}

pub fn pop_grapheme(text: &str) -> &str {
    match text.grapheme_indices(true).next_back() {
        Some((start, _)) => &text[..start],
        None => text,
    }
}
