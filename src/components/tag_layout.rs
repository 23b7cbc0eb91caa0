use crate::measure::TextMeasure;
use crate::theme::ComboboxTokens;

use super::select_option::SelectOption;

/// Selected options partitioned into visual rows, in selection order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagArrangement {
    rows: Vec<Vec<SelectOption>>,
}

impl TagArrangement {
    pub fn rows(&self) -> &[Vec<SelectOption>] {
        &self.rows
    }

    pub fn last_row(&self) -> Option<&[SelectOption]> {
        self.rows.last().map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn flatten(&self) -> Vec<SelectOption> {
        self.rows.iter().flatten().cloned().collect()
    }

    pub fn matches(&self, options: &[SelectOption]) -> bool {
        self.rows.iter().flatten().eq(options.iter())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagLayout {
    pub container_width: f32,
    pub spacing: f32,
    pub item_padding: f32,
}

impl TagLayout {
    pub fn new(container_width: f32, spacing: f32, item_padding: f32) -> Self {
        Self {
            container_width,
            spacing,
            item_padding,
        }
    }

    /// Layout for the tag area of a text field measured at `container_width`.
    pub fn for_container(container_width: f32, tokens: &ComboboxTokens) -> Self {
        Self::new(
            tokens.available_tag_width(container_width),
            tokens.tag_spacing(),
            tokens.tag_padding_x(),
        )
    }

    pub fn item_width(&self, option: &SelectOption, measure: &dyn TextMeasure) -> f32 {
        measure.width(option.text()) + self.item_padding * 2.0
    }

    /// Greedy left-to-right line breaking. An option wider than the container
    /// still gets a row of its own; nothing is split or dropped.
    pub fn arrange(&self, options: &[SelectOption], measure: &dyn TextMeasure) -> TagArrangement {
        let mut rows: Vec<Vec<SelectOption>> = Vec::new();
        let mut row_width = 0.0;

        for option in options {
            let item_width = self.item_width(option, measure);
            match rows.last_mut() {
                Some(row) if row_width + self.spacing + item_width <= self.container_width => {
                    row.push(option.clone());
                    row_width += self.spacing + item_width;
                }
                _ => {
                    rows.push(vec![option.clone()]);
                    row_width = item_width;
                }
            }
        }

        TagArrangement { rows }
    }
}
