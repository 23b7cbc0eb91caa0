use std::ops::Range;

use crate::measure::TextMeasure;
use crate::theme::ComboboxTokens;

use super::control::{self, SCROLL_ANCHOR_SLOT, SCROLL_SLOT, SELECTED_SLOT};
use super::dropdown_state::DropdownMenu;
use super::multi_select_state::MultiSelectState;
use super::select_option::SelectOption;
use super::select_state::{SelectEffects, SingleSelectState};

/// Props of a single-select box, resolved against the id-keyed store.
#[derive(Clone, Debug)]
pub struct SingleSelectModel {
    pub id: String,
    pub options: Vec<SelectOption>,
    /// `Some` when the caller owns the value.
    pub value: Option<Option<SelectOption>>,
    pub default_value: Option<SelectOption>,
    pub opened: Option<bool>,
    pub default_opened: bool,
    pub creatable: bool,
    pub tokens: ComboboxTokens,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SingleSelectView {
    pub opened: bool,
    pub focused: bool,
    pub value: Option<SelectOption>,
    pub display_text: String,
    pub clearable: bool,
    pub menu: DropdownMenu,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SingleSelectOutcome {
    pub effects: SelectEffects,
    pub value: Option<SelectOption>,
}

impl SingleSelectModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Vec::new(),
            value: None,
            default_value: None,
            opened: None,
            default_opened: false,
            creatable: false,
            tokens: ComboboxTokens::default(),
        }
    }

    fn current_value(&self) -> Option<SelectOption> {
        control::option_state(
            &self.id,
            SELECTED_SLOT,
            self.value.clone(),
            self.default_value.clone(),
        )
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SingleSelectState) -> R) -> R {
        let opened = self.opened.unwrap_or(self.default_opened);
        control::with_single_select(
            &self.id,
            || {
                let mut state =
                    SingleSelectState::new(self.creatable, self.tokens.max_item_displayed);
                state.mount(opened);
                state
            },
            |state| {
                state.set_creatable(self.creatable);
                state.set_max_item_displayed(self.tokens.max_item_displayed);
                if let Some(opened) = self.opened {
                    state.set_opened(opened);
                }
                f(state)
            },
        )
    }

    pub fn view(&self) -> SingleSelectView {
        let value = self.current_value();
        self.with_state(|state| SingleSelectView {
            opened: state.opened(),
            focused: state.focused(),
            display_text: state.display_text(value.as_ref()),
            clearable: state.clearable(),
            menu: state.menu(&self.options, value.as_ref(), self.tokens.button_height),
            value,
        })
    }

    /// Run one transition and persist an uncontrolled value change.
    pub fn apply(
        &self,
        f: impl FnOnce(&mut SingleSelectState, &[SelectOption], &mut Option<SelectOption>) -> SelectEffects,
    ) -> SingleSelectOutcome {
        let mut value = self.current_value();
        let effects = self.with_state(|state| f(state, &self.options, &mut value));
        if effects.selection_changed && self.value.is_none() {
            control::set_option_state(&self.id, SELECTED_SLOT, value.clone());
        }
        if effects.opened == Some(true) {
            reset_scroll(&self.id, &self.options, value.iter(), self.tokens.button_height);
        }
        SingleSelectOutcome { effects, value }
    }

    pub fn observe_rows(&self, visible: Range<usize>) -> SelectEffects {
        let menu = self.view().menu;
        self.with_state(|state| state.observe_rows(visible, &menu))
    }
}

/// Props of a multi-select box, resolved against the id-keyed store.
#[derive(Clone, Debug)]
pub struct MultiSelectModel {
    pub id: String,
    pub options: Vec<SelectOption>,
    pub selected: Option<Vec<SelectOption>>,
    pub default_selected: Vec<SelectOption>,
    pub opened: Option<bool>,
    pub default_opened: bool,
    pub creatable: bool,
    pub tokens: ComboboxTokens,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TagView {
    pub option: SelectOption,
    /// Text shown on the chip; truncated with the ellipsis when the tag is
    /// wider than its row.
    pub label: String,
    pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelectView {
    pub opened: bool,
    pub focused: bool,
    pub caret_visible: bool,
    pub rows: Vec<Vec<TagView>>,
    pub free_text: String,
    pub selected: Vec<SelectOption>,
    pub menu: DropdownMenu,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiSelectOutcome {
    pub effects: SelectEffects,
    pub selected: Vec<SelectOption>,
}

impl MultiSelectModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Vec::new(),
            selected: None,
            default_selected: Vec::new(),
            opened: None,
            default_opened: false,
            creatable: false,
            tokens: ComboboxTokens::default(),
        }
    }

    fn current_selected(&self) -> Vec<SelectOption> {
        control::options_state(
            &self.id,
            SELECTED_SLOT,
            self.selected.clone(),
            self.default_selected.clone(),
        )
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MultiSelectState) -> R) -> R {
        let opened = self.opened.unwrap_or(self.default_opened);
        control::with_multi_select(
            &self.id,
            || {
                let mut state = MultiSelectState::new(self.tokens.clone(), self.creatable);
                state.mount(opened);
                state
            },
            |state| {
                state.set_creatable(self.creatable);
                state.set_tokens(self.tokens.clone());
                if let Some(opened) = self.opened {
                    state.set_opened(opened);
                }
                f(state)
            },
        )
    }

    /// Flush pending layout work with `measure` and snapshot what to paint.
    pub fn view(&self, measure: &dyn TextMeasure) -> MultiSelectView {
        let selected = self.current_selected();
        self.with_state(|state| {
            state.flush(&selected, measure);

            let buffer = state.buffer();
            let mut spans = buffer.spans().iter();
            let rows = state
                .arrangement()
                .rows()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|option| {
                            let label = spans
                                .next()
                                .filter(|span| &span.option == option)
                                .and_then(|span| buffer.text().get(span.range.clone()))
                                .unwrap_or(option.text())
                                .to_string();
                            TagView {
                                highlighted: state.highlighted() == Some(option),
                                option: option.clone(),
                                label,
                            }
                        })
                        .collect()
                })
                .collect();

            MultiSelectView {
                opened: state.opened(),
                focused: state.focused(),
                caret_visible: state.caret_visible(),
                rows,
                free_text: state.free_text(),
                menu: state.menu(&self.options, &selected),
                selected,
            }
        })
    }

    pub fn apply(
        &self,
        f: impl FnOnce(&mut MultiSelectState, &[SelectOption], &mut Vec<SelectOption>) -> SelectEffects,
    ) -> MultiSelectOutcome {
        let mut selected = self.current_selected();
        let effects = self.with_state(|state| f(state, &self.options, &mut selected));
        if effects.selection_changed && self.selected.is_none() {
            control::set_options_state(&self.id, SELECTED_SLOT, selected.clone());
        }
        if effects.opened == Some(true) {
            reset_scroll(&self.id, &self.options, self.options.first(), self.tokens.option_height);
        }
        MultiSelectOutcome { effects, selected }
    }

    pub fn observe_rows(&self, visible: Range<usize>) -> SelectEffects {
        let selected = self.current_selected();
        self.with_state(|state| {
            let menu = state.menu(&self.options, &selected);
            state.observe_rows(visible, &menu)
        })
    }
}

/// Scroll a freshly opened dropdown to its anchor option.
fn reset_scroll<'a>(
    id: &str,
    options: &[SelectOption],
    anchor: impl IntoIterator<Item = &'a SelectOption>,
    row_height: f32,
) {
    let index = anchor
        .into_iter()
        .next()
        .and_then(|anchor| options.iter().position(|option| option == anchor))
        .unwrap_or(0);
    control::set_f32_state(id, SCROLL_SLOT, index as f32 * row_height);
    control::set_bool_state(id, SCROLL_ANCHOR_SLOT, true);
}

/// Rows of a `row_count` list visible through a viewport of
/// `viewport_height` scrolled down by `scroll_y`.
pub fn visible_rows(scroll_y: f32, viewport_height: f32, row_height: f32, row_count: usize) -> Range<usize> {
    if row_height <= 0.0 || row_count == 0 {
        return 0..0;
    }
    let first = ((scroll_y.max(0.0) / row_height).floor() as usize).min(row_count);
    let last = (((scroll_y.max(0.0) + viewport_height.max(0.0)) / row_height).ceil() as usize)
        .min(row_count);
    first..last
}
