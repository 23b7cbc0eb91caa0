use std::ops::Range;

use super::dropdown_state::{self, DropdownMenu, MenuConfig};
use super::scroll_trigger::ScrollTrigger;
use super::select_option::SelectOption;

/// What a state transition asks of the host: repaint, and which caller
/// callbacks to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectEffects {
    pub refresh: bool,
    /// New dropdown state, reported to `on_open_change`.
    pub opened: Option<bool>,
    /// Option built from free text, reported to `on_create`.
    pub created: Option<SelectOption>,
    pub selection_changed: bool,
    /// The last option row came into view; run `on_scroll_bottom`.
    pub load_more: bool,
}

impl SelectEffects {
    pub fn refresh() -> Self {
        Self {
            refresh: true,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: SelectEffects) {
        self.refresh |= other.refresh;
        if other.opened.is_some() {
            self.opened = other.opened;
        }
        if other.created.is_some() {
            self.created = other.created;
        }
        self.selection_changed |= other.selection_changed;
        self.load_more |= other.load_more;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ScrollTrigger {
    pub fn on_menu_rows(&mut self, visible: Range<usize>, menu: &DropdownMenu) -> bool {
        match menu.last_option_row() {
            Some(last) => self.on_visible_range(visible, last + 1),
            None => {
                self.reset();
                false
            }
        }
    }
}

/// Single-select combobox: a free-text filter over the options plus one
/// selected value owned by the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SingleSelectState {
    creatable: bool,
    max_item_displayed: usize,
    opened: bool,
    focused: bool,
    input: String,
    scroll: ScrollTrigger,
}

impl SingleSelectState {
    pub fn new(creatable: bool, max_item_displayed: usize) -> Self {
        Self {
            creatable,
            max_item_displayed,
            ..Self::default()
        }
    }

    /// Initial mount: free text starts empty and focus follows the dropdown.
    pub fn mount(&mut self, opened: bool) -> SelectEffects {
        self.opened = opened;
        self.focused = opened;
        self.input.clear();
        SelectEffects::refresh()
    }

    pub fn set_creatable(&mut self, creatable: bool) {
        self.creatable = creatable;
    }

    pub fn set_max_item_displayed(&mut self, value: usize) {
        self.max_item_displayed = value;
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Clear button is offered while there is typed text in a focused field.
    pub fn clearable(&self) -> bool {
        self.focused && !self.input.is_empty()
    }

    pub fn display_text(&self, selected: Option<&SelectOption>) -> String {
        if self.input.is_empty() {
            selected.map(|option| option.text().to_string()).unwrap_or_default()
        } else {
            self.input.clone()
        }
    }

    pub fn toggle(&mut self) -> SelectEffects {
        self.set_opened(!self.opened)
    }

    pub fn dismiss(&mut self) -> SelectEffects {
        self.set_opened(false)
    }

    pub fn set_opened(&mut self, next: bool) -> SelectEffects {
        if self.opened == next {
            return SelectEffects::default();
        }
        self.opened = next;
        self.focused = next;
        self.input.clear();
        if !next {
            self.scroll.reset();
        }
        tracing::debug!(opened = next, "single select dropdown changed");
        SelectEffects {
            refresh: true,
            opened: Some(next),
            ..SelectEffects::default()
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) -> SelectEffects {
        let text = text.into();
        if text == self.input {
            return SelectEffects::default();
        }
        self.input = text;
        SelectEffects::refresh()
    }

    pub fn clear_input(&mut self) -> SelectEffects {
        self.edit(String::new())
    }

    /// Focus left the field. With creation enabled and the dropdown open the
    /// typed text is committed.
    pub fn blur(
        &mut self,
        available: &[SelectOption],
        selected: &mut Option<SelectOption>,
    ) -> SelectEffects {
        if !self.focused {
            return SelectEffects::default();
        }
        self.focused = false;
        let mut effects = SelectEffects::refresh();
        if self.creatable && self.opened {
            effects.merge(self.create_option(available, selected));
        }
        effects
    }

    pub fn submit(
        &mut self,
        available: &[SelectOption],
        selected: &mut Option<SelectOption>,
    ) -> SelectEffects {
        self.blur(available, selected)
    }

    pub fn select(
        &mut self,
        option: SelectOption,
        selected: &mut Option<SelectOption>,
    ) -> SelectEffects {
        let mut effects = SelectEffects::refresh();
        if selected.as_ref() != Some(&option) {
            tracing::debug!(option = %option, "single select option chosen");
            *selected = Some(option);
            effects.selection_changed = true;
        }
        effects.merge(self.set_opened(false));
        effects
    }

    pub fn create_option(
        &mut self,
        available: &[SelectOption],
        selected: &mut Option<SelectOption>,
    ) -> SelectEffects {
        if !self.creatable {
            return SelectEffects::default();
        }
        let exact = dropdown_state::exact_match(&self.input, available, &[]);
        let Some(text) = dropdown_state::creatable_text(&self.input, exact) else {
            return SelectEffects::default();
        };

        let option = SelectOption::new(text);
        tracing::debug!(option = %option, "created option");
        *selected = Some(option.clone());
        let mut effects = SelectEffects {
            refresh: true,
            created: Some(option),
            selection_changed: true,
            ..SelectEffects::default()
        };
        effects.merge(self.set_opened(false));
        effects
    }

    pub fn menu(&self, available: &[SelectOption], selected: Option<&SelectOption>, button_height: f32) -> DropdownMenu {
        dropdown_state::single_menu(
            available,
            selected,
            &self.input,
            MenuConfig {
                creatable: self.creatable,
                max_item_displayed: self.max_item_displayed,
                row_height: button_height,
            },
        )
    }

    pub fn observe_rows(&mut self, visible: Range<usize>, menu: &DropdownMenu) -> SelectEffects {
        if self.scroll.on_menu_rows(visible, menu) {
            return SelectEffects {
                load_more: true,
                ..SelectEffects::default()
            };
        }
        SelectEffects::default()
    }
}
