use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::measure::TextMeasure;
use crate::theme::ComboboxTokens;

use super::dropdown_state::{self, DropdownMenu, MenuConfig};
use super::scroll_trigger::ScrollTrigger;
use super::select_option::{self, SelectOption};
use super::select_state::SelectEffects;
use super::shadow_buffer::{self, EditKind, ShadowBuffer};
use super::tag_layout::{TagArrangement, TagLayout};
use super::update_queue::{FreeText, Recompute, UpdateQueue};

/// Multi-select combobox: selected options rendered as wrapping tags in
/// front of a free-text field.
///
/// Edits arrive as whole replacement texts of the shadow buffer. Anything
/// that depends on text measurement is queued and resolved by [`flush`],
/// which the host runs before painting.
///
/// [`flush`]: MultiSelectState::flush
#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelectState {
    tokens: ComboboxTokens,
    creatable: bool,
    opened: bool,
    focused: bool,
    highlighted: Option<SelectOption>,
    container_width: f32,
    arrangement: TagArrangement,
    buffer: ShadowBuffer,
    restore_free_text: Option<String>,
    queue: UpdateQueue,
    scroll: ScrollTrigger,
}

impl Default for MultiSelectState {
    fn default() -> Self {
        Self::new(ComboboxTokens::default(), false)
    }
}

impl MultiSelectState {
    pub fn new(tokens: ComboboxTokens, creatable: bool) -> Self {
        Self {
            tokens,
            creatable,
            opened: false,
            focused: false,
            highlighted: None,
            container_width: 0.0,
            arrangement: TagArrangement::default(),
            buffer: ShadowBuffer::default(),
            restore_free_text: None,
            queue: UpdateQueue::default(),
            scroll: ScrollTrigger::default(),
        }
    }

    pub fn mount(&mut self, opened: bool) -> SelectEffects {
        self.opened = opened;
        self.focused = opened;
        self.highlighted = None;
        self.restore_free_text = None;
        self.queue.push(Recompute::Arrangement);
        self.queue.push(Recompute::Format(FreeText::Clear));
        SelectEffects::refresh()
    }

    pub fn set_creatable(&mut self, creatable: bool) {
        self.creatable = creatable;
    }

    pub fn set_tokens(&mut self, tokens: ComboboxTokens) {
        if self.tokens != tokens {
            self.tokens = tokens;
            self.queue.push(Recompute::Arrangement);
            self.queue.push(Recompute::Format(FreeText::Restore));
        }
    }

    pub fn tokens(&self) -> &ComboboxTokens {
        &self.tokens
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn highlighted(&self) -> Option<&SelectOption> {
        self.highlighted.as_ref()
    }

    /// The caret is hidden while a tag is armed for deletion.
    pub fn caret_visible(&self) -> bool {
        self.focused && self.highlighted.is_none()
    }

    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    pub fn arrangement(&self) -> &TagArrangement {
        &self.arrangement
    }

    pub fn buffer(&self) -> &ShadowBuffer {
        &self.buffer
    }

    pub fn free_text(&self) -> String {
        self.buffer.free_text()
    }

    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn toggle(&mut self) -> SelectEffects {
        self.set_opened(!self.opened)
    }

    pub fn dismiss(&mut self) -> SelectEffects {
        self.set_opened(false)
    }

    /// Open or close the dropdown. Focus follows; closing drops the highlight
    /// and clears the free text.
    pub fn set_opened(&mut self, next: bool) -> SelectEffects {
        if self.opened == next {
            return SelectEffects::default();
        }
        self.opened = next;
        self.focused = next;
        if !next {
            self.highlighted = None;
            self.scroll.reset();
            self.queue.push(Recompute::Format(FreeText::Clear));
        }
        tracing::debug!(opened = next, "multi select dropdown changed");
        SelectEffects {
            refresh: true,
            opened: Some(next),
            ..SelectEffects::default()
        }
    }

    /// Focus left the field. An open dropdown commits any new free text when
    /// creation is enabled and then closes.
    pub fn blur(
        &mut self,
        available: &[SelectOption],
        selected: &mut Vec<SelectOption>,
    ) -> SelectEffects {
        if !self.focused {
            return SelectEffects::default();
        }
        self.focused = false;
        let mut effects = SelectEffects::refresh();
        if !self.opened {
            return effects;
        }
        effects.merge(self.create_option(available, selected));
        effects.merge(self.set_opened(false));
        effects
    }

    pub fn submit(
        &mut self,
        available: &[SelectOption],
        selected: &mut Vec<SelectOption>,
    ) -> SelectEffects {
        self.blur(available, selected)
    }

    pub fn select(
        &mut self,
        option: SelectOption,
        selected: &mut Vec<SelectOption>,
    ) -> SelectEffects {
        let mut effects = SelectEffects::refresh();
        if !select_option::contains(selected, &option) {
            tracing::debug!(option = %option, "tag added");
            selected.push(option);
            self.queue.push(Recompute::Arrangement);
            effects.selection_changed = true;
        }
        effects.merge(self.set_opened(false));
        effects
    }

    pub fn create_option(
        &mut self,
        available: &[SelectOption],
        selected: &mut Vec<SelectOption>,
    ) -> SelectEffects {
        if !self.creatable {
            return SelectEffects::default();
        }
        let free_text = self.free_text();
        let exact = dropdown_state::exact_match(&free_text, available, selected);
        let Some(text) = dropdown_state::creatable_text(&free_text, exact) else {
            return SelectEffects::default();
        };

        let option = SelectOption::new(text);
        tracing::debug!(option = %option, "created option");
        selected.push(option.clone());
        self.queue.push(Recompute::Arrangement);
        let mut effects = SelectEffects {
            refresh: true,
            created: Some(option),
            selection_changed: true,
            ..SelectEffects::default()
        };
        effects.merge(self.set_opened(false));
        effects
    }

    /// Tap on a rendered tag: arm it for deletion and force the dropdown open.
    pub fn tap_tag(&mut self, option: &SelectOption, selected: &[SelectOption]) -> SelectEffects {
        if !select_option::contains(selected, option) {
            return SelectEffects::default();
        }
        self.highlighted = Some(option.clone());
        let mut effects = SelectEffects::refresh();
        effects.merge(self.set_opened(true));
        effects
    }

    /// A tap on the field outside any tag disarms a highlighted tag and
    /// flips the dropdown.
    pub fn tap_body(&mut self) -> SelectEffects {
        let mut effects = SelectEffects::default();
        if self.highlighted.take().is_some() {
            effects.merge(SelectEffects::refresh());
        }
        effects.merge(self.toggle());
        effects
    }

    /// Apply a whole-text edit of the shadow buffer.
    pub fn edit(&mut self, text: impl Into<String>, selected: &mut Vec<SelectOption>) -> SelectEffects {
        let text = text.into();
        let kind = self
            .buffer
            .classify(self.buffer.text(), &text, self.highlighted.as_ref());
        if kind == EditKind::Unchanged && text == self.buffer.text() {
            return SelectEffects::default();
        }
        self.buffer.set_text(text);

        let mut effects = SelectEffects::refresh();
        match kind {
            EditKind::Programmatic | EditKind::Unchanged => {}
            EditKind::Insert => self.highlighted = None,
            EditKind::DeleteHighlighted { option, free_text } => {
                self.highlighted = None;
                self.restore_free_text = Some(free_text);
                let before = selected.len();
                selected.retain(|candidate| candidate != &option);
                if selected.len() != before {
                    tracing::debug!(option = %option, "tag removed");
                    effects.selection_changed = true;
                }
                self.queue.push(Recompute::Arrangement);
                self.queue.push(Recompute::Format(FreeText::Restore));
            }
            EditKind::Highlight(option) => {
                tracing::trace!(option = %option, "tag armed for deletion");
                self.highlighted = Some(option);
                effects.merge(self.set_opened(true));
            }
        }
        effects
    }

    /// Keyboard input, applied one grapheme at a time.
    pub fn type_text(&mut self, input: &str, selected: &mut Vec<SelectOption>) -> SelectEffects {
        let mut effects = SelectEffects::default();
        for grapheme in input.graphemes(true) {
            let next = format!("{}{}", self.buffer.text(), grapheme);
            effects.merge(self.edit(next, selected));
        }
        effects
    }

    pub fn backspace(&mut self, selected: &mut Vec<SelectOption>) -> SelectEffects {
        let next = shadow_buffer::pop_grapheme(self.buffer.text()).to_string();
        self.edit(next, selected)
    }

    /// The measured field width changed.
    pub fn resize(&mut self, width: f32) -> SelectEffects {
        let width = width.max(0.0);
        if (width - self.container_width).abs() < 0.5 {
            return SelectEffects::default();
        }
        tracing::trace!(width, "multi select container resized");
        self.container_width = width;
        self.queue.push(Recompute::Arrangement);
        self.queue.push(Recompute::Format(FreeText::Restore));
        SelectEffects::refresh()
    }

    /// Queue a re-layout when the caller's selection no longer matches the
    /// arranged tags.
    pub fn sync_selected(&mut self, selected: &[SelectOption]) -> bool {
        if self.arrangement.matches(selected) {
            return false;
        }
        self.queue.push(Recompute::Arrangement);
        true
    }

    /// Drain queued recomputations. Returns whether the tags or the shadow
    /// text changed.
    pub fn flush(&mut self, selected: &[SelectOption], measure: &dyn TextMeasure) -> bool {
        self.sync_selected(selected);
        if let Some(highlighted) = &self.highlighted
            && !select_option::contains(selected, highlighted)
        {
            self.highlighted = None;
        }

        let mut changed = false;
        while let Some(task) = self.queue.pop() {
            match task {
                Recompute::Arrangement => {
                    let next = TagLayout::for_container(self.container_width, &self.tokens)
                        .arrange(selected, measure);
                    if next != self.arrangement {
                        self.arrangement = next;
                        self.queue.push(Recompute::Format(FreeText::Restore));
                        changed = true;
                    }
                }
                Recompute::Format(free) => {
                    let free_text = match free {
                        FreeText::Clear => String::new(),
                        FreeText::Restore => self
                            .restore_free_text
                            .take()
                            .unwrap_or_else(|| self.buffer.free_text()),
                    };
                    let next = ShadowBuffer::format(
                        &self.arrangement,
                        &free_text,
                        self.container_width,
                        &self.tokens,
                        measure,
                    );
                    if next != self.buffer {
                        self.buffer = next;
                        changed = true;
                    }
                }
            }
        }
        if changed {
            tracing::trace!(rows = self.arrangement.row_count(), "multi select reformatted");
        }
        changed
    }

    pub fn menu(&self, available: &[SelectOption], selected: &[SelectOption]) -> DropdownMenu {
        dropdown_state::multi_menu(
            available,
            selected,
            &self.free_text(),
            MenuConfig {
                creatable: self.creatable,
                max_item_displayed: self.tokens.max_item_displayed,
                row_height: self.tokens.option_height,
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
