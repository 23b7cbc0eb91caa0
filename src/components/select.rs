use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::ops::Range;
use std::rc::Rc;
use std::sync::{LazyLock, Mutex};

use futures::FutureExt;
use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use gpui::{
    AnyElement, App, FocusHandle, InteractiveElement, IntoElement, KeyDownEvent, MouseButton,
    ParentElement, RenderOnce, ScrollHandle, SharedString, StatefulInteractiveElement, Styled,
    Window, canvas, div, point, px,
};

use crate::i18n::I18nManager;
use crate::id::ComponentId;
use crate::measure::WindowTextMeasure;
use crate::theme::ComboboxTokens;

use super::control::{self, SCROLL_ANCHOR_SLOT, SCROLL_SLOT};
use super::dropdown_state::{DropdownMenu, MenuRow};
use super::scroll_trigger::{LoadMoreHandler, dispatch_load_more};
use super::select_control::{
    self, MultiSelectModel, MultiSelectOutcome, MultiSelectView, SingleSelectModel,
    SingleSelectOutcome, SingleSelectView,
};
use super::select_option::SelectOption;
use super::select_state::SelectEffects;
use super::shadow_buffer::pop_grapheme;

type SingleChangeHandler = Rc<dyn Fn(Option<SelectOption>, &mut Window, &mut App)>;
type MultiChangeHandler = Rc<dyn Fn(Vec<SelectOption>, &mut Window, &mut App)>;
type OpenChangeHandler = Rc<dyn Fn(bool, &mut Window, &mut App)>;
type CreateHandler = Rc<dyn Fn(SelectOption, &mut Window, &mut App)>;
type RowHandler = Rc<dyn Fn(MenuRow, &mut Window, &mut App)>;
type VisibleRowsHandler = Rc<dyn Fn(Range<usize>, &mut Window, &mut App)>;

static FOCUS_HANDLES: LazyLock<Mutex<HashMap<String, FocusHandle>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

thread_local! {
    static SCROLL_HANDLES: RefCell<HashMap<String, ScrollHandle>> = RefCell::new(HashMap::new());
}

fn focus_handle_for(id: &str, cx: &App) -> FocusHandle {
    if let Ok(mut handles) = FOCUS_HANDLES.lock() {
        return handles
            .entry(id.to_string())
            .or_insert_with(|| cx.focus_handle())
            .clone();
    }
    cx.focus_handle()
}

fn scroll_handle_for(id: &str) -> ScrollHandle {
    SCROLL_HANDLES.with(|handles| {
        handles
            .borrow_mut()
            .entry(id.to_string())
            .or_insert_with(ScrollHandle::new)
            .clone()
    })
}

fn hex(value: &str) -> gpui::Hsla {
    let digits = value.trim_start_matches('#');
    let Ok(raw) = u32::from_str_radix(digits, 16) else {
        return gpui::transparent_black();
    };
    if digits.len() == 8 {
        gpui::rgba(raw).into()
    } else {
        gpui::rgb(raw).into()
    }
}

/// Lets the load-more dispatcher spawn onto the window's foreground executor.
struct ForegroundSpawner(gpui::ForegroundExecutor);

impl LocalSpawn for ForegroundSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.0.spawn(future).detach();
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Callbacks {
    on_open_change: Option<OpenChangeHandler>,
    on_create: Option<CreateHandler>,
    on_scroll_bottom: Option<LoadMoreHandler>,
}

impl Callbacks {
    fn dispatch(
        &self,
        effects: &SelectEffects,
        focus: &FocusHandle,
        window: &mut Window,
        cx: &mut App,
    ) {
        if let Some(opened) = effects.opened {
            if opened {
                window.focus(focus, cx);
            } else {
                window.blur();
            }
            if let Some(handler) = self.on_open_change.as_ref() {
                (handler)(opened, window, cx);
            }
        }
        if let Some(created) = effects.created.clone()
            && let Some(handler) = self.on_create.as_ref()
        {
            (handler)(created, window, cx);
        }
        if effects.load_more {
            let spawner = ForegroundSpawner(cx.foreground_executor().clone());
            dispatch_load_more(self.on_scroll_bottom.as_ref(), &spawner);
        }
        if effects.refresh {
            window.refresh();
        }
    }
}

fn typed_text(event: &KeyDownEvent) -> Option<String> {
    let modifiers = &event.keystroke.modifiers;
    if modifiers.control || modifiers.platform || modifiers.function || modifiers.alt {
        return None;
    }
    event
        .keystroke
        .key_char
        .clone()
        .filter(|text| !text.chars().any(char::is_control))
}

fn render_menu(
    id: &ComponentId,
    menu: &DropdownMenu,
    tokens: &ComboboxTokens,
    i18n: &I18nManager,
    row_height: f32,
    on_row: RowHandler,
    on_visible: VisibleRowsHandler,
) -> AnyElement {
    let handle = scroll_handle_for(id);
    let max_scroll = (menu.rows.len() as f32 * row_height - menu.height).max(0.0);
    if control::bool_state(id, SCROLL_ANCHOR_SLOT, None, false) {
        let anchor_y = control::f32_state(id, SCROLL_SLOT, 0.0).clamp(0.0, max_scroll);
        handle.set_offset(point(px(0.0), px(-anchor_y)));
        control::set_bool_state(id, SCROLL_ANCHOR_SLOT, false);
    }

    let hover_bg = hex(tokens.option_hover_bg);
    let rows = menu
        .rows
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, row)| {
            let mut node = div()
                .id(id.slot_index("row", index))
                .flex()
                .flex_row()
                .items_center()
                .justify_between()
                .w_full()
                .h(px(row_height))
                .px(px(tokens.option_padding_x))
                .text_size(px(tokens.font_size))
                .text_color(hex(tokens.option_fg))
                .child(
                    div()
                        .flex_1()
                        .min_w_0()
                        .truncate()
                        .child(SharedString::from(row.label(i18n))),
                );

            if let MenuRow::Option { selected: true, .. } = &row {
                node = node.child(div().flex_none().child("\u{2713}"));
            }

            if row.is_actionable() {
                let on_row = on_row.clone();
                node = node
                    .cursor_pointer()
                    .hover(move |style| style.bg(hover_bg))
                    .on_click(move |_, window, cx| (on_row)(row.clone(), window, cx));
            } else {
                node = node.opacity(0.6);
            }
            node.into_any_element()
        })
        .collect::<Vec<_>>();

    let viewport_height = menu.height;
    let row_count = menu.rows.len();
    let id_for_monitor = id.clone();
    let handle_for_monitor = handle.clone();
    let mut dropdown = div()
        .id(id.slot("dropdown"))
        .relative()
        .flex()
        .flex_col()
        .w_full()
        .h(px(viewport_height))
        .rounded(px(tokens.control_radius))
        .bg(hex(tokens.dropdown_bg));
    dropdown = if menu.scroll_enabled {
        dropdown.overflow_y_scroll()
    } else {
        dropdown.overflow_hidden()
    };

    dropdown
        .track_scroll(&handle)
        .children(rows)
        .child(
            canvas(
                move |_bounds, window, cx| {
                    let scroll_y = (-f32::from(handle_for_monitor.offset().y)).max(0.0);
                    control::set_f32_state(&id_for_monitor, SCROLL_SLOT, scroll_y);
                    let visible = select_control::visible_rows(
                        scroll_y,
                        viewport_height,
                        row_height,
                        row_count,
                    );
                    (on_visible)(visible, window, cx);
                },
                |_, _, _, _| {},
            )
            .absolute()
            .size_full(),
        )
        .into_any_element()
}

fn render_caret(tokens: &ComboboxTokens) -> AnyElement {
    div()
        .flex_none()
        .w(px(tokens.cursor_width))
        .h(px(tokens.font_size))
        .bg(hex(tokens.cursor))
        .into_any_element()
}

/// Combobox with a single selected value and a free-text filter.
#[derive(IntoElement)]
pub struct SingleSelectBox {
    id: ComponentId,
    options: Vec<SelectOption>,
    value: Option<Option<SelectOption>>,
    default_value: Option<SelectOption>,
    opened: Option<bool>,
    default_opened: bool,
    placeholder: Option<SharedString>,
    tokens: ComboboxTokens,
    i18n: I18nManager,
    on_change: Option<SingleChangeHandler>,
    callbacks: Callbacks,
}

impl SingleSelectBox {
    #[track_caller]
    pub fn new() -> Self {
        Self {
            id: ComponentId::default(),
            options: Vec::new(),
            value: None,
            default_value: None,
            opened: None,
            default_opened: false,
            placeholder: None,
            tokens: ComboboxTokens::default(),
            i18n: I18nManager::default(),
            on_change: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = impl Into<SelectOption>>) -> Self {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn value(mut self, value: Option<SelectOption>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn default_value(mut self, value: impl Into<SelectOption>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn opened(mut self, value: bool) -> Self {
        self.opened = Some(value);
        self
    }

    pub fn default_opened(mut self, value: bool) -> Self {
        self.default_opened = value;
        self
    }

    pub fn placeholder(mut self, value: impl Into<SharedString>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn tokens(mut self, value: ComboboxTokens) -> Self {
        self.tokens = value;
        self
    }

    pub fn max_item_displayed(mut self, value: usize) -> Self {
        self.tokens.max_item_displayed = value;
        self
    }

    pub fn button_height(mut self, value: f32) -> Self {
        self.tokens.button_height = value;
        self
    }

    pub fn i18n(mut self, value: I18nManager) -> Self {
        self.i18n = value;
        self
    }

    pub fn on_change(
        mut self,
        handler: impl Fn(Option<SelectOption>, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_open_change(mut self, handler: impl Fn(bool, &mut Window, &mut App) + 'static) -> Self {
        self.callbacks.on_open_change = Some(Rc::new(handler));
        self
    }

    /// Enables option creation from free text.
    pub fn on_create(
        mut self,
        handler: impl Fn(SelectOption, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.callbacks.on_create = Some(Rc::new(handler));
        self
    }

    pub fn on_scroll_bottom<F>(mut self, handler: impl Fn() -> F + 'static) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        self.callbacks.on_scroll_bottom = Some(Rc::new(move || handler().boxed_local()));
        self
    }

    fn model(&self) -> SingleSelectModel {
        SingleSelectModel {
            id: self.id.to_string(),
            options: self.options.clone(),
            value: self.value.clone(),
            default_value: self.default_value.clone(),
            opened: self.opened,
            default_opened: self.default_opened,
            creatable: self.callbacks.on_create.is_some(),
            tokens: self.tokens.clone(),
        }
    }

    fn finish(
        outcome: SingleSelectOutcome,
        on_change: Option<&SingleChangeHandler>,
        callbacks: &Callbacks,
        focus: &FocusHandle,
        window: &mut Window,
        cx: &mut App,
    ) {
        if outcome.effects.selection_changed
            && let Some(handler) = on_change
        {
            (handler)(outcome.value.clone(), window, cx);
        }
        callbacks.dispatch(&outcome.effects, focus, window, cx);
    }

    fn render_control(
        &self,
        model: &Rc<SingleSelectModel>,
        view: &SingleSelectView,
        focus: &FocusHandle,
    ) -> AnyElement {
        let tokens = &self.tokens;
        let showing_placeholder = view.display_text.is_empty();
        let text = if showing_placeholder {
            self.placeholder
                .clone()
                .unwrap_or_else(|| self.i18n.t("combobox.placeholder").into())
        } else {
            SharedString::from(view.display_text.clone())
        };
        let text_color = if showing_placeholder {
            hex(tokens.placeholder)
        } else {
            hex(tokens.control_fg)
        };

        let mut field = div()
            .flex()
            .flex_row()
            .items_center()
            .flex_1()
            .min_w_0()
            .child(div().min_w_0().truncate().text_color(text_color).child(text));
        if view.focused {
            field = field.child(render_caret(tokens));
        }

        let mut control = div()
            .id(self.id.slot("control"))
            .track_focus(focus)
            .flex()
            .flex_row()
            .items_center()
            .gap(px(tokens.gap_column_width))
            .w_full()
            .h(px(tokens.button_height))
            .px(px(tokens.control_padding_x))
            .py(px(tokens.control_padding_y))
            .rounded(px(tokens.control_radius))
            .bg(hex(tokens.control_bg))
            .text_size(px(tokens.font_size))
            .cursor_pointer()
            .child(field);

        if view.clearable {
            let model = model.clone();
            let on_change = self.on_change.clone();
            let callbacks = self.callbacks.clone();
            let focus = focus.clone();
            control = control.child(
                div()
                    .id(self.id.slot("clear"))
                    .flex_none()
                    .text_color(hex(tokens.clear_icon))
                    .child("\u{2715}")
                    .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                        let outcome = model.apply(|state, _, _| state.clear_input());
                        Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
                        cx.stop_propagation();
                    }),
            );
        }

        control = control.child(
            div()
                .flex_none()
                .text_color(hex(tokens.control_fg))
                .child(if view.opened { "\u{25B4}" } else { "\u{25BE}" }),
        );

        let toggle_model = model.clone();
        let toggle_on_change = self.on_change.clone();
        let toggle_callbacks = self.callbacks.clone();
        let toggle_focus = focus.clone();
        let key_model = model.clone();
        let key_on_change = self.on_change.clone();
        let key_callbacks = self.callbacks.clone();
        let key_focus = focus.clone();
        control
            .on_click(move |_, window, cx| {
                let outcome = toggle_model.apply(|state, _, _| state.toggle());
                Self::finish(
                    outcome,
                    toggle_on_change.as_ref(),
                    &toggle_callbacks,
                    &toggle_focus,
                    window,
                    cx,
                );
            })
            .on_key_down(move |event, window, cx| {
                let outcome = match event.keystroke.key.as_str() {
                    "backspace" => key_model.apply(|state, _, _| {
                        let next = pop_grapheme(state.input()).to_string();
                        state.edit(next)
                    }),
                    "escape" => key_model.apply(|state, _, _| state.dismiss()),
                    key if control::is_submit_key(key) => {
                        key_model.apply(|state, options, value| state.submit(options, value))
                    }
                    _ => {
                        let Some(text) = typed_text(event) else {
                            return;
                        };
                        key_model.apply(|state, _, _| {
                            let next = format!("{}{text}", state.input());
                            state.edit(next)
                        })
                    }
                };
                Self::finish(
                    outcome,
                    key_on_change.as_ref(),
                    &key_callbacks,
                    &key_focus,
                    window,
                    cx,
                );
                cx.stop_propagation();
            })
            .into_any_element()
    }
}

impl Default for SingleSelectBox {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOnce for SingleSelectBox {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let model = Rc::new(self.model());
        let view = model.view();
        let focus = focus_handle_for(&self.id, cx);
        let tokens = &self.tokens;

        let mut root = div()
            .id(self.id.clone())
            .relative()
            .flex()
            .flex_col()
            .gap(px(tokens.dropdown_offset))
            .w_full()
            .child(self.render_control(&model, &view, &focus));

        if view.opened {
            let on_row: RowHandler = {
                let model = model.clone();
                let on_change = self.on_change.clone();
                let callbacks = self.callbacks.clone();
                let focus = focus.clone();
                Rc::new(move |row, window, cx| {
                    let outcome = match row {
                        MenuRow::Option { option, .. } => {
                            model.apply(|state, _, value| state.select(option, value))
                        }
                        MenuRow::Create(_) => model
                            .apply(|state, options, value| state.create_option(options, value)),
                        MenuRow::NoOptionFound | MenuRow::AlreadyAdded => return,
                    };
                    Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
                })
            };
            let on_visible: VisibleRowsHandler = {
                let model = model.clone();
                let callbacks = self.callbacks.clone();
                let focus = focus.clone();
                Rc::new(move |visible, window, cx| {
                    let effects = model.observe_rows(visible);
                    callbacks.dispatch(&effects, &focus, window, cx);
                })
            };
            root = root.child(render_menu(
                &self.id,
                &view.menu,
                tokens,
                &self.i18n,
                tokens.button_height,
                on_row,
                on_visible,
            ));

            let on_change = self.on_change.clone();
            let callbacks = self.callbacks.clone();
            root = root.on_mouse_down_out(move |_, window, cx| {
                let outcome = model.apply(|state, options, value| {
                    let mut effects = state.blur(options, value);
                    effects.merge(state.dismiss());
                    effects
                });
                Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
            });
        }

        root
    }
}

/// Combobox whose selected options render as wrapping tags in front of the
/// free-text field.
#[derive(IntoElement)]
pub struct MultiSelectBox {
    id: ComponentId,
    options: Vec<SelectOption>,
    selected: Option<Vec<SelectOption>>,
    default_selected: Vec<SelectOption>,
    opened: Option<bool>,
    default_opened: bool,
    placeholder: Option<SharedString>,
    tokens: ComboboxTokens,
    i18n: I18nManager,
    on_change: Option<MultiChangeHandler>,
    callbacks: Callbacks,
}

impl MultiSelectBox {
    #[track_caller]
    pub fn new() -> Self {
        Self {
            id: ComponentId::default(),
            options: Vec::new(),
            selected: None,
            default_selected: Vec::new(),
            opened: None,
            default_opened: false,
            placeholder: None,
            tokens: ComboboxTokens::default(),
            i18n: I18nManager::default(),
            on_change: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = impl Into<SelectOption>>) -> Self {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn selected(mut self, values: impl IntoIterator<Item = impl Into<SelectOption>>) -> Self {
        self.selected = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_selected(
        mut self,
        values: impl IntoIterator<Item = impl Into<SelectOption>>,
    ) -> Self {
        self.default_selected = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn opened(mut self, value: bool) -> Self {
        self.opened = Some(value);
        self
    }

    pub fn default_opened(mut self, value: bool) -> Self {
        self.default_opened = value;
        self
    }

    pub fn placeholder(mut self, value: impl Into<SharedString>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    pub fn tokens(mut self, value: ComboboxTokens) -> Self {
        self.tokens = value;
        self
    }

    pub fn max_item_displayed(mut self, value: usize) -> Self {
        self.tokens.max_item_displayed = value;
        self
    }

    pub fn option_height(mut self, value: f32) -> Self {
        self.tokens.option_height = value;
        self
    }

    pub fn i18n(mut self, value: I18nManager) -> Self {
        self.i18n = value;
        self
    }

    pub fn on_change(
        mut self,
        handler: impl Fn(Vec<SelectOption>, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_open_change(mut self, handler: impl Fn(bool, &mut Window, &mut App) + 'static) -> Self {
        self.callbacks.on_open_change = Some(Rc::new(handler));
        self
    }

    /// Enables option creation from free text.
    pub fn on_create(
        mut self,
        handler: impl Fn(SelectOption, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.callbacks.on_create = Some(Rc::new(handler));
        self
    }

    pub fn on_scroll_bottom<F>(mut self, handler: impl Fn() -> F + 'static) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        self.callbacks.on_scroll_bottom = Some(Rc::new(move || handler().boxed_local()));
        self
    }

    fn model(&self) -> MultiSelectModel {
        MultiSelectModel {
            id: self.id.to_string(),
            options: self.options.clone(),
            selected: self.selected.clone(),
            default_selected: self.default_selected.clone(),
            opened: self.opened,
            default_opened: self.default_opened,
            creatable: self.callbacks.on_create.is_some(),
            tokens: self.tokens.clone(),
        }
    }

    fn finish(
        outcome: MultiSelectOutcome,
        on_change: Option<&MultiChangeHandler>,
        callbacks: &Callbacks,
        focus: &FocusHandle,
        window: &mut Window,
        cx: &mut App,
    ) {
        if outcome.effects.selection_changed
            && let Some(handler) = on_change
        {
            (handler)(outcome.selected.clone(), window, cx);
        }
        callbacks.dispatch(&outcome.effects, focus, window, cx);
    }

    fn render_tag(
        &self,
        tag: &select_control::TagView,
        model: &Rc<MultiSelectModel>,
        focus: &FocusHandle,
    ) -> AnyElement {
        let tokens = &self.tokens;
        let bg = if tag.highlighted {
            hex(tokens.tag_highlight_bg)
        } else {
            hex(tokens.tag_bg)
        };
        let model = model.clone();
        let option = tag.option.clone();
        let on_change = self.on_change.clone();
        let callbacks = self.callbacks.clone();
        let focus = focus.clone();
        div()
            .id(self.id.slot_index("tag", tag.option.text()))
            .flex_none()
            .px(px(tokens.tag_padding_x()))
            .py(px(tokens.tag_padding_y()))
            .rounded(px(tokens.tag_radius))
            .bg(bg)
            .text_color(hex(tokens.field_fg))
            .child(SharedString::from(tag.label.clone()))
            .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                let outcome = model.apply(|state, _, selected| state.tap_tag(&option, selected));
                Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
                cx.stop_propagation();
            })
            .into_any_element()
    }

    fn render_field(
        &self,
        model: &Rc<MultiSelectModel>,
        view: &MultiSelectView,
        focus: &FocusHandle,
    ) -> AnyElement {
        let tokens = &self.tokens;
        let mut rows = view
            .rows
            .iter()
            .map(|row| {
                div()
                    .flex()
                    .flex_row()
                    .items_center()
                    .gap(px(tokens.tag_spacing()))
                    .children(row.iter().map(|tag| self.render_tag(tag, model, focus)))
            })
            .collect::<Vec<_>>();

        let mut input = div().flex().flex_row().items_center().min_w_0();
        if view.rows.is_empty() && view.free_text.is_empty() && !view.focused {
            let placeholder = self
                .placeholder
                .clone()
                .unwrap_or_else(|| self.i18n.t("combobox.placeholder").into());
            input = input.text_color(hex(tokens.placeholder)).child(placeholder);
        } else {
            input = input.child(SharedString::from(view.free_text.clone()));
        }
        if view.caret_visible {
            input = input.child(render_caret(tokens));
        }
        match rows.pop() {
            Some(last) => rows.push(last.child(input)),
            None => rows.push(div().flex().flex_row().items_center().child(input)),
        }

        let width_model = model.clone();
        let tap_model = model.clone();
        let tap_on_change = self.on_change.clone();
        let tap_callbacks = self.callbacks.clone();
        let tap_focus = focus.clone();
        let key_model = model.clone();
        let key_on_change = self.on_change.clone();
        let key_callbacks = self.callbacks.clone();
        let key_focus = focus.clone();
        div()
            .id(self.id.slot("field"))
            .track_focus(focus)
            .relative()
            .flex()
            .flex_col()
            .gap(px(tokens.tag_row_spacing()))
            .w_full()
            .px(px(tokens.text_field_padding_x))
            .py(px(tokens.text_field_padding_y))
            .rounded(px(tokens.control_radius))
            .bg(hex(tokens.field_bg))
            .text_color(hex(tokens.field_fg))
            .text_size(px(tokens.font_size))
            .cursor_text()
            .children(rows)
            .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                let outcome = tap_model.apply(|state, _, _| state.tap_body());
                Self::finish(
                    outcome,
                    tap_on_change.as_ref(),
                    &tap_callbacks,
                    &tap_focus,
                    window,
                    cx,
                );
            })
            .on_key_down(move |event, window, cx| {
                let outcome = match event.keystroke.key.as_str() {
                    "backspace" => key_model.apply(|state, _, selected| state.backspace(selected)),
                    "escape" => key_model.apply(|state, _, _| state.dismiss()),
                    key if control::is_submit_key(key) => {
                        key_model.apply(|state, options, selected| state.submit(options, selected))
                    }
                    _ => {
                        let Some(text) = typed_text(event) else {
                            return;
                        };
                        key_model.apply(|state, _, selected| state.type_text(&text, selected))
                    }
                };
                Self::finish(
                    outcome,
                    key_on_change.as_ref(),
                    &key_callbacks,
                    &key_focus,
                    window,
                    cx,
                );
                cx.stop_propagation();
            })
            .child(
                canvas(
                    move |bounds, window, _cx| {
                        let width = f32::from(bounds.size.width);
                        let outcome = width_model.apply(|state, _, _| state.resize(width));
                        if outcome.effects.refresh {
                            window.refresh();
                        }
                    },
                    |_, _, _, _| {},
                )
                .absolute()
                .size_full(),
            )
            .into_any_element()
    }
}

impl Default for MultiSelectBox {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOnce for MultiSelectBox {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let model = Rc::new(self.model());
        let view = {
            let measure = WindowTextMeasure::new(window, self.tokens.font_size);
            model.view(&measure)
        };
        let focus = focus_handle_for(&self.id, cx);
        let tokens = &self.tokens;

        let mut root = div()
            .id(self.id.clone())
            .relative()
            .flex()
            .flex_col()
            .gap(px(tokens.dropdown_offset))
            .w_full()
            .child(self.render_field(&model, &view, &focus));

        if view.opened {
            let on_row: RowHandler = {
                let model = model.clone();
                let on_change = self.on_change.clone();
                let callbacks = self.callbacks.clone();
                let focus = focus.clone();
                Rc::new(move |row, window, cx| {
                    let outcome = match row {
                        MenuRow::Option { option, .. } => {
                            model.apply(|state, _, selected| state.select(option, selected))
                        }
                        MenuRow::Create(_) => model.apply(|state, options, selected| {
                            state.create_option(options, selected)
                        }),
                        MenuRow::NoOptionFound | MenuRow::AlreadyAdded => return,
                    };
                    Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
                })
            };
            let on_visible: VisibleRowsHandler = {
                let model = model.clone();
                let callbacks = self.callbacks.clone();
                let focus = focus.clone();
                Rc::new(move |visible, window, cx| {
                    let effects = model.observe_rows(visible);
                    callbacks.dispatch(&effects, &focus, window, cx);
                })
            };
            root = root.child(render_menu(
                &self.id,
                &view.menu,
                tokens,
                &self.i18n,
                tokens.option_height,
                on_row,
                on_visible,
            ));

            let on_change = self.on_change.clone();
            let callbacks = self.callbacks.clone();
            root = root.on_mouse_down_out(move |_, window, cx| {
                let outcome = model.apply(|state, options, selected| {
                    let mut effects = state.blur(options, selected);
                    effects.merge(state.dismiss());
                    effects
                });
                Self::finish(outcome, on_change.as_ref(), &callbacks, &focus, window, cx);
            });
        }

        root
    }
}
