use std::sync::{LazyLock, Mutex, MutexGuard};

use super::control::{self, SCROLL_ANCHOR_SLOT, SCROLL_SLOT, SELECTED_SLOT};
use super::dropdown_state::MenuRow;
use super::select_control::{self, MultiSelectModel, SingleSelectModel};
use super::select_option::{SelectOption, from_texts};
use crate::measure::MonospaceMeasure;

static STATE_TEST_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

const MEASURE: MonospaceMeasure = MonospaceMeasure::new(10.0);

struct StateTestGuard {
    _lock: MutexGuard<'static, ()>,
}

fn guard() -> StateTestGuard {
    let lock = match STATE_TEST_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    control::clear_all();
    StateTestGuard { _lock: lock }
}

impl Drop for StateTestGuard {
    fn drop(&mut self) {
        control::clear_all();
    }
}

fn numbered_options(count: usize) -> Vec<SelectOption> {
    (1..=count)
        .map(|index| SelectOption::new(format!("option {index}")))
        .collect()
}

fn multi_model(id: &str) -> MultiSelectModel {
    let mut model = MultiSelectModel::new(id);
    model.options = from_texts(["A", "B", "C"]);
    model.default_selected = from_texts(["A", "B"]);
    model.default_opened = true;
    model
}

/// Mount the model and publish a container width, as the first two render
/// passes of an element do.
fn mounted_multi(model: &MultiSelectModel, width: f32) {
    model.view(&MEASURE);
    model.apply(|state, _, _| state.resize(width));
    model.view(&MEASURE);
}

#[test]
fn control_slots_fall_back_to_defaults_and_respect_controlled_values() {
    let _guard = guard();
    assert!(control::bool_state("box", "opened", None, true));
    control::set_bool_state("box", "opened", false);
    assert!(!control::bool_state("box", "opened", None, true));
    assert!(control::bool_state("box", "opened", Some(true), false));

    let stored = control::options_state("box", SELECTED_SLOT, None, from_texts(["a"]));
    assert_eq!(stored, from_texts(["a"]));
    let controlled = control::options_state("box", SELECTED_SLOT, Some(Vec::new()), Vec::new());
    assert!(controlled.is_empty());

    assert_eq!(control::f32_state("box", SCROLL_SLOT, 3.0), 3.0);
    assert!(control::is_submit_key("enter"));
    assert!(!control::is_submit_key("space"));
}

#[test]
fn uncontrolled_multi_select_removes_tag_in_two_backspaces() {
    let _guard = guard();
    let model = multi_model("multi-delete");
    mounted_multi(&model, 200.0);

    let first = model.apply(|state, _, selected| state.backspace(selected));
    assert!(!first.effects.selection_changed);
    let view = model.view(&MEASURE);
    assert!(view.rows[0][1].highlighted);
    assert!(!view.caret_visible);

    let second = model.apply(|state, _, selected| state.backspace(selected));
    assert!(second.effects.selection_changed);
    assert_eq!(second.selected, from_texts(["A"]));

    let view = model.view(&MEASURE);
    assert_eq!(view.selected, from_texts(["A"]));
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].len(), 1);
    assert!(view.caret_visible);
}

#[test]
fn controlled_multi_select_reports_but_does_not_store() {
    let _guard = guard();
    let mut model = multi_model("multi-controlled");
    model.selected = Some(from_texts(["C"]));
    mounted_multi(&model, 200.0);

    let outcome = model.apply(|state, _, selected| state.select(SelectOption::new("A"), selected));
    assert!(outcome.effects.selection_changed);
    assert_eq!(outcome.selected, from_texts(["C", "A"]));
    assert_eq!(model.view(&MEASURE).selected, from_texts(["C"]));
}

#[test]
fn selecting_from_menu_closes_and_hides_chosen_option() {
    let _guard = guard();
    let model = multi_model("multi-select-row");
    mounted_multi(&model, 300.0);

    let view = model.view(&MEASURE);
    assert_eq!(
        view.menu.rows,
        vec![MenuRow::Option {
            option: SelectOption::new("C"),
            selected: false,
        }]
    );

    let outcome = model.apply(|state, _, selected| state.select(SelectOption::new("C"), selected));
    assert_eq!(outcome.effects.opened, Some(false));
    let view = model.view(&MEASURE);
    assert!(!view.opened);
    assert_eq!(view.selected, from_texts(["A", "B", "C"]));
    assert_eq!(view.menu.rows, vec![MenuRow::NoOptionFound]);
}

#[test]
fn typed_exact_match_shows_single_row_without_create_prompt() {
    let _guard = guard();
    let mut model = MultiSelectModel::new("multi-exact");
    model.options = numbered_options(10);
    model.default_selected = numbered_options(5);
    model.default_selected.extend(from_texts(["custom a", "custom b"]));
    model.default_opened = true;
    mounted_multi(&model, 800.0);

    model.apply(|state, _, selected| state.type_text("option 6", selected));
    let view = model.view(&MEASURE);
    assert_eq!(view.free_text, "option 6");
    assert!(view.menu.exact_match);
    assert_eq!(view.menu.visible_row_count, 1);
    assert_eq!(view.menu.filtered, from_texts(["option 6"]));
    assert!(
        !view
            .menu
            .rows
            .iter()
            .any(|row| matches!(row, MenuRow::Create(_)))
    );
}

#[test]
fn creatable_multi_select_offers_and_commits_new_text() {
    let _guard = guard();
    let mut model = multi_model("multi-create");
    model.creatable = true;
    mounted_multi(&model, 300.0);

    model.apply(|state, _, selected| state.type_text("Zed", selected));
    let view = model.view(&MEASURE);
    assert_eq!(view.menu.rows, vec![MenuRow::Create("Zed".into())]);
    assert_eq!(view.menu.visible_row_count, 1);

    let outcome = model.apply(|state, options, selected| state.submit(options, selected));
    assert_eq!(outcome.effects.created, Some(SelectOption::new("Zed")));
    assert_eq!(outcome.effects.opened, Some(false));

    let view = model.view(&MEASURE);
    assert_eq!(view.selected, from_texts(["A", "B", "Zed"]));
    assert_eq!(view.free_text, "");
}

#[test]
fn creatable_exact_match_of_selected_reports_already_added() {
    let _guard = guard();
    let mut model = multi_model("multi-already-added");
    model.creatable = true;
    mounted_multi(&model, 300.0);

    model.apply(|state, _, selected| state.type_text("A", selected));
    let view = model.view(&MEASURE);
    assert_eq!(view.menu.rows, vec![MenuRow::AlreadyAdded]);

    let outcome = model.apply(|state, options, selected| state.create_option(options, selected));
    assert!(outcome.effects.is_empty());
}

#[test]
fn narrow_container_truncates_long_tag_label() {
    let _guard = guard();
    let mut model = MultiSelectModel::new("multi-overflow");
    model.default_selected = from_texts(["SelectOptionSelectOption"]);
    mounted_multi(&model, 100.0);

    let view = model.view(&MEASURE);
    assert_eq!(view.rows[0][0].label, "Sele...");
    assert_eq!(view.rows[0][0].option.text(), "SelectOptionSelectOption");

    model.apply(|state, _, _| state.resize(400.0));
    let view = model.view(&MEASURE);
    assert_eq!(view.rows[0][0].label, "SelectOptionSelectOption");
}

#[test]
fn tag_tap_while_closed_reopens_dropdown() {
    let _guard = guard();
    let model = multi_model("multi-tap");
    mounted_multi(&model, 200.0);
    model.apply(|state, _, _| state.dismiss());
    assert!(!model.view(&MEASURE).opened);

    let outcome = model.apply(|state, _, selected| state.tap_tag(&SelectOption::new("A"), selected));
    assert_eq!(outcome.effects.opened, Some(true));
    let view = model.view(&MEASURE);
    assert!(view.opened);
    assert!(view.rows[0][0].highlighted);
    assert!(control::bool_state("multi-tap", SCROLL_ANCHOR_SLOT, None, false));
}

#[test]
fn field_tap_disarms_highlighted_tag_and_toggles_dropdown() {
    let _guard = guard();
    let model = multi_model("multi-body-tap");
    mounted_multi(&model, 200.0);
    model.apply(|state, _, selected| state.tap_tag(&SelectOption::new("B"), selected));
    assert!(model.view(&MEASURE).rows[0][1].highlighted);

    let outcome = model.apply(|state, _, _| state.tap_body());
    assert_eq!(outcome.effects.opened, Some(false));
    let view = model.view(&MEASURE);
    assert!(!view.opened);
    assert!(view.rows.iter().flatten().all(|tag| !tag.highlighted));

    let outcome = model.apply(|state, _, selected| {
        let mut effects = state.tap_body();
        effects.merge(state.backspace(selected));
        effects
    });
    assert_eq!(outcome.effects.opened, Some(true));
    assert!(!outcome.effects.selection_changed);
    assert_eq!(outcome.selected, from_texts(["A", "B"]));
    assert!(model.view(&MEASURE).opened);
}

#[test]
fn controlled_open_flag_wins_over_internal_transitions() {
    let _guard = guard();
    let mut model = multi_model("multi-open-controlled");
    model.opened = Some(true);
    mounted_multi(&model, 200.0);

    let outcome = model.apply(|state, _, _| state.dismiss());
    assert_eq!(outcome.effects.opened, Some(false));
    assert!(model.view(&MEASURE).opened);
}

#[test]
fn multi_select_requests_more_once_per_last_row_appearance() {
    let _guard = guard();
    let mut model = MultiSelectModel::new("multi-scroll");
    model.options = numbered_options(8);
    model.default_opened = true;
    mounted_multi(&model, 300.0);

    let rows = model.view(&MEASURE).menu.rows.len();
    assert_eq!(rows, 8);
    assert!(!model.observe_rows(0..3).load_more);
    assert!(model.observe_rows(5..8).load_more);
    assert!(!model.observe_rows(5..8).load_more);
    assert!(!model.observe_rows(2..5).load_more);
    assert!(model.observe_rows(5..8).load_more);
}

#[test]
fn single_select_commits_choice_into_store() {
    let _guard = guard();
    let mut model = SingleSelectModel::new("single-choice");
    model.options = from_texts(["Option 1", "Option 2"]);
    model.default_opened = true;

    let view = model.view();
    assert!(view.opened);
    assert!(view.focused);
    assert_eq!(view.display_text, "");

    let outcome = model.apply(|state, _, value| state.select(SelectOption::new("Option 2"), value));
    assert!(outcome.effects.selection_changed);
    assert_eq!(outcome.value, Some(SelectOption::new("Option 2")));

    let view = model.view();
    assert!(!view.opened);
    assert_eq!(view.display_text, "Option 2");
    assert_eq!(view.value, Some(SelectOption::new("Option 2")));
}

#[test]
fn single_select_filters_and_marks_selected_row() {
    let _guard = guard();
    let mut model = SingleSelectModel::new("single-filter");
    model.options = from_texts(["Option 1", "Option 2", "Other"]);
    model.default_value = Some(SelectOption::new("Option 2"));
    model.default_opened = true;

    model.apply(|state, _, _| state.edit("opt"));
    let view = model.view();
    assert_eq!(view.display_text, "opt");
    assert!(view.clearable);
    assert_eq!(
        view.menu.rows,
        vec![
            MenuRow::Option {
                option: SelectOption::new("Option 1"),
                selected: false,
            },
            MenuRow::Option {
                option: SelectOption::new("Option 2"),
                selected: true,
            },
        ]
    );
}

#[test]
fn single_select_creates_on_blur_only_with_handler() {
    let _guard = guard();
    let mut model = SingleSelectModel::new("single-create");
    model.options = from_texts(["Foo"]);
    model.default_opened = true;
    model.creatable = true;

    model.apply(|state, _, _| state.edit("Bar"));
    let outcome = model.apply(|state, options, value| state.blur(options, value));
    assert_eq!(outcome.effects.created, Some(SelectOption::new("Bar")));
    assert_eq!(model.view().value, Some(SelectOption::new("Bar")));

    let mut plain = SingleSelectModel::new("single-plain");
    plain.options = from_texts(["Foo"]);
    plain.default_opened = true;
    plain.apply(|state, _, _| state.edit("Bar"));
    let outcome = plain.apply(|state, options, value| state.blur(options, value));
    assert_eq!(outcome.effects.created, None);
    assert_eq!(plain.view().value, None);
}

#[test]
fn opening_single_select_anchors_scroll_on_selected_option() {
    let _guard = guard();
    let mut model = SingleSelectModel::new("single-anchor");
    model.options = numbered_options(10);
    model.default_value = Some(SelectOption::new("option 4"));

    model.apply(|state, _, _| state.toggle());
    let anchor = control::f32_state("single-anchor", SCROLL_SLOT, 0.0);
    assert_eq!(anchor, 3.0 * model.tokens.button_height);
    assert!(control::bool_state("single-anchor", SCROLL_ANCHOR_SLOT, None, false));
}

#[test]
fn visible_rows_follow_scroll_offset() {
    assert_eq!(select_control::visible_rows(0.0, 144.0, 48.0, 10), 0..3);
    assert_eq!(select_control::visible_rows(60.0, 144.0, 48.0, 10), 1..5);
    assert_eq!(select_control::visible_rows(400.0, 144.0, 48.0, 10), 8..10);
    assert_eq!(select_control::visible_rows(0.0, 144.0, 48.0, 0), 0..0);
    assert_eq!(select_control::visible_rows(0.0, 144.0, 0.0, 4), 0..0);
}
