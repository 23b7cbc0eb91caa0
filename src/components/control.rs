use std::{
    collections::HashMap,
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

use super::multi_select_state::MultiSelectState;
use super::select_option::SelectOption;
use super::select_state::SingleSelectState;

static BOOL_STATE: LazyLock<Mutex<HashMap<String, bool>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static F32_STATE: LazyLock<Mutex<HashMap<String, f32>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static OPTION_STATE: LazyLock<Mutex<HashMap<String, Option<SelectOption>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static OPTIONS_STATE: LazyLock<Mutex<HashMap<String, Vec<SelectOption>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static SINGLE_SELECT: LazyLock<Mutex<HashMap<String, SingleSelectState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static MULTI_SELECT: LazyLock<Mutex<HashMap<String, MultiSelectState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

pub const OPENED_SLOT: &str = "opened";
pub const SELECTED_SLOT: &str = "selected";
pub const SCROLL_SLOT: &str = "scroll-y";
pub const SCROLL_ANCHOR_SLOT: &str = "scroll-anchor-pending";

fn key(id: &str, slot: &str) -> String {
    format!("{id}::{slot}")
}

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn bool_state(id: &str, slot: &str, controlled: Option<bool>, default: bool) -> bool {
    if let Some(value) = controlled {
        return value;
    }

    *lock(&BOOL_STATE).entry(key(id, slot)).or_insert(default)
}

pub fn set_bool_state(id: &str, slot: &str, value: bool) {
    lock(&BOOL_STATE).insert(key(id, slot), value);
}

pub fn f32_state(id: &str, slot: &str, default: f32) -> f32 {
    *lock(&F32_STATE).entry(key(id, slot)).or_insert(default)
}

pub fn set_f32_state(id: &str, slot: &str, value: f32) {
    lock(&F32_STATE).insert(key(id, slot), value);
}

pub fn option_state(
    id: &str,
    slot: &str,
    controlled: Option<Option<SelectOption>>,
    default: Option<SelectOption>,
) -> Option<SelectOption> {
    if let Some(value) = controlled {
        return value;
    }

    lock(&OPTION_STATE)
        .entry(key(id, slot))
        .or_insert(default)
        .clone()
}

pub fn set_option_state(id: &str, slot: &str, value: Option<SelectOption>) {
    lock(&OPTION_STATE).insert(key(id, slot), value);
}

pub fn options_state(
    id: &str,
    slot: &str,
    controlled: Option<Vec<SelectOption>>,
    default: Vec<SelectOption>,
) -> Vec<SelectOption> {
    if let Some(value) = controlled {
        return value;
    }

    lock(&OPTIONS_STATE)
        .entry(key(id, slot))
        .or_insert(default)
        .clone()
}

pub fn set_options_state(id: &str, slot: &str, value: Vec<SelectOption>) {
    lock(&OPTIONS_STATE).insert(key(id, slot), value);
}

/// Run `f` against the single-select machine registered under `id`,
/// creating it with `init` on first use.
pub fn with_single_select<R>(
    id: &str,
    init: impl FnOnce() -> SingleSelectState,
    f: impl FnOnce(&mut SingleSelectState) -> R,
) -> R {
    let mut machines = lock(&SINGLE_SELECT);
    f(machines.entry(id.to_string()).or_insert_with(init))
}

pub fn with_multi_select<R>(
    id: &str,
    init: impl FnOnce() -> MultiSelectState,
    f: impl FnOnce(&mut MultiSelectState) -> R,
) -> R {
    let mut machines = lock(&MULTI_SELECT);
    f(machines.entry(id.to_string()).or_insert_with(init))
}

pub fn is_submit_key(key: &str) -> bool {
    key == "enter"
}

pub fn clear_all() {
    lock(&BOOL_STATE).clear();
    lock(&F32_STATE).clear();
    lock(&OPTION_STATE).clear();
    lock(&OPTIONS_STATE).clear();
    lock(&SINGLE_SELECT).clear();
    lock(&MULTI_SELECT).clear();
}
