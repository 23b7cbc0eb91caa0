use crate::i18n::I18nManager;

use super::select_option::{self, SelectOption};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MenuRow {
    NoOptionFound,
    AlreadyAdded,
    Create(String),
    Option {
        option: SelectOption,
        selected: bool,
    },
}

impl MenuRow {
    pub fn label(&self, i18n: &I18nManager) -> String {
        match self {
            Self::NoOptionFound => i18n.t("combobox.no_option_found"),
            Self::AlreadyAdded => i18n.t("combobox.option_already_added"),
            Self::Create(text) => i18n.t_with("combobox.create_option", &[("text", text.as_str())]),
            Self::Option { option, .. } => option.text().to_string(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Option { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuConfig {
    pub creatable: bool,
    pub max_item_displayed: usize,
    pub row_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropdownMenu {
    pub rows: Vec<MenuRow>,
    pub filtered: Vec<SelectOption>,
    pub exact_match: bool,
    pub visible_row_count: usize,
    pub height: f32,
    pub scroll_enabled: bool,
    pub scroll_anchor: Option<SelectOption>,
}

impl DropdownMenu {
    /// Index of the last option row, the one whose appearance asks for more.
    pub fn last_option_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .rposition(|row| matches!(row, MenuRow::Option { .. }))
    }
}

fn matches_free_text(option: &SelectOption, needle: &str) -> bool {
    needle.is_empty() || option.text().to_lowercase().contains(needle)
}

/// Unselected options whose text contains `free_text`, ignoring case.
pub fn filter_options(
    available: &[SelectOption],
    selected: &[SelectOption],
    free_text: &str,
) -> Vec<SelectOption> {
    let needle = free_text.to_lowercase();
    available
        .iter()
        .filter(|option| !select_option::contains(selected, option))
        .filter(|option| matches_free_text(option, &needle))
        .cloned()
        .collect()
}

/// Options whose text contains `free_text`, ignoring case. Selected options
/// stay listed.
pub fn filter_all(available: &[SelectOption], free_text: &str) -> Vec<SelectOption> {
    filter_options(available, &[], free_text)
}

pub fn exact_match(free_text: &str, available: &[SelectOption], selected: &[SelectOption]) -> bool {
    select_option::contains_text(available, free_text)
        || select_option::contains_text(selected, free_text)
}

/// Text a "create" action would turn into an option, if any.
pub fn creatable_text(free_text: &str, exact: bool) -> Option<&str> {
    (!free_text.is_empty() && !exact).then_some(free_text)
}

pub fn visible_row_count(
    creatable: bool,
    exact: bool,
    filtered_count: usize,
    free_text: &str,
) -> usize {
    if !creatable {
        return if exact { 1 } else { filtered_count };
    }
    if exact {
        return filtered_count.max(1);
    }
    filtered_count + usize::from(!free_text.is_empty())
}

pub fn single_visible_row_count(
    creatable: bool,
    exact: bool,
    filtered_count: usize,
    free_text: &str,
) -> usize {
    if !creatable || exact || free_text.is_empty() {
        filtered_count
    } else {
        filtered_count + 1
    }
}

pub fn menu_height(visible_row_count: usize, max_item_displayed: usize, row_height: f32) -> f32 {
    visible_row_count.min(max_item_displayed) as f32 * row_height
}

pub fn multi_menu(
    available: &[SelectOption],
    selected: &[SelectOption],
    free_text: &str,
    config: MenuConfig,
) -> DropdownMenu {
    let filtered = filter_options(available, selected, free_text);
    let exact = exact_match(free_text, available, selected);

    let mut rows = Vec::with_capacity(filtered.len() + 1);
    if filtered.is_empty() && !config.creatable {
        rows.push(MenuRow::NoOptionFound);
    }
    if filtered.is_empty() && config.creatable && exact {
        rows.push(MenuRow::AlreadyAdded);
    }
    if config.creatable
        && let Some(text) = creatable_text(free_text, exact)
    {
        rows.push(MenuRow::Create(text.to_string()));
    }
    rows.extend(filtered.iter().cloned().map(|option| MenuRow::Option {
        option,
        selected: false,
    }));

    let visible_row_count = visible_row_count(config.creatable, exact, filtered.len(), free_text);
    DropdownMenu {
        rows,
        exact_match: exact,
        visible_row_count,
        height: menu_height(visible_row_count, config.max_item_displayed, config.row_height),
        scroll_enabled: available.len() > config.max_item_displayed,
        scroll_anchor: available.first().cloned(),
        filtered,
    }
}

pub fn single_menu(
    available: &[SelectOption],
    selected: Option<&SelectOption>,
    free_text: &str,
    config: MenuConfig,
) -> DropdownMenu {
    let filtered = filter_all(available, free_text);
    let exact = exact_match(free_text, available, &[]);

    let mut rows = Vec::with_capacity(filtered.len() + 1);
    if filtered.is_empty() && !config.creatable {
        rows.push(MenuRow::NoOptionFound);
    }
    if config.creatable
        && let Some(text) = creatable_text(free_text, exact)
    {
        rows.push(MenuRow::Create(text.to_string()));
    }
    rows.extend(filtered.iter().cloned().map(|option| MenuRow::Option {
        selected: selected == Some(&option),
        option,
    }));

    let visible_row_count =
        single_visible_row_count(config.creatable, exact, filtered.len(), free_text);
    DropdownMenu {
        rows,
        exact_match: exact,
        visible_row_count,
        height: menu_height(visible_row_count, config.max_item_displayed, config.row_height),
        scroll_enabled: available.len() > config.max_item_displayed,
        scroll_anchor: selected.cloned(),
        filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::select_option::from_texts;

    fn config(creatable: bool) -> MenuConfig {
        MenuConfig {
            creatable,
            max_item_displayed: 3,
            row_height: 48.0,
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let options = from_texts(["Option 1", "Option 2"]);
        assert_eq!(filter_options(&options, &[], "opt"), options);
        assert_eq!(filter_options(&options, &[], "1"), from_texts(["Option 1"]));
        assert_eq!(filter_options(&options, &[], ""), options);
    }

    #[test]
    fn filter_removes_selected_options() {
        let options = from_texts(["a", "b", "c"]);
        let selected = from_texts(["b"]);
        assert_eq!(filter_options(&options, &selected, ""), from_texts(["a", "c"]));
    }

    #[test]
    fn exact_match_looks_at_available_and_selected() {
        let options = from_texts(["Foo"]);
        let selected = from_texts(["Bar"]);
        assert!(exact_match("Foo", &options, &selected));
        assert!(exact_match("Bar", &options, &selected));
        assert!(!exact_match("foo", &options, &selected));
    }

    #[test]
    fn row_count_without_creation() {
        assert_eq!(visible_row_count(false, true, 0, "Foo"), 1);
        assert_eq!(visible_row_count(false, false, 4, "o"), 4);
    }

    #[test]
    fn row_count_with_creation() {
        assert_eq!(visible_row_count(true, true, 0, "Foo"), 1);
        assert_eq!(visible_row_count(true, true, 2, "Foo"), 2);
        assert_eq!(visible_row_count(true, false, 2, "Fo"), 3);
        assert_eq!(visible_row_count(true, false, 5, ""), 5);
    }

    #[test]
    fn menu_height_is_capped() {
        assert_eq!(menu_height(7, 3, 48.0), 144.0);
        assert_eq!(menu_height(2, 3, 48.0), 96.0);
        assert_eq!(menu_height(0, 3, 48.0), 0.0);
    }

    #[test]
    fn multi_menu_offers_create_row_before_matches() {
        let options = from_texts(["Option 1", "Option 2"]);
        let menu = multi_menu(&options, &[], "Opt", config(true));
        assert_eq!(menu.rows[0], MenuRow::Create("Opt".into()));
        assert_eq!(menu.rows.len(), 3);
        assert_eq!(menu.visible_row_count, 3);
        assert_eq!(menu.last_option_row(), Some(2));
    }

    #[test]
    fn multi_menu_reports_already_added_for_selected_exact_match() {
        let options = from_texts(["Foo"]);
        let selected = from_texts(["Foo"]);
        let menu = multi_menu(&options, &selected, "Foo", config(true));
        assert_eq!(menu.rows, vec![MenuRow::AlreadyAdded]);
        assert!(menu.exact_match);
        assert_eq!(menu.visible_row_count, 1);
        assert_eq!(menu.last_option_row(), None);
    }

    #[test]
    fn multi_menu_without_creation_reports_no_match() {
        let options = from_texts(["Foo"]);
        let menu = multi_menu(&options, &[], "zzz", config(false));
        assert_eq!(menu.rows, vec![MenuRow::NoOptionFound]);
    }

    #[test]
    fn single_menu_keeps_selected_option_checked() {
        let options = from_texts(["a", "b"]);
        let selected = SelectOption::new("b");
        let menu = single_menu(&options, Some(&selected), "", config(false));
        assert_eq!(
            menu.rows[1],
            MenuRow::Option {
                option: selected.clone(),
                selected: true,
            }
        );
        assert_eq!(menu.scroll_anchor, Some(selected));
        assert!(!menu.scroll_enabled);
    }

    #[test]
    fn single_menu_counts_create_row_only_for_new_text() {
        let options = from_texts(["apple", "apricot"]);
        assert_eq!(single_menu(&options, None, "ap", config(true)).visible_row_count, 3);
        assert_eq!(single_menu(&options, None, "apple", config(true)).visible_row_count, 1);
        assert_eq!(single_menu(&options, None, "", config(true)).visible_row_count, 2);
    }

    #[test]
    fn creatable_text_requires_new_non_empty_text() {
        assert_eq!(creatable_text("", false), None);
        assert_eq!(creatable_text("Foo", true), None);
        assert_eq!(creatable_text("Foo", false), Some("Foo"));
    }

    #[test]
    fn menu_row_labels_are_localized() {
        let i18n = I18nManager::new();
        i18n.set_locale("en-US");
        assert_eq!(MenuRow::NoOptionFound.label(&i18n), "No option found.");
        assert_eq!(
            MenuRow::Create("Foo".into()).label(&i18n),
            "Create new option: Foo"
        );
        assert!(!MenuRow::AlreadyAdded.is_actionable());
    }
}
