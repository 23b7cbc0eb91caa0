use gpui::IntoElement;

use crate::components::SelectOption;

fn into_any(element: impl IntoElement) -> gpui::AnyElement {
    element.into_any_element()
}

fn assert_render_once<T: gpui::RenderOnce>() {}

#[test]
fn facade_exports_render_components() {
    assert_render_once::<crate::SingleSelectBox>();
    assert_render_once::<crate::MultiSelectBox>();
    assert_render_once::<crate::components::select::SingleSelectBox>();
}

#[test]
fn prelude_smoke_builds_both_boxes() {
    use crate::prelude::*;

    let _ = into_any(
        SingleSelectBox::new()
            .with_id("api-single")
            .options(["Option 1", "Option 2"])
            .default_value("Option 1")
            .placeholder("Pick one"),
    );
    let _ = into_any(
        MultiSelectBox::new()
            .with_id("api-multi")
            .options(["Option 1", "Option 2", "Option 3"])
            .selected([SelectOption::new("Option 2")])
            .max_item_displayed(5)
            .on_create(|_, _, _| {})
            .on_scroll_bottom(|| async {}),
    );
}
