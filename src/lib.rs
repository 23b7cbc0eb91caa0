pub mod components;
pub mod i18n;
pub mod id;
pub mod measure;
pub mod prelude;
pub mod theme;

pub use components::{
    DropdownMenu, MenuRow, MultiSelectState, SelectEffects, SelectOption, SingleSelectState,
    TagArrangement, TagLayout,
};
#[cfg(feature = "elements")]
pub use components::{MultiSelectBox, SingleSelectBox};
pub use i18n::{I18nManager, Locale};
pub use id::ComponentId;
pub use measure::{MonospaceMeasure, TextMeasure};
pub use theme::ComboboxTokens;

#[cfg(all(test, feature = "elements"))]
mod test_public_api;
