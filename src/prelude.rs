pub use crate::components::{
    MultiSelectModel, MultiSelectState, SelectEffects, SelectOption, SingleSelectModel,
    SingleSelectState,
};
#[cfg(feature = "elements")]
pub use crate::components::{MultiSelectBox, SingleSelectBox};
pub use crate::i18n::{I18nManager, Locale};
pub use crate::id::ComponentId;
pub use crate::measure::{MonospaceMeasure, TextMeasure};
pub use crate::theme::ComboboxTokens;
