pub mod control;
pub mod dropdown_state;
pub mod multi_select_state;
#[cfg(feature = "elements")]
pub mod select;
pub mod scroll_trigger;
pub mod select_control;
pub mod select_option;
pub mod select_state;
pub mod shadow_buffer;
pub mod tag_layout;
pub mod update_queue;

#[cfg(test)]
mod test_state_logic;

pub use dropdown_state::{DropdownMenu, MenuConfig, MenuRow};
pub use multi_select_state::MultiSelectState;
#[cfg(feature = "elements")]
pub use select::{MultiSelectBox, SingleSelectBox};
pub use scroll_trigger::{LoadMoreHandler, ScrollTrigger, dispatch_load_more};
pub use select_control::{
    MultiSelectModel, MultiSelectOutcome, MultiSelectView, SingleSelectModel,
    SingleSelectOutcome, SingleSelectView, TagView,
};
pub use select_option::SelectOption;
pub use select_state::{SelectEffects, SingleSelectState};
pub use shadow_buffer::{EditKind, ShadowBuffer, TagSpan};
pub use tag_layout::{TagArrangement, TagLayout};
pub use update_queue::{FreeText, Recompute, UpdateQueue};
