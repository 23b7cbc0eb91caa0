/// Metrics and colours shared by both combobox variants.
///
/// Colours are hex strings resolved by the element layer; the engine only
/// reads the numeric metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct ComboboxTokens {
    pub font_size: f32,
    pub text_field_padding_x: f32,
    pub text_field_padding_y: f32,
    pub line_spacing: f32,
    /// Width of one blank column reserved between tags.
    pub gap_column_width: f32,
    /// Blank columns between the last tag and the free text.
    pub new_option_gap_columns: usize,
    pub trailing_padding: f32,
    pub ellipsis: &'static str,
    pub option_height: f32,
    pub button_height: f32,
    pub max_item_displayed: usize,
    pub control_padding_x: f32,
    pub control_padding_y: f32,
    pub dropdown_offset: f32,
    pub option_padding_x: f32,
    pub control_radius: f32,
    pub tag_radius: f32,
    pub cursor_width: f32,
    pub control_bg: &'static str,
    pub control_fg: &'static str,
    pub field_bg: &'static str,
    pub field_fg: &'static str,
    pub placeholder: &'static str,
    pub tag_bg: &'static str,
    pub tag_highlight_bg: &'static str,
    pub cursor: &'static str,
    pub dropdown_bg: &'static str,
    pub option_fg: &'static str,
    pub option_hover_bg: &'static str,
    pub clear_icon: &'static str,
}

impl Default for ComboboxTokens {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            text_field_padding_x: 8.0,
            text_field_padding_y: 4.0,
            line_spacing: 12.0,
            gap_column_width: 4.0,
            new_option_gap_columns: 2,
            trailing_padding: 8.0,
            ellipsis: "...",
            option_height: 48.0,
            button_height: 50.0,
            max_item_displayed: 3,
            control_padding_x: 12.0,
            control_padding_y: 4.0,
            dropdown_offset: 8.0,
            option_padding_x: 16.0,
            control_radius: 8.0,
            tag_radius: 4.0,
            cursor_width: 2.0,
            control_bg: "#000000",
            control_fg: "#ffffff",
            field_bg: "#ffffff",
            field_fg: "#000000",
            placeholder: "#868e96",
            tag_bg: "#d3d3d333",
            tag_highlight_bg: "#d3d3d399",
            cursor: "#0a84ff",
            dropdown_bg: "#000000",
            option_fg: "#ffffff",
            option_hover_bg: "#ffffff1a",
            clear_icon: "#9e9e9ecc",
        }
    }
}

impl ComboboxTokens {
    pub fn tag_spacing(&self) -> f32 {
        self.gap_column_width * self.new_option_gap_columns as f32
    }

    pub fn tag_padding_x(&self) -> f32 {
        self.gap_column_width
    }

    pub fn tag_padding_y(&self) -> f32 {
        self.text_field_padding_y / 2.0
    }

    pub fn tag_row_spacing(&self) -> f32 {
        (self.line_spacing - self.tag_padding_y() * 2.0).max(0.0)
    }

    /// Blank run written between two tags on the same row.
    pub fn tag_spacer(&self) -> String {
        " ".repeat(self.new_option_gap_columns + 2)
    }

    /// Blank run written between the tag portion and the free text.
    pub fn row_gap(&self) -> String {
        " ".repeat(self.new_option_gap_columns)
    }

    /// Width a tag row may occupy inside a text field of `container_width`.
    pub fn available_tag_width(&self, container_width: f32) -> f32 {
        (container_width - self.text_field_padding_x * 2.0 - self.trailing_padding).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacers_follow_gap_columns() {
        let tokens = ComboboxTokens::default();
        assert_eq!(tokens.tag_spacer(), "    ");
        assert_eq!(tokens.row_gap(), "  ");
        assert_eq!(tokens.tag_spacing(), 8.0);
    }

    #[test]
    fn available_width_removes_paddings_and_never_goes_negative() {
        let tokens = ComboboxTokens::default();
        assert_eq!(tokens.available_tag_width(320.0), 296.0);
        assert_eq!(tokens.available_tag_width(0.0), 0.0);
    }
}
