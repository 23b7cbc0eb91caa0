use unicode_segmentation::UnicodeSegmentation;

/// Rendered-width queries the tag engine needs from the host's text stack.
///
/// Widths are in logical pixels. Implementations must be monotonic: a longer
/// prefix of the same string never measures narrower than a shorter one.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;

    /// Longest grapheme-aligned prefix of `text` whose width is at most
    /// `max_width`.
    fn prefix_that_fits<'a>(&self, text: &'a str, max_width: f32) -> &'a str {
        if max_width <= 0.0 || text.is_empty() {
            return "";
        }
        if self.width(text) <= max_width {
            return text;
        }

        let ends = text
            .grapheme_indices(true)
            .map(|(start, grapheme)| start + grapheme.len())
            .collect::<Vec<_>>();
        let fitting = ends.partition_point(|end| self.width(&text[..*end]) <= max_width);
        match fitting {
            0 => "",
            count => &text[..ends[count - 1]],
        }
    }

    fn overflows(&self, text: &str, max_width: f32) -> bool {
        self.width(text) > max_width
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn width(&self, text: &str) -> f32 {
        (**self).width(text)
    }
}

/// Fixed advance per grapheme. Used before a window is available and in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    pub advance: f32,
}

impl MonospaceMeasure {
    pub const fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn width(&self, text: &str) -> f32 {
        text.graphemes(true).count() as f32 * self.advance
    }
}

#[cfg(feature = "elements")]
pub struct WindowTextMeasure<'a> {
    window: &'a gpui::Window,
    font_size: gpui::Pixels,
}

#[cfg(feature = "elements")]
impl<'a> WindowTextMeasure<'a> {
    pub fn new(window: &'a gpui::Window, font_size: f32) -> Self {
        Self {
            window,
            font_size: gpui::px(font_size),
        }
    }
}

#[cfg(feature = "elements")]
impl TextMeasure for WindowTextMeasure<'_> {
    fn width(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let mut text_style = self.window.text_style();
        text_style.font_size = self.font_size.into();
        let run = text_style.to_run(text.len());
        let layout = self
            .window
            .text_system()
            .layout_line(text, self.font_size, &[run], None);
        f32::from(layout.width).ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_width_counts_graphemes() {
        let measure = MonospaceMeasure::new(10.0);
        assert_eq!(measure.width(""), 0.0);
        assert_eq!(measure.width("abc"), 30.0);
        assert_eq!(measure.width("e\u{301}x"), 20.0);
    }

    #[test]
    fn prefix_that_fits_returns_longest_fitting_prefix() {
        let measure = MonospaceMeasure::new(10.0);
        assert_eq!(measure.prefix_that_fits("abcdef", 35.0), "abc");
        assert_eq!(measure.prefix_that_fits("abcdef", 60.0), "abcdef");
        assert_eq!(measure.prefix_that_fits("abcdef", 9.0), "");
    }

    #[test]
    fn prefix_that_fits_is_empty_for_non_positive_width() {
        let measure = MonospaceMeasure::new(10.0);
        assert_eq!(measure.prefix_that_fits("abc", 0.0), "");
        assert_eq!(measure.prefix_that_fits("abc", -4.0), "");
    }

    #[test]
    fn prefix_that_fits_never_splits_a_grapheme() {
        let measure = MonospaceMeasure::new(10.0);
        assert_eq!(measure.prefix_that_fits("e\u{301}e\u{301}e", 20.0), "e\u{301}e\u{301}");
    }
}
