//! Text measurement
//!
//! The engine never shapes text itself. It asks a [`TextMeasurer`] for the
//! size of each styled run; any font loading must be finished beforehand.

use super::{attr_f64, Attrs};

/// Size of a measured piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

impl TextSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Synchronous text measurement capability
pub trait TextMeasurer {
    /// Measure a single-line run of text drawn with `attrs`.
    fn measure(&self, text: &str, attrs: &Attrs) -> TextSize;
}

pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.3;

/// Deterministic measurer assuming every glyph has the same advance.
///
/// Useful for tests and headless rendering where no font is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Advance of one glyph as a fraction of the font size
    pub char_width_factor: f64,
    /// Extra advance applied to bold text
    pub bold_factor: f64,
    /// Extra advance applied to text in a monospace family
    pub monospace_factor: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            bold_factor: 1.1,
            monospace_factor: 1.2,
        }
    }
}

impl MonospaceMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_char_width_factor(mut self, factor: f64) -> Self {
        self.char_width_factor = factor;
        self
    }

    pub fn with_bold_factor(mut self, factor: f64) -> Self {
        self.bold_factor = factor;
        self
    }

    pub fn with_monospace_factor(mut self, factor: f64) -> Self {
        self.monospace_factor = factor;
        self
    }
}

fn is_bold(attrs: &Attrs) -> bool {
    attrs
        .get("font-weight")
        .map_or(false, |w| w == "bold" || w == "bolder")
}

fn is_monospace(attrs: &Attrs) -> bool {
    attrs
        .get("font-family")
        .map_or(false, |family| family.split(',').any(|f| f.trim() == "monospace"))
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, attrs: &Attrs) -> TextSize {
        let font_size = attr_f64(attrs, "font-size").unwrap_or(DEFAULT_FONT_SIZE);
        let line_height = attr_f64(attrs, "line-height").unwrap_or(DEFAULT_LINE_HEIGHT);

        let mut advance = font_size * self.char_width_factor;
        if is_bold(attrs) {
            advance *= self.bold_factor;
        }
        if is_monospace(attrs) {
            advance *= self.monospace_factor;
        }

        TextSize::new(
            text.chars().count() as f64 * advance,
            font_size * line_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::attrs;

    #[test]
    fn test_width_scales_with_length() {
        let m = MonospaceMeasurer::default();
        let a = attrs(&[("font-size", "10")]);
        assert_eq!(m.measure("abcd", &a).width, 24.0);
        assert_eq!(m.measure("", &a).width, 0.0);
    }

    #[test]
    fn test_height_uses_line_height() {
        let m = MonospaceMeasurer::default();
        let a = attrs(&[("font-size", "20"), ("line-height", "1.5")]);
        assert_eq!(m.measure("x", &a).height, 30.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let m = MonospaceMeasurer::default();
        let plain = attrs(&[("font-size", "10")]);
        let bold = attrs(&[("font-size", "10"), ("font-weight", "bolder")]);
        assert!(m.measure("abc", &bold).width > m.measure("abc", &plain).width);
    }

    #[test]
    fn test_monospace_is_wider() {
        let m = MonospaceMeasurer::default();
        let plain = attrs(&[("font-size", "10")]);
        let mono = attrs(&[("font-size", "10"), ("font-family", "Courier, monospace")]);
        assert!(m.measure("abc", &mono).width > m.measure("abc", &plain).width);
        assert_eq!(
            m.with_monospace_factor(1.0).measure("abc", &mono).width,
            m.measure("abc", &plain).width
        );
    }

    #[test]
    fn test_builder_factors() {
        let m = MonospaceMeasurer::new()
            .with_char_width_factor(1.0)
            .with_bold_factor(2.0);
        let bold = attrs(&[("font-size", "10"), ("font-weight", "bold")]);
        assert_eq!(m.measure("ab", &bold).width, 40.0);
    }
}
