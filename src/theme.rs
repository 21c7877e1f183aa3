//! Themes: visual constants and per-type style bundles
//!
//! A theme is a TOML document. User themes are merged over the built-in
//! default, so a theme only needs to list the values it changes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{BoundingBox, Element, Point};
use crate::sequence::ArrowKind;
use crate::text::Attrs;

/// Errors that can occur when loading or parsing themes
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse theme TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Note mode used when a stage asks for an unknown one
pub const DEFAULT_NOTE_MODE: &str = "note";
/// Block mode used when a stage asks for an unknown one
pub const DEFAULT_BLOCK_MODE: &str = "default";

/// Space around a box, in the usual CSS order
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Padding {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
}

impl Padding {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Theme {
    pub name: Option<String>,
    /// Space around the whole drawing
    pub outer_margin: f64,
    /// Minimum horizontal gap between anything attached to two agents
    pub agent_margin: f64,
    /// Vertical gap below each action
    pub action_margin: f64,
    /// Half-width of a highlighted lifeline
    pub agent_line_highlight_radius: f64,
    pub title_margin: f64,
    pub title_attrs: Attrs,
    pub agent_line_attrs: Attrs,
    pub agent_line_highlight_attrs: Attrs,
    pub agent_cap: AgentCapTheme,
    pub connect: ConnectTheme,
    pub notes: BTreeMap<String, NoteTheme>,
    pub blocks: BTreeMap<String, BlockTheme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentCapTheme {
    pub box_padding: Padding,
    pub box_attrs: Attrs,
    pub label_attrs: Attrs,
    pub cross_size: f64,
    pub cross_attrs: Attrs,
    pub bar_height: f64,
    pub bar_attrs: Attrs,
    pub none_height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectTheme {
    /// Horizontal reach of a message sent to the same agent
    pub loopback_radius: f64,
    pub label_padding: f64,
    pub label_margin: Padding,
    pub label_attrs: Attrs,
    pub mask_padding: Padding,
    pub mask_attrs: Attrs,
    pub solid_attrs: Attrs,
    pub dash_attrs: Attrs,
    pub arrow: ArrowTheme,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrowTheme {
    pub width: f64,
    pub height: f64,
    pub single_attrs: Attrs,
    pub open_attrs: Attrs,
}

/// Outline drawn around a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteShape {
    /// Rectangle with a folded top-right corner
    Folded,
    Rect,
    Rounded,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteTheme {
    pub shape: NoteShape,
    pub margin: Padding,
    pub padding: Padding,
    /// How far a note spanning several agents reaches past the extremes
    pub overlap_left: f64,
    pub overlap_right: f64,
    #[serde(default)]
    pub flick_size: f64,
    pub box_attrs: Attrs,
    pub label_attrs: Attrs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockTheme {
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Horizontal reach past the outermost agents, per nesting level
    pub side_margin: f64,
    pub box_attrs: Attrs,
    pub separator_attrs: Attrs,
    pub section_padding: Padding,
    pub tag_padding: Padding,
    pub tag_box_attrs: Attrs,
    pub tag_label_attrs: Attrs,
    pub label_padding: Padding,
    pub label_attrs: Attrs,
}

/// Built-in theme: black lines on white, small sans-serif labels
const DEFAULT_THEME: &str = r##"
name = "basic"
outer_margin = 5.0
agent_margin = 10.0
action_margin = 10.0
agent_line_highlight_radius = 4.0
title_margin = 10.0

[title_attrs]
font-family = "sans-serif"
font-size = "20"
line-height = "1.3"
text-anchor = "middle"

[agent_line_attrs]
stroke = "#000000"
stroke-width = "1"
fill = "none"

[agent_line_highlight_attrs]
stroke = "#000000"
stroke-width = "1"
fill = "#ffffff"

[agent_cap]
cross_size = 20.0
bar_height = 4.0
none_height = 10.0

[agent_cap.box_padding]
top = 5.0
left = 10.0
right = 10.0
bottom = 5.0

[agent_cap.box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"

[agent_cap.label_attrs]
font-family = "sans-serif"
font-size = "12"
line-height = "1.3"
text-anchor = "middle"

[agent_cap.cross_attrs]
stroke = "#000000"
stroke-width = "1"
fill = "none"

[agent_cap.bar_attrs]
fill = "#000000"

[connect]
loopback_radius = 6.0
label_padding = 6.0

[connect.label_margin]
top = 2.0
bottom = 1.0

[connect.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "middle"

[connect.mask_padding]
left = 3.0
right = 3.0
bottom = 1.0

[connect.mask_attrs]
fill = "#ffffff"

[connect.solid_attrs]
stroke = "#000000"
stroke-width = "1"
fill = "none"

[connect.dash_attrs]
stroke = "#000000"
stroke-width = "1"
stroke-dasharray = "4, 2"
fill = "none"

[connect.arrow]
width = 5.0
height = 10.0

[connect.arrow.single_attrs]
fill = "#000000"

[connect.arrow.open_attrs]
stroke = "#000000"
stroke-width = "1"
fill = "none"

[notes.note]
shape = "folded"
overlap_left = 10.0
overlap_right = 10.0
flick_size = 5.0
margin = { top = 0.0, left = 5.0, right = 5.0, bottom = 0.0 }
padding = { top = 5.0, left = 5.0, right = 10.0, bottom = 5.0 }

[notes.note.box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"

[notes.note.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "start"

[notes.box]
shape = "rect"
overlap_left = 10.0
overlap_right = 10.0
margin = { top = 0.0, left = 5.0, right = 5.0, bottom = 0.0 }
padding = { top = 5.0, left = 5.0, right = 5.0, bottom = 5.0 }

[notes.box.box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"

[notes.box.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "start"

[notes.state]
shape = "rounded"
overlap_left = 10.0
overlap_right = 10.0
margin = { top = 0.0, left = 5.0, right = 5.0, bottom = 0.0 }
padding = { top = 7.0, left = 7.0, right = 7.0, bottom = 7.0 }

[notes.state.box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"
rx = "10"
ry = "10"

[notes.state.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "middle"

[blocks.default]
margin_top = 0.0
margin_bottom = 0.0
side_margin = 10.0
section_padding = { top = 3.0, bottom = 2.0 }
tag_padding = { top = 1.0, left = 3.0, right = 3.0, bottom = 0.0 }
label_padding = { left = 5.0, right = 5.0 }

[blocks.default.box_attrs]
fill = "none"
stroke = "#000000"
stroke-width = "1.5"
rx = "2"
ry = "2"

[blocks.default.separator_attrs]
stroke = "#000000"
stroke-width = "1.5"
stroke-dasharray = "4, 2"

[blocks.default.tag_box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"

[blocks.default.tag_label_attrs]
font-family = "sans-serif"
font-weight = "bold"
font-size = "9"
line-height = "1.3"
text-anchor = "start"

[blocks.default.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "start"

[blocks.ref]
margin_top = 0.0
margin_bottom = 0.0
side_margin = 10.0
section_padding = { top = 5.0, bottom = 5.0 }
tag_padding = { top = 1.0, left = 3.0, right = 3.0, bottom = 0.0 }
label_padding = { left = 5.0, right = 5.0 }

[blocks.ref.box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1.5"
rx = "2"
ry = "2"

[blocks.ref.separator_attrs]
stroke = "#000000"
stroke-width = "1.5"
stroke-dasharray = "4, 2"

[blocks.ref.tag_box_attrs]
fill = "#ffffff"
stroke = "#000000"
stroke-width = "1"

[blocks.ref.tag_label_attrs]
font-family = "sans-serif"
font-weight = "bold"
font-size = "9"
line-height = "1.3"
text-anchor = "start"

[blocks.ref.label_attrs]
font-family = "sans-serif"
font-size = "8"
line-height = "1.3"
text-anchor = "middle"
"##;

impl Theme {
    /// Load a theme from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a theme from a TOML string, filling gaps from the default theme
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let mut base: toml::Table = DEFAULT_THEME.parse()?;
        let overlay: toml::Table = content.parse()?;
        merge_tables(&mut base, overlay);
        Ok(toml::Value::Table(base).try_into()?)
    }

    /// Style bundle for a note mode, falling back to the plain note
    pub fn note(&self, mode: &str) -> Option<&NoteTheme> {
        self.notes
            .get(mode)
            .or_else(|| self.notes.get(DEFAULT_NOTE_MODE))
    }

    /// Style bundle for a block mode, falling back to the default block
    pub fn block(&self, mode: &str) -> Option<&BlockTheme> {
        self.blocks
            .get(mode)
            .or_else(|| self.blocks.get(DEFAULT_BLOCK_MODE))
    }

    /// Arrowhead whose tip touches `tip`, pointing right for `dir > 0` and
    /// left otherwise. `ArrowKind::None` draws nothing.
    pub fn arrowhead(&self, tip: Point, dir: f64, kind: ArrowKind) -> Option<Element> {
        let arrow = &self.connect.arrow;
        let back = tip.x - dir.signum() * arrow.width;
        let upper = Point::new(back, tip.y - arrow.height / 2.0);
        let lower = Point::new(back, tip.y + arrow.height / 2.0);

        match kind {
            ArrowKind::None => None,
            ArrowKind::Single => Some(Element::Path {
                points: vec![tip, upper, lower],
                closed: true,
                attrs: arrow.single_attrs.clone(),
            }),
            ArrowKind::Open => Some(Element::Path {
                points: vec![upper, tip, lower],
                closed: false,
                attrs: arrow.open_attrs.clone(),
            }),
        }
    }

    /// Tag outline used for block section headers: a box with its lower
    /// right corner cut off
    pub fn tag_shape(&self, bounds: BoundingBox, attrs: &Attrs) -> Element {
        let cut = (bounds.height / 2.0).min(4.0);
        Element::Path {
            points: vec![
                Point::new(bounds.x, bounds.y),
                Point::new(bounds.right(), bounds.y),
                Point::new(bounds.right(), bounds.bottom() - cut),
                Point::new(bounds.right() - cut, bounds.bottom()),
                Point::new(bounds.x, bounds.bottom()),
            ],
            closed: true,
            attrs: attrs.clone(),
        }
    }

    /// X-shaped cross centered on `center`
    pub fn cross(&self, center: Point, size: f64, attrs: &Attrs) -> Element {
        let r = size / 2.0;
        Element::Group {
            class: "cross".to_string(),
            children: vec![
                Element::Line {
                    from: Point::new(center.x - r, center.y - r),
                    to: Point::new(center.x + r, center.y + r),
                    attrs: attrs.clone(),
                },
                Element::Line {
                    from: Point::new(center.x + r, center.y - r),
                    to: Point::new(center.x - r, center.y + r),
                    attrs: attrs.clone(),
                },
            ],
        }
    }

    /// Outline of a note box
    pub fn note_shape(&self, note: &NoteTheme, bounds: BoundingBox) -> Element {
        match note.shape {
            NoteShape::Rect | NoteShape::Rounded => Element::Rect {
                bounds,
                attrs: note.box_attrs.clone(),
            },
            NoteShape::Folded => {
                let flick = note.flick_size.min(bounds.height).min(bounds.width);
                Element::Path {
                    points: vec![
                        Point::new(bounds.x, bounds.y),
                        Point::new(bounds.right() - flick, bounds.y),
                        Point::new(bounds.right(), bounds.y + flick),
                        Point::new(bounds.right(), bounds.bottom()),
                        Point::new(bounds.x, bounds.bottom()),
                    ],
                    closed: true,
                    attrs: note.box_attrs.clone(),
                }
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        toml::from_str(DEFAULT_THEME).expect("Default theme should be valid TOML")
    }
}

/// Recursively overlay `overlay` onto `base`; tables merge, other values
/// replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(inner) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, inner),
                _ => {
                    base.insert(key, toml::Value::Table(inner));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = Theme::default();
        assert_eq!(theme.agent_line_highlight_radius, 4.0);
        assert!(theme.notes.contains_key("note"));
        assert!(theme.blocks.contains_key("default"));
    }

    #[test]
    fn test_lookup_falls_back_to_default_mode() {
        let theme = Theme::default();
        assert_eq!(theme.note("nonexistent").map(|n| n.shape), Some(NoteShape::Folded));
        assert_eq!(theme.note("state").map(|n| n.shape), Some(NoteShape::Rounded));
        assert!(theme.block("if").is_some());
    }

    #[test]
    fn test_partial_theme_merges_over_default() {
        let theme = Theme::from_str(
            r##"
name = "wide"
agent_line_highlight_radius = 8.0

[connect.label_attrs]
font-size = "12"
"##,
        )
        .expect("Should parse");
        assert_eq!(theme.name.as_deref(), Some("wide"));
        assert_eq!(theme.agent_line_highlight_radius, 8.0);
        assert_eq!(
            theme.connect.label_attrs.get("font-size").map(String::as_str),
            Some("12")
        );
        // untouched keys of a merged table survive
        assert_eq!(
            theme.connect.label_attrs.get("text-anchor").map(String::as_str),
            Some("middle")
        );
        assert_eq!(theme.agent_margin, 10.0);
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Theme::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ThemeError::ParseError(_))));
    }

    #[test]
    fn test_arrowhead_points_toward_tip() {
        let theme = Theme::default();
        let head = theme.arrowhead(Point::new(100.0, 50.0), 1.0, ArrowKind::Single);
        match head {
            Some(Element::Path { points, closed, .. }) => {
                assert!(closed);
                assert_eq!(points[0], Point::new(100.0, 50.0));
                assert!(points[1].x < 100.0);
            }
            other => panic!("expected a path, got {:?}", other),
        }
        assert!(theme
            .arrowhead(Point::new(0.0, 0.0), -1.0, ArrowKind::None)
            .is_none());
    }
}
