//! SVG generation from a laid-out drawing

use crate::layout::{BoundingBox, Drawing, Element, Layer, Point, TextAnchor, TextBlock};
use crate::text::Attrs;

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            elements: vec![],
            indent: 1,
        }
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn push(&mut self, markup: String) {
        let line = format!("{}{}", self.indent_str(), markup);
        self.elements.push(line);
    }

    /// Open a group with a prefixed class
    pub fn start_group(&mut self, class: &str) {
        let markup = format!(r#"<g class="{}">"#, escape_xml(&self.config.class_name(class)));
        self.push(markup);
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.push("</g>".to_string());
    }

    /// Add a drawing element, recursing into groups
    pub fn add_element(&mut self, element: &Element) {
        match element {
            Element::Line { from, to, attrs } => {
                self.push(format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                    fmt_num(from.x),
                    fmt_num(from.y),
                    fmt_num(to.x),
                    fmt_num(to.y),
                    format_attrs(attrs, &[])
                ));
            }
            Element::Rect { bounds, attrs } => {
                self.push(format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                    fmt_num(bounds.x),
                    fmt_num(bounds.y),
                    fmt_num(bounds.width),
                    fmt_num(bounds.height),
                    format_attrs(attrs, &[])
                ));
            }
            Element::Path {
                points,
                closed,
                attrs,
            } => {
                if points.is_empty() {
                    return;
                }
                let fill = if !closed && !attrs.contains_key("fill") {
                    r#" fill="none""#
                } else {
                    ""
                };
                self.push(format!(
                    r#"<path d="{}"{}{}/>"#,
                    path_to_d(points, *closed),
                    format_attrs(attrs, &[]),
                    fill
                ));
            }
            Element::Text(text) => self.add_text(text),
            Element::Group { class, children } => {
                self.start_group(class);
                for child in children {
                    self.add_element(child);
                }
                self.end_group();
            }
        }
    }

    /// Add a text block, one `tspan` per line
    pub fn add_text(&mut self, text: &TextBlock) {
        if text.lines.iter().all(|l| l.runs.is_empty()) {
            return;
        }
        let anchor = match text.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };

        let mut body = String::new();
        for line in text.lines.iter().filter(|l| !l.runs.is_empty()) {
            body.push_str(&format!(
                r#"<tspan x="{}" y="{}">"#,
                fmt_num(text.x),
                fmt_num(line.baseline)
            ));
            for run in &line.runs {
                match &run.attrs {
                    Some(attrs) => body.push_str(&format!(
                        "<tspan{}>{}</tspan>",
                        format_attrs(attrs, &[]),
                        escape_xml(&run.text)
                    )),
                    None => body.push_str(&escape_xml(&run.text)),
                }
            }
            body.push_str("</tspan>");
        }

        self.push(format!(
            r#"<text{} text-anchor="{}">{}</text>"#,
            format_attrs(&text.attrs, &["text-anchor"]),
            anchor,
            body
        ));
    }

    /// Build the final SVG string
    pub fn build(self, bounds: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let viewbox = bounds.inflate(padding);
        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            fmt_num(viewbox.x),
            fmt_num(viewbox.y),
            fmt_num(viewbox.width),
            fmt_num(viewbox.height),
            fmt_num(viewbox.width),
            fmt_num(viewbox.height)
        ));
        svg.push_str(nl);

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Render a drawing to an SVG string, one group per non-empty layer
pub fn render_svg(drawing: &Drawing, config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());

    for layer in Layer::ALL {
        let elements = drawing.layer(layer);
        if elements.is_empty() {
            continue;
        }
        builder.start_group(layer.name());
        for element in elements {
            builder.add_element(element);
        }
        builder.end_group();
    }

    builder.build(drawing.bounds)
}

/// Format attributes as ` key="value"` pairs, in key order
fn format_attrs(attrs: &Attrs, skip: &[&str]) -> String {
    attrs
        .iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| format!(r#" {}="{}""#, escape_xml(k), escape_xml(v)))
        .collect()
}

/// Format a coordinate with at most three decimals
fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

fn path_to_d(points: &[Point], closed: bool) -> String {
    let mut d = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { "M" } else { "L" };
            format!("{}{},{}", cmd, fmt_num(p.x), fmt_num(p.y))
        })
        .collect::<Vec<_>>()
        .join(" ");
    if closed {
        d.push_str(" Z");
    }
    d
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextLine;
    use crate::text::{attrs, FormattedRun};
    use pretty_assertions::assert_eq;

    fn compact() -> SvgConfig {
        SvgConfig::new()
            .with_standalone(false)
            .with_pretty_print(false)
    }

    #[test]
    fn test_path_to_d() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
        ];
        assert_eq!(path_to_d(&points, false), "M0,0 L10,0 L10,20");
        assert_eq!(path_to_d(&points, true), "M0,0 L10,0 L10,20 Z");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(escape_xml(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(0.1 + 0.2), "0.3");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(-2.5), "-2.5");
    }

    #[test]
    fn test_render_single_line() {
        let mut drawing = Drawing::new();
        drawing.push(
            Layer::Shapes,
            Element::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(10.0, 5.0),
                attrs: attrs(&[("stroke", "black")]),
            },
        );
        drawing.bounds = BoundingBox::new(0.0, 0.0, 10.0, 5.0);

        let svg = render_svg(&drawing, &compact());
        insta::assert_snapshot!(svg, @r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 5" width="10" height="5"><g class="seq-shapes"><line x1="0" y1="0" x2="10" y2="5" stroke="black"/></g></svg>"#);
    }

    #[test]
    fn test_render_text_runs() {
        let mut drawing = Drawing::new();
        drawing.push(
            Layer::Labels,
            Element::Text(TextBlock {
                x: 5.0,
                anchor: TextAnchor::Middle,
                lines: vec![TextLine {
                    baseline: 12.0,
                    runs: vec![
                        FormattedRun::plain("a "),
                        FormattedRun {
                            text: "b".to_string(),
                            attrs: Some(attrs(&[("font-weight", "bolder")])),
                        },
                    ],
                }],
                attrs: attrs(&[("font-size", "8"), ("text-anchor", "middle")]),
                bounds: BoundingBox::new(0.0, 4.0, 10.0, 10.0),
            }),
        );

        let svg = render_svg(&drawing, &compact().without_class_prefix());
        assert!(svg.contains(
            r#"<g class="labels"><text font-size="8" text-anchor="middle"><tspan x="5" y="12">a <tspan font-weight="bolder">b</tspan></tspan></text></g>"#
        ));
    }

    #[test]
    fn test_open_path_gets_no_fill() {
        let mut builder = SvgBuilder::new(compact());
        builder.add_element(&Element::Path {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            closed: false,
            attrs: attrs(&[("stroke", "black")]),
        });
        builder.add_element(&Element::Path {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)],
            closed: true,
            attrs: attrs(&[("fill", "black")]),
        });
        assert_eq!(
            builder.elements,
            vec![
                r#"<path d="M0,0 L1,1" stroke="black" fill="none"/>"#.to_string(),
                r#"<path d="M0,0 L1,1 L0,1 Z" fill="black"/>"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_standalone_pretty_output() {
        let mut drawing = Drawing::new();
        drawing.push(
            Layer::Blocks,
            Element::Group {
                class: "region".to_string(),
                children: vec![Element::Rect {
                    bounds: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
                    attrs: Attrs::new(),
                }],
            },
        );
        drawing.bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        let svg = render_svg(&drawing, &SvgConfig::new().with_viewbox_padding(5.0));
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"viewBox="-5 -5 20 20""#));
        assert!(svg.contains("\n  <g class=\"seq-blocks\">\n    <g class=\"seq-region\">\n      <rect x=\"1\" y=\"2\" width=\"3\" height=\"4\"/>\n"));
        assert!(svg.ends_with("</svg>"));
    }
}
