//! Integration tests for the layout engine and SVG output

use pretty_assertions::assert_eq;

use sequence_illustrator::layout::{Drawing, Element, Layer, LayoutError};
use sequence_illustrator::text::measure_label;
use sequence_illustrator::{
    layout, render, ComponentRegistry, MonospaceMeasurer, RenderConfig, Sequence, Theme,
};

fn parse(source: &str) -> Sequence {
    Sequence::from_str(source).expect("Should parse")
}

fn lay_out(source: &str) -> Result<Drawing, LayoutError> {
    layout(&parse(source), &RenderConfig::new())
}

fn x_of(drawing: &Drawing, name: &str) -> f64 {
    drawing.agent(name).expect("agent should be placed").x
}

fn message_ys(drawing: &Drawing) -> Vec<f64> {
    drawing
        .layer(Layer::Shapes)
        .iter()
        .filter_map(|e| match e {
            Element::Line { from, .. } => Some(from.y),
            _ => None,
        })
        .collect()
}

const BEGIN_ABC: &str = r#"
[[stages]]
type = "agent-begin"
agents = ["A", "B", "C"]
"#;

#[test]
fn test_same_input_gives_identical_svg() {
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "connect"
agents = ["A", "C"]
label = "hello *there*"

[[stages]]
type = "note-over"
agents = ["B"]
label = "thinking"
"#
    );
    assert_eq!(render(&source).unwrap(), render(&source).unwrap());
}

#[test]
fn test_unmatched_block_end_reports_its_index() {
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "connect"
agents = ["A", "B"]

[[stages]]
type = "block-end"
"#
    );
    let err = lay_out(&source).unwrap_err();
    assert!(matches!(err, LayoutError::UnmatchedBlock { index: 2, .. }));
    assert_eq!(err.stage_index(), 2);
}

#[test]
fn test_unterminated_block_reports_its_begin() {
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "block-begin"
left = "A"
right = "B"

[[stages]]
type = "connect"
agents = ["A", "B"]
"#
    );
    let err = lay_out(&source).unwrap_err();
    assert!(matches!(err, LayoutError::UnterminatedBlock { index: 1 }));
}

#[test]
fn test_one_region_per_balanced_block() {
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "block-begin"
tag = "alt"
label = "ok"
left = "A"
right = "C"

[[stages]]
type = "connect"
agents = ["A", "B"]

[[stages]]
type = "block-split"
tag = "else"

[[stages]]
type = "block-begin"
tag = "opt"
left = "B"
right = "C"

[[stages]]
type = "connect"
agents = ["B", "C"]

[[stages]]
type = "block-end"

[[stages]]
type = "block-end"
"#
    );
    let drawing = lay_out(&source).unwrap();
    let regions: Vec<_> = drawing
        .layer(Layer::Blocks)
        .iter()
        .filter_map(|e| match e {
            Element::Rect { bounds, .. } => Some(*bounds),
            _ => None,
        })
        .collect();
    assert_eq!(regions.len(), 2);

    // Outer region is drawn first and encloses the inner one
    let (outer, inner) = (regions[0], regions[1]);
    assert!(outer.x < inner.x);
    assert!(outer.right() > inner.right());
    assert!(outer.y < inner.y);
    assert!(outer.bottom() > inner.bottom());
}

#[test]
fn test_note_between_separates_agents() {
    let label = "a fairly long note placed between two agents";
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "note-between"
agents = ["A", "B"]
label = "{label}"
"#
    );
    let drawing = lay_out(&source).unwrap();

    let theme = Theme::default();
    let note = theme.note("note").unwrap();
    let measured = measure_label(&MonospaceMeasurer::default(), label, &note.label_attrs);
    let needed = measured.size.width + note.padding.horizontal() + note.margin.horizontal();

    assert!(x_of(&drawing, "B") - x_of(&drawing, "A") >= needed);
    assert!(x_of(&drawing, "C") > x_of(&drawing, "B"));
}

#[test]
fn test_async_to_unknown_mark_starts_from_the_top() {
    let base = r#"
[[stages]]
type = "agent-begin"
agents = ["A", "B", "C", "D"]

[[stages]]
type = "connect"
agents = ["A", "B"]
label = "first"

[[stages]]
type = "connect"
agents = ["A", "B"]
label = "second"
"#;
    let source = format!(
        r#"{base}
[[stages]]
type = "async"
target = "never-marked"

[[stages]]
type = "connect"
agents = ["C", "D"]
label = "independent"
"#
    );
    let ys = message_ys(&lay_out(&source).unwrap());
    assert_eq!(ys.len(), 3);
    assert_eq!(ys[2], ys[0]);

    // Without the jump the message waits below the others
    let source = format!(
        r#"{base}
[[stages]]
type = "connect"
agents = ["C", "D"]
label = "independent"
"#
    );
    let ys = message_ys(&lay_out(&source).unwrap());
    assert!(ys[2] > ys[1]);
}

#[test]
fn test_highlight_widens_lifeline() {
    let source = r#"
[[stages]]
type = "agent-begin"
agents = ["A", "B"]

[[stages]]
type = "agent-highlight"
agents = ["B"]
highlighted = true

[[stages]]
type = "connect"
agents = ["A", "B"]
label = "work"

[[stages]]
type = "agent-highlight"
agents = ["B"]
highlighted = false
"#;
    let drawing = lay_out(source).unwrap();
    let theme = Theme::default();
    assert_eq!(drawing.agent("B").unwrap().max_rad, theme.agent_line_highlight_radius);
    assert_eq!(drawing.agent("A").unwrap().max_rad, 0.0);

    let highlighted = drawing
        .layer(Layer::AgentLines)
        .iter()
        .filter(|e| matches!(e, Element::Rect { .. }))
        .count();
    assert_eq!(highlighted, 1);
}

#[test]
fn test_one_registry_renders_twice_identically() {
    let source = format!(
        r#"{BEGIN_ABC}
[[stages]]
type = "label-pattern"
pattern = "<inc> <label>"

[[stages]]
type = "mark"
name = "m"

[[stages]]
type = "connect"
agents = ["A", "B"]
label = "one"

[[stages]]
type = "async"
target = "m"

[[stages]]
type = "connect"
agents = ["B", "C"]
label = "two"
"#
    );
    let sequence = parse(&source);
    let theme = Theme::default();
    let measurer = MonospaceMeasurer::default();
    let registry = ComponentRegistry::standard();

    let first =
        sequence_illustrator::layout::compute(&sequence, &theme, &measurer, &registry).unwrap();
    let second =
        sequence_illustrator::layout::compute(&sequence, &theme, &measurer, &registry).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_document_renders() {
    let svg = render("").unwrap();
    assert!(svg.contains("<svg"));
    assert!(!svg.contains("<g"));
}
