//! Helpers shared by component tests

use crate::layout::{compute, Drawing, Element, Layer, LayoutError};
use crate::sequence::{AgentCaps, CapMode, Connect, ConnectOptions, Sequence, Stage};
use crate::text::MonospaceMeasurer;
use crate::theme::Theme;

use super::ComponentRegistry;

pub(crate) fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn begin(agents: &[&str]) -> Stage {
    Stage::AgentBegin(AgentCaps {
        agents: names(agents),
        mode: CapMode::Box,
    })
}

pub(crate) fn end(agents: &[&str], mode: CapMode) -> Stage {
    Stage::AgentEnd(AgentCaps {
        agents: names(agents),
        mode,
    })
}

pub(crate) fn connect(from: &str, to: &str, label: &str) -> Stage {
    Stage::Connect(Connect {
        agents: names(&[from, to]),
        label: label.to_string(),
        options: ConnectOptions::default(),
    })
}

pub(crate) fn sequence(agents: &[&str], stages: Vec<Stage>) -> Sequence {
    Sequence {
        title: None,
        agents: agents.iter().map(|a| crate::sequence::AgentDecl::new(*a)).collect(),
        stages,
    }
}

pub(crate) fn try_layout(sequence: &Sequence) -> Result<Drawing, LayoutError> {
    let theme = Theme::default();
    let measurer = MonospaceMeasurer::default();
    let registry = ComponentRegistry::standard();
    compute(sequence, &theme, &measurer, &registry)
}

pub(crate) fn layout(sequence: &Sequence) -> Drawing {
    try_layout(sequence).expect("layout should succeed")
}

pub(crate) fn x_of(drawing: &Drawing, agent: &str) -> f64 {
    drawing
        .agent(agent)
        .unwrap_or_else(|| panic!("no agent {}", agent))
        .x
}

/// Every text line in a layer, flattened to plain strings
pub(crate) fn texts(drawing: &Drawing, layer: Layer) -> Vec<String> {
    drawing
        .layer(layer)
        .iter()
        .filter_map(|e| match e {
            Element::Text(block) => Some(
                block
                    .lines
                    .iter()
                    .map(|l| crate::text::markdown::line_text(&l.runs))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        })
        .collect()
}
