//! Mutable layout context threaded through every pass
//!
//! An [`Env`] lives for exactly one layout call. It owns the agent arena,
//! the component state and the drawing being built, and borrows the theme,
//! text measurer and component registry.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::components::block::BlockFrame;
use crate::components::ComponentRegistry;
use crate::sequence::AgentDecl;
use crate::text::measure::DEFAULT_FONT_SIZE;
use crate::text::{
    attr_f64, measure_label, Attrs, LabelPattern, MeasuredLabel, PatternCounters, TextMeasurer,
};
use crate::theme::Theme;

use super::types::{BoundingBox, Drawing, Element, Layer, Point, TextAnchor, TextBlock, TextLine};

/// Cap height as a fraction of the font size, used to place baselines
const CAP_HEIGHT: f64 = 0.7;

/// Handle to an agent in the [`AgentTable`]
///
/// Ids are handed out in left-to-right order, so comparing ids compares
/// agent positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// Mutable layout record of one agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInfo {
    pub name: String,
    pub label: String,
    /// Left-to-right order
    pub index: usize,
    pub x: f64,
    /// Half-width of the lifeline at the current point of the pass
    pub current_rad: f64,
    /// Widest half-width seen in the separation pass
    pub current_max_rad: f64,
    /// Minimum center distance to other agents
    pub separations: BTreeMap<AgentId, f64>,
    /// Furthest anything attached to this agent reaches to its left
    pub left_pad: f64,
    /// Furthest anything attached to this agent reaches to its right
    pub right_pad: f64,
    /// Lowest Y drawn in this agent's column so far
    pub latest_y: f64,
    /// Start of the open lifeline segment; `None` while the agent is not
    /// visible
    pub line_start: Option<f64>,
}

impl AgentInfo {
    fn new(name: impl Into<String>, label: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            index,
            x: 0.0,
            current_rad: 0.0,
            current_max_rad: 0.0,
            separations: BTreeMap::new(),
            left_pad: 0.0,
            right_pad: 0.0,
            latest_y: 0.0,
            line_start: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.line_start.is_some()
    }

    /// Separation required to `other`, if any was recorded
    pub fn separation(&self, other: AgentId) -> Option<f64> {
        self.separations.get(&other).copied()
    }
}

/// Arena of agents addressed by [`AgentId`]
#[derive(Debug, Clone, Default)]
pub struct AgentTable {
    agents: Vec<AgentInfo>,
    by_name: HashMap<String, AgentId>,
}

impl AgentTable {
    /// Build the table from declared agents. A repeated name keeps its
    /// first position.
    pub fn new(decls: &[AgentDecl]) -> Self {
        let mut table = Self::default();
        for decl in decls {
            if table.lookup(&decl.name).is_none() {
                table.insert(&decl.name, decl.display_label());
            }
        }
        table
    }

    pub fn lookup(&self, name: &str) -> Option<AgentId> {
        self.by_name.get(name).copied()
    }

    /// Append an agent at the right end
    pub fn insert(&mut self, name: &str, label: &str) -> AgentId {
        let id = AgentId(self.agents.len());
        self.agents.push(AgentInfo::new(name, label, id.0));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: AgentId) -> &AgentInfo {
        &self.agents[id.0]
    }

    pub fn get_mut(&mut self, id: AgentId) -> &mut AgentInfo {
        &mut self.agents[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.agents.len()).map(AgentId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentInfo> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AgentInfo> {
        self.agents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Space a stage needs on either side of an agent's center line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
    pub left: f64,
    pub right: f64,
}

/// A label pattern installed by a `label-pattern` stage
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePattern {
    pub pattern: LabelPattern,
    pub counters: PatternCounters,
}

/// State owned by the components, one field per stateful component
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    /// Mark name -> Y recorded in the render pass
    pub marks: BTreeMap<String, f64>,
    /// Open blocks, innermost last
    pub blocks: Vec<BlockFrame>,
    pub label_pattern: Option<ActivePattern>,
}

/// Layout context for one diagram
pub struct Env<'a> {
    pub theme: &'a Theme,
    pub registry: &'a ComponentRegistry,
    measurer: &'a dyn TextMeasurer,
    pub agents: AgentTable,
    pub state: ComponentState,
    /// Top of the stage being rendered
    pub top_y: f64,
    /// Y of the stage's main line (message line, cap baseline, ...)
    pub primary_y: f64,
    /// Index of the top-level stage being processed
    pub stage_index: usize,
    spacing: BTreeMap<AgentId, Spacing>,
    pub drawing: Drawing,
}

impl<'a> Env<'a> {
    pub fn new(
        theme: &'a Theme,
        measurer: &'a dyn TextMeasurer,
        registry: &'a ComponentRegistry,
        decls: &[AgentDecl],
    ) -> Self {
        Self {
            theme,
            registry,
            measurer,
            agents: AgentTable::new(decls),
            state: ComponentState::default(),
            top_y: 0.0,
            primary_y: 0.0,
            stage_index: 0,
            spacing: BTreeMap::new(),
            drawing: Drawing::new(),
        }
    }

    /// Resolve an agent by name. Unknown names get a fresh record at the
    /// right end instead of failing.
    pub fn agent_id(&mut self, name: &str) -> AgentId {
        match self.agents.lookup(name) {
            Some(id) => id,
            None => {
                warn!(
                    agent = name,
                    stage = self.stage_index,
                    "stage refers to an undeclared agent"
                );
                self.agents.insert(name, name)
            }
        }
    }

    pub fn agent_ids(&mut self, names: &[String]) -> Vec<AgentId> {
        names.iter().map(|n| self.agent_id(n)).collect()
    }

    pub fn agent(&self, id: AgentId) -> &AgentInfo {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> &mut AgentInfo {
        self.agents.get_mut(id)
    }

    /// Leftmost and rightmost of `ids`
    pub fn extremes(&self, ids: &[AgentId]) -> Option<(AgentId, AgentId)> {
        let left = ids.iter().min()?;
        let right = ids.iter().max()?;
        Some((*left, *right))
    }

    pub fn visible_agents(&self) -> Vec<AgentId> {
        self.agents
            .ids()
            .filter(|id| self.agents.get(*id).is_visible())
            .collect()
    }

    /// Start processing a stage: clears spacing requests and seeds every
    /// visible agent with zero spacing
    pub fn begin_stage(&mut self, index: usize) {
        self.stage_index = index;
        self.spacing.clear();
        for id in self.visible_agents() {
            self.spacing.insert(id, Spacing::default());
        }
    }

    /// Request room on either side of an agent for the current stage
    pub fn add_spacing(&mut self, id: AgentId, left: f64, right: f64) {
        let entry = self.spacing.entry(id).or_default();
        entry.left = entry.left.max(left);
        entry.right = entry.right.max(right);
    }

    /// Require the centers of two agents to be at least `distance` apart
    pub fn add_separation(&mut self, a: AgentId, b: AgentId, distance: f64) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let entry = self
                .agents
                .get_mut(from)
                .separations
                .entry(to)
                .or_insert(0.0);
            *entry = entry.max(distance);
        }
    }

    /// Turn the current stage's spacing requests into pairwise separations
    pub fn fold_spacing(&mut self) {
        let margin = self.theme.agent_margin;
        let entries: Vec<(AgentId, Spacing)> = std::mem::take(&mut self.spacing)
            .into_iter()
            .collect();

        for (id, spacing) in &entries {
            let agent = self.agents.get_mut(*id);
            agent.left_pad = agent.left_pad.max(spacing.left);
            agent.right_pad = agent.right_pad.max(spacing.right);
        }

        for (i, (left, left_spacing)) in entries.iter().enumerate() {
            for (right, right_spacing) in &entries[i + 1..] {
                self.add_separation(
                    *left,
                    *right,
                    right_spacing.left + left_spacing.right + margin,
                );
            }
        }
    }

    /// Set the lifeline half-width of an agent
    pub fn set_rad(&mut self, id: AgentId, rad: f64) {
        let agent = self.agents.get_mut(id);
        agent.current_rad = rad;
        agent.current_max_rad = agent.current_max_rad.max(rad);
    }

    /// Agents whose X lies within the X span of `ids`; every agent when
    /// `ids` is empty
    pub fn agents_in_range(&self, ids: &[AgentId]) -> Vec<AgentId> {
        if ids.is_empty() {
            return self.agents.ids().collect();
        }
        let (lo, hi) = ids.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), id| {
            let x = self.agents.get(*id).x;
            (lo.min(x), hi.max(x))
        });
        self.agents
            .ids()
            .filter(|id| {
                let x = self.agents.get(*id).x;
                x >= lo && x <= hi
            })
            .collect()
    }

    /// Mark an agent visible without drawing anything (separation pass)
    pub fn show_agent(&mut self, id: AgentId) {
        let agent = self.agents.get_mut(id);
        if agent.line_start.is_none() {
            agent.line_start = Some(0.0);
        }
    }

    /// Mark an agent hidden without drawing anything (separation pass)
    pub fn hide_agent(&mut self, id: AgentId) {
        self.agents.get_mut(id).line_start = None;
    }

    /// Open a lifeline at `y`
    pub fn open_line(&mut self, id: AgentId, y: f64) {
        self.agents.get_mut(id).line_start = Some(y);
    }

    /// Draw the open lifeline down to `y` and hide the agent
    pub fn close_line(&mut self, id: AgentId, y: f64) {
        self.draw_agent_line(id, y);
        self.agents.get_mut(id).line_start = None;
    }

    /// Draw the open lifeline segment of an agent down to `to_y` using
    /// its current radius. The segment then restarts at `to_y`.
    pub fn draw_agent_line(&mut self, id: AgentId, to_y: f64) {
        let agent = self.agents.get(id);
        let Some(start) = agent.line_start else {
            return;
        };
        if to_y <= start {
            return;
        }

        let (x, rad) = (agent.x, agent.current_rad);
        let element = if rad > 0.0 {
            Element::Rect {
                bounds: BoundingBox::new(x - rad, start, rad * 2.0, to_y - start),
                attrs: self.theme.agent_line_highlight_attrs.clone(),
            }
        } else {
            Element::Line {
                from: Point::new(x, start),
                to: Point::new(x, to_y),
                attrs: self.theme.agent_line_attrs.clone(),
            }
        };
        self.drawing.push(Layer::AgentLines, element);
        self.agents.get_mut(id).line_start = Some(to_y);
    }

    pub fn measure(&self, label: &str, attrs: &Attrs) -> MeasuredLabel {
        measure_label(self.measurer, label, attrs)
    }

    /// Lay out a measured label with its anchor at `x` and its top at `top`
    pub fn text(&self, label: &MeasuredLabel, attrs: &Attrs, x: f64, top: f64) -> Element {
        let anchor = TextAnchor::from_attrs(attrs);
        let font_size = attr_f64(attrs, "font-size").unwrap_or(DEFAULT_FONT_SIZE);

        let mut line_top = top;
        let lines = label
            .lines
            .iter()
            .map(|line| {
                let baseline = line_top + (line.height + font_size * CAP_HEIGHT) / 2.0;
                line_top += line.height;
                TextLine {
                    baseline,
                    runs: line.runs.clone(),
                }
            })
            .collect();

        Element::Text(TextBlock {
            x,
            anchor,
            lines,
            attrs: attrs.clone(),
            bounds: BoundingBox::new(
                anchor.left_of(x, label.size.width),
                top,
                label.size.width,
                label.size.height,
            ),
        })
    }

    /// Lay out a measured label aligned inside a box per its anchor
    pub fn text_within(
        &self,
        label: &MeasuredLabel,
        attrs: &Attrs,
        left: f64,
        width: f64,
        top: f64,
    ) -> Element {
        let x = TextAnchor::from_attrs(attrs).x_within(left, width);
        self.text(label, attrs, x, top)
    }

    pub fn push(&mut self, layer: Layer, element: Element) {
        self.drawing.push(layer, element);
    }

    /// Run a message label through the active label pattern, if any
    pub fn apply_label_pattern(&mut self, label: &str) -> String {
        match self.state.label_pattern.as_mut() {
            Some(active) => active.pattern.apply(label, &mut active.counters),
            None => label.to_string(),
        }
    }

    /// The label [`Env::apply_label_pattern`] would produce next, without
    /// advancing any counter
    pub fn preview_label_pattern(&self, label: &str) -> String {
        match self.state.label_pattern.as_ref() {
            Some(active) => active.pattern.apply(label, &mut active.counters.clone()),
            None => label.to_string(),
        }
    }

    pub fn into_drawing(self) -> Drawing {
        self.drawing
    }
}
