//! Core types for the layout engine and its output drawing

use crate::text::{Attrs, FormattedRun};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning two corners, in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Grow the box by `amount` on every side
    pub fn inflate(&self, amount: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Horizontal alignment of a text block relative to its `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    /// Read the `text-anchor` attribute, defaulting to start
    pub fn from_attrs(attrs: &Attrs) -> Self {
        match attrs.get("text-anchor").map(String::as_str) {
            Some("middle") => TextAnchor::Middle,
            Some("end") => TextAnchor::End,
            _ => TextAnchor::Start,
        }
    }

    /// Left edge of a block of `width` anchored at `x`
    pub fn left_of(&self, x: f64, width: f64) -> f64 {
        match self {
            TextAnchor::Start => x,
            TextAnchor::Middle => x - width / 2.0,
            TextAnchor::End => x - width,
        }
    }

    /// Anchor x that aligns text inside a box starting at `left`
    pub fn x_within(&self, left: f64, width: f64) -> f64 {
        match self {
            TextAnchor::Start => left,
            TextAnchor::Middle => left + width / 2.0,
            TextAnchor::End => left + width,
        }
    }
}

/// One line of a text block
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Baseline y-coordinate
    pub baseline: f64,
    pub runs: Vec<FormattedRun>,
}

/// Positioned multi-line text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub x: f64,
    pub anchor: TextAnchor,
    pub lines: Vec<TextLine>,
    pub attrs: Attrs,
    /// Measured extent of the whole block
    pub bounds: BoundingBox,
}

/// A drawing primitive with absolute coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Line {
        from: Point,
        to: Point,
        attrs: Attrs,
    },
    Rect {
        bounds: BoundingBox,
        attrs: Attrs,
    },
    /// Polyline through `points`, closed back to the first point if `closed`
    Path {
        points: Vec<Point>,
        closed: bool,
        attrs: Attrs,
    },
    Text(TextBlock),
    Group {
        class: String,
        children: Vec<Element>,
    },
}

impl Element {
    /// Extent of the element, if it has any
    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Element::Line { from, to, .. } => Some(BoundingBox::from_corners(*from, *to)),
            Element::Rect { bounds, .. } => Some(*bounds),
            Element::Path { points, .. } => points
                .iter()
                .map(|p| BoundingBox::new(p.x, p.y, 0.0, 0.0))
                .reduce(|a, b| a.union(&b)),
            Element::Text(text) => {
                if text.lines.is_empty() {
                    None
                } else {
                    Some(text.bounds)
                }
            }
            Element::Group { children, .. } => children
                .iter()
                .filter_map(Element::bounds)
                .reduce(|a, b| a.union(&b)),
        }
    }
}

/// Drawing layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    AgentLines,
    Blocks,
    Shapes,
    Labels,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::AgentLines,
        Layer::Blocks,
        Layer::Shapes,
        Layer::Labels,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::AgentLines => "agent-lines",
            Layer::Blocks => "blocks",
            Layer::Shapes => "shapes",
            Layer::Labels => "labels",
        }
    }
}

/// Final horizontal geometry of one agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentGeometry {
    pub name: String,
    pub x: f64,
    /// Widest lifeline half-width used anywhere in the diagram
    pub max_rad: f64,
}

/// The engine output: positioned, styled primitives in layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub background: Vec<Element>,
    pub agent_lines: Vec<Element>,
    pub blocks: Vec<Element>,
    pub shapes: Vec<Element>,
    pub labels: Vec<Element>,
    pub agents: Vec<AgentGeometry>,
    pub bounds: BoundingBox,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to a layer
    pub fn push(&mut self, layer: Layer, element: Element) {
        self.layer_mut(layer).push(element);
    }

    /// Insert an element into a layer at `index`, behind everything pushed
    /// after that point
    pub fn insert(&mut self, layer: Layer, index: usize, element: Element) {
        let elements = self.layer_mut(layer);
        let index = index.min(elements.len());
        elements.insert(index, element);
    }

    pub fn layer(&self, layer: Layer) -> &[Element] {
        match layer {
            Layer::Background => &self.background,
            Layer::AgentLines => &self.agent_lines,
            Layer::Blocks => &self.blocks,
            Layer::Shapes => &self.shapes,
            Layer::Labels => &self.labels,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Element> {
        match layer {
            Layer::Background => &mut self.background,
            Layer::AgentLines => &mut self.agent_lines,
            Layer::Blocks => &mut self.blocks,
            Layer::Shapes => &mut self.shapes,
            Layer::Labels => &mut self.labels,
        }
    }

    /// Union of every element's bounds
    pub fn content_bounds(&self) -> Option<BoundingBox> {
        Layer::ALL
            .iter()
            .flat_map(|l| self.layer(*l).iter())
            .filter_map(Element::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Geometry of a named agent
    pub fn agent(&self, name: &str) -> Option<&AgentGeometry> {
        self.agents.iter().find(|a| a.name == name)
    }
}
