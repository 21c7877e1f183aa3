//! Sequence Illustrator - sequence diagram layout and SVG rendering
//!
//! This library turns a list of diagram stages (agent lifelines, messages,
//! notes, blocks) into a positioned drawing and serializes it to SVG.
//!
//! # Example
//!
//! ```rust
//! use sequence_illustrator::render;
//!
//! let svg = render(r#"
//! [[stages]]
//! type = "agent-begin"
//! agents = ["Client", "Server"]
//!
//! [[stages]]
//! type = "connect"
//! agents = ["Client", "Server"]
//! label = "request"
//! "#).unwrap();
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("request"));
//! ```

pub mod components;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod sequence;
pub mod text;
pub mod theme;

pub use components::{Component, ComponentRegistry};
pub use error::DocumentError;
pub use layout::{Drawing, LayoutError};
pub use renderer::{render_svg, SvgConfig};
pub use sequence::{Sequence, Stage};
pub use text::{MonospaceMeasurer, TextMeasurer};
pub use theme::{Theme, ThemeError};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error reading the document
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Configuration for the complete render pipeline
#[derive(Clone)]
pub struct RenderConfig {
    /// Visual constants and style bundles
    pub theme: Theme,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Text measurement used for every label
    pub measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Debug mode: draw agent guides
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            svg: SvgConfig::default(),
            measurer: Arc::new(MonospaceMeasurer::default()),
            debug: false,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("theme", &self.theme.name)
            .field("svg", &self.svg)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the text measurer
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + Send + Sync + 'static) -> Self {
        self.measurer = Arc::new(measurer);
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Render a TOML sequence document to SVG with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render a TOML sequence document to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use sequence_illustrator::{render_with_config, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_svg(SvgConfig::default().with_viewbox_padding(20.0).with_standalone(false));
///
/// let svg = render_with_config(r#"title = "Empty""#, &config).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let sequence = Sequence::from_str(source)?;
    let drawing = layout(&sequence, config)?;
    Ok(render_svg(&drawing, &config.svg))
}

/// Lay out a sequence with the standard components
pub fn layout(sequence: &Sequence, config: &RenderConfig) -> Result<Drawing, LayoutError> {
    let registry = ComponentRegistry::standard();
    let mut drawing = layout::compute(sequence, &config.theme, config.measurer.as_ref(), &registry)?;

    if config.debug {
        for agent in &drawing.agents {
            debug!(agent = %agent.name, x = agent.x, max_rad = agent.max_rad, "agent geometry");
        }
        layout::debug_guides(&mut drawing);
    }

    Ok(drawing)
}
