//! Per-stage-kind behavior
//!
//! Every stage kind is handled by one [`Component`]. The engine calls the
//! component's hooks for each stage in both passes; hooks a component does
//! not need keep their no-op defaults.

pub mod agent_cap;
pub mod agent_highlight;
pub mod block;
pub mod connect;
pub mod label_pattern;
pub mod marker;
pub mod note;
pub mod parallel;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeMap;
use std::fmt;

use crate::layout::{AgentId, ComponentState, Env, LayoutError};
use crate::sequence::{Stage, StageKind};

/// What a stage tells the engine before it is rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPre {
    /// Agents the stage draws on
    pub agents: Vec<AgentId>,
    /// Distance from the stage top to its primary line
    pub top_shift: f64,
    /// Origin Y for the next stage, if this stage jumps back up
    pub asynchronous_y: Option<f64>,
}

/// Layout behavior of one stage kind
pub trait Component {
    /// Create this component's state, once before the separation pass
    fn make_state(&self, _state: &mut ComponentState) {}

    /// Reset this component's state, once before the render pass
    fn reset_state(&self, _state: &mut ComponentState) {}

    fn separation_pre(&self, _stage: &Stage, _env: &mut Env<'_>) -> Result<(), LayoutError> {
        Ok(())
    }

    /// Record the horizontal room the stage needs
    fn separation(&self, _stage: &Stage, _env: &mut Env<'_>) -> Result<(), LayoutError> {
        Ok(())
    }

    fn render_pre(&self, _stage: &Stage, _env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        Ok(RenderPre::default())
    }

    /// Draw the stage from `env.top_y` and return its bottom Y
    fn render(&self, _stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        Ok(env.top_y)
    }
}

/// Mapping from stage kind to the component handling it
#[derive(Default)]
pub struct ComponentRegistry {
    components: BTreeMap<StageKind, Box<dyn Component>>,
}

impl ComponentRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in component
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(StageKind::AgentBegin, agent_cap::AgentBegin);
        registry.register(StageKind::AgentEnd, agent_cap::AgentEnd);
        registry.register(StageKind::AgentHighlight, agent_highlight::AgentHighlight);
        registry.register(StageKind::Connect, connect::Connect);
        registry.register(StageKind::NoteOver, note::NoteOver);
        registry.register(StageKind::NoteSide, note::NoteSide);
        registry.register(StageKind::NoteBetween, note::NoteBetween);
        registry.register(StageKind::BlockBegin, block::BlockBegin);
        registry.register(StageKind::BlockSplit, block::BlockSplit);
        registry.register(StageKind::BlockEnd, block::BlockEnd);
        registry.register(StageKind::Mark, marker::Mark);
        registry.register(StageKind::Async, marker::Async);
        registry.register(StageKind::LabelPattern, label_pattern::LabelPatternComponent);
        registry.register(StageKind::Parallel, parallel::Parallel);
        registry
    }

    /// Register a component, replacing any previous one for `kind`
    pub fn register(&mut self, kind: StageKind, component: impl Component + 'static) {
        self.components.insert(kind, Box::new(component));
    }

    pub fn get(&self, kind: StageKind) -> Option<&dyn Component> {
        self.components.get(&kind).map(|c| c.as_ref())
    }

    /// Registered components in kind order
    pub fn components(&self) -> impl Iterator<Item = (StageKind, &dyn Component)> {
        self.components.iter().map(|(k, c)| (*k, c.as_ref()))
    }

    /// Component for a stage, or an error naming the stage
    pub fn component_for(&self, index: usize, stage: &Stage) -> Result<&dyn Component, LayoutError> {
        let kind = stage.kind();
        self.get(kind)
            .ok_or_else(|| LayoutError::missing_component(index, kind))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.keys()).finish()
    }
}
