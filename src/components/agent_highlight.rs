//! Lifeline highlighting

use crate::layout::{Env, LayoutError};
use crate::sequence::Stage;

use super::{Component, RenderPre};

/// `agent-highlight`: widens or narrows lifelines from this point on
pub struct AgentHighlight;

fn desired_rad(env: &Env<'_>, highlighted: bool) -> f64 {
    if highlighted {
        env.theme.agent_line_highlight_radius
    } else {
        0.0
    }
}

impl Component for AgentHighlight {
    fn separation_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::AgentHighlight(highlight) = stage else {
            return Ok(());
        };
        let rad = desired_rad(env, highlight.highlighted);
        for id in env.agent_ids(&highlight.agents) {
            env.set_rad(id, rad);
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::AgentHighlight(highlight) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(RenderPre {
            agents: env.agent_ids(&highlight.agents),
            ..RenderPre::default()
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::AgentHighlight(highlight) = stage else {
            return Ok(env.top_y);
        };
        let top = env.top_y;
        let rad = desired_rad(env, highlight.highlighted);
        for id in env.agent_ids(&highlight.agents) {
            env.draw_agent_line(id, top);
            env.set_rad(id, rad);
        }
        Ok(top)
    }
}
