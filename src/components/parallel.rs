//! Stages drawn side by side

use crate::layout::{Env, LayoutError};
use crate::sequence::Stage;

use super::{Component, RenderPre};

/// `parallel`: runs every nested stage from the same top Y
pub struct Parallel;

impl Component for Parallel {
    fn separation_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::Parallel(parallel) = stage else {
            return Ok(());
        };
        let registry = env.registry;
        for child in &parallel.stages {
            registry
                .component_for(env.stage_index, child)?
                .separation_pre(child, env)?;
        }
        Ok(())
    }

    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::Parallel(parallel) = stage else {
            return Ok(());
        };
        let registry = env.registry;
        for child in &parallel.stages {
            registry
                .component_for(env.stage_index, child)?
                .separation(child, env)?;
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::Parallel(parallel) = stage else {
            return Ok(RenderPre::default());
        };
        let registry = env.registry;
        let mut combined = RenderPre::default();
        for child in &parallel.stages {
            let pre = registry
                .component_for(env.stage_index, child)?
                .render_pre(child, env)?;
            for id in pre.agents {
                if !combined.agents.contains(&id) {
                    combined.agents.push(id);
                }
            }
            combined.top_shift = combined.top_shift.max(pre.top_shift);
            if pre.asynchronous_y.is_some() {
                combined.asynchronous_y = pre.asynchronous_y;
            }
        }
        Ok(combined)
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::Parallel(parallel) = stage else {
            return Ok(env.top_y);
        };
        let registry = env.registry;
        let (top, primary) = (env.top_y, env.primary_y);
        let mut bottom = top;
        for child in &parallel.stages {
            env.top_y = top;
            env.primary_y = primary;
            let child_bottom = registry
                .component_for(env.stage_index, child)?
                .render(child, env)?;
            bottom = bottom.max(child_bottom);
        }
        env.top_y = top;
        env.primary_y = primary;
        Ok(bottom)
    }
}
