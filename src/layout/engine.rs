//! Layout engine: turns a stage list into a positioned drawing
//!
//! Layout runs in three steps:
//! 1. Separation pass - every stage reports the horizontal room it needs
//! 2. Position assignment - agents are placed left to right
//! 3. Render pass - stages are drawn top to bottom with a vertical cursor

use tracing::debug;

use crate::components::ComponentRegistry;
use crate::sequence::{Sequence, Stage};
use crate::text::{attrs, merge_attrs, TextMeasurer};
use crate::theme::Theme;

use super::env::{AgentId, Env};
use super::error::LayoutError;
use super::types::{AgentGeometry, BoundingBox, Drawing, Element, Layer, Point};

/// Compute the drawing for a sequence
pub fn compute(
    sequence: &Sequence,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
    registry: &ComponentRegistry,
) -> Result<Drawing, LayoutError> {
    let mut env = Env::new(theme, measurer, registry, &sequence.agents);

    separation_pass(&sequence.stages, &mut env)?;
    assign_positions(&mut env);
    let bottom = render_pass(sequence, &mut env)?;

    Ok(finish(env, bottom))
}

fn separation_pass(stages: &[Stage], env: &mut Env<'_>) -> Result<(), LayoutError> {
    let registry = env.registry;
    for (_, component) in registry.components() {
        component.make_state(&mut env.state);
    }

    for (index, stage) in stages.iter().enumerate() {
        env.begin_stage(index);
        let component = registry.component_for(index, stage)?;
        component.separation_pre(stage, env)?;
        component.separation(stage, env)?;
        env.fold_spacing();
    }

    if let Some(frame) = env.state.blocks.last() {
        return Err(LayoutError::unterminated(frame.begin_index));
    }

    debug!(
        stages = stages.len(),
        agents = env.agents.len(),
        "separation pass complete"
    );
    Ok(())
}

/// Place agents left to right, honouring radii and recorded separations
fn assign_positions(env: &mut Env<'_>) {
    let margin = env.theme.agent_margin;
    let ids: Vec<AgentId> = env.agents.ids().collect();

    for (pos, id) in ids.iter().enumerate() {
        let x = match pos.checked_sub(1).map(|p| ids[p]) {
            None => 0.0,
            Some(prev) => {
                let prev_info = env.agent(prev);
                let info = env.agent(*id);
                let mut x =
                    prev_info.x + prev_info.current_max_rad + info.current_max_rad + margin;
                for earlier in &ids[..pos] {
                    if let Some(distance) = info.separation(*earlier) {
                        x = x.max(env.agent(*earlier).x + distance);
                    }
                }
                x
            }
        };

        let info = env.agent_mut(*id);
        info.x = x;
        debug!(agent = %info.name, x, max_rad = info.current_max_rad, "positioned agent");
    }
}

fn render_pass(sequence: &Sequence, env: &mut Env<'_>) -> Result<f64, LayoutError> {
    let registry = env.registry;
    for (_, component) in registry.components() {
        component.reset_state(&mut env.state);
    }
    for agent in env.agents.iter_mut() {
        agent.current_rad = 0.0;
        agent.line_start = None;
        agent.latest_y = 0.0;
    }

    let mut cursor = draw_title(sequence.title.as_deref(), env);
    for agent in env.agents.iter_mut() {
        agent.latest_y = cursor;
    }

    let mut asynchronous_y: Option<f64> = None;
    for (index, stage) in sequence.stages.iter().enumerate() {
        env.begin_stage(index);
        let component = registry.component_for(index, stage)?;
        let pre = component.render_pre(stage, env)?;
        let in_range = env.agents_in_range(&pre.agents);

        // A stage naming no agents keeps the async origin as is
        let top_y = match asynchronous_y.take() {
            Some(origin) if pre.agents.is_empty() => origin,
            Some(origin) => in_range
                .iter()
                .map(|id| env.agent(*id).latest_y)
                .fold(origin, f64::max),
            None => cursor,
        };
        env.top_y = top_y;
        env.primary_y = top_y + pre.top_shift;

        let bottom = component.render(stage, env)?;

        if !pre.agents.is_empty() {
            for id in in_range {
                let agent = env.agent_mut(id);
                agent.latest_y = agent.latest_y.max(bottom);
            }
        }
        cursor = cursor.max(bottom);
        asynchronous_y = pre.asynchronous_y;
    }

    for id in env.visible_agents() {
        env.draw_agent_line(id, cursor);
    }

    debug!(bottom = cursor, "render pass complete");
    Ok(cursor)
}

/// Draw the title centered over the agents, returning the Y below it
fn draw_title(title: Option<&str>, env: &mut Env<'_>) -> f64 {
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return 0.0;
    };
    let theme = env.theme;
    let label = env.measure(title, &theme.title_attrs);

    let (lo, hi) = env
        .agents
        .iter()
        .fold(None, |range: Option<(f64, f64)>, agent| match range {
            None => Some((agent.x, agent.x)),
            Some((lo, hi)) => Some((lo.min(agent.x), hi.max(agent.x))),
        })
        .unwrap_or((0.0, 0.0));
    let center = (lo + hi) / 2.0;

    let text = env.text_within(
        &label,
        &theme.title_attrs,
        center - label.size.width / 2.0,
        label.size.width,
        0.0,
    );
    env.push(Layer::Labels, text);

    label.size.height + theme.title_margin
}

/// Record agent geometry and compute the overall bounds
fn finish(env: Env<'_>, bottom: f64) -> Drawing {
    let outer_margin = env.theme.outer_margin;
    let agents: Vec<AgentGeometry> = env
        .agents
        .iter()
        .map(|a| AgentGeometry {
            name: a.name.clone(),
            x: a.x,
            max_rad: a.current_max_rad,
        })
        .collect();
    let reach = env
        .agents
        .iter()
        .map(|a| {
            BoundingBox::new(
                a.x - a.left_pad - a.current_max_rad,
                0.0,
                a.left_pad + a.right_pad + a.current_max_rad * 2.0,
                bottom,
            )
        })
        .reduce(|a, b| a.union(&b));

    let mut drawing = env.into_drawing();
    let content = match (drawing.content_bounds(), reach) {
        (Some(content), Some(reach)) => content.union(&reach),
        (Some(bounds), None) | (None, Some(bounds)) => bounds,
        (None, None) => BoundingBox::new(0.0, 0.0, 0.0, bottom),
    };
    drawing.bounds = content.inflate(outer_margin);
    drawing.agents = agents;
    drawing
}

/// Add a dashed guide at every agent's X plus its reserved reach
pub fn debug_guides(drawing: &mut Drawing) {
    let top = drawing.bounds.y;
    let bottom = drawing.bounds.bottom();
    let guides: Vec<Element> = drawing
        .agents
        .iter()
        .flat_map(|agent| {
            let style = attrs(&[
                ("stroke", "#c04040"),
                ("stroke-dasharray", "2,2"),
                ("stroke-width", "0.5"),
            ]);
            [
                Element::Line {
                    from: Point::new(agent.x, top),
                    to: Point::new(agent.x, bottom),
                    attrs: style.clone(),
                },
                Element::Rect {
                    bounds: BoundingBox::new(
                        agent.x - agent.max_rad,
                        top,
                        agent.max_rad * 2.0,
                        bottom - top,
                    ),
                    attrs: merge_attrs(&style, Some(&attrs(&[("fill", "none")]))),
                },
            ]
        })
        .collect();
    for guide in guides {
        drawing.push(Layer::Background, guide);
    }
}
