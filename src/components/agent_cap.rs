//! Agent begin and end caps

use crate::layout::{AgentId, BoundingBox, Element, Env, Layer, LayoutError, Point};
use crate::sequence::{CapMode, Stage};
use crate::text::MeasuredLabel;

use super::{Component, RenderPre};

/// `agent-begin`: draws the head of each lifeline and opens it
pub struct AgentBegin;

/// `agent-end`: closes each lifeline and draws its foot
pub struct AgentEnd;

/// Size and content of one cap
struct Cap {
    mode: CapMode,
    label: Option<MeasuredLabel>,
    width: f64,
    height: f64,
}

fn measure_cap(env: &Env<'_>, id: AgentId, mode: CapMode) -> Cap {
    let theme = &env.theme.agent_cap;
    let label = env.measure(&env.agent(id).label, &theme.label_attrs);
    let box_width = label.size.width + theme.box_padding.horizontal();

    match mode {
        CapMode::Box => Cap {
            mode,
            width: box_width,
            height: label.size.height + theme.box_padding.vertical(),
            label: Some(label),
        },
        CapMode::Bar => Cap {
            mode,
            label: None,
            width: box_width,
            height: theme.bar_height,
        },
        CapMode::Cross => Cap {
            mode,
            label: None,
            width: theme.cross_size,
            height: theme.cross_size,
        },
        CapMode::None => Cap {
            mode,
            label: None,
            width: 0.0,
            height: theme.none_height,
        },
    }
}

/// Crosses only make sense where a lifeline stops
fn begin_mode(mode: CapMode) -> CapMode {
    match mode {
        CapMode::Cross => CapMode::Bar,
        other => other,
    }
}

fn draw_cap(env: &mut Env<'_>, id: AgentId, cap: &Cap, top: f64, height: f64) {
    let full_theme = env.theme;
    let theme = &full_theme.agent_cap;
    let x = env.agent(id).x;
    let bounds = BoundingBox::new(x - cap.width / 2.0, top, cap.width, height);

    match cap.mode {
        CapMode::Box => {
            let outline = Element::Rect {
                bounds,
                attrs: theme.box_attrs.clone(),
            };
            let text = cap.label.as_ref().map(|label| {
                env.text_within(
                    label,
                    &theme.label_attrs,
                    bounds.x + theme.box_padding.left,
                    label.size.width,
                    top + (height - label.size.height) / 2.0,
                )
            });
            env.push(Layer::Shapes, outline);
            if let Some(text) = text {
                env.push(Layer::Labels, text);
            }
        }
        CapMode::Bar => {
            let bar = Element::Rect {
                bounds: BoundingBox::new(bounds.x, top, cap.width, theme.bar_height),
                attrs: theme.bar_attrs.clone(),
            };
            env.push(Layer::Shapes, bar);
        }
        CapMode::Cross => {
            let cross = full_theme.cross(
                Point::new(x, top + cap.height / 2.0),
                cap.width,
                &theme.cross_attrs,
            );
            env.push(Layer::Shapes, cross);
        }
        CapMode::None => {}
    }
}

/// Reserve half of each cap's width on both sides of its agent
fn reserve_caps(env: &mut Env<'_>, ids: &[AgentId], mode: CapMode) {
    for id in ids {
        let cap = measure_cap(env, *id, mode);
        env.add_spacing(*id, cap.width / 2.0, cap.width / 2.0);
    }
}

impl Component for AgentBegin {
    fn separation_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::AgentBegin(caps) = stage else {
            return Ok(());
        };
        for id in env.agent_ids(&caps.agents) {
            env.show_agent(id);
        }
        Ok(())
    }

    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::AgentBegin(caps) = stage else {
            return Ok(());
        };
        let ids = env.agent_ids(&caps.agents);
        reserve_caps(env, &ids, begin_mode(caps.mode));
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::AgentBegin(caps) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(RenderPre {
            agents: env.agent_ids(&caps.agents),
            ..RenderPre::default()
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::AgentBegin(caps) = stage else {
            return Ok(env.top_y);
        };
        let top = env.top_y;
        let ids: Vec<AgentId> = env
            .agent_ids(&caps.agents)
            .into_iter()
            .filter(|id| !env.agent(*id).is_visible())
            .collect();
        if ids.is_empty() {
            return Ok(top);
        }

        let mode = begin_mode(caps.mode);
        let measured: Vec<Cap> = ids.iter().map(|id| measure_cap(env, *id, mode)).collect();
        let height = measured.iter().map(|c| c.height).fold(0.0, f64::max);

        for (id, cap) in ids.iter().zip(&measured) {
            draw_cap(env, *id, cap, top, height);
            env.open_line(*id, top + height);
        }

        Ok(top + height + env.theme.action_margin)
    }
}

impl Component for AgentEnd {
    fn separation_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::AgentEnd(caps) = stage else {
            return Ok(());
        };
        let ids = env.agent_ids(&caps.agents);
        reserve_caps(env, &ids, caps.mode);
        Ok(())
    }

    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::AgentEnd(caps) = stage else {
            return Ok(());
        };
        for id in env.agent_ids(&caps.agents) {
            env.hide_agent(id);
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::AgentEnd(caps) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(RenderPre {
            agents: env.agent_ids(&caps.agents),
            ..RenderPre::default()
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::AgentEnd(caps) = stage else {
            return Ok(env.top_y);
        };
        let top = env.top_y;
        let ids: Vec<AgentId> = env
            .agent_ids(&caps.agents)
            .into_iter()
            .filter(|id| env.agent(*id).is_visible())
            .collect();
        if ids.is_empty() {
            return Ok(top);
        }

        let measured: Vec<Cap> = ids
            .iter()
            .map(|id| measure_cap(env, *id, caps.mode))
            .collect();
        let height = measured.iter().map(|c| c.height).fold(0.0, f64::max);

        for (id, cap) in ids.iter().zip(&measured) {
            env.close_line(*id, top);
            draw_cap(env, *id, cap, top, height);
        }

        Ok(top + height + env.theme.action_margin)
    }
}
