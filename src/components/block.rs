//! Blocks: framed regions with tagged sections (alt / loop / ref ...)
//!
//! Blocks form a stack over the stage stream. A frame is pushed by
//! `block-begin`, gains a section per `block-split` and is drawn when
//! `block-end` pops it, because only then is its full extent known.

use crate::layout::{AgentId, BoundingBox, ComponentState, Element, Env, Layer, LayoutError, Point};
use crate::sequence::{Stage, StageKind};
use crate::text::MeasuredLabel;
use crate::theme::BlockTheme;

use super::{Component, RenderPre};

/// `block-begin`
pub struct BlockBegin;

/// `block-split`
pub struct BlockSplit;

/// `block-end`
pub struct BlockEnd;

/// One section of an open block
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub mode: String,
    pub tag: MeasuredLabel,
    pub label: MeasuredLabel,
    /// Top of the section header
    pub top: f64,
}

/// An open block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFrame {
    /// Stage index of the `block-begin`
    pub begin_index: usize,
    pub mode: String,
    pub left: AgentId,
    pub right: AgentId,
    /// Deepest nesting of the blocks closed inside this one
    pub inner_levels: usize,
    pub sections: Vec<Section>,
    pub start_y: f64,
    /// Position in the blocks layer the outline is inserted at
    pub layer_index: usize,
}

impl BlockFrame {
    /// Nesting levels this block spans, itself included
    pub fn levels(&self) -> usize {
        self.inner_levels + 1
    }
}

fn block_style<'t>(env: &Env<'t>, kind: StageKind, mode: &str) -> Result<&'t BlockTheme, LayoutError> {
    let theme = env.theme;
    theme
        .block(mode)
        .ok_or_else(|| LayoutError::missing_style(env.stage_index, kind, mode))
}

fn measure_section(
    env: &Env<'_>,
    style: &BlockTheme,
    mode: &str,
    tag: &str,
    label: &str,
    top: f64,
) -> Section {
    Section {
        mode: mode.to_string(),
        tag: env.measure(tag, &style.tag_label_attrs),
        label: env.measure(label, &style.label_attrs),
        top,
    }
}

fn tag_width(style: &BlockTheme, section: &Section) -> f64 {
    if section.tag.is_empty() {
        0.0
    } else {
        section.tag.size.width + style.tag_padding.horizontal()
    }
}

fn header_width(style: &BlockTheme, section: &Section) -> f64 {
    let label = if section.label.is_empty() {
        0.0
    } else {
        section.label.size.width + style.label_padding.horizontal()
    };
    tag_width(style, section) + label
}

fn header_height(style: &BlockTheme, section: &Section) -> f64 {
    let tag = if section.tag.is_empty() {
        0.0
    } else {
        section.tag.size.height + style.tag_padding.vertical()
    };
    let label = if section.label.is_empty() {
        0.0
    } else {
        section.label.size.height + style.label_padding.vertical()
    };
    tag.max(label)
}

/// Reach of a block edge past an agent's center line
fn reach(env: &Env<'_>, id: AgentId, style: &BlockTheme, levels: usize) -> f64 {
    env.agent(id).current_max_rad + style.side_margin * levels as f64
}

/// Make sure a section header fits inside the block
fn reserve_header(env: &mut Env<'_>, frame: &BlockFrame, style: &BlockTheme, width: f64) {
    let left_reach = reach(env, frame.left, style, 1);
    let right_reach = reach(env, frame.right, style, 1);
    if frame.left == frame.right {
        env.add_spacing(frame.left, left_reach, width - left_reach);
    } else {
        env.add_separation(frame.left, frame.right, width - left_reach - right_reach);
    }
}

/// Enclosed agents, leftmost first
fn frame_agents(env: &mut Env<'_>, left: &str, right: &str) -> (AgentId, AgentId) {
    let (a, b) = (env.agent_id(left), env.agent_id(right));
    (a.min(b), a.max(b))
}

fn pop_frame(env: &mut Env<'_>) -> Result<BlockFrame, LayoutError> {
    let frame = env
        .state
        .blocks
        .pop()
        .ok_or_else(|| LayoutError::unmatched(env.stage_index, StageKind::BlockEnd))?;
    if let Some(parent) = env.state.blocks.last_mut() {
        parent.inner_levels = parent.inner_levels.max(frame.levels());
    }
    Ok(frame)
}

fn innermost<'e>(env: &'e Env<'_>, kind: StageKind) -> Result<&'e BlockFrame, LayoutError> {
    env.state
        .blocks
        .last()
        .ok_or_else(|| LayoutError::unmatched(env.stage_index, kind))
}

impl Component for BlockBegin {
    fn make_state(&self, state: &mut ComponentState) {
        state.blocks.clear();
    }

    fn reset_state(&self, state: &mut ComponentState) {
        state.blocks.clear();
    }

    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::BlockBegin(begin) = stage else {
            return Ok(());
        };
        let style = block_style(env, StageKind::BlockBegin, &begin.mode)?;
        let (left, right) = frame_agents(env, &begin.left, &begin.right);
        let section = measure_section(env, style, &begin.mode, &begin.tag, &begin.label, 0.0);

        let frame = BlockFrame {
            begin_index: env.stage_index,
            mode: begin.mode.clone(),
            left,
            right,
            inner_levels: 0,
            sections: Vec::new(),
            start_y: 0.0,
            layer_index: 0,
        };
        reserve_header(env, &frame, style, header_width(style, &section));
        env.state.blocks.push(frame);
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::BlockBegin(begin) = stage else {
            return Ok(RenderPre::default());
        };
        let (left, right) = frame_agents(env, &begin.left, &begin.right);
        Ok(RenderPre {
            agents: vec![left, right],
            ..RenderPre::default()
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::BlockBegin(begin) = stage else {
            return Ok(env.top_y);
        };
        let style = block_style(env, StageKind::BlockBegin, &begin.mode)?;
        let (left, right) = frame_agents(env, &begin.left, &begin.right);
        let top = env.top_y + style.margin_top;
        let section = measure_section(env, style, &begin.mode, &begin.tag, &begin.label, top);
        let content_top = top + header_height(style, &section) + style.section_padding.top;

        let frame = BlockFrame {
            begin_index: env.stage_index,
            mode: begin.mode.clone(),
            left,
            right,
            inner_levels: 0,
            sections: vec![section],
            start_y: top,
            layer_index: env.drawing.layer(Layer::Blocks).len(),
        };
        env.state.blocks.push(frame);
        Ok(content_top)
    }
}

impl Component for BlockSplit {
    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::BlockSplit(split) = stage else {
            return Ok(());
        };
        let frame = innermost(env, StageKind::BlockSplit)?.clone();
        let style = block_style(env, StageKind::BlockSplit, &split.mode)?;
        let section = measure_section(env, style, &split.mode, &split.tag, &split.label, 0.0);
        reserve_header(env, &frame, style, header_width(style, &section));
        Ok(())
    }

    fn render_pre(&self, _stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let frame = innermost(env, StageKind::BlockSplit)?;
        Ok(RenderPre {
            agents: vec![frame.left, frame.right],
            ..RenderPre::default()
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::BlockSplit(split) = stage else {
            return Ok(env.top_y);
        };
        innermost(env, StageKind::BlockSplit)?;
        let style = block_style(env, StageKind::BlockSplit, &split.mode)?;
        let top = env.top_y + style.section_padding.bottom;
        let section = measure_section(env, style, &split.mode, &split.tag, &split.label, top);
        let content_top = top + header_height(style, &section) + style.section_padding.top;

        if let Some(frame) = env.state.blocks.last_mut() {
            frame.sections.push(section);
        }
        Ok(content_top)
    }
}

impl BlockEnd {
    fn draw(&self, env: &mut Env<'_>, frame: &BlockFrame, style: &BlockTheme, bottom: f64) {
        let theme = env.theme;
        let levels = frame.levels();
        let left_edge = env.agent(frame.left).x - reach(env, frame.left, style, levels);
        let mut right_edge = env.agent(frame.right).x + reach(env, frame.right, style, levels);

        let mut section_styles = Vec::with_capacity(frame.sections.len());
        for section in &frame.sections {
            let section_style = theme.block(&section.mode).unwrap_or(style);
            right_edge = right_edge.max(left_edge + header_width(section_style, section));
            section_styles.push(section_style);
        }
        let width = right_edge - left_edge;

        env.drawing.insert(
            Layer::Blocks,
            frame.layer_index,
            Element::Rect {
                bounds: BoundingBox::new(left_edge, frame.start_y, width, bottom - frame.start_y),
                attrs: style.box_attrs.clone(),
            },
        );

        for (i, (section, section_style)) in frame.sections.iter().zip(section_styles).enumerate() {
            if i > 0 {
                env.push(
                    Layer::Blocks,
                    Element::Line {
                        from: Point::new(left_edge, section.top),
                        to: Point::new(right_edge, section.top),
                        attrs: section_style.separator_attrs.clone(),
                    },
                );
            }

            let tag_box_width = tag_width(section_style, section);
            if tag_box_width > 0.0 {
                let tag_bounds = BoundingBox::new(
                    left_edge,
                    section.top,
                    tag_box_width,
                    section.tag.size.height + section_style.tag_padding.vertical(),
                );
                let shape = theme.tag_shape(tag_bounds, &section_style.tag_box_attrs);
                let text = env.text_within(
                    &section.tag,
                    &section_style.tag_label_attrs,
                    tag_bounds.x + section_style.tag_padding.left,
                    section.tag.size.width,
                    section.top + section_style.tag_padding.top,
                );
                env.push(Layer::Blocks, shape);
                env.push(Layer::Labels, text);
            }

            if !section.label.is_empty() {
                let padding = section_style.label_padding;
                let label_left = left_edge + tag_box_width + padding.left;
                let text = env.text_within(
                    &section.label,
                    &section_style.label_attrs,
                    label_left,
                    right_edge - padding.right - label_left,
                    section.top + padding.top,
                );
                env.push(Layer::Labels, text);
            }
        }
    }
}

impl Component for BlockEnd {
    fn separation(&self, _stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let frame = pop_frame(env)?;
        let style = block_style(env, StageKind::BlockEnd, &frame.mode)?;
        let levels = frame.levels();
        let left_reach = reach(env, frame.left, style, levels);
        let right_reach = reach(env, frame.right, style, levels);

        if frame.left == frame.right {
            env.add_spacing(frame.left, left_reach, right_reach);
        } else {
            env.add_spacing(frame.left, left_reach, 0.0);
            env.add_spacing(frame.right, 0.0, right_reach);
        }
        Ok(())
    }

    fn render_pre(&self, _stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let frame = innermost(env, StageKind::BlockEnd)?;
        Ok(RenderPre {
            agents: vec![frame.left, frame.right],
            ..RenderPre::default()
        })
    }

    fn render(&self, _stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let frame = pop_frame(env)?;
        let style = block_style(env, StageKind::BlockEnd, &frame.mode)?;
        let bottom = env.top_y + style.section_padding.bottom;
        self.draw(env, &frame, style, bottom);
        Ok(bottom + style.margin_bottom + env.theme.action_margin)
    }
}
