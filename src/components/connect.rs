//! Messages between agents

use crate::layout::{AgentId, BoundingBox, Element, Env, Layer, LayoutError, Point};
use crate::sequence::{ArrowKind, Connect as ConnectStage, LineStyle, Stage};
use crate::text::MeasuredLabel;
use crate::theme::Theme;

use super::{Component, RenderPre};

/// `connect`: a message line with optional arrowheads and a label
pub struct Connect;

/// Sender and receiver. A single agent sends to itself.
fn endpoints(env: &mut Env<'_>, connect: &ConnectStage) -> Option<(AgentId, AgentId)> {
    let from = env.agent_id(connect.agents.first()?);
    let to = match connect.agents.get(1) {
        Some(name) => env.agent_id(name),
        None => from,
    };
    Some((from, to))
}

fn arrow_width(theme: &Theme, kind: ArrowKind) -> f64 {
    match kind {
        ArrowKind::None => 0.0,
        ArrowKind::Single | ArrowKind::Open => theme.connect.arrow.width,
    }
}

/// Width of the label including its mask, zero for an empty label
fn masked_width(theme: &Theme, label: &MeasuredLabel) -> f64 {
    if label.is_empty() {
        0.0
    } else {
        label.size.width + theme.connect.mask_padding.horizontal()
    }
}

/// Height the label occupies above the line
fn label_stack(theme: &Theme, label: &MeasuredLabel) -> f64 {
    if label.is_empty() {
        0.0
    } else {
        label.size.height + theme.connect.label_margin.vertical()
    }
}

/// Draw a label with its mask, top-left at (`left`, `top`)
fn draw_label(env: &mut Env<'_>, label: &MeasuredLabel, left: f64, top: f64) {
    if label.is_empty() {
        return;
    }
    let theme = env.theme;
    let pad = theme.connect.mask_padding;
    let mask = Element::Rect {
        bounds: BoundingBox::new(
            left - pad.left,
            top - pad.top,
            label.size.width + pad.horizontal(),
            label.size.height + pad.vertical(),
        ),
        attrs: theme.connect.mask_attrs.clone(),
    };
    let text = env.text_within(
        label,
        &theme.connect.label_attrs,
        left,
        label.size.width,
        top,
    );
    env.push(Layer::Shapes, mask);
    env.push(Layer::Labels, text);
}

fn push_arrow(env: &mut Env<'_>, tip: Point, dir: f64, kind: ArrowKind) {
    if let Some(head) = env.theme.arrowhead(tip, dir, kind) {
        env.push(Layer::Shapes, head);
    }
}

impl Connect {
    fn render_between(
        &self,
        env: &mut Env<'_>,
        connect: &ConnectStage,
        from: AgentId,
        to: AgentId,
        label: &MeasuredLabel,
    ) -> f64 {
        let theme = env.theme;
        let y = env.primary_y;
        let (from_info, to_info) = (env.agent(from), env.agent(to));
        let dir = if to_info.x >= from_info.x { 1.0 } else { -1.0 };
        let start = from_info.x + dir * from_info.current_rad;
        let end = to_info.x - dir * to_info.current_rad;

        let label_left = (start + end) / 2.0 - label.size.width / 2.0;
        let label_top = y - theme.connect.label_margin.bottom - label.size.height;
        draw_label(env, label, label_left, label_top);

        env.push(
            Layer::Shapes,
            Element::Line {
                from: Point::new(start, y),
                to: Point::new(end, y),
                attrs: line_attrs(theme, connect.options.line),
            },
        );
        push_arrow(env, Point::new(start, y), -dir, connect.options.left);
        push_arrow(env, Point::new(end, y), dir, connect.options.right);

        y + theme.connect.arrow.height / 2.0 + theme.action_margin
    }

    fn render_loopback(
        &self,
        env: &mut Env<'_>,
        connect: &ConnectStage,
        agent: AgentId,
        label: &MeasuredLabel,
    ) -> f64 {
        let theme = env.theme;
        let info = env.agent(agent);
        let x0 = info.x + info.current_rad;
        let reach = info.x + info.current_max_rad + theme.connect.loopback_radius;
        let y1 = env.primary_y;
        let loop_height = label.size.height.max(theme.connect.arrow.height);
        let y2 = y1 + loop_height;

        env.push(
            Layer::Shapes,
            Element::Path {
                points: vec![
                    Point::new(x0, y1),
                    Point::new(reach, y1),
                    Point::new(reach, y2),
                    Point::new(x0, y2),
                ],
                closed: false,
                attrs: line_attrs(theme, connect.options.line),
            },
        );
        push_arrow(env, Point::new(x0, y1), -1.0, connect.options.left);
        push_arrow(env, Point::new(x0, y2), -1.0, connect.options.right);

        let label_left = reach + theme.connect.label_padding;
        let label_top = y1 + (loop_height - label.size.height) / 2.0;
        draw_label(env, label, label_left, label_top);

        y2 + theme.connect.arrow.height / 2.0 + theme.action_margin
    }
}

fn line_attrs(theme: &Theme, style: LineStyle) -> crate::text::Attrs {
    match style {
        LineStyle::Solid => theme.connect.solid_attrs.clone(),
        LineStyle::Dash => theme.connect.dash_attrs.clone(),
    }
}

impl Component for Connect {
    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::Connect(connect) = stage else {
            return Ok(());
        };
        let Some((from, to)) = endpoints(env, connect) else {
            return Ok(());
        };
        let theme = env.theme;
        let text = env.apply_label_pattern(&connect.label);
        let label = env.measure(&text, &theme.connect.label_attrs);
        let label_width = masked_width(theme, &label);

        if from == to {
            let reach = env.agent(from).current_max_rad
                + theme.connect.loopback_radius
                + theme.connect.label_padding
                + label_width;
            env.add_spacing(from, 0.0, reach);
        } else {
            let distance = label_width
                + theme.connect.label_padding * 2.0
                + arrow_width(theme, connect.options.left)
                + arrow_width(theme, connect.options.right)
                + env.agent(from).current_max_rad
                + env.agent(to).current_max_rad;
            env.add_separation(from, to, distance);
            env.add_spacing(from, 0.0, 0.0);
            env.add_spacing(to, 0.0, 0.0);
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::Connect(connect) = stage else {
            return Ok(RenderPre::default());
        };
        let Some((from, to)) = endpoints(env, connect) else {
            return Ok(RenderPre::default());
        };
        let theme = env.theme;
        let half_arrow = theme.connect.arrow.height / 2.0;
        let top_shift = if from == to {
            half_arrow
        } else {
            let text = env.preview_label_pattern(&connect.label);
            let label = env.measure(&text, &theme.connect.label_attrs);
            label_stack(theme, &label).max(half_arrow)
        };

        Ok(RenderPre {
            agents: vec![from, to],
            top_shift,
            asynchronous_y: None,
        })
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::Connect(connect) = stage else {
            return Ok(env.top_y);
        };
        let Some((from, to)) = endpoints(env, connect) else {
            return Ok(env.top_y);
        };
        let text = env.apply_label_pattern(&connect.label);
        let label = env.measure(&text, &env.theme.connect.label_attrs);

        let bottom = if from == to {
            self.render_loopback(env, connect, from, &label)
        } else {
            self.render_between(env, connect, from, to, &label)
        };
        Ok(bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::*;
    use crate::sequence::{ConnectOptions, LabelPatternStage};
    use crate::text::{measure_label, MonospaceMeasurer};

    #[test]
    fn test_label_fits_between_agents() {
        let label = "a rather long message label";
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![begin(&["A", "B"]), connect("A", "B", label)],
        ));

        let theme = Theme::default();
        let measured = measure_label(
            &MonospaceMeasurer::default(),
            label,
            &theme.connect.label_attrs,
        );
        let gap = x_of(&drawing, "B") - x_of(&drawing, "A");
        assert!(gap >= measured.size.width + theme.connect.label_padding * 2.0);
        assert_eq!(texts(&drawing, Layer::Labels), vec!["A", "B", label]);
    }

    #[test]
    fn test_dashed_line_with_open_arrows() {
        let stage = Stage::Connect(ConnectStage {
            agents: names(&["B", "A"]),
            label: String::new(),
            options: ConnectOptions {
                line: LineStyle::Dash,
                left: ArrowKind::Open,
                right: ArrowKind::Open,
            },
        });
        let drawing = layout(&sequence(&["A", "B"], vec![begin(&["A", "B"]), stage]));

        let line = drawing
            .layer(Layer::Shapes)
            .iter()
            .find_map(|e| match e {
                Element::Line { from, to, attrs } => Some((*from, *to, attrs.clone())),
                _ => None,
            })
            .expect("message line");
        assert!(line.0.x > line.1.x, "B is right of A, so the line runs leftwards");
        assert!(line.2.contains_key("stroke-dasharray"));

        let open_heads = drawing
            .layer(Layer::Shapes)
            .iter()
            .filter(|e| matches!(e, Element::Path { closed: false, .. }))
            .count();
        assert_eq!(open_heads, 2);
    }

    #[test]
    fn test_loopback_reserves_right_spacing() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![begin(&["A", "B"]), connect("A", "A", "think hard")],
        ));
        let label = drawing
            .layer(Layer::Labels)
            .iter()
            .filter_map(Element::bounds)
            .last()
            .expect("loopback label");
        assert!(label.x > x_of(&drawing, "A"));
        assert!(label.right() < x_of(&drawing, "B"));
    }

    #[test]
    fn test_label_pattern_numbers_messages() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![
                begin(&["A", "B"]),
                Stage::LabelPattern(LabelPatternStage {
                    pattern: "<inc>. <label>".to_string(),
                }),
                connect("A", "B", "hello"),
                connect("B", "A", "hi"),
            ],
        ));
        assert_eq!(
            texts(&drawing, Layer::Labels),
            vec!["A", "B", "1. hello", "2. hi"]
        );
    }
}
