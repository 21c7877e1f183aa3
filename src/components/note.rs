//! Notes over, beside and between agents

use crate::layout::{AgentId, BoundingBox, Env, Layer, LayoutError};
use crate::sequence::{Side, Stage, StageKind};
use crate::text::MeasuredLabel;
use crate::theme::NoteTheme;

use super::{Component, RenderPre};

/// `note-over`: a note centered on one agent or spanning several
pub struct NoteOver;

/// `note-side`: a note to the left or right of the outermost agent
pub struct NoteSide;

/// `note-between`: a note filling the gap between two agents
pub struct NoteBetween;

fn note_style<'t>(env: &Env<'t>, kind: StageKind, mode: &str) -> Result<&'t NoteTheme, LayoutError> {
    let theme = env.theme;
    theme
        .note(mode)
        .ok_or_else(|| LayoutError::missing_style(env.stage_index, kind, mode))
}

/// A measured note and the size of its box
struct NoteBox<'t> {
    style: &'t NoteTheme,
    label: MeasuredLabel,
    width: f64,
    height: f64,
}

fn measure_note<'t>(
    env: &Env<'t>,
    kind: StageKind,
    mode: &str,
    text: &str,
) -> Result<NoteBox<'t>, LayoutError> {
    let style = note_style(env, kind, mode)?;
    let label = env.measure(text, &style.label_attrs);
    Ok(NoteBox {
        style,
        width: label.size.width + style.padding.horizontal(),
        height: label.size.height + style.padding.vertical(),
        label,
    })
}

/// Draw a note box with its left edge at `left`, returning the stage bottom
fn draw_note(env: &mut Env<'_>, note: &NoteBox<'_>, left: f64, width: f64) -> f64 {
    let style = note.style;
    let bounds = BoundingBox::new(left, env.top_y + style.margin.top, width, note.height);
    let shape = env.theme.note_shape(style, bounds);
    let text = env.text_within(
        &note.label,
        &style.label_attrs,
        bounds.x + style.padding.left,
        bounds.width - style.padding.horizontal(),
        bounds.y + style.padding.top,
    );
    env.push(Layer::Shapes, shape);
    env.push(Layer::Labels, text);

    bounds.bottom() + style.margin.bottom + env.theme.action_margin
}

fn render_pre_for(env: &mut Env<'_>, agents: &[String]) -> RenderPre {
    RenderPre {
        agents: env.agent_ids(agents),
        ..RenderPre::default()
    }
}

/// Reserve room for a note centered on a single agent
fn reserve_centered(env: &mut Env<'_>, id: AgentId, note: &NoteBox<'_>) {
    let half = note.width / 2.0;
    env.add_spacing(
        id,
        half + note.style.margin.left,
        half + note.style.margin.right,
    );
}

impl Component for NoteOver {
    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::NoteOver(note) = stage else {
            return Ok(());
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(());
        };
        let note_box = measure_note(env, StageKind::NoteOver, &note.mode, &note.label)?;
        let style = note_box.style;

        if left == right {
            reserve_centered(env, left, &note_box);
        } else {
            env.add_separation(
                left,
                right,
                note_box.width - style.overlap_left - style.overlap_right,
            );
            env.add_spacing(left, style.overlap_left + style.margin.left, 0.0);
            env.add_spacing(right, 0.0, style.overlap_right + style.margin.right);
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::NoteOver(note) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(render_pre_for(env, &note.agents))
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::NoteOver(note) = stage else {
            return Ok(env.top_y);
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(env.top_y);
        };
        let note_box = measure_note(env, StageKind::NoteOver, &note.mode, &note.label)?;
        let style = note_box.style;

        let (left_x, right_x) = (env.agent(left).x, env.agent(right).x);
        let (span_left, span_right) = if left == right {
            (left_x, right_x)
        } else {
            (left_x - style.overlap_left, right_x + style.overlap_right)
        };
        let width = note_box.width.max(span_right - span_left);
        let center = (span_left + span_right) / 2.0;

        Ok(draw_note(env, &note_box, center - width / 2.0, width))
    }
}

impl Component for NoteSide {
    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::NoteSide(note) = stage else {
            return Ok(());
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(());
        };
        let note_box = measure_note(env, StageKind::NoteSide, &note.mode, &note.label)?;
        let margin = note_box.style.margin;

        match note.side {
            Side::Right => {
                let reach = env.agent(right).current_max_rad
                    + margin.left
                    + note_box.width
                    + margin.right;
                env.add_spacing(right, 0.0, reach);
            }
            Side::Left => {
                let reach = env.agent(left).current_max_rad
                    + margin.right
                    + note_box.width
                    + margin.left;
                env.add_spacing(left, reach, 0.0);
            }
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::NoteSide(note) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(render_pre_for(env, &note.agents))
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::NoteSide(note) = stage else {
            return Ok(env.top_y);
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(env.top_y);
        };
        let note_box = measure_note(env, StageKind::NoteSide, &note.mode, &note.label)?;
        let margin = note_box.style.margin;

        let box_left = match note.side {
            Side::Right => {
                let agent = env.agent(right);
                agent.x + agent.current_max_rad + margin.left
            }
            Side::Left => {
                let agent = env.agent(left);
                agent.x - agent.current_max_rad - margin.right - note_box.width
            }
        };
        Ok(draw_note(env, &note_box, box_left, note_box.width))
    }
}

impl Component for NoteBetween {
    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        let Stage::NoteBetween(note) = stage else {
            return Ok(());
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(());
        };
        let note_box = measure_note(env, StageKind::NoteBetween, &note.mode, &note.label)?;

        if left == right {
            reserve_centered(env, left, &note_box);
        } else {
            let margin = note_box.style.margin;
            let distance = note_box.width
                + margin.horizontal()
                + env.agent(left).current_max_rad
                + env.agent(right).current_max_rad;
            env.add_separation(left, right, distance);
        }
        Ok(())
    }

    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::NoteBetween(note) = stage else {
            return Ok(RenderPre::default());
        };
        Ok(render_pre_for(env, &note.agents))
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        let Stage::NoteBetween(note) = stage else {
            return Ok(env.top_y);
        };
        let ids = env.agent_ids(&note.agents);
        let Some((left, right)) = env.extremes(&ids) else {
            return Ok(env.top_y);
        };
        let note_box = measure_note(env, StageKind::NoteBetween, &note.mode, &note.label)?;

        if left == right {
            let x = env.agent(left).x;
            return Ok(draw_note(env, &note_box, x - note_box.width / 2.0, note_box.width));
        }

        let margin = note_box.style.margin;
        let (l, r) = (env.agent(left), env.agent(right));
        let gap_left = l.x + l.current_max_rad + margin.left;
        let gap_right = r.x - r.current_max_rad - margin.right;
        let width = note_box.width.max(gap_right - gap_left);
        let center = (gap_left + gap_right) / 2.0;

        Ok(draw_note(env, &note_box, center - width / 2.0, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::*;
    use crate::layout::Element;
    use crate::sequence::{Note, SideNote};
    use crate::theme::Theme;

    fn note_between(agents: &[&str], label: &str) -> Stage {
        Stage::NoteBetween(Note {
            agents: names(agents),
            mode: "note".to_string(),
            label: label.to_string(),
        })
    }

    fn note_shapes(drawing: &crate::layout::Drawing) -> Vec<BoundingBox> {
        drawing
            .layer(Layer::Shapes)
            .iter()
            .filter(|e| matches!(e, Element::Path { closed: true, .. }))
            .filter_map(Element::bounds)
            .collect()
    }

    #[test]
    fn test_note_between_separates_agents() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![
                begin(&["A", "B"]),
                note_between(&["A", "B"], "this note is wider than the caps"),
            ],
        ));

        let theme = Theme::default();
        let style = theme.note("note").expect("default note style");
        let note = note_shapes(&drawing)[0];
        let gap = x_of(&drawing, "B") - x_of(&drawing, "A");
        assert!(gap + 1e-9 >= note.width + style.margin.horizontal());
        assert!(note.x > x_of(&drawing, "A"));
        assert!(note.right() < x_of(&drawing, "B"));
    }

    #[test]
    fn test_note_over_single_agent_is_centered() {
        let drawing = layout(&sequence(
            &["A"],
            vec![
                begin(&["A"]),
                Stage::NoteOver(Note {
                    agents: names(&["A"]),
                    mode: "box".to_string(),
                    label: "centered".to_string(),
                }),
            ],
        ));
        let rects: Vec<BoundingBox> = drawing
            .layer(Layer::Shapes)
            .iter()
            .filter_map(Element::bounds)
            .collect();
        let note = rects[1];
        assert!((note.center().x - x_of(&drawing, "A")).abs() < 1e-9);
    }

    #[test]
    fn test_note_side_left_sits_left_of_agent() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![
                begin(&["A", "B"]),
                Stage::NoteSide(SideNote {
                    agents: names(&["B"]),
                    mode: "note".to_string(),
                    label: "on the left".to_string(),
                    side: Side::Left,
                }),
            ],
        ));
        let note = note_shapes(&drawing)[0];
        assert!(note.right() < x_of(&drawing, "B"));
        assert!(note.x > x_of(&drawing, "A"));
    }

    #[test]
    fn test_multiline_note_grows_downwards() {
        let one = layout(&sequence(&["A"], vec![begin(&["A"]), note_between(&["A"], "x")]));
        let two = layout(&sequence(
            &["A"],
            vec![begin(&["A"]), note_between(&["A"], "x\ny")],
        ));
        assert!(note_shapes(&two)[0].height > note_shapes(&one)[0].height);
    }
}
