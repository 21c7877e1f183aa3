//! Named marks and asynchronous jumps back to them

use tracing::debug;

use crate::layout::{ComponentState, Env, LayoutError};
use crate::sequence::Stage;

use super::{Component, RenderPre};

/// `mark`: remembers the current Y under a name
pub struct Mark;

/// `async`: draws the next stage from a remembered Y
pub struct Async;

impl Component for Mark {
    fn make_state(&self, state: &mut ComponentState) {
        state.marks.clear();
    }

    fn reset_state(&self, state: &mut ComponentState) {
        state.marks.clear();
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        if let Stage::Mark(mark) = stage {
            env.state.marks.insert(mark.name.clone(), env.top_y);
        }
        Ok(env.top_y)
    }
}

impl Component for Async {
    fn render_pre(&self, stage: &Stage, env: &mut Env<'_>) -> Result<RenderPre, LayoutError> {
        let Stage::Async(jump) = stage else {
            return Ok(RenderPre::default());
        };

        // Missing and unknown targets both resolve to the top of the diagram
        let target = jump.target.as_deref().unwrap_or_default();
        let y = match env.state.marks.get(target) {
            Some(y) => *y,
            None => {
                if !target.is_empty() {
                    debug!(target, stage = env.stage_index, "async target was never marked");
                }
                0.0
            }
        };

        Ok(RenderPre {
            asynchronous_y: Some(y),
            ..RenderPre::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::*;
    use crate::components::ComponentRegistry;
    use crate::layout::{AgentId, Element, Layer};
    use crate::sequence::{AgentDecl, Async as AsyncStage, Mark as MarkStage};
    use crate::text::MonospaceMeasurer;
    use crate::theme::Theme;

    fn mark(name: &str) -> Stage {
        Stage::Mark(MarkStage {
            name: name.to_string(),
        })
    }

    fn jump(target: Option<&str>) -> Stage {
        Stage::Async(AsyncStage {
            target: target.map(str::to_string),
        })
    }

    fn resolve(env: &mut Env<'_>, target: Option<&str>) -> Option<f64> {
        Async
            .render_pre(&jump(target), env)
            .expect("async never fails")
            .asynchronous_y
    }

    #[test]
    fn test_async_resolves_recorded_mark() {
        let theme = Theme::default();
        let measurer = MonospaceMeasurer::default();
        let registry = ComponentRegistry::standard();
        let mut env = Env::new(&theme, &measurer, &registry, &[AgentDecl::new("A")]);

        env.top_y = 42.0;
        Mark.render(&mark("here"), &mut env).expect("mark never fails");
        env.top_y = 100.0;

        assert_eq!(resolve(&mut env, Some("here")), Some(42.0));
        assert_eq!(resolve(&mut env, Some("elsewhere")), Some(0.0));
        assert_eq!(resolve(&mut env, None), Some(0.0));
        assert_eq!(resolve(&mut env, Some("")), Some(0.0));
        assert!(env.agent(AgentId(0)).separations.is_empty());
    }

    #[test]
    fn test_reset_clears_marks() {
        let mut state = ComponentState::default();
        state.marks.insert("m".to_string(), 3.0);
        Mark.reset_state(&mut state);
        assert!(state.marks.is_empty());
    }

    #[test]
    fn test_async_message_starts_at_mark() {
        let drawing = layout(&sequence(
            &["A", "B", "C"],
            vec![
                begin(&["A", "B", "C"]),
                mark("start"),
                connect("A", "B", "first"),
                connect("A", "B", "second"),
                jump(Some("start")),
                connect("B", "C", "reply"),
            ],
        ));

        let line_ys: Vec<f64> = drawing
            .layer(Layer::Shapes)
            .iter()
            .filter_map(|e| match e {
                Element::Line { from, .. } => Some(from.y),
                _ => None,
            })
            .collect();
        assert_eq!(line_ys.len(), 3);
        // B's column is already used below the mark, so the reply waits for it
        assert!(line_ys[2] > line_ys[1]);

        let drawing = layout(&sequence(
            &["A", "B", "C", "D"],
            vec![
                begin(&["A", "B", "C", "D"]),
                mark("start"),
                connect("A", "B", "first"),
                connect("A", "B", "second"),
                jump(Some("start")),
                connect("C", "D", "parallel"),
            ],
        ));
        let line_ys: Vec<f64> = drawing
            .layer(Layer::Shapes)
            .iter()
            .filter_map(|e| match e {
                Element::Line { from, .. } => Some(from.y),
                _ => None,
            })
            .collect();
        assert_eq!(line_ys[2], line_ys[0]);
    }

    #[test]
    fn test_mark_after_async_records_the_jump_origin() {
        let drawing = layout(&sequence(
            &["A", "B", "C", "D"],
            vec![
                begin(&["A", "B", "C", "D"]),
                mark("a"),
                connect("A", "B", "first"),
                connect("A", "B", "second"),
                jump(Some("a")),
                mark("b"),
                jump(Some("b")),
                connect("C", "D", "third"),
            ],
        ));
        let line_ys: Vec<f64> = drawing
            .layer(Layer::Shapes)
            .iter()
            .filter_map(|e| match e {
                Element::Line { from, .. } => Some(from.y),
                _ => None,
            })
            .collect();
        assert_eq!(line_ys.len(), 3);
        assert_eq!(line_ys[2], line_ys[0]);
    }
}
