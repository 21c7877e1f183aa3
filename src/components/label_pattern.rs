//! Automatic message labelling

use crate::layout::{ActivePattern, ComponentState, Env, LayoutError};
use crate::sequence::Stage;
use crate::text::LabelPattern;

use super::Component;

/// `label-pattern`: installs a pattern applied to every following message
pub struct LabelPatternComponent;

fn install(stage: &Stage, env: &mut Env<'_>) {
    if let Stage::LabelPattern(stage) = stage {
        let pattern = LabelPattern::parse(&stage.pattern);
        env.state.label_pattern = if pattern.is_empty() {
            None
        } else {
            let counters = pattern.counters();
            Some(ActivePattern { pattern, counters })
        };
    }
}

impl Component for LabelPatternComponent {
    fn make_state(&self, state: &mut ComponentState) {
        state.label_pattern = None;
    }

    fn reset_state(&self, state: &mut ComponentState) {
        state.label_pattern = None;
    }

    fn separation(&self, stage: &Stage, env: &mut Env<'_>) -> Result<(), LayoutError> {
        install(stage, env);
        Ok(())
    }

    fn render(&self, stage: &Stage, env: &mut Env<'_>) -> Result<f64, LayoutError> {
        install(stage, env);
        Ok(env.top_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::*;
    use crate::layout::Layer;
    use crate::sequence::LabelPatternStage;

    fn pattern(raw: &str) -> Stage {
        Stage::LabelPattern(LabelPatternStage {
            pattern: raw.to_string(),
        })
    }

    #[test]
    fn test_new_pattern_restarts_counters() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![
                begin(&["A", "B"]),
                pattern("<inc 1.0,0.5> <label>"),
                connect("A", "B", "a"),
                connect("A", "B", "b"),
                pattern("[<inc 10>] <label>"),
                connect("A", "B", "c"),
            ],
        ));
        assert_eq!(
            texts(&drawing, Layer::Labels),
            vec!["A", "B", "1.0 a", "1.5 b", "[10] c"]
        );
    }

    #[test]
    fn test_empty_pattern_restores_plain_labels() {
        let drawing = layout(&sequence(
            &["A", "B"],
            vec![
                begin(&["A", "B"]),
                pattern("<inc> <label>"),
                connect("A", "B", "numbered"),
                pattern(""),
                connect("A", "B", "plain"),
            ],
        ));
        assert_eq!(
            texts(&drawing, Layer::Labels),
            vec!["A", "B", "1 numbered", "plain"]
        );
    }
}
