//! Label text handling: patterns, inline emphasis and measurement

pub mod label_pattern;
pub mod markdown;
pub mod measure;

pub use label_pattern::{LabelPattern, LabelToken, PatternCounters};
pub use markdown::{parse_markdown, FormattedLine, FormattedRun};
pub use measure::{MonospaceMeasurer, TextMeasurer, TextSize};

use std::collections::BTreeMap;

/// Presentation attributes (SVG attribute name -> value)
///
/// Ordered so that serialized output is stable.
pub type Attrs = BTreeMap<String, String>;

/// Build an attribute map from string pairs
pub fn attrs(pairs: &[(&str, &str)]) -> Attrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Read a numeric attribute such as `font-size`
pub fn attr_f64(attrs: &Attrs, key: &str) -> Option<f64> {
    attrs.get(key).and_then(|v| v.trim().parse().ok())
}

/// `base` overlaid with `overlay`
pub fn merge_attrs(base: &Attrs, overlay: Option<&Attrs>) -> Attrs {
    let mut out = base.clone();
    if let Some(overlay) = overlay {
        for (k, v) in overlay {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}

/// A label split into formatted lines and measured
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLabel {
    pub lines: Vec<MeasuredLine>,
    pub size: TextSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLine {
    pub runs: Vec<FormattedRun>,
    pub width: f64,
    pub height: f64,
}

impl MeasuredLabel {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.runs.is_empty())
    }
}

/// Parse emphasis in `label` and measure every line with `attrs` as the
/// base style.
pub fn measure_label(measurer: &dyn TextMeasurer, label: &str, attrs: &Attrs) -> MeasuredLabel {
    let mut size = TextSize::default();
    let lines: Vec<MeasuredLine> = parse_markdown(label)
        .into_iter()
        .map(|runs| {
            let empty_height = measurer.measure("", attrs).height;
            let (width, height) = runs.iter().fold((0.0_f64, empty_height), |(w, h), run| {
                let run_size = measurer.measure(&run.text, &merge_attrs(attrs, run.attrs.as_ref()));
                (w + run_size.width, h.max(run_size.height))
            });
            size.width = size.width.max(width);
            size.height += height;
            MeasuredLine {
                runs,
                width,
                height,
            }
        })
        .collect();

    MeasuredLabel { lines, size }
}
