//! Inline emphasis parsing for labels
//!
//! Recognises `*italic*`, `_italic_`, `**bold**`, `__bold__`, `~struck~` and
//! `` `mono` ``. Styles stay open across line breaks until closed.

use std::sync::OnceLock;

use regex::Regex;

use super::Attrs;

/// A contiguous run of text sharing one set of attributes
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRun {
    pub text: String,
    /// `None` for plain text
    pub attrs: Option<Attrs>,
}

impl FormattedRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: None,
        }
    }
}

/// One output line of formatted runs
pub type FormattedLine = Vec<FormattedRun>;

struct Style {
    delimiter: &'static str,
    attrs: &'static [(&'static str, &'static str)],
}

const STYLES: &[Style] = &[
    Style {
        delimiter: "*",
        attrs: &[("font-style", "italic")],
    },
    Style {
        delimiter: "_",
        attrs: &[("font-style", "italic")],
    },
    Style {
        delimiter: "**",
        attrs: &[("font-weight", "bolder")],
    },
    Style {
        delimiter: "__",
        attrs: &[("font-weight", "bolder")],
    },
    Style {
        delimiter: "~",
        attrs: &[("text-decoration", "line-through")],
    },
    Style {
        delimiter: "`",
        attrs: &[("font-family", "monospace")],
    },
];

struct Matchers {
    open: Regex,
    close: Regex,
}

/// Openers need a non-alphanumeric character before and non-space after;
/// closers the reverse. Lines are padded with a space on each side so both
/// ends of a line count as boundaries.
fn matchers() -> &'static [Matchers] {
    static MATCHERS: OnceLock<Vec<Matchers>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        STYLES
            .iter()
            .map(|style| {
                let delim = regex::escape(style.delimiter);
                Matchers {
                    open: Regex::new(&format!(r"[^\p{{L}}\p{{N}}]{}\S", delim))
                        .expect("Opener pattern should be a valid regex"),
                    close: Regex::new(&format!(r"\S{}[^\p{{L}}\p{{N}}]", delim))
                        .expect("Closer pattern should be a valid regex"),
                }
            })
            .collect()
    })
}

/// Emphasis state carried from one line to the next
#[derive(Debug, Clone, Default)]
struct EmphasisState {
    active: [bool; STYLES.len()],
    attrs: Option<Attrs>,
}

impl EmphasisState {
    fn toggle(&mut self, style: usize) {
        self.active[style] = !self.active[style];
        self.attrs = self.combine();
    }

    fn combine(&self) -> Option<Attrs> {
        let mut attrs = Attrs::new();
        for (style, _) in STYLES
            .iter()
            .zip(self.active.iter())
            .filter(|(_, on)| **on)
        {
            for (k, v) in style.attrs {
                attrs.insert((*k).to_string(), (*v).to_string());
            }
        }
        if attrs.is_empty() {
            None
        } else {
            Some(attrs)
        }
    }

    /// Earliest delimiter at or after byte offset `p` of `line`.
    /// Returns the style index, and start/end offsets of the delimiter.
    fn find_next(&self, line: &str, p: usize) -> Option<(usize, usize, usize)> {
        let padded = format!(" {} ", line);
        let mut best: Option<(usize, usize, usize)> = None;

        for (index, (style, matcher)) in STYLES.iter().zip(matchers()).enumerate() {
            let regex = if self.active[index] {
                &matcher.close
            } else {
                &matcher.open
            };
            // The boundary character sits one position before the delimiter,
            // which in padded coordinates is exactly `p`.
            let Some(m) = regex.find_at(&padded, p) else {
                continue;
            };
            let lead = padded[m.start()..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
            let start = m.start() + lead - 1;
            let end = start + style.delimiter.len();

            let better = match best {
                None => true,
                Some((_, best_start, best_end)) => {
                    start < best_start || (start == best_start && end > best_end)
                }
            };
            if better {
                best = Some((index, start, end));
            }
        }

        best
    }
}

/// Split `text` into lines of styled runs.
pub fn parse_markdown(text: &str) -> Vec<FormattedLine> {
    if text.is_empty() {
        return vec![];
    }

    let mut state = EmphasisState::default();
    text.split('\n')
        .map(|line| parse_line(line, &mut state))
        .collect()
}

fn parse_line(line: &str, state: &mut EmphasisState) -> FormattedLine {
    let mut runs = Vec::new();
    let mut p = 0;

    while let Some((style, start, end)) = state.find_next(line, p) {
        if start > p {
            runs.push(FormattedRun {
                text: line[p..start].to_string(),
                attrs: state.attrs.clone(),
            });
        }
        state.toggle(style);
        p = end;
    }

    if p < line.len() {
        runs.push(FormattedRun {
            text: line[p..].to_string(),
            attrs: state.attrs.clone(),
        });
    }

    runs
}

/// Concatenate the text of a formatted line
pub fn line_text(line: &[FormattedRun]) -> String {
    line.iter().map(|r| r.text.as_str()).collect()
}
