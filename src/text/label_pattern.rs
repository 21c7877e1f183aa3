//! Label patterns for automatic message labelling
//!
//! A pattern such as `"<inc 1.0,0.5>. <label>"` is split into literal text,
//! a substitution point for the original label, and numeric counters.

use logos::Logos;

/// Raw tokens of a pattern string
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    /// A complete `<...>` group, without the brackets
    #[regex(r"<[^<>]*>", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_owned()
    })]
    Group(String),

    /// Plain text up to the next `<`
    #[regex(r"[^<]+", |lex| lex.slice().to_owned())]
    Text(String),

    /// A `<` that never gets closed
    #[token("<")]
    Open,
}

/// One element of a parsed label pattern
#[derive(Debug, Clone, PartialEq)]
pub enum LabelToken {
    /// Literal text, including unknown `<tokens>` passed through verbatim
    Text(String),
    /// Substitution point for the message label
    Label,
    /// Auto-incrementing counter
    Counter { start: f64, inc: f64, dp: usize },
}

/// A parsed label pattern
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPattern {
    pub tokens: Vec<LabelToken>,
}

impl LabelPattern {
    /// Parse a pattern string. Never fails: anything unrecognised is literal.
    pub fn parse(raw: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut lexer = RawToken::lexer(raw);

        while let Some(token) = lexer.next() {
            match token {
                Ok(RawToken::Group(inner)) => {
                    flush_literal(&mut tokens, &mut literal);
                    tokens.push(parse_group(&inner));
                }
                Ok(RawToken::Text(text)) => literal.push_str(&text),
                Ok(RawToken::Open) | Err(()) => literal.push_str(lexer.slice()),
            }
        }
        flush_literal(&mut tokens, &mut literal);

        Self { tokens }
    }

    /// Whether the pattern contains no tokens at all
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Start a fresh application of this pattern with counters at their
    /// starting values.
    pub fn counters(&self) -> PatternCounters {
        PatternCounters {
            values: self
                .tokens
                .iter()
                .map(|t| match t {
                    LabelToken::Counter { start, .. } => *start,
                    _ => 0.0,
                })
                .collect(),
        }
    }

    /// Substitute `label` into the pattern, advancing every counter.
    pub fn apply(&self, label: &str, counters: &mut PatternCounters) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                LabelToken::Text(text) => out.push_str(text),
                LabelToken::Label => out.push_str(label),
                LabelToken::Counter { inc, dp, .. } => {
                    let value = counters.values.get(i).copied().unwrap_or_default();
                    out.push_str(&format!("{:.*}", *dp, value));
                    if let Some(slot) = counters.values.get_mut(i) {
                        *slot += inc;
                    }
                }
            }
        }
        out
    }
}

/// Running counter values for one application of a pattern
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternCounters {
    values: Vec<f64>,
}

fn flush_literal(tokens: &mut Vec<LabelToken>, literal: &mut String) {
    if !literal.is_empty() {
        tokens.push(LabelToken::Text(std::mem::take(literal)));
    }
}

fn parse_group(inner: &str) -> LabelToken {
    if inner == "label" {
        return LabelToken::Label;
    }

    let (kind, args) = match inner.split_once(' ') {
        Some((kind, args)) => (kind, args),
        None => (inner, ""),
    };

    if kind == "inc" {
        if let Some(counter) = parse_counter(args) {
            return counter;
        }
    }

    LabelToken::Text(format!("<{}>", inner))
}

fn parse_counter(args: &str) -> Option<LabelToken> {
    let mut start = 1.0;
    let mut inc = 1.0;
    let mut dp = 0;

    let mut parts = args.split(',').map(str::trim);
    if let Some(arg) = parts.next().filter(|a| !a.is_empty()) {
        start = arg.parse::<f64>().ok()?;
        dp = dp.max(decimal_places(arg));
    }
    if let Some(arg) = parts.next().filter(|a| !a.is_empty()) {
        inc = arg.parse::<f64>().ok()?;
        dp = dp.max(decimal_places(arg));
    }
    if parts.next().is_some() {
        return None;
    }

    Some(LabelToken::Counter { start, inc, dp })
}

/// Digits written after a literal decimal point
fn decimal_places(number: &str) -> usize {
    number
        .split_once('.')
        .map(|(_, frac)| frac.chars().take_while(char::is_ascii_digit).count())
        .unwrap_or(0)
}
