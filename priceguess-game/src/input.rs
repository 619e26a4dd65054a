//! Validation of raw guess text before it reaches a controller.
use regex::Regex;
use std::sync::OnceLock;

// Leading unsigned decimal, optionally with an exponent; trailing text is ignored.
const GUESS_PATTERN: &str = r"^\s*((?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)";

fn guess_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(GUESS_PATTERN).ok()).as_ref()
}

/// Parse a typed guess. Empty, non-numeric, negative and non-finite input
/// yields `None`, which callers drop silently.
#[must_use]
pub fn parse_guess(raw: &str) -> Option<f64> {
    let captures = guess_regex()?.captures(raw)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
