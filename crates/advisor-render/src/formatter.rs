//! Lightweight markup to display HTML for assistant replies.
//!
//! A fixed chain of global substitutions, applied in order. Only the markup
//! below is recognized; everything else passes through untouched.

use regex::Regex;
use std::sync::OnceLock;

const STEP_NUMBER: &str = "<br><div class=\"step-number\">";
const STEP_CONTENT: &str = "<div class=\"step-content\">";

/// Ordered substitution rules: (pattern, replacement).
const RULES: &[(&str, &str)] = &[
    // **bold**
    (r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
    // *italic*
    (r"\*(.*?)\*", "<em>${1}</em>"),
    // Paragraph breaks, then the remaining single newlines.
    (r"\n\n+", "<br><br>"),
    (r"\n", "<br>"),
    // "1. " at the start of a line opens a step block. ASCII digits only.
    (
        r"(^|<br>)([0-9]+)\.\s+",
        "${1}<br><div class=\"step-number\">${2}.</div><div class=\"step-content\">",
    ),
    // Bullets start on their own line.
    (r"•\s+", "<br>• "),
];

/// Compiled formatter. Build once and reuse.
pub struct MessageFormatter {
    rules: Vec<(Regex, &'static str)>,
    leading_break: Regex,
}

impl MessageFormatter {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(pattern, replacement)| {
                (Regex::new(pattern).expect("built-in pattern"), *replacement)
            })
            .collect();
        Self {
            rules,
            leading_break: Regex::new(r"^\s*<br>").expect("built-in pattern"),
        }
    }

    /// Convert `raw` into a single `formatted-response` container.
    pub fn format(&self, raw: &str) -> String {
        let mut text = raw.trim().to_string();
        for (pattern, replacement) in &self.rules {
            if pattern.is_match(&text) {
                text = pattern.replace_all(&text, *replacement).into_owned();
            }
        }
        let text = self.leading_break.replace(&text, "");
        let text = close_step_blocks(&text);
        format!("<div class=\"formatted-response\">{}</div>", text)
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format with a shared formatter instance.
pub fn format_bot_message(raw: &str) -> String {
    static FORMATTER: OnceLock<MessageFormatter> = OnceLock::new();
    FORMATTER.get_or_init(MessageFormatter::new).format(raw)
}

/// Each step's content span runs until the next step marker or the end.
fn close_step_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(start) = rest.find(STEP_CONTENT) {
        let body_start = start + STEP_CONTENT.len();
        out.push_str(&rest[..body_start]);
        let body = &rest[body_start..];
        let end = body.find(STEP_NUMBER).unwrap_or(body.len());
        out.push_str(&body[..end]);
        out.push_str("</div>");
        rest = &body[end..];
    }
    out.push_str(rest);
    out
}
