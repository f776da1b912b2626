//! Response parser for model output.
//!
//! Models are told to answer with a bare `{"actions": [...], "reply": "..."}`
//! object but routinely wrap it in code fences or a sentence of prose.
//! Recovery is two-tier: decode the cleaned text directly, then retry on
//! the first balanced `{...}` span found in it.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Structured model reply. `actions` are still untyped; see `actions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub actions: Vec<Value>,
    pub reply: String,
}

impl ParsedResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

fn re_code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*").unwrap())
}

/// Parse raw model output. `None` means nothing decodable was found.
pub fn parse_response(raw: &str) -> Option<ParsedResponse> {
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned = re_code_fence().replace_all(raw, "");
    let cleaned = cleaned.trim();

    if let Some(parsed) = decode(cleaned) {
        return Some(parsed);
    }

    first_object(cleaned).and_then(decode)
}

fn decode(text: &str) -> Option<ParsedResponse> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;

    let actions = match obj.get("actions") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    let reply = obj
        .get("reply")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ParsedResponse { actions, reply })
}

/// First balanced `{...}` span in `text`. Braces inside string literals
/// don't count toward nesting.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
