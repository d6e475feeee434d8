//! Parsing the model's `{"score": <int>, "reason": "<sentence>"}` reply.

use serde_json::Value;

use super::model::{ModelVerdict, ScoreError};

/// Inclusive bounds for an accepted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: i64,
    pub max: i64,
}

impl ScoreRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: i64) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Parse a reply into a verdict.
///
/// Accepts a bare object, one wrapped in a Markdown code fence, or one
/// embedded in surrounding prose. `score` may be an integer, a whole float or
/// a numeric string; it must fall inside `range`.
pub fn parse_verdict(text: &str, range: ScoreRange) -> Result<ModelVerdict, ScoreError> {
    let text = strip_code_fence(text.trim());

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            let start = text.find('{');
            let end = text.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => serde_json::from_str(&text[s..=e])
                    .map_err(|err| malformed(format!("invalid JSON object: {}", err), text))?,
                _ => return Err(malformed("no JSON object found".to_string(), text)),
            }
        }
    };

    let object = value
        .as_object()
        .ok_or_else(|| malformed("reply is not a JSON object".to_string(), text))?;

    let score = object
        .get("score")
        .and_then(coerce_score)
        .ok_or_else(|| malformed("missing or non-integer score".to_string(), text))?;

    if !range.contains(score) {
        return Err(malformed(
            format!("score {} outside {}..={}", score, range.min, range.max),
            text,
        ));
    }

    let rationale = object
        .get("reason")
        .or_else(|| object.get("rationale"))
        .map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    Ok(ModelVerdict::new(score, rationale))
}

fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    // Drop the opening fence line (```json) and a closing fence if present
    let body = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => "",
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn malformed(reason: String, text: &str) -> ScoreError {
    ScoreError::MalformedResponse(format!("{} in {:?}", reason, truncate_for_error(text, 100)))
}

/// Truncate text for error messages.
fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
