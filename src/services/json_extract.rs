use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("no {0:?} delimiters found in model output")]
    MissingDelimiters(JsonShape),

    #[error("embedded JSON did not parse: {0}")]
    Parse(String),
}

/// Pulls the JSON value out of free-form model output.
///
/// Takes everything from the first opening delimiter to the last closing one
/// and parses it strictly. Output with two separate blocks, or with stray
/// closing characters after the value, fails rather than being guessed at.
pub fn extract_json(text: &str, shape: JsonShape) -> Result<Value, ParseFailure> {
    let (open, close) = shape.delimiters();

    let start = text.find(open);
    let end = text.rfind(close);

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => return Err(ParseFailure::MissingDelimiters(shape)),
    };

    serde_json::from_str(&text[start..=end]).map_err(|e| ParseFailure::Parse(e.to_string()))
}
