//! Text extraction from a generative-language response envelope.
//!
//! The envelope is treated as untyped JSON. Strategies run in order against
//! the envelope's `response` member, when there is one, and then against the
//! envelope itself; the first one that yields non-empty text wins.

use serde_json::Value;
use tracing::debug;

type Strategy = fn(&Value) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 5] = [
    ("text", direct_text),
    ("candidates.content.parts", candidate_parts),
    ("candidates.content[]", candidate_content_array),
    ("candidates.output.content", candidate_output),
    ("output[0].content", top_level_output),
];

/// First text found by the ordered strategies, or `None`.
pub fn extract_text(envelope: &Value) -> Option<String> {
    let roots = envelope
        .get("response")
        .into_iter()
        .chain(std::iter::once(envelope));
    for root in roots {
        for (name, strategy) in STRATEGIES {
            if let Some(text) = strategy(root) {
                debug!(strategy = name, "reply text extracted");
                return Some(text);
            }
        }
    }
    None
}

/// Extracted text, falling back to the serialized envelope.
pub fn text_or_raw(envelope: &Value) -> String {
    extract_text(envelope).unwrap_or_else(|| envelope.to_string())
}

fn non_empty(v: &Value) -> Option<String> {
    v.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

fn first_text<'a, I>(items: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Value>,
{
    items
        .into_iter()
        .find_map(|item| item.get("text").and_then(non_empty))
}

fn candidates(root: &Value) -> impl Iterator<Item = &Value> {
    root.get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn direct_text(root: &Value) -> Option<String> {
    root.get("text").and_then(non_empty)
}

/// `candidates[].content.parts[].text` (generateContent REST shape).
fn candidate_parts(root: &Value) -> Option<String> {
    candidates(root).find_map(|cand| {
        let parts = cand.get("content")?.get("parts")?.as_array()?;
        first_text(parts)
    })
}

/// `candidates[].content[].text`.
fn candidate_content_array(root: &Value) -> Option<String> {
    candidates(root).find_map(|cand| first_text(cand.get("content")?.as_array()?))
}

/// `candidates[].output[].content[].text`.
fn candidate_output(root: &Value) -> Option<String> {
    candidates(root).find_map(|cand| {
        cand.get("output")?
            .as_array()?
            .iter()
            .find_map(|out| first_text(out.get("content")?.as_array()?))
    })
}

/// `output[0].content[].text`.
fn top_level_output(root: &Value) -> Option<String> {
    let contents = root.get("output")?.as_array()?.first()?.get("content")?;
    first_text(contents.as_array()?)
}
