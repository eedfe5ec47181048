//! Markdown fence stripping for generated text.

const FENCE: &str = "```";

/// Remove surrounding whitespace and markdown code fencing from LLM output.
///
/// A fenced block is recognised when the trimmed text opens with ```` ``` ````
/// (optionally followed by a language tag on the same line) and closes with
/// ```` ``` ```` on its own line. The interior is kept verbatim apart from
/// trimming. Nested outer fences are peeled until none remain, so cleaning is
/// idempotent.
pub fn clean_llm_output(raw: &str) -> String {
    let mut current = raw.trim();
    while let Some(inner) = strip_fence(current) {
        current = inner.trim();
    }
    current.to_string()
}

/// Return the interior of a fenced block, or `None` if `text` is not fenced.
fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let (tag, body) = rest.split_once('\n')?;
    if tag.contains('`') {
        return None;
    }

    let body = body.strip_suffix(FENCE)?;
    if body.is_empty() {
        return Some(body);
    }

    // The closing fence must sit on its own line.
    body.strip_suffix('\n')
        .map(|b| b.strip_suffix('\r').unwrap_or(b))
}
