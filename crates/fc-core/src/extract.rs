//! Pull a JSON object out of free-form assistant text.
//!
//! Replies are asked to be bare JSON but often arrive wrapped in a
//! markdown fence, surrounded by prose, or with trailing commas. The
//! cleanup runs in three passes:
//!
//! 1. strip a surrounding ```` ```lang ```` fence
//! 2. slice the first balanced `{ … }` object (string-literal aware)
//! 3. drop commas that directly precede `}` or `]`
//!
//! Built on `winnow` 0.7 like the rest of the crate's text handling.

use serde_json::Value;
use winnow::combinator::{delimited, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, none_of, take_till, take_while};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("reply contains no JSON object")]
    NoObject,

    #[error("reply JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extract and parse the first JSON object in `text`.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let cleaned = clean_reply(text).ok_or(ExtractError::NoObject)?;
    match serde_json::from_str(&cleaned) {
        Ok(value) => Ok(value),
        Err(e) => {
            log::warn!("reply JSON rejected: {e}");
            Err(e.into())
        }
    }
}

/// Run the three cleanup passes. `None` when no `{` is present.
pub fn clean_reply(text: &str) -> Option<String> {
    let unfenced = strip_fence(text.trim());
    let mut input = unfenced;
    let object = match first_object.parse_next(&mut input) {
        Ok(object) => object,
        // Unbalanced: keep everything from the first brace on.
        Err(_) => &unfenced[unfenced.find('{')?..],
    };
    Some(remove_trailing_commas(object))
}

// ─── Fence ───────────────────────────────────────────────────────────────

fn fence_open<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded("```", take_while(0.., |c: char| c.is_alphanumeric())).parse_next(input)
}

/// Return the body of a fenced block, or the input unchanged.
fn strip_fence(text: &str) -> &str {
    let mut input = text;
    if fence_open.parse_next(&mut input).is_err() {
        return text;
    }
    match input.strip_suffix("```") {
        Some(body) => body.trim(),
        None => text,
    }
}

// ─── Balanced object ─────────────────────────────────────────────────────

/// A JSON string literal, escapes included.
fn string_literal<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(
        '"',
        repeat::<_, _, (), _, _>(0.., escaped_or_plain).take(),
        '"',
    )
    .parse_next(input)
}

fn escaped_or_plain(input: &mut &str) -> ModalResult<()> {
    if input.starts_with('\\') {
        ('\\', any).void().parse_next(input)
    } else {
        none_of('"').void().parse_next(input)
    }
}

/// Skip prose up to the first `{` and return the balanced object there.
fn first_object<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let _: &str = take_till::<_, _, ErrMode<ContextError>>(0.., '{').parse_next(input)?;
    let start = *input;
    let mut depth = 0usize;
    loop {
        if input.starts_with('"') {
            string_literal.parse_next(input)?;
            continue;
        }
        let c: char = any::<_, ErrMode<ContextError>>.parse_next(input)?;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&start[..start.len() - input.len()]);
                }
            }
            _ => {}
        }
        if input.is_empty() {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
    }
}

// ─── Trailing commas ─────────────────────────────────────────────────────

fn remove_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut rest = json;
    while let Some(c) = rest.chars().next() {
        if c == '"' {
            let mut probe = rest;
            if let Ok(lit) = string_literal.take().parse_next(&mut probe) {
                out.push_str(lit);
                rest = probe;
                continue;
            }
        }
        if c == ',' {
            let after = rest[1..].trim_start();
            if after.starts_with('}') || after.starts_with(']') {
                rest = &rest[1..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bare_object_passes_through() {
        assert_eq!(clean_reply(r#"{"a":1}"#).as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn strips_language_fence() {
        let reply = "```json\n{\"nodes\": [], \"edges\": []}\n```";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!({"nodes": [], "edges": []})
        );
    }

    #[test]
    fn strips_plain_fence() {
        let reply = "```\n{\"suggestions\": []}\n```";
        assert_eq!(extract_json(reply).unwrap(), json!({"suggestions": []}));
    }

    #[test]
    fn slices_object_out_of_prose() {
        let reply = "Sure! Here is the layout: {\"a\": {\"b\": 2}} Let me know.";
        assert_eq!(extract_json(reply).unwrap(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let reply = r#"{"text": "use } and { freely", "n": 1} trailing"#;
        assert_eq!(
            extract_json(reply).unwrap(),
            json!({"text": "use } and { freely", "n": 1})
        );
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let reply = r#"{"text": "say \"hi\" }", "n": 2}"#;
        assert_eq!(
            extract_json(reply).unwrap(),
            json!({"text": "say \"hi\" }", "n": 2})
        );
    }

    #[test]
    fn trailing_commas_removed() {
        let reply = "{\"nodes\": [1, 2, ], \"edges\": [], }";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!({"nodes": [1, 2], "edges": []})
        );
    }

    #[test]
    fn commas_inside_strings_kept() {
        assert_eq!(
            extract_json(r#"{"label": "a, ]"}"#).unwrap(),
            json!({"label": "a, ]"})
        );
    }

    #[test]
    fn no_brace_is_an_error() {
        assert!(matches!(
            extract_json("I could not do that."),
            Err(ExtractError::NoObject)
        ));
    }

    #[test]
    fn unbalanced_object_fails_to_parse() {
        assert!(matches!(
            extract_json("{\"nodes\": ["),
            Err(ExtractError::Json(_))
        ));
    }
}
