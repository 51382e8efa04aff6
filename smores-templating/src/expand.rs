//! Rewriting `{tag}` syntax into Liquid expressions.
//!
//! `{user.dogs:1.name}` becomes `{{user.dogs[0].name | fallback: ''}}`. A `{`
//! only starts a tag when a name character follows it directly, so Liquid's own
//! `{{`, `{%` and ordinary prose braces pass through untouched.

use crate::error::{Result, SyntaxError, TemplatingError};
use crate::tag::{is_name_char, parse_path_at, TagPath};
use std::fmt;
use std::sync::Arc;

/// Name of the filter that supplies the default for unresolved values.
pub const FALLBACK_FILTER: &str = "fallback";

/// What an unresolved tag renders as.
#[derive(Clone)]
pub enum Fallback {
    /// The same text for every tag.
    Literal(String),
    /// Computed from the tag in source form, e.g. `{user.notarealtag}`.
    Computed(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Fallback {
    pub fn literal(text: impl Into<String>) -> Self {
        Fallback::Literal(text.into())
    }

    pub fn computed(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Fallback::Computed(Arc::new(f))
    }

    /// Render unresolved tags back as written.
    pub fn echo_tag() -> Self {
        Fallback::computed(|tag| tag.to_string())
    }

    /// The fallback text for one tag.
    pub fn resolve(&self, path: &TagPath) -> String {
        match self {
            Fallback::Literal(text) => text.clone(),
            Fallback::Computed(f) => f(&path.render_as_tag()),
        }
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Fallback::Literal(String::new())
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Fallback::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Fallback {
    fn from(text: &str) -> Self {
        Fallback::Literal(text.to_string())
    }
}

impl From<String> for Fallback {
    fn from(text: String) -> Self {
        Fallback::Literal(text)
    }
}

/// How a tag should be expanded, decided per tag by the caller of [`expand_with`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// Look up this path, with the fallback as default.
    Lookup(TagPath),
    /// The tag is known not to resolve; emit only the fallback.
    Unresolved,
}

/// A piece of scanned template text.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag { path: TagPath, source: &'a str },
}

/// Split template text into literal text and tags.
pub fn scan(text: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('{') {
        let open = pos + rel;
        match candidate_end(text, open)? {
            Some(close) => {
                if literal_start < open {
                    segments.push(Segment::Text(&text[literal_start..open]));
                }
                let path = parse_path_at(&text[open + 1..close], open + 1)?;
                segments.push(Segment::Tag {
                    path,
                    source: &text[open..=close],
                });
                pos = close + 1;
                literal_start = pos;
            }
            None => pos = open + 1,
        }
    }
    if literal_start < text.len() {
        segments.push(Segment::Text(&text[literal_start..]));
    }
    Ok(segments)
}

/// Byte offset of the `}` closing a tag that opens at `open`, or `None` when
/// the brace is literal text.
fn candidate_end(text: &str, open: usize) -> Result<Option<usize>> {
    let body = &text[open + 1..];
    if !body.starts_with(is_name_char) {
        return Ok(None);
    }
    for (i, c) in body.char_indices() {
        if c == '}' {
            let inner = &body[..i];
            if inner.ends_with([' ', '\t']) {
                return Ok(None);
            }
            return Ok(Some(open + 1 + i));
        }
        if !(is_name_char(c) || matches!(c, '.' | ':' | ' ' | '\t')) {
            return Ok(None);
        }
    }
    Err(TemplatingError::syntax(open, SyntaxError::Unterminated))
}

/// Expand every tag with a lookup and the given fallback.
pub fn expand(text: &str, fallback: &Fallback) -> Result<String> {
    expand_with(text, fallback, |path| Expansion::Lookup(path.clone()))
}

/// Expand every tag, letting `screen` decide per tag what to emit.
///
/// The fallback is always computed from the tag as written, not from the
/// path `screen` returns.
pub fn expand_with<F>(text: &str, fallback: &Fallback, mut screen: F) -> Result<String>
where
    F: FnMut(&TagPath) -> Expansion,
{
    let mut out = String::with_capacity(text.len() + 32);
    for segment in scan(text)? {
        match segment {
            Segment::Text(literal) => out.push_str(literal),
            Segment::Tag { path, source } => {
                let default = quote_literal(&fallback.resolve(&path))?;
                match screen(&path) {
                    Expansion::Lookup(lookup) => {
                        let expr = lookup.to_engine_expr();
                        tracing::trace!(tag = source, %expr, "expanded tag");
                        out.push_str(&format!(
                            "{{{{{expr} | {FALLBACK_FILTER}: {default}}}}}"
                        ));
                    }
                    Expansion::Unresolved => {
                        tracing::trace!(tag = source, "tag does not resolve");
                        out.push_str(&format!("{{{{ {default} }}}}"));
                    }
                }
            }
        }
    }
    Ok(out)
}

/// Append the `fallback` filter to every `{{ ... }}` output that does not end
/// in it, so records and lists printed by raw Liquid finalize the same way tags
/// do. `{% raw %}` blocks are left alone.
pub fn finalize_outputs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut pos = 0;
    while let Some(rel) = text[pos..].find('{') {
        let open = pos + rel;
        let rest = &text[open..];
        if rest.starts_with("{{") {
            let Some(close) = find_unquoted(text, open + 2, "}}") else {
                break;
            };
            out.push_str(&text[pos..open]);
            out.push_str(&finalize_output(&text[open + 2..close]));
            pos = close + 2;
        } else if rest.starts_with("{%") {
            let Some(close) = find_unquoted(text, open + 2, "%}") else {
                break;
            };
            let end = if is_raw_open(&text[open + 2..close]) {
                raw_block_end(text, close + 2)
            } else {
                close + 2
            };
            out.push_str(&text[pos..end]);
            pos = end;
        } else {
            out.push_str(&text[pos..=open]);
            pos = open + 1;
        }
    }
    out.push_str(&text[pos..]);
    out
}

fn finalize_output(inner: &str) -> String {
    let (body, trim) = match inner.strip_suffix('-') {
        Some(body) => (body, "-"),
        None => (inner, ""),
    };
    let ends_in_fallback = last_filter(body).is_some_and(|filter| {
        filter
            .strip_prefix(FALLBACK_FILTER)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([':', ' ', '\t']))
    });
    if ends_in_fallback || body.trim().trim_start_matches('-').trim().is_empty() {
        return format!("{{{{{inner}}}}}");
    }
    format!(
        "{{{{{} | {FALLBACK_FILTER}: '' {trim}}}}}",
        body.trim_end()
    )
}

/// The text after the last unquoted `|`, trimmed.
fn last_filter(body: &str) -> Option<&str> {
    let mut quote = None;
    let mut last = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '|' => last = Some(i),
            None => {}
        }
    }
    last.map(|i| body[i + 1..].trim())
}

/// Byte offset of the first `pat` at or after `from` outside a string literal.
fn find_unquoted(text: &str, from: usize, pat: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text[from..].char_indices() {
        let at = from + i;
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if text[at..].starts_with(pat) => return Some(at),
            None => {}
        }
    }
    None
}

fn is_raw_open(tag_body: &str) -> bool {
    tag_body.trim_matches(|c: char| c == '-' || c.is_whitespace()) == "raw"
}

/// End of the `{% endraw %}` closing a raw block whose body starts at `from`.
fn raw_block_end(text: &str, from: usize) -> usize {
    let mut pos = from;
    while let Some(rel) = text[pos..].find("{%") {
        let open = pos + rel;
        let Some(close) = text[open..].find("%}").map(|r| open + r) else {
            break;
        };
        let body = text[open + 2..close].trim_matches(|c: char| c == '-' || c.is_whitespace());
        if body == "endraw" {
            return close + 2;
        }
        pos = close + 2;
    }
    text.len()
}

/// Write `text` as a Liquid string literal.
///
/// Liquid strings have no escapes, so the quote character is chosen to avoid
/// the text's own quotes.
pub fn quote_literal(text: &str) -> Result<String> {
    if !text.contains('\'') {
        Ok(format!("'{text}'"))
    } else if !text.contains('"') {
        Ok(format!("\"{text}\""))
    } else {
        Err(TemplatingError::UnquotableFallback(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{parse_tag, PathStep};
    use rstest::rstest;

    #[rstest]
    #[case("{user.name}", "{{user.name | fallback: ''}}")]
    #[case("{user.addresses:4.geo.lat}", "{{user.addresses[3].geo.lat | fallback: ''}}")]
    #[case("{User.Dogs:1.Name}", "{{user.dogs[0].name | fallback: ''}}")]
    #[case("Hi {user.name}, bye", "Hi {{user.name | fallback: ''}}, bye")]
    #[case("{a}{b}", "{{a | fallback: ''}}{{b | fallback: ''}}")]
    #[case("{user . dogs : 2}", "{{user.dogs[1] | fallback: ''}}")]
    fn expands_tags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expand(input, &Fallback::default()).unwrap(), expected);
    }

    #[rstest]
    #[case("plain text")]
    #[case("")]
    #[case("{% if x %}y{% endif %}")]
    #[case("{{ user.name }}")]
    #[case("function() { return 1; }")]
    #[case("{ user }")]
    #[case("{user }")]
    #[case("{user-name}")]
    #[case("set: {}")]
    fn leaves_non_tags_alone(#[case] input: &str) {
        assert_eq!(expand(input, &Fallback::default()).unwrap(), input);
    }

    #[test]
    fn liquid_output_markers_still_contain_tags() {
        // The inner brace pair is a tag in its own right.
        assert_eq!(
            expand("{{user}}", &Fallback::default()).unwrap(),
            "{{{user | fallback: ''}}}"
        );
    }

    #[rstest]
    #[case("{a..b}", SyntaxError::EmptyName)]
    #[case("{a.}", SyntaxError::EmptyName)]
    #[case("{a:0}", SyntaxError::NonPositiveIndex)]
    #[case("{a:}", SyntaxError::MissingIndex)]
    #[case("text {user.name", SyntaxError::Unterminated)]
    fn malformed_tags_are_errors(#[case] input: &str, #[case] expected: SyntaxError) {
        match expand(input, &Fallback::default()) {
            Err(TemplatingError::Syntax { kind, .. }) => assert_eq!(kind, expected),
            other => panic!("expected syntax error for {input}, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_offset_points_at_brace() {
        match expand("abc {user", &Fallback::default()) {
            Err(TemplatingError::Syntax { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn literal_fallback() {
        let out = expand("{user.x}", &Fallback::literal("INVALID_TAG")).unwrap();
        assert_eq!(out, "{{user.x | fallback: 'INVALID_TAG'}}");
    }

    #[test]
    fn computed_fallback_sees_source_form() {
        let fallback = Fallback::computed(|tag| format!("!!{tag}!!"));
        let out = expand("{User.NotARealTag}", &fallback).unwrap();
        assert_eq!(out, "{{user.notarealtag | fallback: '!!{user.notarealtag}!!'}}");
    }

    #[test]
    fn fallback_quotes_are_chosen_to_fit() {
        let out = expand("{a}", &Fallback::literal("it's")).unwrap();
        assert_eq!(out, "{{a | fallback: \"it's\"}}");

        let err = expand("{a}", &Fallback::literal("'\"")).unwrap_err();
        assert!(matches!(err, TemplatingError::UnquotableFallback(_)));
    }

    #[test]
    fn screening_can_mark_tags_unresolved() {
        let out = expand_with("{ghost.x} {user.name}", &Fallback::literal("?"), |path| {
            if path.root().name == "ghost" {
                Expansion::Unresolved
            } else {
                Expansion::Lookup(path.clone())
            }
        })
        .unwrap();
        assert_eq!(out, "{{ '?' }} {{user.name | fallback: '?'}}");
    }

    #[test]
    fn screening_fallback_sees_tag_as_written() {
        let fallback = Fallback::echo_tag();
        let out = expand_with("{user.user.name}", &fallback, |path| {
            Expansion::Lookup(TagPath::from_steps(path.rest().to_vec()).unwrap())
        })
        .unwrap();
        assert_eq!(out, "{{user.name | fallback: '{user.user.name}'}}");
    }

    #[test]
    fn scan_reports_segments() {
        let segments = scan("a {b.c:2} d").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("a "));
        match &segments[1] {
            Segment::Tag { path, source } => {
                assert_eq!(*source, "{b.c:2}");
                assert_eq!(path.steps()[1], PathStep::indexed("c", 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(segments[2], Segment::Text(" d"));
    }

    #[test]
    fn expanded_path_round_trips() {
        for tag in ["{user.dogs:1.name}", "{a:3.b:12.c}", "{x}"] {
            let path = parse_tag(tag).unwrap();
            let expanded = expand(&path.render_as_tag(), &Fallback::default()).unwrap();
            assert_eq!(
                expanded,
                format!("{{{{{} | fallback: ''}}}}", path.to_engine_expr())
            );
        }
    }

    #[rstest]
    #[case("{{ user.address }}", "{{ user.address | fallback: '' }}")]
    #[case("{{geo}}", "{{geo | fallback: '' }}")]
    #[case("{{- name | upcase -}}", "{{- name | upcase | fallback: '' -}}")]
    #[case("{{ 'a|b}}' }}", "{{ 'a|b}}' | fallback: '' }}")]
    #[case("a {{x}} b {{y}}", "a {{x | fallback: '' }} b {{y | fallback: '' }}")]
    fn finalizes_bare_outputs(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(finalize_outputs(input), expected);
    }

    #[rstest]
    #[case("{{user.name | fallback: '?'}}")]
    #[case("{{ '?' | fallback }}")]
    #[case("{% for d in dogs %}{% endfor %}")]
    #[case("{% raw %}{{ x }}{% endraw %}")]
    #[case("no output { here }")]
    #[case("{{ }}")]
    #[case("unclosed {{ x")]
    fn leaves_finalized_outputs_alone(#[case] input: &str) {
        assert_eq!(finalize_outputs(input), input);
    }

    #[test]
    fn raw_blocks_end_at_endraw() {
        assert_eq!(
            finalize_outputs("{%- raw -%}{{ a }}{%- endraw -%}{{ b }}"),
            "{%- raw -%}{{ a }}{%- endraw -%}{{ b | fallback: '' }}"
        );
    }

    #[test]
    fn expanded_tags_are_already_final() {
        let expanded = expand("{user.dogs:1} {{ user }}", &Fallback::default()).unwrap();
        assert_eq!(
            finalize_outputs(&expanded),
            "{{user.dogs[0] | fallback: ''}} {{ user | fallback: '' }}"
        );
    }
}
