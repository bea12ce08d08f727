//! Inline markup cleanup for streamed model output.
//!
//! The upstream model occasionally emits a handful of HTML tags. They are
//! rewritten to their Markdown equivalents and every other tag is dropped, so
//! renderers only ever see Markdown. The transform is chunk-local: a tag whose
//! brackets straddle two deltas passes through untouched.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?b>").expect("valid bold pattern"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?i>").expect("valid italic pattern"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break pattern"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Rewrite known inline tags to Markdown and strip the rest.
///
/// Bold, italic and line-break rewriting must happen before the catch-all
/// strip, which would otherwise swallow them.
pub fn sanitize(chunk: &str) -> String {
    if !chunk.contains('<') {
        return chunk.to_string();
    }

    let text = BOLD.replace_all(chunk, "**");
    let text = ITALIC.replace_all(&text, "*");
    let text = LINE_BREAK.replace_all(&text, "\n");
    ANY_TAG.replace_all(&text, "").into_owned()
}
