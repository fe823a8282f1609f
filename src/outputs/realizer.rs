use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag pattern is a valid literal"));

/// Removes markup tags, keeping the text between them.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Cuts to at most `max_chars` characters, never inside a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Tags stripped first, then truncated.
pub fn clean_answer(text: &str, max_chars: usize) -> String {
    truncate_chars(strip_tags(text).trim(), max_chars)
}

/// PURE FUNCTION: the spoken form of an answer.
/// A pipeline preamble template replaces the raw answer when configured.
pub fn realize_answer(
    question: &str,
    answer: &str,
    template: Option<&str>,
    max_chars: usize,
) -> String {
    let answer = clean_answer(answer, max_chars);
    match template {
        Some(template) => template
            .replace("{question}", question.trim())
            .replace("{answer}", &answer),
        None => answer,
    }
}
