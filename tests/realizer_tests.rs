use parley::outputs::realizer::{clean_answer, realize_answer, strip_tags, truncate_chars};

#[test]
fn tags_are_removed_text_is_kept() {
    assert_eq!(strip_tags("<b>Paris</b> is <a href=\"x\">nice</a>"), "Paris is nice");
    assert_eq!(strip_tags("no markup"), "no markup");
    // A lone bracket is not a tag
    assert_eq!(strip_tags("3 < 4"), "3 < 4");
}

#[test]
fn truncation_counts_chars_not_bytes() {
    assert_eq!(truncate_chars("Zürich", 3), "Zür");
    assert_eq!(truncate_chars("東京都", 2), "東京");
    assert_eq!(truncate_chars("short", 10), "short");
    assert_eq!(truncate_chars("exact", 5), "exact");
}

#[test]
fn stripping_happens_before_truncation() {
    // Truncating first would keep a dangling "<b"
    assert_eq!(clean_answer("Paris<b></b>", 5), "Paris");
    assert_eq!(clean_answer("<i>Berlin</i> is the capital", 6), "Berlin");
    assert_eq!(clean_answer("  <p> Rome </p>  ", 200), "Rome");
}

#[test]
fn answer_without_template_is_spoken_as_cleaned() {
    assert_eq!(
        realize_answer("capital of Italy", "<b>Rome</b>", None, 200),
        "Rome"
    );
}

#[test]
fn template_substitutes_question_and_answer() {
    let spoken = realize_answer(
        "  capital of Italy ",
        "<b>Rome</b>",
        Some("You asked about {question}. It is {answer}."),
        200,
    );
    assert_eq!(spoken, "You asked about capital of Italy. It is Rome.");
}

#[test]
fn template_without_placeholders_is_used_verbatim() {
    assert_eq!(
        realize_answer("q", "a", Some("Let me show you."), 200),
        "Let me show you."
    );
}
