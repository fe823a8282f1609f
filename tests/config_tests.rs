use std::io::Write;
use std::time::Duration;

use parley::config::{ConfigError, ParleyConfig};
use parley::kernel::appearance::AppearanceEntry;
use parley::kernel::presence::{ConversationState, Mood};

#[test]
fn empty_file_yields_defaults() {
    let config = ParleyConfig::from_toml("").unwrap();

    assert_eq!(config.conversation.max_answer_chars, 200);
    assert_eq!(config.conversation.restart_delay(), Duration::from_secs(5));
    assert_eq!(config.conversation.dialog_name, "companion");
    assert_eq!(config.services.request_timeout(), Duration::from_millis(5000));
    assert!(config.preambles.is_empty());
    assert_eq!(config.phrases.greeting.len(), 4);
}

#[test]
fn load_reads_every_section() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[conversation]
max_answer_chars = 80
restart_delay_secs = 2
dialog_name = "concierge"

[preambles]
thunderstone = "About {{question}}: {{answer}}"

[phrases]
greeting = ["Howdy."]

[services]
qa_url = "http://qa.internal:9000"

[appearance.states.Thinking]
color = [1, 2, 3]
speed = 4.0
"#
    )
    .unwrap();

    let config = ParleyConfig::load(file.path()).unwrap();

    assert_eq!(config.conversation.max_answer_chars, 80);
    assert_eq!(config.conversation.restart_delay(), Duration::from_secs(2));
    assert_eq!(config.conversation.dialog_name, "concierge");
    // Unset fields keep their defaults
    assert_eq!(config.conversation.min_confidence, 0.5);
    assert_eq!(
        config.preambles.get("thunderstone").map(String::as_str),
        Some("About {question}: {answer}")
    );
    assert_eq!(config.phrases.greeting, vec!["Howdy.".to_string()]);
    assert_eq!(config.phrases.farewell.len(), 3);
    assert_eq!(config.services.qa_url, "http://qa.internal:9000");
    assert_eq!(config.services.dialog_url, "http://localhost:8081");

    let table = config.appearance_table().unwrap();
    assert_eq!(
        table.for_state(ConversationState::Thinking),
        AppearanceEntry::new([1, 2, 3], 4.0)
    );
    assert_eq!(
        table.for_mood(Mood::Idle),
        AppearanceEntry::new([200, 200, 200], 1.0)
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ParleyConfig::load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = ParleyConfig::from_toml("[conversation\nmax_answer_chars = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn empty_phrase_list_is_rejected() {
    let err = ParleyConfig::from_toml("[phrases]\nfarewell = []").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyPhraseList("farewell")));
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = ParleyConfig::from_toml("[conversation]\nmax_answer_chars = 0").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "conversation.max_answer_chars",
            ..
        }
    ));

    let err = ParleyConfig::from_toml("[conversation]\nmin_confidence = 1.5").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn unknown_appearance_key_is_rejected() {
    let err = ParleyConfig::from_toml(
        "[appearance.states.Dreaming]\ncolor = [0, 0, 0]\nspeed = 1.0",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownAppearanceKey(_)));
}
