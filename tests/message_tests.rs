// Tests for wire payloads: the summary message contract, audio chunk
// text frames and the settings JSON shapes clients send.

use anyhow::Result;
use echonotes::{
    AccessibilitySummary, AudioChunkMessage, Difficulty, ProfileNeed, SummaryMessage, UserSettings,
};
use serde_json::{json, Value};

#[test]
fn test_summary_message_uses_exact_field_names() -> Result<()> {
    let message = SummaryMessage {
        simple_text: "Short.".to_string(),
        expanded_text: "Longer version.".to_string(),
        notes_for_hearing: "A bell rang.".to_string(),
    };

    let value = serde_json::to_value(&message)?;
    let object = value.as_object().expect("summary serializes to an object");
    assert_eq!(object.len(), 3, "Exactly the three contract fields");
    assert_eq!(object["simple_text"], "Short.");
    assert_eq!(object["expanded_text"], "Longer version.");
    assert_eq!(object["notes_for_hearing"], "A bell rang.");

    let parsed: SummaryMessage = serde_json::from_value(value)?;
    assert_eq!(parsed, message);
    Ok(())
}

#[test]
fn test_summary_message_from_accessibility_summary() {
    let summary = AccessibilitySummary {
        simple_text: "a".to_string(),
        expanded_text: "b".to_string(),
        notes_for_hearing: String::new(),
    };
    let message = SummaryMessage::from(summary);
    assert_eq!(message.simple_text, "a");
    assert_eq!(message.expanded_text, "b");
    assert_eq!(message.notes_for_hearing, "");
}

#[test]
fn test_audio_chunk_message_round_trip() -> Result<()> {
    let audio = [0u8, 1, 2, 255, 128, 64];
    let message = AudioChunkMessage::encode(&audio);

    let wire = serde_json::to_string(&message)?;
    let received: AudioChunkMessage = serde_json::from_str(&wire)?;
    let decoded = received.decode()?;

    assert_eq!(&decoded[..], &audio[..]);
    Ok(())
}

#[test]
fn test_audio_chunk_message_rejects_bad_base64() {
    let message: AudioChunkMessage =
        serde_json::from_str(r#"{"chunk": "not base64!!"}"#).expect("valid JSON shape");
    assert!(message.decode().is_err());
}

#[test]
fn test_settings_accept_the_client_literals() -> Result<()> {
    let settings: UserSettings = serde_json::from_value(json!({
        "difficulty": "very simple",
        "profile": ["dyslexia", "hearing_impairment"]
    }))?;

    assert_eq!(settings.difficulty, Difficulty::VerySimple);
    assert_eq!(
        settings.profile,
        vec![ProfileNeed::Dyslexia, ProfileNeed::HearingImpairment]
    );

    // And they serialize back to the same spellings
    let value = serde_json::to_value(&settings)?;
    assert_eq!(value["difficulty"], "very simple");
    assert_eq!(value["profile"], json!(["dyslexia", "hearing_impairment"]));
    Ok(())
}

#[test]
fn test_settings_cover_every_difficulty() -> Result<()> {
    for (literal, expected) in [
        ("very simple", Difficulty::VerySimple),
        ("simple", Difficulty::Simple),
        ("normal", Difficulty::Normal),
        ("detailed", Difficulty::Detailed),
    ] {
        let value: Value = json!({ "difficulty": literal, "profile": [] });
        let settings: UserSettings = serde_json::from_value(value)?;
        assert_eq!(settings.difficulty, expected, "Literal '{}'", literal);
    }
    Ok(())
}

#[test]
fn test_settings_default_when_fields_are_missing() -> Result<()> {
    let settings: UserSettings = serde_json::from_value(json!({}))?;
    assert_eq!(settings.difficulty, Difficulty::Simple);
    assert!(settings.profile.is_empty());
    Ok(())
}
