// Tests for subtitle export formatting
//
// SRT wants HH:MM:SS,mmm timestamps, VTT wants HH:MM:SS.mmm; end times are
// synthesized as start + 3000ms since entries record no end offset.

use caption_relay::export::{render, ExportFormat};
use caption_relay::CaptionEntry;
use std::str::FromStr;

fn entry(text: &str, translated: Option<&str>, timestamp: u64) -> CaptionEntry {
    CaptionEntry {
        id: format!("entry-{}", timestamp),
        session_id: "session-1".to_string(),
        original_text: text.to_string(),
        translated_text: translated.map(str::to_string),
        speaker_label: None,
        timestamp,
        confidence: None,
    }
}

#[test]
fn srt_blocks_are_numbered_with_synthesized_end_times() {
    let entries = vec![entry("hello", None, 0), entry("world", None, 5000)];
    let srt = render(ExportFormat::Srt, &entries);

    let expected = "1\n\
                    00:00:00,000 --> 00:00:03,000\n\
                    hello\n\
                    \n\
                    2\n\
                    00:00:05,000 --> 00:00:08,000\n\
                    world\n\
                    \n";
    assert_eq!(srt, expected);
}

#[test]
fn srt_includes_translated_line_when_present() {
    let entries = vec![entry("hello", Some("hola"), 1000)];
    let srt = render(ExportFormat::Srt, &entries);

    assert!(srt.contains("00:00:01,000 --> 00:00:04,000"));
    assert!(srt.contains("hello\nhola\n"));
}

#[test]
fn vtt_has_header_and_dot_separated_millis() {
    let entries = vec![entry("hello", None, 61_250)];
    let vtt = render(ExportFormat::Vtt, &entries);

    assert!(vtt.starts_with("WEBVTT\n\n"));
    assert!(vtt.contains("00:01:01.250 --> 00:01:04.250"));
}

#[test]
fn timestamps_roll_over_hours() {
    let entries = vec![entry("late", None, 3_600_000 + 123)];
    let srt = render(ExportFormat::Srt, &entries);

    assert!(srt.contains("01:00:00,123 --> 01:00:03,123"));
}

#[test]
fn txt_lines_carry_clock_and_speaker() {
    let mut with_speaker = entry("hello", Some("hola"), 5000);
    with_speaker.speaker_label = Some("Speaker 1".to_string());

    let txt = render(ExportFormat::Txt, &[with_speaker]);
    assert!(txt.contains("[00:00:05] Speaker 1: hello"));
    assert!(txt.contains("hola"));
}

#[test]
fn format_parses_case_insensitively_and_rejects_unknown() {
    assert_eq!(ExportFormat::from_str("SRT").unwrap(), ExportFormat::Srt);
    assert_eq!(ExportFormat::from_str("vtt").unwrap(), ExportFormat::Vtt);
    assert_eq!(ExportFormat::from_str("txt").unwrap(), ExportFormat::Txt);
    assert!(ExportFormat::from_str("pdf").is_err());
}

#[test]
fn empty_session_renders_empty_documents() {
    assert_eq!(render(ExportFormat::Srt, &[]), "");
    assert_eq!(render(ExportFormat::Vtt, &[]), "WEBVTT\n\n");
    assert_eq!(render(ExportFormat::Txt, &[]), "");
}
