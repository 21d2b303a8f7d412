//! Subtitle and transcript export
//!
//! Renders a session's caption entries as SRT, WebVTT or plain text. No end
//! time is recorded for entries, so each caption is given a fixed display
//! window of three seconds from its start offset.

use crate::store::CaptionEntry;
use std::fmt::Write as _;
use std::str::FromStr;

/// Synthesized display duration per caption, in milliseconds
const CAPTION_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Srt,
    Vtt,
    Txt,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Srt => "application/x-subrip",
            ExportFormat::Vtt => "text/vtt",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Srt => "srt",
            ExportFormat::Vtt => "vtt",
            ExportFormat::Txt => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Ok(ExportFormat::Srt),
            "vtt" => Ok(ExportFormat::Vtt),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

/// Render entries (already sorted by timestamp) in the requested format
pub fn render(format: ExportFormat, entries: &[CaptionEntry]) -> String {
    match format {
        ExportFormat::Srt => render_srt(entries),
        ExportFormat::Vtt => render_vtt(entries),
        ExportFormat::Txt => render_txt(entries),
    }
}

/// `HH:MM:SS,mmm` (SRT) or `HH:MM:SS.mmm` (VTT)
fn format_timestamp(ms: u64, millis_separator: char) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, millis_separator, millis
    )
}

fn caption_lines(entry: &CaptionEntry) -> String {
    match entry.translated_text.as_deref().filter(|t| !t.is_empty()) {
        Some(translated) => format!("{}\n{}", entry.original_text, translated),
        None => entry.original_text.clone(),
    }
}

fn render_srt(entries: &[CaptionEntry]) -> String {
    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let start = entry.timestamp;
        let end = start + CAPTION_DURATION_MS;
        let _ = writeln!(out, "{}", index + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp(start, ','),
            format_timestamp(end, ',')
        );
        let _ = writeln!(out, "{}", caption_lines(entry));
        let _ = writeln!(out);
    }
    out
}

fn render_vtt(entries: &[CaptionEntry]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for (index, entry) in entries.iter().enumerate() {
        let start = entry.timestamp;
        let end = start + CAPTION_DURATION_MS;
        let _ = writeln!(out, "{}", index + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp(start, '.'),
            format_timestamp(end, '.')
        );
        let _ = writeln!(out, "{}", caption_lines(entry));
        let _ = writeln!(out);
    }
    out
}

fn render_txt(entries: &[CaptionEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let clock = format_timestamp(entry.timestamp, '.')
            .chars()
            .take(8)
            .collect::<String>();
        match &entry.speaker_label {
            Some(speaker) => {
                let _ = writeln!(out, "[{}] {}: {}", clock, speaker, entry.original_text);
            }
            None => {
                let _ = writeln!(out, "[{}] {}", clock, entry.original_text);
            }
        }
        if let Some(translated) = entry.translated_text.as_deref().filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "           {}", translated);
        }
    }
    out
}
