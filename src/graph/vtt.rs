//! WebVTT to plain-text conversion for Teams transcripts.

use once_cell::sync::Lazy;
use regex::Regex;

static CUE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static VOICE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<v ([^>]+)>").unwrap());

/// Strip headers, cue numbers and timings, leaving one `Speaker: text` line
/// per caption.
pub fn clean_vtt(vtt: &str) -> String {
    vtt.lines()
        .filter(|line| {
            !(line.starts_with("WEBVTT")
                || line.starts_with("NOTE")
                || line.contains("-->")
                || CUE_NUMBER.is_match(line.trim()))
        })
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let spoken = VOICE_OPEN.replace_all(line, "$1: ");
            spoken.replace("</v>", "").trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
