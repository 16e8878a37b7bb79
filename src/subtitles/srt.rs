use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

use crate::errors::SubtitleError;
use crate::subtitles::model::Line;

// @module: SRT parsing and rendering

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})")
        .unwrap()
});

/// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
    let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
    }

    let mut values = [0u64; 4];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .trim()
            .parse()
            .map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;
    }

    let [hours, minutes, seconds, millis] = values;
    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse SRT content into subtitle lines.
///
/// Blocks that do not have the entry shape are skipped. A timing line that
/// matches the timestamp pattern but carries out-of-range components is an
/// error.
pub fn parse(content: &str) -> Result<Vec<Line>, SubtitleError> {
    let mut lines = Vec::new();
    let mut fallback_number = 0usize;

    for block in content.replace("\r\n", "\n").split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let mut rows = block.lines();

        let number_row = match rows.next() {
            Some(row) => row.trim(),
            None => continue,
        };

        let timing_row = match rows.next() {
            Some(row) => row,
            None => continue,
        };

        let captures = match TIMESTAMP_REGEX.captures(timing_row) {
            Some(captures) => captures,
            None => continue,
        };

        let start_ms = parse_timestamp(&format!(
            "{}:{}:{},{}",
            &captures[1], &captures[2], &captures[3], &captures[4]
        ))?;
        let end_ms = parse_timestamp(&format!(
            "{}:{}:{},{}",
            &captures[5], &captures[6], &captures[7], &captures[8]
        ))?;

        fallback_number += 1;
        let number = number_row.parse().unwrap_or(fallback_number);

        let text = rows.collect::<Vec<_>>().join("\n");
        match Line::new_validated(number, start_ms, end_ms, text) {
            Ok(line) => lines.push(line),
            // Skip entries with empty text or inverted timing
            Err(_) => continue,
        }
    }

    Ok(lines)
}

/// Render translated lines as SRT.
///
/// Untranslated lines fall back to their source text so a partially
/// translated document still renders a complete file. When
/// `include_original` is set, the source text is appended in italics below
/// the translation.
pub fn render<'a>(lines: impl Iterator<Item = &'a Line>, include_original: bool) -> String {
    let mut output = String::new();
    let mut sequence = 0usize;

    for line in lines {
        sequence += 1;
        let _ = writeln!(output, "{}", sequence);
        let _ = writeln!(
            output,
            "{} --> {}",
            format_timestamp(line.start_ms),
            format_timestamp(line.end_ms)
        );

        match &line.translation {
            Some(translation) => {
                let _ = writeln!(output, "{}", translation);
                if include_original {
                    let _ = writeln!(output, "<i>{}</i>", line.text);
                }
            }
            None => {
                let _ = writeln!(output, "{}", line.text);
            }
        }

        let _ = writeln!(output);
    }

    output
}
