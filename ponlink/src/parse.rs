//! Shared deterministic parsing helpers for CLI transcripts.
//!
//! Vendor-specific table and block layouts live with their adapters; this
//! module holds the primitives they share: label/value extraction, numeric
//! coercion, history-window rendering, and the strict provisioning response
//! grammar.

use std::time::Duration;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapter::types::{OntAlert, OntLocation, SignalSample};
use crate::error::ProvisioningError;

static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("float pattern"));
static UNSIGNED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("unsigned pattern"));

// Device-local timestamp, `YYYY-MM-DD HH:MM[:SS]`.
static SIGNAL_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(\d{4}-\d{2}-\d{2} \d{2}:\d{2}(?::\d{2})?)\s+(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)(?:\s+(-?\d+(?:\.\d+)?))?\s*$",
    )
    .expect("signal row pattern")
});
static ALERT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(\d{4}-\d{2}-\d{2} \d{2}:\d{2}(?::\d{2})?)\s+(\S+)\s+(\S+)\s+(.+?)\s*$")
        .expect("alert row pattern")
});

/// Extract `Label : value` pairs from a block of CLI output, in line order.
///
/// Lines without a colon, separator lines, and lines with an empty label
/// are skipped. Values keep any colons of their own (timestamps survive).
pub fn parse_kv_block(output: &str) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || is_separator_line(line) {
            continue;
        }
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        fields.insert(label.to_string(), value.trim().to_string());
    }
    fields
}

/// True for ruling lines (`----`, `====`, `+---+`) that frame CLI tables.
pub fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| matches!(c, '-' | '=' | '+' | ' '))
}

/// First numeric value in `text`, tolerating attached units (`-19.42(dBm)`).
pub fn parse_f64(text: &str) -> Option<f64> {
    FLOAT.find(text)?.as_str().parse().ok()
}

/// First unsigned integer in `text` (`1286 m` parses as 1286).
pub fn parse_u32(text: &str) -> Option<u32> {
    UNSIGNED.find(text)?.as_str().parse().ok()
}

/// Remove and return the first field whose label contains any needle.
///
/// Matching is case-insensitive on the label; needles are expected
/// lowercase. Used to lift known fields out of a parsed block, leaving
/// the remainder for an `extra` map.
pub(crate) fn take_field(
    fields: &mut IndexMap<String, String>,
    needles: &[&str],
) -> Option<String> {
    let key = fields
        .keys()
        .find(|key| {
            let lowered = key.to_ascii_lowercase();
            needles.iter().any(|needle| lowered.contains(needle))
        })?
        .clone();
    fields.shift_remove(&key).filter(|value| !value.is_empty())
}

/// Parse `timestamp  rx  tx  [temperature]` history rows.
///
/// Both vendors print optical history this way; header and ruling lines
/// fall through the row pattern.
pub fn parse_signal_rows(output: &str) -> Vec<SignalSample> {
    SIGNAL_ROW
        .captures_iter(output)
        .map(|row| SignalSample {
            timestamp: row[1].to_string(),
            rx_power_dbm: row[2].parse().ok(),
            tx_power_dbm: row[3].parse().ok(),
            temperature_c: row.get(4).and_then(|m| m.as_str().parse().ok()),
        })
        .collect()
}

/// Parse `timestamp  severity  category  message...` alert rows.
pub fn parse_alert_rows(output: &str) -> Vec<OntAlert> {
    ALERT_ROW
        .captures_iter(output)
        .map(|row| OntAlert {
            timestamp: row[1].to_string(),
            severity: Some(row[2].to_string()),
            category: row[3].to_string(),
            message: row[4].to_string(),
        })
        .collect()
}

/// Render a history window as the whole-hour count vendor commands take.
///
/// Sub-hour windows round up to 1; no window means the 24h default.
pub fn window_hours(window: Option<Duration>) -> u64 {
    match window {
        Some(window) => window.as_secs().div_ceil(3600).max(1),
        None => 24,
    }
}

/// Line-oriented scan for `Latitude`/`Longitude`/`Description` labels.
///
/// Both vendors print location records the same way, so this lives here
/// rather than with either adapter.
pub fn parse_location(output: &str) -> OntLocation {
    let mut location = OntLocation::default();
    for (label, value) in parse_kv_block(output) {
        let label = label.to_ascii_lowercase();
        if label.contains("latitude") {
            location.latitude = parse_f64(&value);
        } else if label.contains("longitude") {
            location.longitude = parse_f64(&value);
        } else if label.contains("description") && !value.is_empty() {
            location.description = Some(value);
        }
    }
    location
}

/// Decide a provisioning command's outcome from its response text.
///
/// The grammar is strict: the vendor's ID marker yields the new ONT id; a
/// success token without the marker is [`ProvisioningError::MissingOntId`],
/// not an inferred success; anything else is rejected with the response
/// attached. Success is never guessed from the absence of an error string.
pub fn parse_provisioning_response(
    response: &str,
    id_pattern: &Regex,
    success_tokens: &[&str],
) -> Result<String, ProvisioningError> {
    if let Some(captures) = id_pattern.captures(response) {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_string());
        }
    }

    let trimmed = response.trim().to_string();
    let lowered = trimmed.to_ascii_lowercase();
    if success_tokens
        .iter()
        .any(|token| lowered.contains(&token.to_ascii_lowercase()))
    {
        return Err(ProvisioningError::MissingOntId { response: trimmed });
    }
    Err(ProvisioningError::Rejected { response: trimmed })
}
