//! Parsers for ZTE ZXA10 CLI output.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapter::types::{OntInfo, OntStatus};
use crate::device::Addressing;
use crate::parse;

/// ONT id marker in `onu add` responses; capture 1 is the assigned id.
pub(super) static ONT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ONT\s+ID\s*:\s*(\d+)").expect("ont id pattern"));

/// `gpon-onu_<index>:<id>  admin  omcc  phase  serial` state rows.
static ONU_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*gpon-onu_(\d+/\d+/\d+):(\d+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)")
        .expect("onu row pattern")
});

pub(super) const SETUP_COMMANDS: &[&str] = &["terminal length 0"];

pub(super) const FAILED_WHEN: &[&str] = &[
    "%error",
    "error:",
    "failure",
    "invalid input",
    "unknown command",
];

pub(super) const NOT_FOUND_WHEN: &[&str] = &["no related information", "does not exist"];

pub(super) const SUCCESS_TOKENS: &[&str] = &["success"];

/// Parse `show gpon onu state` tabular output.
pub(super) fn parse_ont_list(output: &str) -> Vec<OntInfo> {
    ONU_ROW
        .captures_iter(output)
        .map(|row| {
            let mut ont = OntInfo::new(&row[2], &row[6]);
            ont.addressing = Some(Addressing::gpon_index(&row[1]));
            ont.extra.insert("admin state".to_string(), row[3].to_string());
            ont.extra.insert("omcc state".to_string(), row[4].to_string());
            ont.run_state = Some(row[5].to_string());
            ont
        })
        .collect()
}

/// Build an [`OntInfo`] from merged detail-info fields.
pub(super) fn ont_from_fields(ont_id: &str, mut fields: IndexMap<String, String>) -> OntInfo {
    let serial = parse::take_field(&mut fields, &["serial"]).unwrap_or_default();
    let mut ont = OntInfo::new(ont_id, serial);
    ont.description = parse::take_field(&mut fields, &["name", "description"]);
    ont.run_state = parse::take_field(&mut fields, &["phase state"]);
    ont.config_state = parse::take_field(&mut fields, &["configuration state", "config state"]);
    ont.software_version = parse::take_field(&mut fields, &["software version"]);
    ont.equipment_id = parse::take_field(&mut fields, &["equipment"]);
    ont.extra = fields;
    ont
}

/// Parse optical power output into a status record. ZXA10 reports the
/// working phase rather than a literal "online".
pub(super) fn parse_status(ont_id: &str, output: &str) -> OntStatus {
    let mut fields = parse::parse_kv_block(output);

    let rx = parse::take_field(&mut fields, &["rx optical power", "rx power"]);
    let tx = parse::take_field(&mut fields, &["tx optical power", "tx power"]);
    let distance = parse::take_field(&mut fields, &["distance"]);
    let run_state = parse::take_field(&mut fields, &["phase state", "run state"])
        .unwrap_or_else(|| "unknown".to_string());
    let last_down_cause = parse::take_field(&mut fields, &["last down cause"]);
    let last_down_time = parse::take_field(&mut fields, &["last down time"]);

    OntStatus {
        ont_id: ont_id.to_string(),
        online: run_state.eq_ignore_ascii_case("working")
            || run_state.eq_ignore_ascii_case("online"),
        run_state,
        rx_power_dbm: rx.as_deref().and_then(parse::parse_f64),
        tx_power_dbm: tx.as_deref().and_then(parse::parse_f64),
        distance_m: distance.as_deref().and_then(parse::parse_u32),
        last_down_cause,
        last_down_time,
        extra: fields,
    }
}
