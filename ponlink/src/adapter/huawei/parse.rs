//! Parsers for Huawei SmartAX CLI output.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapter::types::{OntInfo, OntStatus};
use crate::device::Addressing;
use crate::parse;

/// ONT id marker in `ont add` responses; capture 1 is the assigned id.
pub(super) static ONT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ONTID\s*:\s*(\d+)").expect("ont id pattern"));

/// `F/S/P  ONT-ID  SN  control  run  config` rows; tolerates the spaces
/// SmartAX pads into `0/ 1/0` style port columns.
static ONT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(\d+)/\s*(\d+)/\s*\d+\s+(\d+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)")
        .expect("ont row pattern")
});

pub(super) const SETUP_COMMANDS: &[&str] = &["enable", "config", "scroll"];

pub(super) const FAILED_WHEN: &[&str] = &[
    "failure",
    "error:",
    "unknown command",
    "parameter error",
    "invalid input",
];

pub(super) const NOT_FOUND_WHEN: &[&str] = &["does not exist"];

pub(super) const SUCCESS_TOKENS: &[&str] = &["success"];

/// Parse `display ont info <f> <s> all` tabular output.
pub(super) fn parse_ont_list(output: &str) -> Vec<OntInfo> {
    ONT_ROW
        .captures_iter(output)
        .map(|row| {
            let mut ont = OntInfo::new(&row[3], &row[4]);
            ont.addressing = Some(Addressing::frame_slot(&row[1], &row[2]));
            ont.extra.insert("control flag".to_string(), row[5].to_string());
            ont.run_state = Some(row[6].to_string());
            ont.config_state = Some(row[7].to_string());
            ont
        })
        .collect()
}

/// Build an [`OntInfo`] from merged info/status/version fields.
pub(super) fn ont_from_fields(ont_id: &str, mut fields: IndexMap<String, String>) -> OntInfo {
    let serial = parse::take_field(&mut fields, &["serial", "sn"]).unwrap_or_default();
    let mut ont = OntInfo::new(ont_id, serial);
    ont.description = parse::take_field(&mut fields, &["description", "desc"]);
    ont.run_state = parse::take_field(&mut fields, &["run state"]);
    ont.config_state = parse::take_field(&mut fields, &["config state"]);
    ont.software_version =
        parse::take_field(&mut fields, &["software version", "ont version", "main version"]);
    ont.equipment_id = parse::take_field(&mut fields, &["equipment-id", "equipment id"]);
    ont.extra = fields;
    ont
}

/// Parse `display ont optical-info` output into a status record.
pub(super) fn parse_status(ont_id: &str, output: &str) -> OntStatus {
    let mut fields = parse::parse_kv_block(output);

    let rx = parse::take_field(&mut fields, &["rx optical power"]);
    let tx = parse::take_field(&mut fields, &["tx optical power"]);
    let distance = parse::take_field(&mut fields, &["distance"]);
    let run_state =
        parse::take_field(&mut fields, &["run state"]).unwrap_or_else(|| "unknown".to_string());
    let last_down_cause = parse::take_field(&mut fields, &["last down cause"]);
    let last_down_time = parse::take_field(&mut fields, &["last down time"]);

    OntStatus {
        ont_id: ont_id.to_string(),
        online: run_state.eq_ignore_ascii_case("online"),
        run_state,
        rx_power_dbm: rx.as_deref().and_then(parse::parse_f64),
        tx_power_dbm: tx.as_deref().and_then(parse::parse_f64),
        distance_m: distance.as_deref().and_then(parse::parse_u32),
        last_down_cause,
        last_down_time,
        extra: fields,
    }
}
