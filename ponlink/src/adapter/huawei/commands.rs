//! Built-in command templates for Huawei SmartAX OLTs.
//!
//! Registered under the MA5800 model; unknown Huawei models fall back to
//! this table. Placeholders are filled per call; `{desc_param}`,
//! `{vlan_param}` and `{methods_param}` are derived clauses that may
//! render empty.

use crate::device::Vendor;
use crate::template::{CommandTable, CommandTemplateRegistry};

const MA5800: &[(&str, &str)] = &[
    ("show_version", "display version"),
    ("show_system_info", "display sysman system-information"),
    ("show_all_onts", "display ont info {frame} {slot} all"),
    ("show_ont_info", "display ont info {frame} {slot} {ont_id}"),
    ("show_ont_status", "display ont optical-info {frame} {slot} {ont_id}"),
    ("show_ont_version", "display ont version {frame} {slot} {ont_id}"),
    (
        "add_ont",
        "ont add {frame} {slot} sn-auth {serial} omci ont-lineprofile-id 1 ont-srvprofile-id 1 {desc_param}",
    ),
    ("delete_ont", "ont delete {frame} {slot} {ont_id}"),
    (
        "configure_vlan",
        "ont port vlan {frame} {slot} {ont_id} {interface_id} {mode} {vlan_param}",
    ),
    ("set_wan_dhcp", "ont ipconfig {frame} {slot} {ont_id} dhcp {state}"),
    (
        "set_wan_static",
        "ont ipconfig {frame} {slot} {ont_id} static ip-address {ip} mask {mask} gateway {gateway}",
    ),
    ("set_wan_pppoe", "ont ipconfig {frame} {slot} {ont_id} pppoe {state}"),
    (
        "enable_port",
        "ont port attribute {frame} {slot} {ont_id} eth {interface_id} operational-state on",
    ),
    (
        "disable_port",
        "ont port attribute {frame} {slot} {ont_id} eth {interface_id} operational-state off",
    ),
    ("reboot_ont", "ont reboot {frame} {slot} {ont_id}"),
    ("restore_factory", "ont factory-setting-restore {frame} {slot} {ont_id}"),
    (
        "show_traffic",
        "display ont traffic {frame} {slot} {ont_id} past-hours {hours}",
    ),
    (
        "show_signal_history",
        "display ont optical-history {frame} {slot} {ont_id} past-hours {hours}",
    ),
    (
        "show_alerts",
        "display ont alarm-history {frame} {slot} {ont_id} past-hours {hours}",
    ),
    (
        "configure_alerts",
        "ont alarm-profile {frame} {slot} {ont_id} {alert_type} threshold {threshold} {methods_param}",
    ),
    ("show_location", "display ont location {frame} {slot} {ont_id}"),
    (
        "update_location",
        "ont location {frame} {slot} {ont_id} latitude {latitude} longitude {longitude} {desc_param}",
    ),
    (
        "set_speed_download",
        "ont traffic-limit {frame} {slot} {ont_id} downstream {kbps}",
    ),
    (
        "set_speed_upload",
        "ont traffic-limit {frame} {slot} {ont_id} upstream {kbps}",
    ),
    ("set_lan_dhcp", "ont dhcp-server {frame} {slot} {ont_id} {state}"),
    ("set_service_internet", "ont service {frame} {slot} {ont_id} internet {state}"),
    ("set_service_iptv", "ont service {frame} {slot} {ont_id} iptv {state}"),
    ("set_service_voice", "ont service {frame} {slot} {ont_id} voice {state}"),
    ("set_routing_mode", "ont wan-mode {frame} {slot} {ont_id} {mode}"),
    (
        "tr069_acs_url",
        "ont tr069-server-config {frame} {slot} {ont_id} acs-url {url}",
    ),
    (
        "tr069_interval",
        "ont tr069-server-config {frame} {slot} {ont_id} inform-interval {interval}",
    ),
    (
        "tr069_username",
        "ont tr069-server-config {frame} {slot} {ont_id} username {username}",
    ),
    (
        "tr069_password",
        "ont tr069-server-config {frame} {slot} {ont_id} password {password}",
    ),
    ("tr069_enable", "ont tr069-server-config {frame} {slot} {ont_id} enable"),
];

pub(crate) fn register(registry: &mut CommandTemplateRegistry) {
    let table: CommandTable = MA5800
        .iter()
        .map(|(name, template)| (name.to_string(), template.to_string()))
        .collect();
    registry.register_model(Vendor::Huawei, Vendor::Huawei.default_model(), table);
}

#[cfg(test)]
mod tests {
    use crate::template::CommandParams;

    use super::*;

    #[test]
    fn test_table_renders_with_frame_slot_params() {
        let mut registry = CommandTemplateRegistry::new();
        register(&mut registry);

        let params = CommandParams::new()
            .set("frame", "0")
            .set("slot", "1")
            .set("ont_id", "5");
        let rendered = registry
            .get_command(Vendor::Huawei, "MA5800", "show_ont_info", &params)
            .unwrap();
        assert_eq!(rendered, "display ont info 0 1 5");
    }

    #[test]
    fn test_add_ont_with_and_without_description() {
        let mut registry = CommandTemplateRegistry::new();
        register(&mut registry);

        let base = CommandParams::new()
            .set("frame", "0")
            .set("slot", "1")
            .set("serial", "485754431234A5B6");

        let with = base.clone().with_description(Some("Flat 4"));
        let rendered = registry
            .get_command(Vendor::Huawei, "MA5800", "add_ont", &with)
            .unwrap();
        assert!(rendered.ends_with("description \"Flat 4\""));

        let without = base.with_description(None);
        let rendered = registry
            .get_command(Vendor::Huawei, "MA5800", "add_ont", &without)
            .unwrap();
        assert!(rendered.ends_with("ont-srvprofile-id 1"));
    }
}
