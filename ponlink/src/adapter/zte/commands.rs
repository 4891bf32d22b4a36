//! Built-in command templates for ZTE ZXA10 OLTs.
//!
//! Registered under the C320 model; unknown ZTE models fall back to this
//! table. ZXA10 addresses ONUs by a `rack/shelf/port` gpon index, joined
//! with the ONU id as `gpon-onu_{index}:{ont_id}`.

use crate::device::Vendor;
use crate::template::{CommandTable, CommandTemplateRegistry};

const C320: &[(&str, &str)] = &[
    ("show_version", "show version"),
    ("show_system_info", "show system-group"),
    ("show_all_onts", "show gpon onu state gpon-olt_{index}"),
    ("show_ont_info", "show gpon onu detail-info gpon-onu_{index}:{ont_id}"),
    ("show_ont_status", "show pon power attenuation gpon-onu_{index}:{ont_id}"),
    ("show_ont_version", "show gpon remote-onu equip gpon-onu_{index}:{ont_id}"),
    ("add_ont", "onu add gpon-olt_{index} sn-auth {serial} {desc_param}"),
    ("delete_ont", "onu delete gpon-olt_{index} {ont_id}"),
    (
        "configure_vlan",
        "onu port vlan gpon-onu_{index}:{ont_id} {interface_id} {mode} {vlan_param}",
    ),
    ("set_wan_dhcp", "onu ipconfig gpon-onu_{index}:{ont_id} dhcp {state}"),
    (
        "set_wan_static",
        "onu ipconfig gpon-onu_{index}:{ont_id} static ip {ip} mask {mask} gateway {gateway}",
    ),
    ("set_wan_pppoe", "onu ipconfig gpon-onu_{index}:{ont_id} pppoe {state}"),
    (
        "enable_port",
        "onu port gpon-onu_{index}:{ont_id} {interface_id} state unlock",
    ),
    (
        "disable_port",
        "onu port gpon-onu_{index}:{ont_id} {interface_id} state lock",
    ),
    ("reboot_ont", "onu reboot gpon-onu_{index}:{ont_id}"),
    ("restore_factory", "onu restore factory gpon-onu_{index}:{ont_id}"),
    (
        "show_traffic",
        "show gpon onu traffic gpon-onu_{index}:{ont_id} past-hours {hours}",
    ),
    (
        "show_signal_history",
        "show pon power history gpon-onu_{index}:{ont_id} hours {hours}",
    ),
    (
        "show_alerts",
        "show alarm history gpon-onu_{index}:{ont_id} hours {hours}",
    ),
    (
        "configure_alerts",
        "onu alarm-profile gpon-onu_{index}:{ont_id} {alert_type} threshold {threshold} {methods_param}",
    ),
    ("show_location", "show onu location gpon-onu_{index}:{ont_id}"),
    (
        "update_location",
        "onu location gpon-onu_{index}:{ont_id} latitude {latitude} longitude {longitude} {desc_param}",
    ),
    (
        "set_speed_download",
        "onu rate-limit gpon-onu_{index}:{ont_id} downstream {kbps}",
    ),
    (
        "set_speed_upload",
        "onu rate-limit gpon-onu_{index}:{ont_id} upstream {kbps}",
    ),
    ("set_lan_dhcp", "onu dhcp-server gpon-onu_{index}:{ont_id} {state}"),
    ("set_service_internet", "onu service gpon-onu_{index}:{ont_id} internet {state}"),
    ("set_service_iptv", "onu service gpon-onu_{index}:{ont_id} iptv {state}"),
    ("set_service_voice", "onu service gpon-onu_{index}:{ont_id} voice {state}"),
    ("set_routing_mode", "onu wan-mode gpon-onu_{index}:{ont_id} {mode}"),
    ("tr069_acs_url", "onu tr069 gpon-onu_{index}:{ont_id} acs-url {url}"),
    ("tr069_interval", "onu tr069 gpon-onu_{index}:{ont_id} inform-interval {interval}"),
    ("tr069_username", "onu tr069 gpon-onu_{index}:{ont_id} username {username}"),
    ("tr069_password", "onu tr069 gpon-onu_{index}:{ont_id} password {password}"),
    ("tr069_enable", "onu tr069 gpon-onu_{index}:{ont_id} enable"),
];

pub(crate) fn register(registry: &mut CommandTemplateRegistry) {
    let table: CommandTable = C320
        .iter()
        .map(|(name, template)| (name.to_string(), template.to_string()))
        .collect();
    registry.register_model(Vendor::Zte, Vendor::Zte.default_model(), table);
}

#[cfg(test)]
mod tests {
    use crate::template::CommandParams;

    use super::*;

    #[test]
    fn test_table_renders_with_gpon_index_params() {
        let mut registry = CommandTemplateRegistry::new();
        register(&mut registry);

        let params = CommandParams::new().set("index", "1/1/1").set("ont_id", "2");
        let rendered = registry
            .get_command(Vendor::Zte, "C320", "show_ont_info", &params)
            .unwrap();
        assert_eq!(rendered, "show gpon onu detail-info gpon-onu_1/1/1:2");
    }

    #[test]
    fn test_port_state_uses_lock_grammar() {
        let mut registry = CommandTemplateRegistry::new();
        register(&mut registry);

        let params = CommandParams::new()
            .set("index", "1/1/1")
            .set("ont_id", "2")
            .set("interface_id", "eth_0/1");
        let rendered = registry
            .get_command(Vendor::Zte, "C320", "disable_port", &params)
            .unwrap();
        assert_eq!(rendered, "onu port gpon-onu_1/1/1:2 eth_0/1 state lock");
    }
}
