//! Provision a new ONT by serial number and bring its subscriber online:
//! register it, set the service VLAN, switch the WAN to DHCP, and unlock
//! the first ethernet port.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example provision_ont -- --vendor huawei --host 10.0.0.10 \
//!     --user admin --password secret --serial 48575443AB12CD34 \
//!     --vlan 100 --desc "fiber-cust-0042"
//! ```

use std::env;

use ponlink::adapter::{OntIpConfig, VlanMode};
use ponlink::{create_adapter, AdapterOptions, Credentials, OltAdapter, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to {} ({})...", args.host, args.vendor);
    let mut adapter = create_adapter(
        &args.vendor,
        &args.host,
        Credentials::new(&args.user, args.password.clone()),
        AdapterOptions::new(),
    )?;

    if !adapter.connect().await {
        eprintln!("Error: could not establish a session with {}", args.host);
        std::process::exit(1);
    }

    println!("Provisioning serial {}...", args.serial);
    let ont = adapter
        .provision_ont(&args.serial, None, args.desc.as_deref(), None)
        .await?;
    println!("Device assigned ONT id {}", ont.id);

    println!("Setting eth1 to access VLAN {}...", args.vlan);
    let vlan_ok = adapter
        .configure_ont_vlan(&ont.id, "eth1", VlanMode::Access, Some(args.vlan), None)
        .await?;
    println!("  -> {}", if vlan_ok { "ok" } else { "rejected" });

    println!("Switching WAN to DHCP...");
    let ip_ok = adapter
        .set_ont_ip_configuration(&ont.id, &OntIpConfig::new().with_dhcp(true), None)
        .await?;
    println!("  -> {}", if ip_ok { "ok" } else { "rejected" });

    println!("Unlocking eth1...");
    let port_ok = adapter.enable_ont_port(&ont.id, "eth1", true, None).await?;
    println!("  -> {}", if port_ok { "ok" } else { "rejected" });

    adapter.disconnect().await;

    if vlan_ok && ip_ok && port_ok {
        println!("\nONT {} is provisioned and online-ready.", ont.id);
    } else {
        println!("\nONT {} provisioned, but some steps were rejected.", ont.id);
    }
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    vendor: String,
    host: String,
    user: String,
    password: String,
    serial: String,
    vlan: u16,
    desc: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut vendor = "huawei".to_string();
        let mut host = None;
        let mut user = "admin".to_string();
        let mut password = None;
        let mut serial = None;
        let mut vlan = 100u16;
        let mut desc = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--vendor" | "-v" => {
                    i += 1;
                    if i < args.len() {
                        vendor = args[i].clone();
                    }
                }
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = Some(args[i].clone());
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--serial" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        serial = Some(args[i].clone());
                    }
                }
                "--vlan" => {
                    i += 1;
                    if i < args.len() {
                        vlan = args[i].parse().unwrap_or(100);
                    }
                }
                "--desc" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        desc = Some(args[i].clone());
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        let (Some(host), Some(password), Some(serial)) = (host, password, serial) else {
            eprintln!("Error: --host, --password, and --serial are required (see --help)");
            std::process::exit(1);
        };

        Self {
            vendor,
            host,
            user,
            password,
            serial,
            vlan,
            desc,
        }
    }

    fn print_help() {
        println!(
            r#"ponlink provision_ont example

USAGE:
    cargo run --example provision_ont -- [OPTIONS]

OPTIONS:
    -v, --vendor <VENDOR>    huawei or zte [default: huawei]
    -h, --host <HOST>        OLT management address (required)
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password (required)
    -s, --serial <SN>        ONT serial number to register (required)
    --vlan <ID>              Access VLAN for eth1 [default: 100]
    -d, --desc <TEXT>        Description stored on the device
    --help                   Print this help message
"#
        );
    }
}
