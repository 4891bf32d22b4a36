//! List the ONTs behind one OLT and show live status for one of them.
//!
//! # Prerequisites
//!
//! - Management access to a Huawei (SSH) or ZTE (Telnet) OLT
//! - An account allowed to run the display/show commands
//!
//! # Usage
//!
//! ```bash
//! cargo run --example ont_inventory -- --vendor huawei --host 10.0.0.10 \
//!     --user admin --password secret --frame 0 --slot 1
//!
//! cargo run --example ont_inventory -- --vendor zte --host 10.0.0.20 \
//!     --user admin --password secret --index 1/2/1 --ont 3
//! ```

use std::env;

use ponlink::{create_adapter, AdapterOptions, Addressing, Credentials, OltAdapter, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to {} ({})...", args.host, args.vendor);
    let mut options = AdapterOptions::new();
    if let Some(port) = args.port {
        options = options.with_port(port);
    }
    if let Some(addressing) = args.addressing.clone() {
        options = options.with_addressing(addressing);
    }

    let mut adapter = create_adapter(
        &args.vendor,
        &args.host,
        Credentials::new(&args.user, args.password.clone()),
        options,
    )?;

    if !adapter.connect().await {
        eprintln!("Error: could not establish a session with {}", args.host);
        std::process::exit(1);
    }
    println!("Connected!");

    println!("\nSystem info:");
    println!("{}", "-".repeat(50));
    for (key, value) in adapter.get_system_info().await? {
        println!("{key}: {value}");
    }

    println!("\nONT inventory:");
    println!("{}", "-".repeat(50));
    let onts = adapter.get_onts(args.addressing.as_ref()).await?;
    if onts.is_empty() {
        println!("(no ONTs in scope)");
    }
    for ont in &onts {
        println!(
            "id {:>4}  sn {:16}  run {:10}  {}",
            ont.id,
            ont.serial_number,
            ont.run_state.as_deref().unwrap_or("-"),
            ont.description.as_deref().unwrap_or("")
        );
    }

    if let Some(ont_id) = &args.ont {
        println!("\nStatus of ONT {ont_id}:");
        println!("{}", "-".repeat(50));
        let status = adapter
            .get_ont_status(ont_id, args.addressing.as_ref())
            .await?;
        println!(
            "online: {}  run state: {}",
            status.online, status.run_state
        );
        if let Some(rx) = status.rx_power_dbm {
            println!("rx power: {rx} dBm");
        }
        if let Some(tx) = status.tx_power_dbm {
            println!("tx power: {tx} dBm");
        }
        if let Some(distance) = status.distance_m {
            println!("distance: {distance} m");
        }
        if let Some(cause) = &status.last_down_cause {
            println!("last down cause: {cause}");
        }
    }

    adapter.disconnect().await;
    println!("\nDone!");
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    vendor: String,
    host: String,
    port: Option<u16>,
    user: String,
    password: String,
    addressing: Option<Addressing>,
    ont: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut vendor = "huawei".to_string();
        let mut host = None;
        let mut port = None;
        let mut user = "admin".to_string();
        let mut password = None;
        let mut frame = None;
        let mut slot = None;
        let mut index = None;
        let mut ont = None;

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
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().ok();
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
                "--frame" => {
                    i += 1;
                    if i < args.len() {
                        frame = Some(args[i].clone());
                    }
                }
                "--slot" => {
                    i += 1;
                    if i < args.len() {
                        slot = Some(args[i].clone());
                    }
                }
                "--index" => {
                    i += 1;
                    if i < args.len() {
                        index = Some(args[i].clone());
                    }
                }
                "--ont" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        ont = Some(args[i].clone());
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

        let (Some(host), Some(password)) = (host, password) else {
            eprintln!("Error: --host and --password are required (see --help)");
            std::process::exit(1);
        };

        let addressing = match (frame, slot, index) {
            (Some(frame), Some(slot), _) => Some(Addressing::frame_slot(frame, slot)),
            (_, _, Some(index)) => Some(Addressing::gpon_index(index)),
            _ => None,
        };

        Self {
            vendor,
            host,
            port,
            user,
            password,
            addressing,
            ont,
        }
    }

    fn print_help() {
        println!(
            r#"ponlink ont_inventory example

USAGE:
    cargo run --example ont_inventory -- [OPTIONS]

OPTIONS:
    -v, --vendor <VENDOR>    huawei or zte [default: huawei]
    -h, --host <HOST>        OLT management address (required)
    -p, --port <PORT>        Management port [default: 22 for huawei, 23 for zte]
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password (required)
    --frame <FRAME>          Huawei frame number
    --slot <SLOT>            Huawei slot number
    --index <INDEX>          ZTE gpon index, e.g. 1/2/1
    -o, --ont <ID>           Also show live status for this ONT id
    --help                   Print this help message
"#
        );
    }
}
