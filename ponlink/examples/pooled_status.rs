//! Query live status for several ONTs through a bounded connection pool.
//!
//! The pool reuses CLI sessions across requests and fails fast when all
//! slots are busy. Callers treat `PoolExhausted` as backpressure and retry
//! after a short delay, which this example demonstrates.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pooled_status -- --vendor huawei --host 10.0.0.10 \
//!     --user admin --password secret --onts 1,2,3,4,5
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ponlink::device::{DeviceRecord, MemoryCredentialStore, StaticDeviceDirectory};
use ponlink::pool::DevicePool;
use ponlink::{Credentials, Error, OltAdapter, PoolConfig, PoolRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let directory = StaticDeviceDirectory::new().with_device(DeviceRecord {
        id: "olt-lab".to_string(),
        vendor: args.vendor.parse()?,
        host: args.host.clone(),
        port: None,
        model: None,
        addressing: None,
    });
    let credentials = MemoryCredentialStore::new()
        .with_credentials("olt-lab", Credentials::new(&args.user, args.password.clone()));

    let registry = PoolRegistry::new(
        Arc::new(directory),
        Arc::new(credentials),
        PoolConfig::new()
            .with_max_connections(2)
            .with_idle_timeout(Duration::from_secs(120)),
    );

    let pool = registry.pool_for("olt-lab").await?;
    println!(
        "Querying {} ONT(s) on {} through a pool of 2...",
        args.onts.len(),
        args.host
    );

    let mut tasks = Vec::new();
    for ont_id in args.onts.clone() {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move {
            let status = status_with_retry(&pool, &ont_id).await;
            (ont_id, status)
        }));
    }

    for task in tasks {
        let (ont_id, status) = task.await?;
        match status {
            Ok(status) => println!(
                "ONT {:>4}: {} (rx {} dBm)",
                ont_id,
                if status.online { "online" } else { "offline" },
                status
                    .rx_power_dbm
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Err(e) => println!("ONT {ont_id:>4}: error: {e}"),
        }
    }

    println!(
        "\nPool after the burst: {} idle, {} active",
        pool.idle_count(),
        pool.active_count()
    );

    registry.shutdown().await;
    println!("Pools closed.");
    Ok(())
}

/// Fetch one ONT's status, backing off briefly while the pool is at
/// capacity.
async fn status_with_retry(
    pool: &DevicePool,
    ont_id: &str,
) -> Result<ponlink::adapter::OntStatus, Error> {
    loop {
        let ont_id = ont_id.to_string();
        let result = pool
            .with_adapter(|adapter| {
                Box::pin(async move { adapter.get_ont_status(&ont_id, None).await })
            })
            .await;
        match result {
            Err(Error::PoolExhausted { .. }) => {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            other => return other,
        }
    }
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    vendor: String,
    host: String,
    user: String,
    password: String,
    onts: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut vendor = "huawei".to_string();
        let mut host = None;
        let mut user = "admin".to_string();
        let mut password = None;
        let mut onts = vec!["1".to_string()];

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
                "--onts" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        onts = args[i].split(',').map(str::to_string).collect();
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

        Self {
            vendor,
            host,
            user,
            password,
            onts,
        }
    }

    fn print_help() {
        println!(
            r#"ponlink pooled_status example

USAGE:
    cargo run --example pooled_status -- [OPTIONS]

OPTIONS:
    -v, --vendor <VENDOR>    huawei or zte [default: huawei]
    -h, --host <HOST>        OLT management address (required)
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password (required)
    -o, --onts <IDS>         Comma-separated ONT ids [default: 1]
    --help                   Print this help message
"#
        );
    }
}
