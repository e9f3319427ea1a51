//! CLI tool for procnet

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use procnet::{Config, ConnectionRecord, Endpoint, ProcNet, SocketSummary};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "procnet")]
#[command(about = "Show sockets from the kernel's /proc/net tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the tables (overrides the config file)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Config file (default: ~/.config/procnet/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: Format,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Active TCP connections (listeners excluded)
    Tcp,
    /// Listening TCP sockets
    Listeners,
    /// UDP sockets
    Udp,
    /// Sockets in use for one protocol (TCP, UDP, TCP6, UDP6, RAW, ...)
    Count {
        protocol: String,
    },
    /// All summary counters
    Summary,
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(root) = &cli.root {
        config.tables.proc_net_root = root.clone();
    }
    let net = ProcNet::from_config(&config);
    let json = cli.format == Format::Json;

    match &cli.command {
        Commands::Tcp => {
            let connections = net.tcp_connections()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&connections)?);
            } else {
                print_connections(&connections);
            }
        }
        Commands::Listeners => {
            let listeners = net.tcp_listeners()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listeners)?);
            } else {
                print_endpoints("tcp", "LISTEN", &listeners);
            }
        }
        Commands::Udp => {
            let sockets = net.udp_listeners()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sockets)?);
            } else {
                print_endpoints("udp", "", &sockets);
            }
        }
        Commands::Count { protocol } => {
            let protocol = protocol.to_uppercase();
            let table = if protocol.ends_with('6') {
                procnet::procfs::SOCKSTAT6
            } else {
                procnet::procfs::SOCKSTAT
            };
            let count = net.socket_count(table, &protocol)?;
            if json {
                println!("{}", serde_json::json!({ "protocol": protocol, "inuse": count }));
            } else {
                println!("{}: {}", protocol, count);
            }
        }
        Commands::Summary => {
            let summary = net.socket_summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_connections(connections: &[ConnectionRecord]) {
    println!("{:<6} {:<45} {:<45} {}", "Proto", "Local Address", "Foreign Address", "State");
    for conn in connections {
        let proto = if conn.local.address.is_ipv6() { "tcp6" } else { "tcp" };
        println!(
            "{:<6} {:<45} {:<45} {}",
            proto,
            conn.local.to_string(),
            conn.remote.to_string(),
            conn.state
        );
    }
}

#[cfg(feature = "cli")]
fn print_endpoints(proto: &str, state: &str, endpoints: &[Endpoint]) {
    println!("{:<6} {:<45} {}", "Proto", "Local Address", "State");
    for endpoint in endpoints {
        let suffix = if endpoint.address.is_ipv6() { "6" } else { "" };
        println!(
            "{:<6} {:<45} {}",
            format!("{}{}", proto, suffix),
            endpoint.to_string(),
            state
        );
    }
}

#[cfg(feature = "cli")]
fn print_summary(summary: &SocketSummary) {
    if let Some(used) = summary.sockets_used() {
        println!("sockets used: {}", used);
    }
    for protocol in summary.protocols().filter(|p| *p != "sockets") {
        match summary.in_use(protocol) {
            Some(count) => println!("{:<8} inuse {}", protocol, count),
            None => println!("{:<8} -", protocol),
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}
