//! # procnet
//!
//! Typed views of the Linux kernel's socket tables. procnet turns the text of
//! `/proc/net/tcp`, `tcp6`, `udp`, `udp6` and `sockstat` into endpoints,
//! connection records and counters.
//!
//! ## Features
//!
//! - **Connection tables**: active TCP connections, TCP listeners and UDP
//!   sockets across IPv4 and IPv6, in table order
//! - **Hex endpoint decoding**: the kernel's host-order IPv4 values and
//!   word-reversed IPv6 addresses, with the byte order selectable
//! - **Pluggable state codes**: native TCP state numbers are mapped through a
//!   [`StateMap`], so other kernels' codes slot in without touching the parser
//! - **Summary counters**: `inuse` counts and full `sockstat` tables
//!
//! ## Quick Start
//!
//! ### Live system
//!
//! ```no_run
//! use procnet::ProcNet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let net = ProcNet::new();
//!
//! for listener in net.tcp_listeners()? {
//!     println!("LISTEN {}", listener);
//! }
//! for conn in net.tcp_connections()? {
//!     println!("{} -> {} {}", conn.local, conn.remote, conn.state);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Text you already have
//!
//! ```
//! use procnet::{parse_socket_count, TableParser};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let udp = "  sl  local_address rem_address   st\n 7: 3500007F:0035 00000000:0000 07\n";
//! let sockets = TableParser::new().parse_udp_listeners(Some(udp), None)?;
//! assert_eq!(sockets[0].to_string(), "127.0.0.53:53");
//!
//! assert_eq!(parse_socket_count("TCP: inuse 42\nUDP: inuse 7\n", "UDP")?, 7);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - the `procnet-cli` binary (netstat-style text or JSON output)

pub mod address; // Hex endpoint decoding
pub mod config; // Configuration with TOML persistence
pub mod error;
pub mod parser; // Field tokenizer
pub mod procfs; // Reading tables from /proc/net
pub mod sockstat; // Summary counters
pub mod state; // TCP states and native code mapping
pub mod table; // Connection table assembly

pub use address::{Endpoint, Ipv6ByteOrder};
pub use config::Config;
pub use error::{Error, Result};
pub use procfs::ProcNet;
pub use sockstat::{parse_socket_count, SocketSummary};
pub use state::{ConnectionState, LinuxTcpStates, StateMap};
pub use table::{ConnectionRecord, TableParser};
