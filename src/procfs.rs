//! Reading the kernel tables from a proc-style directory
//!
//! [`ProcNet`] fetches the raw text of each table and hands it to the
//! parsers. A table file that does not exist is an absent table (e.g.
//! `tcp6` on a kernel built without IPv6, or an empty `/proc/net` under
//! WSL); any other I/O failure is an error.
//!
//! ```no_run
//! use procnet::ProcNet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let net = ProcNet::new();
//! for conn in net.tcp_connections()? {
//!     println!("{}", conn);
//! }
//! println!("{} TCP sockets in use", net.tcp_socket_count()?);
//! # Ok(())
//! # }
//! ```

use crate::address::Endpoint;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sockstat::{parse_socket_count, SocketSummary};
use crate::state::{LinuxTcpStates, StateMap};
use crate::table::{ConnectionRecord, TableParser};
use std::io;
use std::path::{Path, PathBuf};

pub const TCP: &str = "tcp";
pub const TCP6: &str = "tcp6";
pub const UDP: &str = "udp";
pub const UDP6: &str = "udp6";
pub const SOCKSTAT: &str = "sockstat";
pub const SOCKSTAT6: &str = "sockstat6";

/// Table reader rooted at a `/proc/net` style directory
#[derive(Debug, Clone)]
pub struct ProcNet<M = LinuxTcpStates> {
    root: PathBuf,
    include_ipv6: bool,
    parser: TableParser<M>,
}

impl ProcNet<LinuxTcpStates> {
    /// Reader for the live `/proc/net`
    pub fn new() -> Self {
        Self::with_root("/proc/net")
    }

    /// Reader for a different directory (a container's proc, a fixture)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_ipv6: true,
            parser: TableParser::new(),
        }
    }

    /// Reader set up from a [`Config`]
    pub fn from_config(config: &Config) -> Self {
        let tables = &config.tables;
        Self {
            root: tables.proc_net_root.clone(),
            include_ipv6: tables.include_ipv6,
            parser: TableParser::new().with_ipv6_order(tables.ipv6_byte_order.resolve()),
        }
    }
}

impl Default for ProcNet<LinuxTcpStates> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StateMap> ProcNet<M> {
    /// Replace the table parser (state mapping, IPv6 layout)
    pub fn with_parser<N: StateMap>(self, parser: TableParser<N>) -> ProcNet<N> {
        ProcNet {
            root: self.root,
            include_ipv6: self.include_ipv6,
            parser,
        }
    }

    /// Treat the IPv6 tables as absent
    pub fn without_ipv6(mut self) -> Self {
        self.include_ipv6 = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw text of one table, `None` if the file does not exist
    pub fn read_table(&self, name: &str) -> Result<Option<String>> {
        let path = self.root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                log::debug!("read {} ({} bytes)", path.display(), contents.len());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} not present, treating as empty", path.display());
                Ok(None)
            }
            Err(e) => Err(Error::Io(io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))),
        }
    }

    /// Raw text of a table that must exist
    fn read_required(&self, name: &str) -> Result<String> {
        self.read_table(name)?.ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", self.root.join(name).display()),
            ))
        })
    }

    fn read_pair(&self, v4: &str, v6: &str) -> Result<(Option<String>, Option<String>)> {
        let v4 = self.read_table(v4)?;
        let v6 = if self.include_ipv6 {
            self.read_table(v6)?
        } else {
            None
        };
        Ok((v4, v6))
    }

    /// Active TCP connections over both families, listeners excluded
    pub fn tcp_connections(&self) -> Result<Vec<ConnectionRecord>> {
        let (v4, v6) = self.read_pair(TCP, TCP6)?;
        self.parser
            .parse_tcp_connections(v4.as_deref(), v6.as_deref())
    }

    /// Local endpoints of listening TCP sockets
    pub fn tcp_listeners(&self) -> Result<Vec<Endpoint>> {
        let (v4, v6) = self.read_pair(TCP, TCP6)?;
        self.parser.parse_tcp_listeners(v4.as_deref(), v6.as_deref())
    }

    /// Local endpoints of all UDP sockets
    pub fn udp_listeners(&self) -> Result<Vec<Endpoint>> {
        let (v4, v6) = self.read_pair(UDP, UDP6)?;
        self.parser.parse_udp_listeners(v4.as_deref(), v6.as_deref())
    }

    /// `inuse` count for `protocol` in the summary table `table`
    pub fn socket_count(&self, table: &str, protocol: &str) -> Result<u32> {
        parse_socket_count(&self.read_required(table)?, protocol)
    }

    pub fn tcp_socket_count(&self) -> Result<u32> {
        self.socket_count(SOCKSTAT, "TCP")
    }

    pub fn udp_socket_count(&self) -> Result<u32> {
        self.socket_count(SOCKSTAT, "UDP")
    }

    pub fn tcp6_socket_count(&self) -> Result<u32> {
        self.socket_count(SOCKSTAT6, "TCP6")
    }

    pub fn udp6_socket_count(&self) -> Result<u32> {
        self.socket_count(SOCKSTAT6, "UDP6")
    }

    /// Every summary counter, IPv6 protocols merged in when present
    pub fn socket_summary(&self) -> Result<SocketSummary> {
        let mut summary = SocketSummary::parse(&self.read_required(SOCKSTAT)?)?;
        if self.include_ipv6 {
            if let Some(v6) = self.read_table(SOCKSTAT6)? {
                summary.merge(SocketSummary::parse(&v6)?);
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv6ByteOrder;
    use crate::state::ConnectionState;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    /// Scratch directory removed on drop
    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!(
                "procnet-test-{}-{}",
                std::process::id(),
                NEXT_DIR.fetch_add(1, Ordering::Relaxed)
            ));
            fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn write(&self, name: &str, contents: &str) -> &Self {
            fs::write(self.dir.join(name), contents).unwrap();
            self
        }

        fn net(&self) -> ProcNet {
            ProcNet::with_root(&self.dir)
                .with_parser(TableParser::new().with_ipv6_order(Ipv6ByteOrder::WordReversed))
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    const TCP_TABLE: &str = "  sl  local_address rem_address   st tx_queue rx_queue\n\
                             \x20  0: 00000000:0016 00000000:0000 0A 00000000:00000000\n\
                             \x20  1: 0F02000A:0016 0102000A:D431 01 00000000:00000000\n";
    const TCP6_TABLE: &str = "  sl  local_address                         remote_address                        st\n\
                              \x20  0: 00000000000000000000000001000000:0CEA 00000000000000000000000000000000:0000 0A\n";
    const UDP_TABLE: &str = "  sl  local_address rem_address   st\n\
                             \x20 12: 3500007F:0035 00000000:0000 07\n";

    #[test]
    fn test_connections_and_listeners() {
        let fixture = Fixture::new();
        fixture.write(TCP, TCP_TABLE).write(TCP6, TCP6_TABLE);
        let net = fixture.net();

        let connections = net.tcp_connections().unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].state, ConnectionState::Established);
        assert_eq!(connections[0].local.to_string(), "10.0.2.15:22");
        assert_eq!(connections[0].remote.to_string(), "10.0.2.1:54321");

        let listeners = net.tcp_listeners().unwrap();
        let listeners: Vec<String> = listeners.iter().map(|e| e.to_string()).collect();
        assert_eq!(listeners, vec!["0.0.0.0:22", "[::1]:3306"]);
    }

    #[test]
    fn test_missing_tables_are_empty() {
        let fixture = Fixture::new();
        fixture.write(UDP, UDP_TABLE);
        let net = fixture.net();

        assert!(net.tcp_connections().unwrap().is_empty());
        assert!(net.read_table(UDP6).unwrap().is_none());
        let udp = net.udp_listeners().unwrap();
        assert_eq!(udp.len(), 1);
        assert_eq!(udp[0].to_string(), "127.0.0.53:53");
    }

    #[test]
    fn test_empty_file_is_empty_table() {
        let fixture = Fixture::new();
        fixture.write(TCP, "").write(TCP6, TCP6_TABLE);
        let listeners = fixture.net().tcp_listeners().unwrap();
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_without_ipv6() {
        let fixture = Fixture::new();
        fixture.write(TCP, TCP_TABLE).write(TCP6, TCP6_TABLE);
        let listeners = fixture.net().without_ipv6().tcp_listeners().unwrap();
        assert_eq!(listeners.len(), 1);
        assert!(listeners[0].address.is_ipv4());
    }

    #[test]
    fn test_malformed_table_is_an_error() {
        let fixture = Fixture::new();
        fixture.write(TCP, "header\n   0: 0100007F 00000000:0000 0A\n");
        let err = fixture.net().tcp_connections().unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_socket_counts() {
        let fixture = Fixture::new();
        fixture
            .write(SOCKSTAT, "sockets: used 40\nTCP: inuse 5 orphan 0 tw 1 alloc 6 mem 1\nUDP: inuse 3 mem 2\n")
            .write(SOCKSTAT6, "TCP6: inuse 2\nUDP6: inuse 1\n");
        let net = fixture.net();

        assert_eq!(net.tcp_socket_count().unwrap(), 5);
        assert_eq!(net.udp_socket_count().unwrap(), 3);
        assert_eq!(net.tcp6_socket_count().unwrap(), 2);
        assert_eq!(net.udp6_socket_count().unwrap(), 1);

        let summary = net.socket_summary().unwrap();
        assert_eq!(summary.sockets_used(), Some(40));
        assert_eq!(summary.in_use("UDP6"), Some(1));
    }

    #[test]
    fn test_missing_sockstat_is_io_error() {
        let fixture = Fixture::new();
        let err = fixture.net().tcp_socket_count().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.tables.proc_net_root = PathBuf::from("/tmp/elsewhere");
        config.tables.ipv6_byte_order = crate::config::ByteOrderSetting::Direct;
        let net = ProcNet::from_config(&config);
        assert_eq!(net.root(), Path::new("/tmp/elsewhere"));
        assert_eq!(net.parser.ipv6_order(), Ipv6ByteOrder::Direct);
    }
}
