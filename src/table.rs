//! Connection table assembly
//!
//! Drives the tokenizer, endpoint decoder and state mapper over the
//! IPv4 and IPv6 tables of one protocol and merges them into a single
//! result, IPv4 rows first. Each table's first line is a header. A table
//! that is absent (`None`) or empty contributes nothing; a malformed row
//! fails the whole call.
//!
//! ```
//! use procnet::table::TableParser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tcp = "  sl  local_address rem_address   st\n   \
//!            0: 0100007F:0277 00000000:0000 0A\n   \
//!            1: 0100007F:A0C2 0100007F:0277 01\n";
//!
//! let parser = TableParser::new();
//! let connections = parser.parse_tcp_connections(Some(tcp), None)?;
//! let listeners = parser.parse_tcp_listeners(Some(tcp), None)?;
//! assert_eq!(connections.len(), 1);
//! assert_eq!(listeners[0].to_string(), "127.0.0.1:631");
//! # Ok(())
//! # }
//! ```

use crate::address::{Endpoint, Ipv6ByteOrder};
use crate::error::{Error, Result};
use crate::parser::StringParser;
use crate::state::{ConnectionState, LinuxTcpStates, StateMap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of a TCP connection table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub local: Endpoint,
    pub remote: Endpoint,
    pub state: ConnectionState,
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.local, self.remote, self.state)
    }
}

#[derive(Debug, Clone, Copy)]
enum Family {
    V4,
    V6,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4 table"),
            Family::V6 => write!(f, "IPv6 table"),
        }
    }
}

/// The IPv4 and IPv6 tables of one protocol, split into lines
struct Tables<'a> {
    v4: Vec<&'a str>,
    v6: Vec<&'a str>,
}

impl<'a> Tables<'a> {
    fn split(v4: Option<&'a str>, v6: Option<&'a str>) -> Self {
        Self {
            v4: table_lines(v4),
            v6: table_lines(v6),
        }
    }

    /// Upper bound on the number of rows any result can hold
    fn data_line_count(&self) -> usize {
        data_lines(&self.v4).len() + data_lines(&self.v6).len()
    }

    /// Call `f` for every data row, IPv4 first.
    ///
    /// Parse errors are tagged with the table and 1-based line number.
    fn for_each_row<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        for (family, lines) in [(Family::V4, &self.v4), (Family::V6, &self.v6)] {
            for (idx, &line) in data_lines(lines).iter().enumerate() {
                f(line).map_err(|e| match e {
                    // +2: header is line 1
                    Error::Parse(msg) => {
                        Error::Parse(format!("{} line {}: {}", family, idx + 2, msg))
                    }
                    other => other,
                })?;
            }
        }
        Ok(())
    }
}

/// Non-empty lines of a table, header included
fn table_lines(contents: Option<&str>) -> Vec<&str> {
    contents
        .map(|text| text.split('\n').filter(|line| !line.is_empty()).collect())
        .unwrap_or_default()
}

/// Lines after the header; an empty table has none
fn data_lines<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    if lines.is_empty() {
        lines
    } else {
        &lines[1..]
    }
}

/// Pre-sized output buffer that overwrites rejected entries in place.
///
/// Every item is written to the next free slot; the slot is only claimed
/// when the item is kept, so a rejected item is overwritten by the next
/// write and the final length is exactly the kept count.
struct Compactor<T> {
    slots: Vec<T>,
    kept: usize,
    skipped: usize,
}

impl<T> Compactor<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            kept: 0,
            skipped: 0,
        }
    }

    fn write(&mut self, item: T, keep: bool) {
        if self.kept < self.slots.len() {
            self.slots[self.kept] = item;
        } else {
            self.slots.push(item);
        }
        if keep {
            self.kept += 1;
        } else {
            self.skipped += 1;
        }
    }

    fn finish(mut self, what: &str) -> Vec<T> {
        log::trace!("{}: kept {}, skipped {}", what, self.kept, self.skipped);
        self.slots.truncate(self.kept);
        self.slots.shrink_to_fit();
        self.slots
    }
}

/// Parser for `/proc/net/{tcp,tcp6,udp,udp6}` style tables
#[derive(Debug, Clone)]
pub struct TableParser<M = LinuxTcpStates> {
    states: M,
    ipv6_order: Ipv6ByteOrder,
}

impl TableParser<LinuxTcpStates> {
    /// Parser using the Linux state codes and the host's IPv6 layout
    pub fn new() -> Self {
        Self::with_state_map(LinuxTcpStates)
    }
}

impl Default for TableParser<LinuxTcpStates> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StateMap> TableParser<M> {
    /// Parser using a platform-specific state mapping
    pub fn with_state_map(states: M) -> Self {
        Self {
            states,
            ipv6_order: Ipv6ByteOrder::native(),
        }
    }

    /// Override how 32-digit IPv6 fields are laid out
    pub fn with_ipv6_order(mut self, order: Ipv6ByteOrder) -> Self {
        self.ipv6_order = order;
        self
    }

    pub fn ipv6_order(&self) -> Ipv6ByteOrder {
        self.ipv6_order
    }

    /// Parse one data row into local/remote endpoints and state
    pub fn parse_connection_line(&self, line: &str) -> Result<ConnectionRecord> {
        let mut parser = StringParser::new(line, ' ', true);
        parser.move_next_or_fail()?; // sl

        let local = Endpoint::from_hex(parser.move_and_extract_next()?, self.ipv6_order)?;
        let remote = Endpoint::from_hex(parser.move_and_extract_next()?, self.ipv6_order)?;
        let native_state = parser.parse_next_hex_u32()?;

        Ok(ConnectionRecord {
            local,
            remote,
            state: self.states.map_state(native_state),
        })
    }

    /// Parse only the local endpoint of one data row
    pub fn parse_local_endpoint(&self, line: &str) -> Result<Endpoint> {
        let mut parser = StringParser::new(line, ' ', true);
        parser.move_next_or_fail()?; // sl

        Endpoint::from_hex(parser.move_and_extract_next()?, self.ipv6_order)
    }

    /// All TCP connections except listening sockets
    pub fn parse_tcp_connections(
        &self,
        v4: Option<&str>,
        v6: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>> {
        let tables = Tables::split(v4, v6);
        let mut out = Compactor::with_capacity(tables.data_line_count());

        tables.for_each_row(|line| {
            let record = self.parse_connection_line(line)?;
            out.write(record, record.state != ConnectionState::Listen);
            Ok(())
        })?;

        Ok(out.finish("tcp connections"))
    }

    /// Local endpoints of TCP sockets in the listen state
    pub fn parse_tcp_listeners(&self, v4: Option<&str>, v6: Option<&str>) -> Result<Vec<Endpoint>> {
        let tables = Tables::split(v4, v6);
        let mut out = Compactor::with_capacity(tables.data_line_count());

        tables.for_each_row(|line| {
            let record = self.parse_connection_line(line)?;
            out.write(record.local, record.state == ConnectionState::Listen);
            Ok(())
        })?;

        Ok(out.finish("tcp listeners"))
    }

    /// Local endpoints of every UDP socket; UDP rows are not filtered by state
    pub fn parse_udp_listeners(&self, v4: Option<&str>, v6: Option<&str>) -> Result<Vec<Endpoint>> {
        let tables = Tables::split(v4, v6);
        let mut out = Compactor::with_capacity(tables.data_line_count());

        tables.for_each_row(|line| {
            out.write(self.parse_local_endpoint(line)?, true);
            Ok(())
        })?;

        Ok(out.finish("udp listeners"))
    }
}
