//! Socket summary counters (`/proc/net/sockstat`, `/proc/net/sockstat6`)
//!
//! The summary table has one line per protocol:
//!
//! ```text
//! sockets: used 294
//! TCP: inuse 12 orphan 0 tw 3 alloc 16 mem 2
//! UDP: inuse 6 mem 4
//! ```

use crate::error::{Error, Result};
use crate::parser::StringParser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read the `inuse` count from `protocol`'s line of a summary table.
///
/// The first occurrence of `protocol` in `contents` selects the line, whose
/// third space-separated field is the count.
pub fn parse_socket_count(contents: &str, protocol: &str) -> Result<u32> {
    let start = contents
        .find(protocol)
        .ok_or_else(|| Error::parse(format!("protocol {:?} not found in summary", protocol)))?;
    let line = &contents[start..];
    let line = match line.find('\n') {
        Some(end) => &line[..end],
        None => line,
    };

    let mut parser = StringParser::new(line, ' ', false);
    parser.move_next_or_fail()?; // "<name>:"
    parser.move_next_or_fail()?; // "inuse"
    parser.parse_next_u32()
}

/// All counters of a summary table, keyed by protocol then counter name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketSummary {
    protocols: BTreeMap<String, BTreeMap<String, u64>>,
}

impl SocketSummary {
    /// Parse every `NAME: key value key value ...` line
    pub fn parse(contents: &str) -> Result<Self> {
        let mut protocols = BTreeMap::new();

        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let (name, counters) = line
                .split_once(':')
                .ok_or_else(|| Error::parse(format!("missing ':' in summary line {:?}", line)))?;

            let mut parser = StringParser::new(counters, ' ', true);
            let mut values = BTreeMap::new();
            while parser.move_next() {
                let key = parser.extract_current()?;
                let value = parser.parse_next_u64().map_err(|_| {
                    Error::parse(format!("counter {:?} has no value in {:?}", key, line))
                })?;
                values.insert(key.to_string(), value);
            }

            protocols.insert(name.trim().to_string(), values);
        }

        Ok(Self { protocols })
    }

    /// A named counter of one protocol
    pub fn get(&self, protocol: &str, counter: &str) -> Option<u64> {
        self.protocols.get(protocol)?.get(counter).copied()
    }

    /// Sockets of `protocol` currently in use
    pub fn in_use(&self, protocol: &str) -> Option<u64> {
        self.get(protocol, "inuse")
    }

    /// Total sockets allocated, from the `sockets: used` line
    pub fn sockets_used(&self) -> Option<u64> {
        self.get("sockets", "used")
    }

    /// Protocol names in the table, sorted
    pub fn protocols(&self) -> impl Iterator<Item = &str> {
        self.protocols.keys().map(String::as_str)
    }

    /// Fold another table's counters in (e.g. sockstat6 into sockstat)
    pub fn merge(&mut self, other: SocketSummary) {
        for (name, counters) in other.protocols {
            self.protocols.entry(name).or_default().extend(counters);
        }
    }
}
