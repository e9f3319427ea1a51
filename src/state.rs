//! TCP connection states and native state-code mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// TCP connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    #[default]
    Unknown,
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    FinWait1,
    FinWait2,
    CloseWait,
    Closing,
    LastAck,
    TimeWait,
    DeleteTcb,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Unknown => write!(f, "UNKNOWN"),
            ConnectionState::Closed => write!(f, "CLOSED"),
            ConnectionState::Listen => write!(f, "LISTEN"),
            ConnectionState::SynSent => write!(f, "SYN_SENT"),
            ConnectionState::SynReceived => write!(f, "SYN_RECV"),
            ConnectionState::Established => write!(f, "ESTABLISHED"),
            ConnectionState::FinWait1 => write!(f, "FIN_WAIT1"),
            ConnectionState::FinWait2 => write!(f, "FIN_WAIT2"),
            ConnectionState::CloseWait => write!(f, "CLOSE_WAIT"),
            ConnectionState::Closing => write!(f, "CLOSING"),
            ConnectionState::LastAck => write!(f, "LAST_ACK"),
            ConnectionState::TimeWait => write!(f, "TIME_WAIT"),
            ConnectionState::DeleteTcb => write!(f, "DELETE_TCB"),
        }
    }
}

/// Maps a platform's native TCP state code to [`ConnectionState`].
///
/// Implementations must be total: codes they do not know map to
/// [`ConnectionState::Unknown`].
pub trait StateMap {
    fn map_state(&self, native: u32) -> ConnectionState;
}

impl<F> StateMap for F
where
    F: Fn(u32) -> ConnectionState,
{
    fn map_state(&self, native: u32) -> ConnectionState {
        self(native)
    }
}

/// Linux `TCP_*` codes as printed in the `st` column of `/proc/net/tcp`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinuxTcpStates;

impl StateMap for LinuxTcpStates {
    fn map_state(&self, native: u32) -> ConnectionState {
        match native {
            0x01 => ConnectionState::Established,
            0x02 => ConnectionState::SynSent,
            0x03 => ConnectionState::SynReceived,
            0x04 => ConnectionState::FinWait1,
            0x05 => ConnectionState::FinWait2,
            0x06 => ConnectionState::TimeWait,
            0x07 => ConnectionState::Closed,
            0x08 => ConnectionState::CloseWait,
            0x09 => ConnectionState::LastAck,
            0x0A => ConnectionState::Listen,
            0x0B => ConnectionState::Closing,
            // TCP_NEW_SYN_RECV: request socket still in the handshake
            0x0C => ConnectionState::SynReceived,
            _ => ConnectionState::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_states() {
        let map = LinuxTcpStates;
        assert_eq!(map.map_state(0x01), ConnectionState::Established);
        assert_eq!(map.map_state(0x0A), ConnectionState::Listen);
        assert_eq!(map.map_state(0x06), ConnectionState::TimeWait);
        assert_eq!(map.map_state(0x0C), ConnectionState::SynReceived);
    }

    #[test]
    fn test_unknown_codes() {
        let map = LinuxTcpStates;
        assert_eq!(map.map_state(0), ConnectionState::Unknown);
        assert_eq!(map.map_state(0xFF), ConnectionState::Unknown);
        assert_eq!(map.map_state(u32::MAX), ConnectionState::Unknown);
    }

    #[test]
    fn test_closure_mapper() {
        let all_closed = |_: u32| ConnectionState::Closed;
        assert_eq!(all_closed.map_state(0x0A), ConnectionState::Closed);
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::SynReceived.to_string(), "SYN_RECV");
        assert_eq!(ConnectionState::default().to_string(), "UNKNOWN");
    }
}
