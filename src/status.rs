use std::fmt;

use crate::probe::ProbeOutcome;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ConnectivityStatus {
    Disconnected,
    Connected,
}

impl ConnectivityStatus {
    pub fn is_connected(&self) -> bool {
        *self == ConnectivityStatus::Connected
    }
}

impl From<bool> for ConnectivityStatus {
    fn from(connected: bool) -> Self {
        if connected {
            ConnectivityStatus::Connected
        } else {
            ConnectivityStatus::Disconnected
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityStatus::Connected => f.write_str("connected"),
            ConnectivityStatus::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Reduces a set of outcomes to overall connectivity: `true` if any probe
/// succeeded. An empty set is not evidence of connectivity.
pub fn reachable(outcomes: &[ProbeOutcome]) -> bool {
    outcomes.iter().any(|outcome| outcome.success)
}
