use std::{fmt, io};

use log::{debug, trace};
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use crate::target::ProbeTarget;

/// The result of probing a single [`ProbeTarget`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProbeOutcome {
    pub target: ProbeTarget,
    pub success: bool,
}

impl ProbeOutcome {
    pub fn new(target: ProbeTarget, success: bool) -> Self {
        Self { target, success }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.success {
            "reachable"
        } else {
            "unreachable"
        };
        write!(f, "{} {}", self.target, state)
    }
}

/// Why a probe did not connect. Only used for diagnostics; callers see a
/// plain `success = false`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum ProbeFailure {
    Timeout,
    Refused,
    Unreachable,
    Other,
}

impl From<&io::Error> for ProbeFailure {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => ProbeFailure::Timeout,
            io::ErrorKind::ConnectionRefused => ProbeFailure::Refused,
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                ProbeFailure::Unreachable
            }
            _ => ProbeFailure::Other,
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ProbeFailure::Timeout => "timed out",
            ProbeFailure::Refused => "connection refused",
            ProbeFailure::Unreachable => "unreachable",
            ProbeFailure::Other => "connection failed",
        };
        f.write_str(reason)
    }
}

/// Attempts one TCP connection to the target within its timeout.
///
/// No data is exchanged: a successful connection is shut down and dropped
/// straight away. Every network failure, including the timeout expiring, is
/// reported as `success = false`; this function never fails.
///
/// # Example
/// ```no_run
/// use async_connectivity::{probe, ProbeTarget};
/// use std::net::{IpAddr, Ipv4Addr};
///
/// tokio_test::block_on(async {
///     let outcome = probe(ProbeTarget::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))).await;
///     println!("{outcome}");
/// })
/// ```
pub async fn probe(target: ProbeTarget) -> ProbeOutcome {
    match connect(target).await {
        Ok(()) => {
            debug!("probe {} succeeded", target);
            ProbeOutcome::new(target, true)
        }
        Err(failure) => {
            debug!("probe {} failed: {}", target, failure);
            ProbeOutcome::new(target, false)
        }
    }
}

async fn connect(target: ProbeTarget) -> Result<(), ProbeFailure> {
    let mut stream = match timeout(target.timeout(), TcpStream::connect(target.socket_addr())).await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => {
            trace!("connect to {} returned: {}", target, err);
            return Err(ProbeFailure::from(&err));
        }
        Err(_elapsed) => return Err(ProbeFailure::Timeout),
    };
    // The connection already counts as established here.
    if let Err(err) = stream.shutdown().await {
        trace!("shutdown of {} failed: {}", target, err);
    }
    Ok(())
}
