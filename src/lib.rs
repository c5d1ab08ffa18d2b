//! ## Example
//! Following example checks whether the host is online by probing the default set of public DNS
//! resolvers over TCP, then prints the outcome of every probe.
//! ```no_run
//! use async_connectivity::{ConnectivityChecker, ProbeTarget};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let checker = ConnectivityChecker::default();
//!     checker.set_targets(vec![
//!         "1.1.1.1".parse::<ProbeTarget>().unwrap(),
//!         "9.9.9.9:53".parse::<ProbeTarget>().unwrap(),
//!     ]);
//!
//!     println!("status: {}", checker.status().await);
//!     for outcome in checker.last_results().unwrap().iter() {
//!         println!("{outcome}");
//!     }
//! }
//! ```
//! A failed probe is never an error: refused, unreachable and timed out connections are all
//! reported as unreachable outcomes. To follow connectivity over time, see [`monitor::Monitor`].

pub mod checker;
pub mod error;
pub mod monitor;
pub mod probe;
pub mod status;
pub mod target;

pub(crate) mod constants;

pub use checker::ConnectivityChecker;
pub use error::{Error, InvalidConfiguration, Result};
pub use monitor::{Monitor, MonitorConfig, MonitorConfigBuilder};
pub use probe::{probe, ProbeOutcome};
pub use status::ConnectivityStatus;
pub use target::{ProbeTarget, ProbeTargetBuilder};
