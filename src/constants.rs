use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

pub(crate) const DEFAULT_PORT: u16 = 53;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(30);

// Cloudflare, Google and OpenDNS public resolvers.
pub(crate) const DEFAULT_TARGET_ADDRS: [IpAddr; 3] = [
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(208, 67, 222, 222)),
];
