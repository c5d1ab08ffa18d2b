use std::{
    future::Future,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use log::debug;

use crate::{
    probe::{probe, ProbeOutcome},
    status::{reachable, ConnectivityStatus},
    target::ProbeTarget,
};

/// Decides whether the host can reach the internet by probing a list of
/// targets concurrently.
///
/// The checker keeps the outcomes of the most recent run as an audit trail,
/// see [`ConnectivityChecker::last_results`]. It is cheap to share behind an
/// [`Arc`], and [`ConnectivityChecker::global`] offers a process-wide
/// instance for call sites that have no composition root to receive one from.
///
/// # Example
/// ```no_run
/// use async_connectivity::ConnectivityChecker;
///
/// tokio_test::block_on(async {
///     let checker = ConnectivityChecker::default();
///     if checker.check().await {
///         println!("online");
///     }
///     for outcome in checker.last_results().unwrap().iter() {
///         println!("{outcome}");
///     }
/// })
/// ```
#[derive(Debug)]
pub struct ConnectivityChecker {
    targets: RwLock<Vec<ProbeTarget>>,
    last_results: RwLock<Option<Arc<[ProbeOutcome]>>>,
}

impl Default for ConnectivityChecker {
    fn default() -> Self {
        Self::new(ProbeTarget::defaults())
    }
}

impl ConnectivityChecker {
    pub fn new(targets: Vec<ProbeTarget>) -> Self {
        Self {
            targets: RwLock::new(targets),
            last_results: RwLock::new(None),
        }
    }

    /// Returns the process-wide checker, created with the default targets on
    /// first use.
    pub fn global() -> &'static ConnectivityChecker {
        static GLOBAL: OnceLock<ConnectivityChecker> = OnceLock::new();
        GLOBAL.get_or_init(ConnectivityChecker::default)
    }

    /// Replaces the target list, consuming and returning the checker.
    pub fn with_targets(mut self, targets: Vec<ProbeTarget>) -> Self {
        *self
            .targets
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = targets;
        self
    }

    pub fn targets(&self) -> Vec<ProbeTarget> {
        self.targets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the target list used by subsequent runs.
    ///
    /// A run copies the list when it starts, so replacing it while a check
    /// is in flight only affects later checks.
    pub fn set_targets(&self, targets: Vec<ProbeTarget>) {
        *self.targets.write().unwrap_or_else(PoisonError::into_inner) = targets;
    }

    /// Outcomes of the most recently completed run, in target order.
    ///
    /// Returns `None` until the first run completes.
    pub fn last_results(&self) -> Option<Arc<[ProbeOutcome]>> {
        self.last_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Status derived from [`Self::last_results`] without probing again.
    pub fn last_status(&self) -> Option<ConnectivityStatus> {
        self.last_results()
            .map(|outcomes| ConnectivityStatus::from(reachable(&outcomes)))
    }

    /// Probes every target concurrently and returns `true` if at least one
    /// connection succeeded.
    ///
    /// All probes run to completion, each bounded by its own timeout, so the
    /// call takes at most about as long as the largest timeout. The outcomes
    /// replace [`Self::last_results`] as a whole once every probe finished.
    /// An empty target list yields `false`.
    pub async fn check(&self) -> bool {
        self.check_with(probe).await
    }

    /// Same as [`Self::check`], mapped to a [`ConnectivityStatus`].
    pub async fn status(&self) -> ConnectivityStatus {
        ConnectivityStatus::from(self.check().await)
    }

    pub(crate) async fn check_with<F, Fut>(&self, prober: F) -> bool
    where
        F: Fn(ProbeTarget) -> Fut,
        Fut: Future<Output = ProbeOutcome>,
    {
        let targets = self.targets();
        debug!("probing {} targets", targets.len());

        let outcomes: Arc<[ProbeOutcome]> =
            futures::future::join_all(targets.into_iter().map(prober))
                .await
                .into();
        let connected = reachable(&outcomes);
        debug!(
            "{} of {} probes succeeded",
            outcomes.iter().filter(|outcome| outcome.success).count(),
            outcomes.len()
        );

        *self
            .last_results
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcomes);
        connected
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    use tokio::{
        net::TcpListener,
        time::{sleep, Instant},
    };

    use super::*;
    use crate::target::ProbeTargetBuilder;

    fn loopback_target(port: u16, timeout: Duration) -> ProbeTarget {
        ProbeTargetBuilder::new()
            .with_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(port)
            .with_timeout(timeout)
            .build()
            .unwrap()
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn successes(checker: &ConnectivityChecker) -> Vec<bool> {
        checker
            .last_results()
            .unwrap()
            .iter()
            .map(|outcome| outcome.success)
            .collect()
    }

    // Stands in for a connection attempt that takes `target.timeout()` to
    // settle. Port 1 marks a target that answers.
    async fn delayed_prober(target: ProbeTarget) -> ProbeOutcome {
        sleep(target.timeout()).await;
        ProbeOutcome::new(target, target.port() == 1)
    }

    #[tokio::test]
    async fn test_check_one_reachable_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        let checker = ConnectivityChecker::new(vec![
            loopback_target(closed_port().await, Duration::from_secs(1)),
            loopback_target(open_port, Duration::from_secs(1)),
        ]);

        assert!(checker.last_results().is_none());
        assert!(checker.check().await);
        assert_eq!(successes(&checker), vec![false, true]);
        assert_eq!(checker.last_status(), Some(ConnectivityStatus::Connected));
    }

    #[tokio::test]
    async fn test_check_all_refused() {
        let port = closed_port().await;
        let checker = ConnectivityChecker::new(vec![
            loopback_target(port, Duration::from_secs(1)),
            loopback_target(port, Duration::from_secs(1)),
        ]);

        assert!(!checker.check().await);
        assert_eq!(successes(&checker), vec![false, false]);
        assert_eq!(checker.status().await, ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_check_empty_targets() {
        let checker = ConnectivityChecker::new(Vec::new());

        assert!(!checker.check().await);
        assert!(checker.last_results().unwrap().is_empty());
        assert_eq!(
            checker.last_status(),
            Some(ConnectivityStatus::Disconnected)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_target_order() {
        let checker = ConnectivityChecker::new(vec![
            loopback_target(1, Duration::from_millis(300)),
            loopback_target(2, Duration::from_millis(100)),
            loopback_target(3, Duration::from_millis(200)),
        ]);

        let start = Instant::now();
        assert!(checker.check_with(delayed_prober).await);
        let elapsed = start.elapsed();

        let ports: Vec<u16> = checker
            .last_results()
            .unwrap()
            .iter()
            .map(|outcome| outcome.target.port())
            .collect();
        assert_eq!(ports, vec![1, 2, 3]);
        assert_eq!(successes(&checker), vec![true, false, false]);
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_run_concurrently() {
        let targets = (10..13)
            .map(|port| loopback_target(port, Duration::from_secs(1)))
            .collect();
        let checker = ConnectivityChecker::new(targets);
        let never_connects = |target: ProbeTarget| async move {
            let pending = futures::future::pending::<()>();
            let connected = tokio::time::timeout(target.timeout(), pending).await.is_ok();
            ProbeOutcome::new(target, connected)
        };

        let start = Instant::now();
        assert!(!checker.check_with(never_connects).await);
        let elapsed = start.elapsed();

        assert_eq!(successes(&checker), vec![false, false, false]);
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_targets_snapshotted_at_start() {
        let checker = ConnectivityChecker::new(vec![
            loopback_target(2, Duration::from_millis(100)),
            loopback_target(3, Duration::from_millis(100)),
        ]);

        let (connected, _) = tokio::join!(checker.check_with(delayed_prober), async {
            sleep(Duration::from_millis(10)).await;
            checker.set_targets(vec![loopback_target(1, Duration::from_millis(100))]);
        });

        assert!(!connected);
        assert_eq!(checker.last_results().unwrap().len(), 2);
        assert_eq!(checker.targets().len(), 1);

        assert!(checker.check_with(delayed_prober).await);
        assert_eq!(successes(&checker), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_matches_check() {
        let checker = ConnectivityChecker::new(Vec::new())
            .with_targets(vec![loopback_target(1, Duration::from_millis(50))]);

        let connected = checker.check_with(delayed_prober).await;
        assert_eq!(
            checker.last_status(),
            Some(ConnectivityStatus::from(connected))
        );
        assert_eq!(checker.last_status(), Some(ConnectivityStatus::Connected));
    }

    #[test]
    fn test_default_and_global_targets() {
        assert_eq!(ConnectivityChecker::default().targets(), ProbeTarget::defaults());
        assert!(std::ptr::eq(
            ConnectivityChecker::global(),
            ConnectivityChecker::global()
        ));
        assert_eq!(ConnectivityChecker::global().targets().len(), 3);
    }
}
