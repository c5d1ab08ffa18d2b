use std::{sync::Arc, time::Duration};

use log::{debug, info};
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    checker::ConnectivityChecker,
    constants::DEFAULT_MONITOR_INTERVAL,
    error::{Error, InvalidConfiguration, Result},
    status::ConnectivityStatus,
};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct MonitorConfigBuilder {
    interval: Option<Duration>,
}

impl MonitorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> std::result::Result<MonitorConfig, InvalidConfiguration> {
        let interval = self.interval.unwrap_or(DEFAULT_MONITOR_INTERVAL);
        if interval.is_zero() {
            return Err(InvalidConfiguration::ZeroInterval);
        }
        Ok(MonitorConfig { interval })
    }
}

/// Re-runs [`ConnectivityChecker::check`] in the background and publishes
/// status transitions.
///
/// Every tick performs one ordinary check, i.e. one attempt per target. The
/// background task stops when the monitor is dropped.
///
/// # Example
/// ```no_run
/// use async_connectivity::{ConnectivityChecker, Monitor, MonitorConfigBuilder};
/// use std::{sync::Arc, time::Duration};
///
/// tokio_test::block_on(async {
///     let checker = Arc::new(ConnectivityChecker::default());
///     let config = MonitorConfigBuilder::new()
///         .with_interval(Duration::from_secs(60))
///         .build()
///         .unwrap();
///     let mut monitor = Monitor::spawn(checker, config).unwrap();
///     while let Ok(status) = monitor.changed().await {
///         println!("now {status}");
///     }
/// })
/// ```
#[derive(Debug)]
pub struct Monitor {
    receiver: watch::Receiver<Option<ConnectivityStatus>>,
    _task_spawner: BackgroundTaskSpawner,
}

impl Monitor {
    /// Starts monitoring on the current tokio runtime. The first check runs
    /// immediately.
    ///
    /// # Errors
    /// Returns an error when called outside a tokio runtime.
    pub fn spawn(checker: Arc<ConnectivityChecker>, config: MonitorConfig) -> Result<Self> {
        let handle = Handle::try_current().map_err(|err| {
            Error::Opaque(format!("failed to spawn monitor, reason: {}", err).into())
        })?;
        let (sender, receiver) = watch::channel(None);

        let mut task_spawner = BackgroundTaskSpawner::new();
        task_spawner.spawn(&handle, Watcher::new(checker, config.interval, sender));

        Ok(Self {
            receiver,
            _task_spawner: task_spawner,
        })
    }

    /// Latest published status, `None` until the first check completes.
    pub fn status(&self) -> Option<ConnectivityStatus> {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ConnectivityStatus>> {
        self.receiver.clone()
    }

    /// Waits for the next status transition.
    ///
    /// # Errors
    /// Returns an error if the background task is no longer running.
    pub async fn changed(&mut self) -> Result<ConnectivityStatus> {
        loop {
            self.receiver.changed().await.map_err(|err| {
                Error::Opaque(format!("monitor stopped, reason: {}", err).into())
            })?;
            if let Some(status) = *self.receiver.borrow_and_update() {
                return Ok(status);
            }
        }
    }
}

struct Watcher {
    checker: Arc<ConnectivityChecker>,
    interval: Duration,
    sender: watch::Sender<Option<ConnectivityStatus>>,
}

impl Watcher {
    fn new(
        checker: Arc<ConnectivityChecker>,
        interval: Duration,
        sender: watch::Sender<Option<ConnectivityStatus>>,
    ) -> Self {
        Self {
            checker,
            interval,
            sender,
        }
    }

    async fn watch(&self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let status = self.checker.status().await;
            let changed = self.sender.send_if_modified(|current| {
                if *current == Some(status) {
                    return false;
                }
                *current = Some(status);
                true
            });
            if changed {
                info!("connectivity changed: {}", status);
            } else {
                debug!("connectivity unchanged: {}", status);
            }
        }
    }
}

#[derive(Debug)]
struct BackgroundTaskSpawner {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundTaskSpawner {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            handle: None,
        }
    }

    fn spawn(&mut self, runtime: &Handle, watcher: Watcher) {
        let token = self.token.clone();
        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = watcher.watch() => {},
                _ = token.cancelled() => {
                    debug!("connectivity monitor stopped");
                }
            }
        });
        self.handle = Some(handle);
    }
}

impl Drop for BackgroundTaskSpawner {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}
