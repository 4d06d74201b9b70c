//! Configuration file watcher for hot reload.
//!
//! Reloads the seed file when it changes on disk or on SIGHUP, and hands the
//! new configuration to a callback that reconciles the routing context.

use crate::config::{Config, load_config};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

/// Callback type for config reload.
pub type ReloadCallback = Box<dyn Fn(Config) + Send + Sync>;

/// Configuration file watcher.
pub struct ConfigWatcher {
    config_path: PathBuf,
    reload_callback: ReloadCallback,
}

impl ConfigWatcher {
    /// Create a new config watcher.
    pub fn new(config_path: PathBuf, reload_callback: ReloadCallback) -> Self {
        Self {
            config_path,
            reload_callback,
        }
    }

    /// Get the path being watched.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Run until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(path = %self.config_path.display(), "config watcher starting");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        );

        // The watcher must stay alive for events to keep flowing.
        let _watcher = match watcher {
            Ok(mut w) => {
                let dir = self
                    .config_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                match w.watch(dir, RecursiveMode::NonRecursive) {
                    Ok(()) => Some(w),
                    Err(e) => {
                        error!(error = %e, "failed to watch config directory");
                        None
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "failed to create file watcher");
                None
            }
        };

        #[cfg(unix)]
        let mut sighup =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(error = %e, "failed to setup SIGHUP handler");
                    None
                }
            };

        info!("config watcher ready");

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    if self.should_reload(&event) {
                        // Editors often emit a burst of events per save.
                        while rx.try_recv().is_ok() {}
                        self.try_reload();
                    }
                }

                _ = async {
                    #[cfg(unix)]
                    {
                        match sighup.as_mut() {
                            Some(sig) => sig.recv().await,
                            None => std::future::pending::<Option<()>>().await,
                        }
                    }
                    #[cfg(not(unix))]
                    {
                        std::future::pending::<Option<()>>().await
                    }
                } => {
                    info!("received SIGHUP, reloading configuration");
                    self.try_reload();
                }

                _ = shutdown.recv() => {
                    info!("config watcher shutting down");
                    break;
                }
            }
        }
    }

    /// Check if this event should trigger a reload.
    fn should_reload(&self, event: &Event) -> bool {
        let is_our_file = event
            .paths
            .iter()
            .any(|p| p.file_name() == self.config_path.file_name());

        is_our_file && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
    }

    /// Load the file and hand it to the callback. Invalid files are skipped.
    fn try_reload(&self) -> bool {
        match load_config(&self.config_path) {
            Ok(config) => {
                info!(
                    servers = config.servers.len(),
                    algorithm = ?config.strategy.algorithm,
                    "configuration reloaded"
                );
                (self.reload_callback)(config);
                true
            }
            Err(e) => {
                error!(error = %e, "failed to reload config, keeping current");
                false
            }
        }
    }
}
