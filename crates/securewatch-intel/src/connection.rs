//! SOC connection indicator.
//!
//! Every 30 seconds the status is redrawn: 80% connected, 15% warning,
//! 5% error. Nothing is actually probed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connected,
    Warning,
    Error,
}

const WEIGHTS: [(ConnectionStatus, f64); 3] = [
    (ConnectionStatus::Connected, 0.80),
    (ConnectionStatus::Warning, 0.15),
    (ConnectionStatus::Error, 0.05),
];

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Live",
            ConnectionStatus::Warning   => "Unstable",
            ConnectionStatus::Error     => "Offline",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "text-success",
            ConnectionStatus::Warning   => "text-warning",
            ConnectionStatus::Error     => "text-danger",
        }
    }

    /// Cumulative-weight walk over a uniform draw in `[0, 1)`.
    pub fn from_roll(roll: f64) -> Self {
        let mut cumulative = 0.0;
        for (status, weight) in WEIGHTS {
            cumulative += weight;
            if roll <= cumulative {
                return status;
            }
        }
        ConnectionStatus::Error
    }

    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen::<f64>())
    }
}

pub struct ConnectionMonitor {
    status: Arc<RwLock<ConnectionStatus>>,
    period: Duration,
}

impl ConnectionMonitor {
    pub fn new(period: Duration) -> Self {
        Self {
            status: Arc::new(RwLock::new(ConnectionStatus::Connected)),
            period,
        }
    }

    pub async fn current(&self) -> ConnectionStatus {
        *self.status.read().await
    }

    /// Redraw the status every period until `shutdown_rx` fires. `on_change`
    /// runs whenever a draw differs from the previous status.
    pub fn start_with_shutdown<R, F>(
        &self,
        mut rng: R,
        mut shutdown_rx: broadcast::Receiver<()>,
        on_change: F,
    ) -> JoinHandle<()>
    where
        R: Rng + Send + 'static,
        F: Fn(ConnectionStatus) + Send + 'static,
    {
        let status = self.status.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick completes immediately; the page starts out connected.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let next = ConnectionStatus::draw(&mut rng);
                        let mut current = status.write().await;
                        if *current != next {
                            debug!(from = ?*current, to = ?next, "connection status changed");
                            *current = next;
                            on_change(next);
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("connection monitor shutting down");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_roll_boundaries() {
        assert_eq!(ConnectionStatus::from_roll(0.0), ConnectionStatus::Connected);
        assert_eq!(ConnectionStatus::from_roll(0.80), ConnectionStatus::Connected);
        assert_eq!(ConnectionStatus::from_roll(0.81), ConnectionStatus::Warning);
        assert_eq!(ConnectionStatus::from_roll(0.94), ConnectionStatus::Warning);
        assert_eq!(ConnectionStatus::from_roll(0.97), ConnectionStatus::Error);
    }

    #[test]
    fn test_draws_mostly_connected() {
        let mut rng = StdRng::seed_from_u64(17);
        let draws: Vec<_> = (0..2000).map(|_| ConnectionStatus::draw(&mut rng)).collect();
        let connected = draws.iter().filter(|s| **s == ConnectionStatus::Connected).count();
        assert!(connected > 1400 && connected < 1800, "connected {connected}/2000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_stops_on_shutdown() {
        let monitor = ConnectionMonitor::new(Duration::from_secs(30));
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = monitor.start_with_shutdown(StdRng::seed_from_u64(1), shutdown_rx, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(3_000)).await;
        assert!(changes.load(Ordering::SeqCst) > 0, "100 draws should change status at least once");

        shutdown_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "monitor should shut down promptly");
    }
}
