//! Viewer count poll timer
//!
//! While a session is consuming, the client asks the server for the
//! channel's audience size every [`VIEWER_POLL_INTERVAL`]. The timer task
//! only enqueues ticks; the client sends the request when it handles them.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::SessionEvent;

/// Period between `PollConnectedViewers` requests
pub const VIEWER_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Repeating viewer poll timer owned by one session
///
/// Dropping the poller stops the timer.
#[derive(Debug)]
pub struct ViewerPoller {
    task: JoinHandle<()>,
}

impl ViewerPoller {
    /// Start ticking every `period`, first tick one `period` from now.
    ///
    /// The immediate first poll is the caller's job.
    pub(crate) fn start(
        generation: u64,
        period: Duration,
        tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(SessionEvent::PollTick { generation }).is_err() {
                    break;
                }
            }
        });

        Self { task }
    }
}

impl Drop for ViewerPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
