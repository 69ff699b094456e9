//! Remote control for a running client

use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::session::SessionEvent;

/// Command queued by a [`ClientHandle`]
#[derive(Debug)]
pub(crate) enum Command {
    Watch {
        channel_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Reset,
    Shutdown,
}

/// Cloneable handle to a client whose event loop runs elsewhere
///
/// Commands are queued behind whatever events the client has not handled
/// yet, so they observe the session in order.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ClientHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Start watching a channel.
    ///
    /// Fails with a usage error if the client is already watching.
    pub async fn watch(&self, channel_id: impl Into<String>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Watch {
            channel_id: channel_id.into(),
            reply,
        })?;
        rx.await.map_err(|_| Error::ClientStopped)?
    }

    /// Tear the current session down
    pub fn reset(&self) -> Result<()> {
        self.command(Command::Reset)
    }

    /// Reset and stop the client's event loop
    pub fn shutdown(&self) -> Result<()> {
        self.command(Command::Shutdown)
    }

    /// Check if the client's event loop has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn command(&self, command: Command) -> Result<()> {
        self.tx
            .send(SessionEvent::Command(command))
            .map_err(|_| Error::ClientStopped)
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[tokio::test]
    async fn test_commands_queued() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(tx);

        assert_ok!(handle.reset());
        assert_ok!(handle.shutdown());

        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::Command(Command::Reset))
        ));
        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::Command(Command::Shutdown))
        ));
    }

    #[tokio::test]
    async fn test_stopped_client() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(tx);
        drop(rx);

        assert!(handle.is_closed());
        assert_err!(handle.reset());
        assert!(matches!(
            handle.watch("chan").await,
            Err(Error::ClientStopped)
        ));
    }
}
